#![cfg(test)]

use crate::config::Config;
use crate::hash::Algorithm;
use crate::merkle::{combine, MerkleTree};
use crate::proof::{verify, Proof, Side};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

type Item = [u8; 8];

/// Custom merkle hash util test. Nodes are tagged so that swapping the
/// children changes the parent.
#[derive(Debug, Clone, Copy, Default)]
struct CMH;

impl Algorithm<Item> for CMH {
    #[inline]
    fn hash(&self, data: &[u8]) -> anyhow::Result<Item> {
        let mut h = DefaultHasher::new();
        h.write(data);
        Ok(h.finish().to_le_bytes())
    }

    #[inline]
    fn node(&self, left: &Item, right: &Item) -> anyhow::Result<Item> {
        let mut h = DefaultHasher::new();
        h.write(&[1u8]);
        h.write(left.as_ref());
        h.write(&[2u8]);
        h.write(right.as_ref());
        Ok(h.finish().to_le_bytes())
    }
}

fn flip_sides(p: &Proof<Item>) -> Proof<Item> {
    let sides = p
        .sides()
        .iter()
        .map(|s| match s {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        })
        .collect();
    Proof::new(p.siblings().to_vec(), sides).unwrap()
}

#[test]
fn test_custom_merkle_hasher() {
    let config = Config::new(CMH);
    let mt: MerkleTree<Item, CMH> = MerkleTree::build(config, &[1u32, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(mt.depth(), 3);

    let l = mt.layer(0).unwrap();
    let n01 = CMH.node(&l[0], &l[1]).unwrap();
    assert_eq!(mt.layer(1).unwrap()[0], n01);
    assert_ne!(n01, CMH.node(&l[1], &l[0]).unwrap());

    for i in 0..mt.leafs() {
        let p = mt.prove(i).unwrap();
        assert!(verify(mt.config(), mt.leaf(i).unwrap(), &p, &mt.root()).unwrap());
        // Order matters for an asymmetric node hash.
        assert!(!verify(mt.config(), mt.leaf(i).unwrap(), &flip_sides(&p), &mt.root()).unwrap());
    }
}

#[test]
fn test_sorted_siblings_ignore_sides() {
    let config = Config::new(CMH).with_sorted_siblings(true);
    let mt: MerkleTree<Item, CMH> = MerkleTree::build(config, &["a", "b", "c", "d", "e"]).unwrap();

    for i in 0..mt.leafs() {
        let p = mt.prove(i).unwrap();
        assert!(verify(mt.config(), mt.leaf(i).unwrap(), &p, &mt.root()).unwrap());
        assert!(verify(mt.config(), mt.leaf(i).unwrap(), &flip_sides(&p), &mt.root()).unwrap());
    }

    let (a, b) = (mt.leaf(0).unwrap(), mt.leaf(1).unwrap());
    assert_eq!(
        combine(mt.config(), a, b).unwrap(),
        combine(mt.config(), b, a).unwrap()
    );
}

#[test]
fn test_sorting_changes_the_tree() {
    let x: Vec<u64> = (0..32).collect();
    let plain: MerkleTree<Item, CMH> = MerkleTree::build(Config::new(CMH), &x).unwrap();
    let sorted: MerkleTree<Item, CMH> =
        MerkleTree::build(Config::new(CMH).with_sorted_siblings(true), &x).unwrap();
    assert_eq!(plain.leaves(), sorted.leaves());
    assert_ne!(plain.root(), sorted.root());

    // A proof is only valid under the combination rule it was made with: at
    // least the leaves below an out of order pair no longer verify.
    let proofs = plain.proofs().unwrap();
    assert!(proofs
        .iter()
        .enumerate()
        .any(|(i, p)| !verify(sorted.config(), plain.leaf(i).unwrap(), p, &plain.root()).unwrap()));
}
