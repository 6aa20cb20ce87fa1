//! Content digest for UI trees using BLAKE3

use crate::tree::value::{Scalar, TreeValue};
use blake3::Hasher;

pub type Digest = [u8; 32];

/// Compute a structural digest of a tree.
///
/// Map entries are hashed in key order so that two trees that compare equal
/// always produce the same digest, whatever their insertion order.
pub fn compute_digest(tree: &TreeValue) -> Digest {
    let mut hasher = Hasher::new();
    hash_node(&mut hasher, tree);
    *hasher.finalize().as_bytes()
}

/// Hex form of [`compute_digest`], as shown in status output.
pub fn digest_hex(tree: &TreeValue) -> String {
    blake3::Hash::from(compute_digest(tree)).to_hex().to_string()
}

fn hash_str(hasher: &mut Hasher, s: &str) {
    // Length prefix (8 bytes, big-endian) keeps adjacent strings unambiguous
    hasher.update(&(s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}

fn hash_node(hasher: &mut Hasher, node: &TreeValue) {
    match node {
        TreeValue::Scalar(Scalar::Null) => {
            hasher.update(b"null");
        }
        TreeValue::Scalar(Scalar::Bool(b)) => {
            hasher.update(b"bool");
            hasher.update(&[u8::from(*b)]);
        }
        TreeValue::Scalar(Scalar::Number(n)) => {
            hasher.update(b"number");
            hash_str(hasher, &n.to_string());
        }
        TreeValue::Scalar(Scalar::String(s)) => {
            hasher.update(b"string");
            hash_str(hasher, s);
        }
        TreeValue::List(items) => {
            hasher.update(b"list");
            hasher.update(&(items.len() as u64).to_be_bytes());
            for item in items {
                hash_node(hasher, item);
            }
        }
        TreeValue::Map(map) => {
            hasher.update(b"map");
            hasher.update(&(map.len() as u64).to_be_bytes());
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                hash_str(hasher, key);
                if let Some(value) = map.get(key.as_str()) {
                    hash_node(hasher, value);
                }
            }
        }
    }
}
