use crate::codec::sha256_hex;
use crate::error::{LedgerError, LedgerResult};

/// Placeholder leaf committed by blocks that carry no transactions.
pub const EMPTY_BLOCK_LEAF: &str = "0";

/// SHA-256 of a UTF-8 string, as lowercase hex.
pub fn hash(value: &str) -> String {
    sha256_hex(value.as_bytes())
}

/// `hash(hash(value))`, used for both leaves and internal nodes.
pub fn double_hash(value: &str) -> String {
    hash(&hash(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MerkleNode {
    value: String,
    left: Option<Box<MerkleNode>>,
    right: Option<Box<MerkleNode>>,
}

impl MerkleNode {
    fn leaf(value: String) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Parent value is the double hash of the two hex digests concatenated,
    /// left first.
    fn parent(left: MerkleNode, right: MerkleNode) -> Self {
        let value = double_hash(&format!("{}{}", left.value, right.value));
        Self {
            value,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    fn depth(&self) -> usize {
        let l = self.left.as_ref().map_or(0, |n| n.depth());
        let r = self.right.as_ref().map_or(0, |n| n.depth());
        1 + l.max(r)
    }
}

/// Binary hash tree over an ordered list of leaf values.
///
/// Built top-down: the node list is split at `len / 2` and each half is
/// built recursively. A leaf list of odd length gets its last leaf
/// duplicated first, so `[a]` and `[a, a]` commit to the same root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: MerkleNode,
    leaf_count: usize,
}

impl MerkleTree {
    pub fn new<S: AsRef<str>>(values: &[S]) -> LedgerResult<Self> {
        if values.is_empty() {
            return Err(LedgerError::MalformedInput(
                "cannot build a Merkle tree without leaves".into(),
            ));
        }

        let mut leaves: Vec<MerkleNode> = values
            .iter()
            .map(|v| MerkleNode::leaf(double_hash(v.as_ref())))
            .collect();
        if leaves.len() % 2 == 1 {
            let last = leaves[leaves.len() - 1].clone();
            leaves.push(last);
        }

        Ok(Self {
            root: Self::build(leaves),
            leaf_count: values.len(),
        })
    }

    // `nodes` is never empty: the top level has at least two entries and
    // every split of a list longer than two leaves both halves non-empty.
    fn build(mut nodes: Vec<MerkleNode>) -> MerkleNode {
        match nodes.len() {
            1 => nodes.remove(0),
            2 => {
                let right = nodes.remove(1);
                let left = nodes.remove(0);
                MerkleNode::parent(left, right)
            }
            len => {
                let right_half = nodes.split_off(len / 2);
                let left = Self::build(nodes);
                let right = Self::build(right_half);
                MerkleNode::parent(left, right)
            }
        }
    }

    pub fn root_hash(&self) -> &str {
        &self.root.value
    }

    /// Number of values the tree was built from (before odd-duplication).
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
