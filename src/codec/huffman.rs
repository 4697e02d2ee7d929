//! Huffman codec
//!
//! Text is compressed to a `"0"`/`"1"` bitstring with a tree built from its
//! own character frequencies. The encoding is not self-describing: the tree
//! returned by [`HuffmanCodec::encode`] must be kept to decode the bits.
//!
//! Nodes live in an arena and refer to their children by index. Ties in the
//! merge queue go to the node created first, so a given text always produces
//! the same tree.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use serde::{Deserialize, Serialize};

use crate::error::{DecodingError, Result};

/// A node in a [`HuffmanTree`]'s arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HuffmanNode {
    /// A symbol and how often it occurred
    Leaf { symbol: char, weight: usize },
    /// Aggregated weight of the two children, by arena index
    Internal { weight: usize, left: usize, right: usize },
}

impl HuffmanNode {
    pub fn weight(&self) -> usize {
        match self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => *weight,
        }
    }
}

/// Binary code tree; `root` is `None` for empty input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// Build the tree for `text`
    pub fn from_text(text: &str) -> Self {
        // Symbols keep their first-seen order so the queue tie-break is stable.
        let mut order: Vec<char> = Vec::new();
        let mut frequency: HashMap<char, usize> = HashMap::new();
        for c in text.chars() {
            let count = frequency.entry(c).or_insert(0);
            if *count == 0 {
                order.push(c);
            }
            *count += 1;
        }

        let mut nodes: Vec<HuffmanNode> = order
            .iter()
            .map(|&symbol| HuffmanNode::Leaf {
                symbol,
                weight: frequency[&symbol],
            })
            .collect();

        // (weight, creation order); creation order equals arena index.
        let mut queue: BinaryHeap<Reverse<(usize, usize)>> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| Reverse((node.weight(), index)))
            .collect();

        while queue.len() > 1 {
            let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
                (queue.pop(), queue.pop())
            else {
                break;
            };
            let weight = left_weight + right_weight;
            nodes.push(HuffmanNode::Internal { weight, left, right });
            queue.push(Reverse((weight, nodes.len() - 1)));
        }

        let root = queue.pop().map(|Reverse((_, index))| index);
        HuffmanTree { nodes, root }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&HuffmanNode> {
        self.root.and_then(|index| self.nodes.get(index))
    }

    /// Number of distinct symbols
    pub fn symbol_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, HuffmanNode::Leaf { .. }))
            .count()
    }

    /// Derive the code for every symbol: `0` for left, `1` for right.
    ///
    /// A tree that is a single leaf gives its symbol the code `"0"`.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = BTreeMap::new();
        let Some(root) = self.root else {
            return CodeTable { codes };
        };

        if let Some(HuffmanNode::Leaf { symbol, .. }) = self.nodes.get(root) {
            codes.insert(*symbol, "0".to_string());
            return CodeTable { codes };
        }

        let mut stack = vec![(root, String::new())];
        while let Some((index, prefix)) = stack.pop() {
            match self.nodes.get(index) {
                Some(HuffmanNode::Leaf { symbol, .. }) => {
                    codes.insert(*symbol, prefix);
                }
                Some(HuffmanNode::Internal { left, right, .. }) => {
                    stack.push((*right, format!("{}1", prefix)));
                    stack.push((*left, format!("{}0", prefix)));
                }
                None => {}
            }
        }
        CodeTable { codes }
    }

    fn node(&self, index: usize) -> std::result::Result<&HuffmanNode, DecodingError> {
        self.nodes.get(index).ok_or(DecodingError::MalformedTree { index })
    }

    /// Walk the tree bit by bit, emitting a symbol at every leaf
    pub fn decode(&self, bits: &str) -> std::result::Result<String, DecodingError> {
        let Some(root) = self.root else {
            return if bits.is_empty() {
                Ok(String::new())
            } else {
                Err(DecodingError::EmptyTree { bits: bits.chars().count() })
            };
        };

        let mut text = String::new();
        let mut node = root;
        let mut consumed = 0;
        for (position, bit) in bits.chars().enumerate() {
            let go_right = match bit {
                '0' => false,
                '1' => true,
                found => return Err(DecodingError::InvalidBit { position, found }),
            };
            consumed = position + 1;

            node = match (self.node(node)?, go_right) {
                (HuffmanNode::Internal { left, .. }, false) => *left,
                (HuffmanNode::Internal { right, .. }, true) => *right,
                // Single-symbol tree: the root leaf stands for code "0".
                (HuffmanNode::Leaf { .. }, false) => node,
                (HuffmanNode::Leaf { .. }, true) => return Err(DecodingError::InvalidCode { position }),
            };

            if let HuffmanNode::Leaf { symbol, .. } = *self.node(node)? {
                text.push(symbol);
                node = root;
            }
        }

        if node != root {
            return Err(DecodingError::Truncated { consumed });
        }
        Ok(text)
    }
}

/// Symbol-to-code mapping derived from a [`HuffmanTree`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeTable {
    codes: BTreeMap<char, String>,
}

impl CodeTable {
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.codes.iter().map(|(&c, code)| (c, code.as_str()))
    }

    /// True when no code is a prefix of another
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&str> = self.codes.values().map(String::as_str).collect();
        // After sorting, a prefix sorts directly before some code it prefixes.
        codes.sort_unstable();
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

/// Output of [`HuffmanCodec::encode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoded {
    pub bits: String,
    pub tree: HuffmanTree,
    pub code_table: CodeTable,
}

/// Text ↔ bitstring compression
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl HuffmanCodec {
    /// Compress `text`, returning the bits with the tree and table that made them
    pub fn encode(text: &str) -> Encoded {
        let tree = HuffmanTree::from_text(text);
        let code_table = tree.code_table();
        let bits = text
            .chars()
            .filter_map(|c| code_table.get(c))
            .collect::<String>();
        Encoded { bits, tree, code_table }
    }

    /// Recover text from bits produced with `tree`
    pub fn decode(bits: &str, tree: Option<&HuffmanTree>) -> Result<String> {
        let tree = tree.ok_or(DecodingError::MissingTree)?;
        Ok(tree.decode(bits)?)
    }
}
