//! Per-tag subtable for interned expressions.
//!
//! The interning cache keeps one subtable per expression [`Tag`]:
//!
//! ```text
//! subtables[Scalar]   → Subtable for scalar literals
//! subtables[Zero]     → Subtable for Zero singletons
//! ...
//! subtables[NAry]     → Subtable for n-ary nodes of every kind
//! ```
//!
//! Each subtable is a hash map from node payload to the shared node. Since all
//! entries in a subtable have the same tag, lookups only ever compare payloads
//! of the same shape, and each subtable can be locked independently.

use std::collections::HashMap;

use crate::expr::{Expr, ExprData};
use crate::types::Tag;

/// A subtable storing shared expressions with a single tag.
#[derive(Clone)]
pub struct Subtable {
    /// The tag of all expressions in this subtable.
    pub tag: Tag,

    /// Map from node payload to the shared node.
    nodes: HashMap<ExprData, Expr>,
}

impl Subtable {
    /// Create a new empty subtable for the given tag.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            nodes: HashMap::new(),
        }
    }

    /// Look up a node by its payload.
    ///
    /// Returns the shared node if an identical one exists.
    pub fn find(&self, data: &ExprData) -> Option<Expr> {
        self.nodes.get(data).cloned()
    }

    /// Insert a node into the subtable.
    ///
    /// # Arguments
    ///
    /// * `expr` - The node to share; its payload is the key
    pub fn insert(&mut self, expr: Expr) {
        debug_assert_eq!(expr.tag(), self.tag, "Node inserted into the wrong subtable");
        self.nodes.insert(expr.data().clone(), expr);
    }

    /// Get the number of nodes in this subtable.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the subtable is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl std::fmt::Debug for Subtable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtable")
            .field("tag", &self.tag)
            .field("len", &self.len())
            .finish()
    }
}
