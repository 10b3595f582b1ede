//! Immutable expression trees.
//!
//! An [`Expr`] is a cheap handle (`Arc`) to an immutable node. Nodes are only
//! created by the [`Manager`][crate::manager::Manager], which canonicalizes
//! every composite node and shares identical shapes through its cache.
//!
//! Equality, hashing and ordering are *structural*. Two handles to the same
//! node compare equal in O(1); two handles to distinct but identical nodes
//! still compare equal, so correctness never depends on sharing.
//!
//! Every node caches a 64-bit structural fingerprint, its size and its depth,
//! computed once at construction from the children's cached values.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::scalar::Scalar;
use crate::types::{AlgebraId, Head, KindId, Tag};

/// Ordered symbol attributes, e.g. `hs -> "1"`.
pub type Attributes = BTreeMap<String, String>;

/// The payload of an expression node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ExprData {
    Scalar(Scalar),
    Zero(AlgebraId),
    Identity(AlgebraId),
    Symbol {
        name: Arc<str>,
        algebra: AlgebraId,
        attributes: Attributes,
    },
    Unary {
        kind: KindId,
        operand: [Expr; 1],
    },
    Binary {
        kind: KindId,
        operands: [Expr; 2],
    },
    NAry {
        kind: KindId,
        operands: Vec<Expr>,
    },
}

impl ExprData {
    pub fn tag(&self) -> Tag {
        match self {
            ExprData::Scalar(_) => Tag::Scalar,
            ExprData::Zero(_) => Tag::Zero,
            ExprData::Identity(_) => Tag::Identity,
            ExprData::Symbol { .. } => Tag::Symbol,
            ExprData::Unary { .. } => Tag::Unary,
            ExprData::Binary { .. } => Tag::Binary,
            ExprData::NAry { .. } => Tag::NAry,
        }
    }

    pub fn head(&self) -> Head {
        match self {
            ExprData::Scalar(_) => Head::Scalar,
            ExprData::Zero(a) => Head::Zero(*a),
            ExprData::Identity(a) => Head::Identity(*a),
            ExprData::Symbol { algebra, .. } => Head::Symbol(*algebra),
            ExprData::Unary { kind, .. }
            | ExprData::Binary { kind, .. }
            | ExprData::NAry { kind, .. } => Head::Kind(*kind),
        }
    }

    pub fn operands(&self) -> &[Expr] {
        match self {
            ExprData::Unary { operand, .. } => operand,
            ExprData::Binary { operands, .. } => operands,
            ExprData::NAry { operands, .. } => operands,
            _ => &[],
        }
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tag().hash(&mut hasher);
        match self {
            ExprData::Scalar(value) => value.hash(&mut hasher),
            ExprData::Zero(a) | ExprData::Identity(a) => a.hash(&mut hasher),
            ExprData::Symbol {
                name,
                algebra,
                attributes,
            } => {
                name.hash(&mut hasher);
                algebra.hash(&mut hasher);
                attributes.hash(&mut hasher);
            }
            ExprData::Unary { kind, .. }
            | ExprData::Binary { kind, .. }
            | ExprData::NAry { kind, .. } => {
                kind.hash(&mut hasher);
                let operands = self.operands();
                hasher.write_usize(operands.len());
                for operand in operands {
                    hasher.write_u64(operand.fingerprint());
                }
            }
        }
        hasher.finish()
    }
}

struct Node {
    data: ExprData,
    fingerprint: u64,
    size: usize,
    depth: usize,
}

impl Node {
    /// Moves the operands out, leaving a leaf behind.
    fn take_operands(&mut self) -> Vec<Expr> {
        match std::mem::replace(&mut self.data, ExprData::Zero(AlgebraId::new(0))) {
            ExprData::Unary { operand, .. } => operand.into(),
            ExprData::Binary { operands, .. } => operands.into(),
            ExprData::NAry { operands, .. } => operands,
            _ => Vec::new(),
        }
    }
}

impl Drop for Node {
    /// Frees uniquely owned descendants from a work list, so dropping a
    /// deep tree does not recurse once per level.
    fn drop(&mut self) {
        if self.data.operands().is_empty() {
            return;
        }
        let mut pending = self.take_operands();
        while let Some(expr) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(expr.0) {
                pending.append(&mut node.take_operands());
            }
        }
    }
}

/// A shared, immutable expression.
#[derive(Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    /// Wraps raw data into a node without any canonicalization.
    pub(crate) fn from_data(data: ExprData) -> Self {
        let operands = data.operands();
        let size = 1 + operands.iter().map(|e| e.size()).sum::<usize>();
        let depth = 1 + operands.iter().map(|e| e.depth()).max().unwrap_or(0);
        let fingerprint = data.fingerprint();
        Expr(Arc::new(Node {
            data,
            fingerprint,
            size,
            depth,
        }))
    }

    pub fn data(&self) -> &ExprData {
        &self.0.data
    }

    pub fn tag(&self) -> Tag {
        self.0.data.tag()
    }

    pub fn head(&self) -> Head {
        self.0.data.head()
    }

    /// The kind of a composite node.
    pub fn kind(&self) -> Option<KindId> {
        match self.head() {
            Head::Kind(kind) => Some(kind),
            _ => None,
        }
    }

    /// Child expressions, in stored (canonical) order. Empty for leaves.
    pub fn operands(&self) -> &[Expr] {
        self.0.data.operands()
    }

    pub fn is_leaf(&self) -> bool {
        self.operands().is_empty()
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self.data() {
            ExprData::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.tag() == Tag::Scalar
    }

    /// The name of a symbol.
    pub fn name(&self) -> Option<&str> {
        match self.data() {
            ExprData::Symbol { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The attributes of a symbol.
    pub fn attributes(&self) -> Option<&Attributes> {
        match self.data() {
            ExprData::Symbol { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.tag() == Tag::Zero
    }

    pub fn is_identity(&self) -> bool {
        self.tag() == Tag::Identity
    }

    /// Cached structural fingerprint. Equal expressions have equal fingerprints.
    pub fn fingerprint(&self) -> u64 {
        self.0.fingerprint
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.0.size
    }

    /// Length of the longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Whether both handles point to the same shared node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Pre-order iterator over all sub-expressions, including `self`.
    pub fn iter(&self) -> Subexpressions<'_> {
        Subexpressions { stack: vec![self] }
    }

    /// Distinct symbols, in order of first (pre-order) appearance.
    pub fn symbols(&self) -> Vec<Expr> {
        let mut seen = HashSet::new();
        self.iter()
            .filter(|e| e.tag() == Tag::Symbol)
            .filter(|e| seen.insert((*e).clone()))
            .cloned()
            .collect()
    }

    /// Whether `needle` occurs anywhere in the tree.
    pub fn contains(&self, needle: &Expr) -> bool {
        self.iter().any(|e| e == needle)
    }
}

/// Pre-order traversal driven by an explicit stack.
pub struct Subexpressions<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Subexpressions<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        self.stack.extend(expr.operands().iter().rev());
        Some(expr)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.fingerprint() == other.fingerprint() && self.data() == other.data())
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl Ord for Expr {
    /// The canonical order: by tag first, then recursively by structure.
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        let ordering = self.tag().cmp(&other.tag());
        if ordering != Ordering::Equal {
            return ordering;
        }
        match (self.data(), other.data()) {
            (ExprData::Scalar(a), ExprData::Scalar(b)) => a.cmp(b),
            (ExprData::Zero(a), ExprData::Zero(b)) => a.cmp(b),
            (ExprData::Identity(a), ExprData::Identity(b)) => a.cmp(b),
            (
                ExprData::Symbol {
                    name: n1,
                    algebra: a1,
                    attributes: t1,
                },
                ExprData::Symbol {
                    name: n2,
                    algebra: a2,
                    attributes: t2,
                },
            ) => a1.cmp(a2).then_with(|| n1.cmp(n2)).then_with(|| t1.cmp(t2)),
            (a, b) => {
                let (k1, k2) = (self.kind(), other.kind());
                let (o1, o2) = (a.operands(), b.operands());
                k1.cmp(&k2)
                    .then_with(|| o1.len().cmp(&o2.len()))
                    .then_with(|| o1.cmp(o2))
            }
        }
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            ExprData::Scalar(value) => write!(f, "Scalar({})", value),
            ExprData::Zero(a) => write!(f, "Zero({})", a),
            ExprData::Identity(a) => write!(f, "Identity({})", a),
            ExprData::Symbol {
                name,
                algebra,
                attributes,
            } => {
                write!(f, "Symbol({:?}, {}", name, algebra)?;
                for (key, value) in attributes {
                    write!(f, ", {}={:?}", key, value)?;
                }
                write!(f, ")")
            }
            _ => {
                write!(f, "{}(", self.head())?;
                for (i, operand) in self.operands().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Expr {
    /// Manager-free rendering; kinds are printed by id.
    /// Use [`Manager::render`][crate::manager::Manager::render] for names.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            ExprData::Scalar(value) => write!(f, "{}", value),
            ExprData::Zero(_) => write!(f, "0"),
            ExprData::Identity(_) => write!(f, "1"),
            ExprData::Symbol { name, .. } => write!(f, "{}", name),
            _ => {
                write!(f, "{}(", self.head())?;
                for (i, operand) in self.operands().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}
