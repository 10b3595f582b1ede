//! # rewrite-rs: Pattern Matching and Term Rewriting for Symbolic Algebras
//!
//! **`rewrite-rs`** is a manager-centric engine for building, canonicalizing and rewriting
//! symbolic expressions. It is the algebra-agnostic core under operator algebras, state
//! vectors, circuit algebras and the like: each of these is just a *configuration* of the
//! engine, i.e. a set of registered algebras, node kinds and rule sets.
//!
//! ## What the engine does
//!
//! - **Canonical construction**: every composite node is built by the canonicalizer, which
//!   flattens, drops units, merges scalar coefficients, sorts commutative operands and
//!   collapses trivial nodes. Structurally equal expressions are represented identically.
//! - **Sharing**: identical canonical shapes are interned in a cache owned by the
//!   [`Manager`][crate::manager::Manager], so equal sub-trees are one node in memory.
//! - **Pattern matching**: [`Pattern`][crate::pattern::Pattern]s with typed and conditional
//!   wildcards, including segment wildcards for runs of operands of n-ary kinds and
//!   order-insensitive matching for commutative kinds.
//! - **Rewriting**: ordered [`RuleSet`][crate::ruleset::RuleSet]s applied bottom-up to a
//!   fixed point by the [`Simplifier`][crate::simplify::Simplifier].
//!
//! ## Basic Usage
//!
//! ```rust
//! use rewrite_rs::kind::{Combine, KindSpec, Notation};
//! use rewrite_rs::manager::Manager;
//! use rewrite_rs::pattern::Pattern;
//! use rewrite_rs::rule::Rule;
//! use rewrite_rs::ruleset::RuleSet;
//! use rewrite_rs::wildcard::wc;
//!
//! // 1. Register an algebra and its kinds
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let times = mgr
//!     .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply).notation(Notation::infix(" * ")))
//!     .unwrap();
//! let plus = mgr
//!     .register_kind(
//!         KindSpec::nary("OperatorPlus", op)
//!             .commutative()
//!             .combine(Combine::Add { scale: times })
//!             .notation(Notation::infix(" + ")),
//!     )
//!     .unwrap();
//! let comm = mgr
//!     .register_kind(KindSpec::binary("Commutator", op).notation(Notation::Bracket))
//!     .unwrap();
//!
//! // 2. Build expressions; canonicalization happens on construction
//! let a = mgr.symbol("A", op).unwrap();
//! let b = mgr.symbol("B", op).unwrap();
//! let zero_b = mgr.scale(times, 0, b.clone()).unwrap();
//! let expr = mgr.create(plus, [a.clone(), zero_b]).unwrap();
//! assert_eq!(expr, a); // A + 0*B == A
//!
//! // 3. Rewrite with rules: [X, X] -> 0
//! let rules = RuleSet::builder("commutators")
//!     .rule(Rule::new(
//!         "self_commutator",
//!         Pattern::shape(comm, [wc("X"), wc("X")]),
//!         move |m, _| Ok(Some(m.zero(op))),
//!     ))
//!     .build(&mgr)
//!     .unwrap();
//! let aa = mgr.binary(comm, a.clone(), a.clone()).unwrap();
//! let expr = mgr.create(plus, [b.clone(), aa]).unwrap();
//! assert_eq!(mgr.simplify(&expr, &rules).unwrap(), b);
//! ```
//!
//! ## Core Components
//!
//! - **[`manager`]**: The [`Manager`][crate::manager::Manager]: registries, constructors, queries.
//! - **[`canonical`]**: The canonicalizer behind every constructor.
//! - **[`matcher`]**: Pattern matching and [`Bindings`][crate::matcher::Bindings].
//! - **[`simplify`]**: Bottom-up rewriting to a fixed point.
//! - **[`toolbox`]**: Ready-made rule sets (Leibniz rule, commutator evaluation, distributivity).
//!
//! For the construction invariants, check the [`canonical`] module documentation.

pub mod cache;
pub mod canonical;
pub mod error;
pub mod expr;
pub mod kind;
pub mod manager;
pub mod matcher;
pub mod pattern;
pub mod render;
pub mod rule;
pub mod ruleset;
pub mod scalar;
pub mod simplify;
pub mod subtable;
pub mod toolbox;
pub mod types;
pub mod wildcard;
