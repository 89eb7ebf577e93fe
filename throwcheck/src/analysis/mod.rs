//! Throw collection, call-graph scheduling, conformance, and inference.
//!
//! # Module Organization
//!
//! - `resolve.rs`: name resolution, expression typing, clause lowering
//! - `collect.rs`: per-body throw collection with catch-scope handling
//! - `call_graph.rs`: arena-indexed call graph
//! - `scc.rs`: iterative Tarjan components, dependency-first
//! - `engine.rs`: fixed-point clause finalization and inference
//! - `conformance.rs`: declared-clause checking

pub mod call_graph;
pub mod collect;
pub mod conformance;
pub mod engine;
pub mod resolve;
pub mod scc;

pub use call_graph::{CallGraph, FuncId};
pub use collect::{Collected, ThrowCollector, ThrowOrigin, ThrowSite};
pub use conformance::check_callable;
pub use engine::{closures_in_program, Analysis, ThrowsEngine, MAX_FIXED_POINT_ITERATIONS};
pub use resolve::{CallTarget, LocalEnv, Resolver};
pub use scc::{is_recursive_component, strongly_connected_components};
