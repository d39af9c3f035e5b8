// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # triadic
//!
//! Discovers balanced multiplicative relations among labelled integer
//! observations and chains them, together with additive laws, to deduce
//! unknown quantities.
//!
//! A triad over `(C1, C2, C3, C4)` is the equation `a·C2·C3 = b·C1·C4` with
//! minimal co-prime `(a, b)`. Its simplicity `K = 1/(a·b)` is 1 for an exact
//! law such as `F·1 = m·a`.
//!
//! ## Architecture
//!
//! - **Exact arithmetic** (`rational`, `triad`): big-integer GCD reduction,
//!   the per-order solver and the 24-permutation search
//! - **Dimensional guard** (`units`): exponent vectors over `M, L, T, I, Θ`
//! - **Relation graph** (`graph`): petgraph storage behind a threshold and the guard
//! - **Additive laws** (`additive`): whole/part sums such as energy conservation
//! - **Inference** (`infer`): fixed-point deduction with a step budget and a trace
//! - **Facade** (`engine`), **configuration** (`config`), **scenario files** (`scenario`)
//!
//! ## Library usage
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use triadic::config::EngineConfig;
//! use triadic::engine::Engine;
//! use triadic::triad::Quadruple;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.add_observation(&Quadruple::from_u64([20, 10, 2, 1], ["F", "m", "a", "1"]));
//! engine.add_observation(&Quadruple::from_u64([50, 5, 10, 1], ["W", "F", "d", "1"]));
//!
//! let inputs: HashMap<String, f64> =
//!     [("m".to_string(), 10.0), ("a".to_string(), 2.0), ("d".to_string(), 5.0)].into();
//! assert_eq!(engine.solve(&inputs, "W", None), Some(100.0));
//! ```

pub mod additive;
pub mod concept;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod graph;
pub mod infer;
pub mod rational;
pub mod scenario;
pub mod triad;
pub mod units;
