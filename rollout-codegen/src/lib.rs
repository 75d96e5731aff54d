//! # rollout-codegen
//!
//! Synthesizes the entry-point source a function runtime expects, plus the
//! small hook scripts used to sync the remote checksum cache.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rollout_codegen::Synthesizer;
//! use rollout_core::FunctionSpec;
//!
//! fn print_entry(spec: &FunctionSpec) {
//!     if let Ok(synth) = Synthesizer::new() {
//!         match synth.synthesize(spec) {
//!             Ok(source) => println!("{source}"),
//!             Err(err) => eprintln!("{}: {err}", spec.function_name),
//!         }
//!     }
//! }
//! ```

pub mod chain;
pub mod context;
pub mod engine;
pub mod error;
pub mod literal;

pub use chain::Binding;
pub use engine::{entry_point_path, Synthesizer};
pub use error::SynthError;
