//! # CLI Behavior
//!
//! This is **one possible UI client** for huntapp, not the application itself.
//!
//! ## Naked Execution (`hunt`)
//!
//! Running `hunt` with no arguments defaults to `hunt list`.
//!
//! ## Selecting Hunts
//!
//! Every command that acts on a hunt takes either its ID
//! (`hunt_1714580000000_k3j9x2m1q`) or its position in `hunt list`, where `1`
//! is the most recently updated hunt. Phases are selected the same way within
//! a hunt: by phase ID or by position in `hunt show`.
//!
//! ## Exit Codes
//!
//! `0` on success, `1` on any error, including `hunt check` finding a
//! corrupted record and `hunt backup` failing.
//!
//! ## Module Structure
//!
//! - `commands`: logging setup, context wiring, dispatch
//! - `render`: text output
//! - `setup`: argument parsing via clap, help text

mod commands;
mod render;
pub mod setup;

pub use commands::run;
