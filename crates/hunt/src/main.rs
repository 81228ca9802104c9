//! # Hunt CLI
//!
//! `hunt` is a command-line client for the `huntapp` record store. The binary
//! is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/hunt/src/cli/)                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - logging, context wiring, dispatch (commands.rs)          │
//! │  - plain-text and JSON output (render.rs)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/huntapp/src/api.rs)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from the API inward is UI agnostic. The CLI layer owns every
//! user-facing concern: argument parsing, where log lines go, exit codes and
//! rendering.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
