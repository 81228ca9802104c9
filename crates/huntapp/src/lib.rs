//! # Huntapp Architecture
//!
//! Huntapp is a **crash-safe record store for encounter hunts**: a counter that
//! may be bumped several times a second, plus an append-only log of milestones
//! ("phases"). It is a library that happens to have a CLI client; every front
//! end talks to the same [`api::HuntApi`].
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/hunt)                                          │
//! │  - Parses arguments, formats output, owns stdout and exit   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Resolves selectors (IDs, list positions)                 │
//! │  - Maintenance surface: recovery, integrity, backup, export │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Store (store/hunt_store.rs)                         │
//! │  - Counter and phase rules (model.rs) under per-hunt locks  │
//! │  - commit → snapshot (maybe) → commit observer              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Backend (store/backend.rs)                         │
//! │  - FsBackend: temp + fsync + rename (store/atomic.rs)       │
//! │  - MemBackend: in-memory, with failure injection            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crash Safety
//!
//! A record on disk is always a complete committed version. When it is not
//! (a torn write from outside the store, disk trouble), startup recovery in
//! [`recovery`] restores it from a leftover temp file or from the newest
//! snapshot. See [`store`] for the durability model.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits
//! the process. Diagnostics go through the `log` facade; the binary decides
//! where they end up.
//!
//! ## Module Overview
//!
//! - [`model`]: `Hunt`, `Phase`, typed updates and the milestone clock.
//! - [`store`]: backends, atomic writer, snapshots, the record store.
//! - [`recovery`]: startup scan and the recovery ladder.
//! - [`integrity`]: structural diagnostic.
//! - [`backup`]: emergency backups, export and import.
//! - [`mirror`]: text files for streaming overlays.
//! - [`settings`]: persisted user settings.
//! - [`config`]: engine configuration.
//! - [`init`]: startup wiring.

pub mod api;
pub mod backup;
pub mod config;
pub mod error;
pub mod init;
pub mod integrity;
pub mod mirror;
pub mod model;
pub mod recovery;
pub mod settings;
pub mod store;

#[cfg(feature = "test_utils")]
pub mod test_utils;
