//! # fusel - git driver for dependency requests
//!
//! fusel teaches a small request engine how to satisfy dependencies of type
//! `git`: given a repository URL and a ref, it clones-or-updates a local
//! working copy and checks the ref out as a detached HEAD.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch a project declared in fusel.toml
//! fusel fmt
//!
//! # Fetch an inline URL at a tag
//! fusel https://github.com/fmtlib/fmt.git#10.2.1
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Manifest parsing (`fusel.toml`)
//! - [`request`] - Request string parsing
//! - [`engine`] - Request resolution and driver dispatch
//! - [`git`] - The git driver
//! - [`credentials`] - Interactive credential acquisition
//! - [`progress`] - Transfer and checkout progress reporting

/// Manifest parsing (`fusel.toml`).
pub mod config;

/// Credential callbacks for authenticated remotes.
pub mod credentials;

/// Request resolution and driver dispatch.
pub mod engine;

/// The git driver.
pub mod git;

/// Transfer and checkout progress reporting.
pub mod progress;

/// Request string parsing.
pub mod request;
