//! gowasm-lib: compile Go sources to WebAssembly
//!
//! This crate drives an external Go or TinyGo toolchain, either installed
//! locally or inside a container, and caches builds per source file:
//! - `Compiler`: entry point, selects a backend and manages the cache
//! - `backend`: local and container build strategies
//! - `toolchain`: discovery of toolchain roots and module paths
//! - `cache`: deterministic per-request cache directories

pub mod backend;
pub mod cache;
pub mod command;
pub mod compile;
pub mod config;
pub mod consts;
pub mod error;
pub mod mounts;
pub mod options;
pub mod request;
pub mod toolchain;
pub mod util;

pub use compile::Compiler;
pub use config::{Config, HostEnv};
pub use error::BuildError;
pub use options::BuildOptions;
pub use request::{TracingSink, WarningSink};
