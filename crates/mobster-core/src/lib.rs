//! # mobster-core
//!
//! Core crate for Mobster. Contains the unified error system and the
//! configuration schemas shared by the hook bus, the feature modules,
//! and the command-line entry point.
//!
//! This crate has **no** internal dependencies on other Mobster crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
