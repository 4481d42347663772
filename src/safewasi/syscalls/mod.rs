//! This module acts as a wrapper for the system calls a sandboxed guest can
//! make against its filesystem view.
//!
//! ## System Calls
//!
//! Cage objects have methods for each call. They return a value, or an error
//! from the `Errno` enum.
//!

pub mod fs_calls;
pub mod fs_constants;
pub use fs_constants::*;
