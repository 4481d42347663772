//! Module definitions for the rustwasi interface
//!
//! ## Interface Module
//!
//! Every call that reaches the host kernel goes through this module. The
//! sandbox in [`safewasi`](crate::safewasi) only ever sees host handles, host
//! errors translated to [`Errno`], and the plain value types in [`types`].
//!
//! Keeping the host surface this narrow means the paths the kernel can be
//! reached by are few and can be audited in one place.

pub mod errnos;
mod file;
mod misc;
pub mod types;
pub use errnos::*;
pub use file::*;
pub use misc::*;
pub use types::*;
