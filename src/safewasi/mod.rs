//! This module is the sandbox: it decides which host files a guest can reach
//! and with which rights.
//!
//! ## top-level features:
//!
//! - ### Cage Objects:
//!     - A cage is one guest's context. It owns a descriptor table and is
//!       built from [`CageOptions`](cage::CageOptions): a table size and the
//!       list of preopened directories.
//!
//! - ### Descriptor Table:
//!     - A fixed size arena of descriptor entries indexed by guest fd. Each
//!       entry holds its host handle, its virtual and real paths, and two
//!       rights masks: `rights_base` for calls on the descriptor itself and
//!       `rights_inheriting` for descriptors opened through it.
//!
//! - ### Rights:
//!     - Per file type ceilings on what a descriptor can hold. Rights only
//!       ever shrink.
//!
//! - ### Path Normalization and Resolution:
//!     - Guest paths are normalized lexically, checked to stay beneath the
//!       descriptor's root, mapped onto the root's real host path, and, if
//!       asked, followed through symlinks with the same check at every hop.
//!
//! - ### System Calls:
//!     - Public `*_syscall` methods on the cage, in `syscalls`.

pub mod cage;
pub mod fdtable;
pub mod filesystem;
pub mod resolver;
pub mod rights;
pub mod syscalls;
