//! The sandbox context
//!
//! A [`Cage`] owns one descriptor table and is driven from one thread. The
//! `*_syscall` methods live in [`syscalls::fs_calls`](crate::safewasi::syscalls::fs_calls).

use crate::interface::{self, Errno, HostHandle};
use crate::safewasi::fdtable::FdTable;
use crate::safewasi::syscalls::fs_constants::*;

pub use crate::interface::errnos::syscall_error;

/// One directory the guest gets access to: `mapped_path` is the name the
/// guest sees, `real_path` the host directory behind it.
#[derive(Debug, Clone, PartialEq, Eq, interface::SerdeSerialize, interface::SerdeDeserialize)]
pub struct Preopen {
    pub mapped_path: String,
    pub real_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, interface::SerdeSerialize, interface::SerdeDeserialize)]
pub struct CageOptions {
    pub fd_table_size: usize,
    pub preopens: Vec<Preopen>,
}

impl Default for CageOptions {
    fn default() -> CageOptions {
        CageOptions {
            fd_table_size: MAXFD,
            preopens: Vec::new(),
        }
    }
}

impl CageOptions {
    pub fn add_preopen(mut self, mapped_path: &str, real_path: &str) -> CageOptions {
        self.preopens.push(Preopen {
            mapped_path: mapped_path.to_string(),
            real_path: real_path.to_string(),
        });
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Errno> {
        interface::serde_serialize_to_bytes(self).map_err(|_| Errno::EINVAL)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<CageOptions, Errno> {
        interface::serde_deserialize_from_bytes(bytes).map_err(|_| Errno::EINVAL)
    }
}

#[derive(Debug)]
pub struct Cage {
    pub filedescriptortable: FdTable,
}

/// For embedders that have to reach one cage from several threads.
pub type SharedCage = interface::RustRfc<interface::RustLock<Cage>>;

impl Cage {
    /// Builds the descriptor table and installs every preopen, in order,
    /// starting at fd 3.
    pub fn new(options: &CageOptions) -> Result<Cage, Errno> {
        let mut fdtable = FdTable::new(options.fd_table_size)?;

        for preopen in options.preopens.iter() {
            let real_path = interface::realpath(&preopen.real_path)
                .map_err(|e| interface::translate_io_error(&e))?;
            let handle = HostHandle::open(&real_path, O_RDONLY | O_DIRECTORY)
                .map_err(|e| interface::translate_io_error(&e))?;

            let entry = fdtable.insert_preopen(handle, &preopen.mapped_path, &real_path)?;
            log::debug!("preopen fd {}: {} -> {}", entry.id, entry.path, entry.real_path);
        }

        Ok(Cage {
            filedescriptortable: fdtable,
        })
    }

    pub fn into_shared(self) -> SharedCage {
        interface::RustRfc::new(interface::RustLock::new(self))
    }
}
