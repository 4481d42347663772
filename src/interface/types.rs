//! Values that cross the boundary to the guest: the file type enumeration,
//! rights masks and the small stat records handed back by the fd and path
//! calls. The layouts follow the guest ABI, the encoding itself is left to
//! the embedder.

use crate::interface;

pub type Rights = u64;
pub type Fdflags = u16;
pub type Oflags = u16;
pub type Lookupflags = u32;
pub type Timestamp = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, interface::SerdeSerialize, interface::SerdeDeserialize)]
#[repr(u8)]
pub enum Filetype {
  #[default]
  Unknown = 0,
  BlockDevice = 1,
  CharacterDevice = 2,
  Directory = 3,
  RegularFile = 4,
  SocketDgram = 5,
  SocketStream = 6,
  SymbolicLink = 7,
}

//what fd_fdstat_get hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Fdstat {
  pub fs_filetype: Filetype,
  pub fs_flags: Fdflags,
  pub fs_rights_base: Rights,
  pub fs_rights_inheriting: Rights,
}

//only directory preopens exist, so pr_type is always PREOPENTYPE_DIR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Prestat {
  pub pr_type: u8,
  pub pr_name_len: usize,
}

//timestamps are nanoseconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, interface::SerdeSerialize, interface::SerdeDeserialize)]
#[repr(C)]
pub struct Filestat {
  pub st_dev: u64,
  pub st_ino: u64,
  pub st_filetype: Filetype,
  pub st_nlink: u64,
  pub st_size: u64,
  pub st_atim: Timestamp,
  pub st_mtim: Timestamp,
  pub st_ctim: Timestamp,
}
