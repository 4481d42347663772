// File system related constants
#![allow(dead_code)]

use crate::interface::{Fdflags, Lookupflags, Oflags, Rights};

// Imported into fs_calls, rights and fdtable

pub const STARTINGFD: u32 = 0;
pub const STDIO_FD_COUNT: u32 = 3;
pub const MAXFD: usize = 1024;

pub const MAX_SYMLINK_FOLLOWS: usize = 32;

pub const PREOPENTYPE_DIR: u8 = 0;

// Rights, one bit each, in guest ABI order
pub const RIGHT_FD_DATASYNC: Rights = 1 << 0;
pub const RIGHT_FD_READ: Rights = 1 << 1;
pub const RIGHT_FD_SEEK: Rights = 1 << 2;
pub const RIGHT_FD_FDSTAT_SET_FLAGS: Rights = 1 << 3;
pub const RIGHT_FD_SYNC: Rights = 1 << 4;
pub const RIGHT_FD_TELL: Rights = 1 << 5;
pub const RIGHT_FD_WRITE: Rights = 1 << 6;
pub const RIGHT_FD_ADVISE: Rights = 1 << 7;
pub const RIGHT_FD_ALLOCATE: Rights = 1 << 8;
pub const RIGHT_PATH_CREATE_DIRECTORY: Rights = 1 << 9;
pub const RIGHT_PATH_CREATE_FILE: Rights = 1 << 10;
pub const RIGHT_PATH_LINK_SOURCE: Rights = 1 << 11;
pub const RIGHT_PATH_LINK_TARGET: Rights = 1 << 12;
pub const RIGHT_PATH_OPEN: Rights = 1 << 13;
pub const RIGHT_FD_READDIR: Rights = 1 << 14;
pub const RIGHT_PATH_READLINK: Rights = 1 << 15;
pub const RIGHT_PATH_RENAME_SOURCE: Rights = 1 << 16;
pub const RIGHT_PATH_RENAME_TARGET: Rights = 1 << 17;
pub const RIGHT_PATH_FILESTAT_GET: Rights = 1 << 18;
pub const RIGHT_PATH_FILESTAT_SET_SIZE: Rights = 1 << 19;
pub const RIGHT_PATH_FILESTAT_SET_TIMES: Rights = 1 << 20;
pub const RIGHT_FD_FILESTAT_GET: Rights = 1 << 21;
pub const RIGHT_FD_FILESTAT_SET_SIZE: Rights = 1 << 22;
pub const RIGHT_FD_FILESTAT_SET_TIMES: Rights = 1 << 23;
pub const RIGHT_PATH_SYMLINK: Rights = 1 << 24;
pub const RIGHT_PATH_REMOVE_DIRECTORY: Rights = 1 << 25;
pub const RIGHT_PATH_UNLINK_FILE: Rights = 1 << 26;
pub const RIGHT_POLL_FD_READWRITE: Rights = 1 << 27;
pub const RIGHT_SOCK_SHUTDOWN: Rights = 1 << 28;

pub const RIGHTS_ALL: Rights = (1 << 29) - 1;

// Lookup flags
pub const LOOKUP_SYMLINK_FOLLOW: Lookupflags = 1 << 0;

// Open flags, guest side
pub const OFLAGS_CREAT: Oflags = 1 << 0;
pub const OFLAGS_DIRECTORY: Oflags = 1 << 1;
pub const OFLAGS_EXCL: Oflags = 1 << 2;
pub const OFLAGS_TRUNC: Oflags = 1 << 3;

// Descriptor flags, guest side
pub const FDFLAGS_APPEND: Fdflags = 1 << 0;
pub const FDFLAGS_DSYNC: Fdflags = 1 << 1;
pub const FDFLAGS_NONBLOCK: Fdflags = 1 << 2;
pub const FDFLAGS_RSYNC: Fdflags = 1 << 3;
pub const FDFLAGS_SYNC: Fdflags = 1 << 4;

// Host open flags
pub const O_RDONLY: i32 = libc::O_RDONLY;
pub const O_WRONLY: i32 = libc::O_WRONLY;
pub const O_RDWR: i32 = libc::O_RDWR;
pub const O_ACCMODE: i32 = libc::O_ACCMODE;

pub const O_CREAT: i32 = libc::O_CREAT;
pub const O_DIRECTORY: i32 = libc::O_DIRECTORY;
pub const O_EXCL: i32 = libc::O_EXCL;
pub const O_TRUNC: i32 = libc::O_TRUNC;
pub const O_APPEND: i32 = libc::O_APPEND;
pub const O_NONBLOCK: i32 = libc::O_NONBLOCK;
pub const O_DSYNC: i32 = libc::O_DSYNC;
pub const O_SYNC: i32 = libc::O_SYNC;
pub const O_NOFOLLOW: i32 = libc::O_NOFOLLOW;
