//! Maximal rights per file type
//!
//! A descriptor never holds a right its file type cannot support. These
//! tables give the ceiling for each type; `insert_fd` intersects whatever was
//! requested with them.

use crate::interface::{Errno, Filetype, HostFileKind, Rights};
use crate::safewasi::syscalls::fs_constants::*;

pub const RIGHTS_BLOCK_DEVICE_BASE: Rights = RIGHTS_ALL;
pub const RIGHTS_BLOCK_DEVICE_INHERITING: Rights = RIGHTS_ALL;
pub const RIGHTS_CHARACTER_DEVICE_BASE: Rights = RIGHTS_ALL;
pub const RIGHTS_CHARACTER_DEVICE_INHERITING: Rights = RIGHTS_ALL;

pub const RIGHTS_REGULAR_FILE_BASE: Rights = RIGHT_FD_DATASYNC
    | RIGHT_FD_READ
    | RIGHT_FD_SEEK
    | RIGHT_FD_FDSTAT_SET_FLAGS
    | RIGHT_FD_SYNC
    | RIGHT_FD_TELL
    | RIGHT_FD_WRITE
    | RIGHT_FD_ADVISE
    | RIGHT_FD_ALLOCATE
    | RIGHT_FD_FILESTAT_GET
    | RIGHT_FD_FILESTAT_SET_SIZE
    | RIGHT_FD_FILESTAT_SET_TIMES
    | RIGHT_POLL_FD_READWRITE;
pub const RIGHTS_REGULAR_FILE_INHERITING: Rights = 0;

pub const RIGHTS_DIRECTORY_BASE: Rights = RIGHT_FD_FDSTAT_SET_FLAGS
    | RIGHT_FD_SYNC
    | RIGHT_FD_ADVISE
    | RIGHT_PATH_CREATE_DIRECTORY
    | RIGHT_PATH_CREATE_FILE
    | RIGHT_PATH_LINK_SOURCE
    | RIGHT_PATH_LINK_TARGET
    | RIGHT_PATH_OPEN
    | RIGHT_FD_READDIR
    | RIGHT_PATH_READLINK
    | RIGHT_PATH_RENAME_SOURCE
    | RIGHT_PATH_RENAME_TARGET
    | RIGHT_PATH_FILESTAT_GET
    | RIGHT_PATH_FILESTAT_SET_SIZE
    | RIGHT_PATH_FILESTAT_SET_TIMES
    | RIGHT_FD_FILESTAT_GET
    | RIGHT_FD_FILESTAT_SET_TIMES
    | RIGHT_PATH_SYMLINK
    | RIGHT_PATH_UNLINK_FILE
    | RIGHT_PATH_REMOVE_DIRECTORY
    | RIGHT_POLL_FD_READWRITE;
pub const RIGHTS_DIRECTORY_INHERITING: Rights = RIGHTS_DIRECTORY_BASE | RIGHTS_REGULAR_FILE_BASE;

pub const RIGHTS_SOCKET_BASE: Rights = RIGHT_FD_READ
    | RIGHT_FD_FDSTAT_SET_FLAGS
    | RIGHT_FD_WRITE
    | RIGHT_FD_FILESTAT_GET
    | RIGHT_POLL_FD_READWRITE
    | RIGHT_SOCK_SHUTDOWN;
pub const RIGHTS_SOCKET_INHERITING: Rights = RIGHTS_ALL;

pub const RIGHTS_TTY_BASE: Rights = RIGHT_FD_READ
    | RIGHT_FD_FDSTAT_SET_FLAGS
    | RIGHT_FD_WRITE
    | RIGHT_FD_FILESTAT_GET
    | RIGHT_POLL_FD_READWRITE;
pub const RIGHTS_TTY_INHERITING: Rights = 0;

/// Guest file type plus the maximal (base, inheriting) rights for a host
/// handle of `kind`, opened with host `flags`.
///
/// A write-only open loses `FD_READ` and a read-only open loses `FD_WRITE`.
/// Kinds the guest has no type for fail with `EINVAL`.
pub fn get_type_and_rights(kind: HostFileKind, flags: i32) -> Result<(Filetype, Rights, Rights), Errno> {
    let (filetype, mut base, inheriting) = match kind {
        HostFileKind::RegularFile => (
            Filetype::RegularFile,
            RIGHTS_REGULAR_FILE_BASE,
            RIGHTS_REGULAR_FILE_INHERITING,
        ),
        HostFileKind::Directory => (
            Filetype::Directory,
            RIGHTS_DIRECTORY_BASE,
            RIGHTS_DIRECTORY_INHERITING,
        ),
        //a fifo behaves like a connected stream socket
        HostFileKind::SocketStream | HostFileKind::Fifo => (
            Filetype::SocketStream,
            RIGHTS_SOCKET_BASE,
            RIGHTS_SOCKET_INHERITING,
        ),
        HostFileKind::SocketDgram => (
            Filetype::SocketDgram,
            RIGHTS_SOCKET_BASE,
            RIGHTS_SOCKET_INHERITING,
        ),
        HostFileKind::BlockDevice => (
            Filetype::BlockDevice,
            RIGHTS_BLOCK_DEVICE_BASE,
            RIGHTS_BLOCK_DEVICE_INHERITING,
        ),
        HostFileKind::CharDevice { tty: true } => (
            Filetype::CharacterDevice,
            RIGHTS_TTY_BASE,
            RIGHTS_TTY_INHERITING,
        ),
        HostFileKind::CharDevice { tty: false } => (
            Filetype::CharacterDevice,
            RIGHTS_CHARACTER_DEVICE_BASE,
            RIGHTS_CHARACTER_DEVICE_INHERITING,
        ),
        HostFileKind::SymbolicLink | HostFileKind::Unknown => return Err(Errno::EINVAL),
    };

    match flags & O_ACCMODE {
        O_WRONLY => base &= !RIGHT_FD_READ,
        O_RDONLY => base &= !RIGHT_FD_WRITE,
        _ => {}
    }

    Ok((filetype, base, inheriting))
}

/// True when `requested` holds a bit missing from `granted`.
pub fn exceeds(requested: Rights, granted: Rights) -> bool {
    requested & !granted != 0
}

