//! This module contains all filesystem-related system calls.
//!
//! ## Notes:
//!
//! - These calls are implementations of the [`Cage`] struct in the
//!   [`safewasi`](crate::safewasi) module. They have been split out of
//!   `cage.rs` for maintainability, so the `Cage` rustdoc may turn up without
//!   them; they are listed below for that reason.
//! - Every call first fetches its descriptor(s) from the descriptor table,
//!   which checks the rights the call needs. Path based calls then run the
//!   guest path through the sandbox resolver and only hand the verified host
//!   path to the host layer.
//!
//! ## File System Calls
//!
//! - [path_open_syscall](crate::safewasi::cage::Cage::path_open_syscall)
//! - [fd_close_syscall](crate::safewasi::cage::Cage::fd_close_syscall)
//! - [fd_renumber_syscall](crate::safewasi::cage::Cage::fd_renumber_syscall)
//! - [fd_prestat_get_syscall](crate::safewasi::cage::Cage::fd_prestat_get_syscall)
//! - [fd_prestat_dir_name_syscall](crate::safewasi::cage::Cage::fd_prestat_dir_name_syscall)
//! - [fd_fdstat_get_syscall](crate::safewasi::cage::Cage::fd_fdstat_get_syscall)
//! - [fd_fdstat_set_rights_syscall](crate::safewasi::cage::Cage::fd_fdstat_set_rights_syscall)
//! - [fd_filestat_get_syscall](crate::safewasi::cage::Cage::fd_filestat_get_syscall)
//! - [path_create_directory_syscall](crate::safewasi::cage::Cage::path_create_directory_syscall)
//! - [path_remove_directory_syscall](crate::safewasi::cage::Cage::path_remove_directory_syscall)
//! - [path_unlink_file_syscall](crate::safewasi::cage::Cage::path_unlink_file_syscall)
//! - [path_readlink_syscall](crate::safewasi::cage::Cage::path_readlink_syscall)
//! - [path_symlink_syscall](crate::safewasi::cage::Cage::path_symlink_syscall)
//! - [path_filestat_get_syscall](crate::safewasi::cage::Cage::path_filestat_get_syscall)
//! - [path_rename_syscall](crate::safewasi::cage::Cage::path_rename_syscall)
//! - [path_link_syscall](crate::safewasi::cage::Cage::path_link_syscall)

use super::fs_constants::*;
use crate::interface::{
    self, Errno, Fdflags, Fdstat, Filestat, HostHandle, Lookupflags, Oflags, Prestat, Rights,
};
use crate::safewasi::cage::{syscall_error, Cage};
use crate::safewasi::resolver::{resolve_path, verify_symlink_target};

// host errors get logged with the call that hit them
fn host_error(e: std::io::Error, syscall: &str) -> Errno {
    let errno = interface::translate_io_error(&e);
    syscall_error(errno, syscall, &e.to_string())
}

impl Cage {
    /// Looks up `fd` with the given rights and resolves `path` beneath it.
    fn resolve_beneath(
        &self,
        fd: u32,
        rights_base: Rights,
        path: &str,
        flags: Lookupflags,
        syscall: &str,
    ) -> Result<String, Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, rights_base, 0)
            .map_err(|e| syscall_error(e, syscall, "descriptor lookup failed"))?;
        let resolved = resolve_path(&entry.sandbox_root(), path, flags)
            .map_err(|e| syscall_error(e, syscall, "path did not resolve inside the sandbox"))?;
        log::trace!("{}: fd {} {:?} -> {:?}", syscall, fd, path, resolved);
        Ok(resolved)
    }

    /// ## ------------------PATH_OPEN SYSCALL------------------
    /// ### Description
    ///
    /// Opens `path` beneath the directory descriptor `dirfd` and installs a
    /// new descriptor for it. The access mode is picked from the requested
    /// base rights: any read style right asks for read access, any write
    /// style right for write access.
    ///
    /// ### Arguments
    ///
    /// * `dirfd` - directory the lookup starts at; needs `PATH_OPEN`, plus
    ///   `PATH_CREATE_FILE` with `OFLAGS_CREAT` and `PATH_FILESTAT_SET_SIZE`
    ///   with `OFLAGS_TRUNC`
    /// * `dirflags` - `LOOKUP_SYMLINK_FOLLOW` to follow a final symlink
    /// * `path` - guest path, relative to `dirfd`
    /// * `oflags` - `OFLAGS_*` creation flags
    /// * `rights_base`, `rights_inheriting` - rights asked for on the new
    ///   descriptor; both must be inheritable from `dirfd`
    /// * `fdflags` - `FDFLAGS_*` descriptor flags
    ///
    /// ### Returns
    ///
    /// The new descriptor id. Its rights are the requested ones cut down to
    /// what the opened file type supports.
    ///
    /// ### Errors
    ///
    /// * `EBADF` - `dirfd` is not open
    /// * `ENOTCAPABLE` - missing rights, or `path` escapes the sandbox
    /// * `EINVAL` - `path` holds a NUL byte
    /// * `ELOOP` - too many symlinks
    /// * `ENOSPC` - the descriptor table is full
    /// * host errors from the open itself, translated
    #[allow(clippy::too_many_arguments)]
    pub fn path_open_syscall(
        &mut self,
        dirfd: u32,
        dirflags: Lookupflags,
        path: &str,
        oflags: Oflags,
        rights_base: Rights,
        rights_inheriting: Rights,
        fdflags: Fdflags,
    ) -> Result<u32, Errno> {
        let read = rights_base & (RIGHT_FD_READ | RIGHT_FD_READDIR) != 0;
        let write = rights_base
            & (RIGHT_FD_DATASYNC | RIGHT_FD_WRITE | RIGHT_FD_ALLOCATE | RIGHT_FD_FILESTAT_SET_SIZE)
            != 0;

        let mut flags = match (read, write) {
            (true, true) => O_RDWR,
            (false, true) => O_WRONLY,
            _ => O_RDONLY,
        };

        let mut needed_base = RIGHT_PATH_OPEN;
        let mut needed_inheriting = rights_base | rights_inheriting;

        if oflags & OFLAGS_CREAT != 0 {
            flags |= O_CREAT;
            needed_base |= RIGHT_PATH_CREATE_FILE;
        }
        if oflags & OFLAGS_DIRECTORY != 0 {
            flags |= O_DIRECTORY;
        }
        if oflags & OFLAGS_EXCL != 0 {
            flags |= O_EXCL;
        }
        if oflags & OFLAGS_TRUNC != 0 {
            flags |= O_TRUNC;
            needed_base |= RIGHT_PATH_FILESTAT_SET_SIZE;
        }

        if fdflags & FDFLAGS_APPEND != 0 {
            flags |= O_APPEND;
        }
        if fdflags & FDFLAGS_DSYNC != 0 {
            flags |= O_DSYNC;
            needed_inheriting |= RIGHT_FD_DATASYNC;
        }
        if fdflags & FDFLAGS_NONBLOCK != 0 {
            flags |= O_NONBLOCK;
        }
        if fdflags & (FDFLAGS_RSYNC | FDFLAGS_SYNC) != 0 {
            flags |= O_SYNC;
            needed_inheriting |= RIGHT_FD_SYNC;
        }
        if write && fdflags & FDFLAGS_APPEND == 0 && oflags & OFLAGS_TRUNC == 0 {
            needed_inheriting |= RIGHT_FD_SEEK;
        }
        //the resolver leaves an unfollowed final link alone, so the host must not open through it
        if dirflags & LOOKUP_SYMLINK_FOLLOW == 0 {
            flags |= O_NOFOLLOW;
        }

        let resolved = {
            let entry = self
                .filedescriptortable
                .get(dirfd, needed_base, needed_inheriting)
                .map_err(|e| syscall_error(e, "path_open", "directory descriptor lacks rights"))?;
            resolve_path(&entry.sandbox_root(), path, dirflags)
                .map_err(|e| syscall_error(e, "path_open", "path did not resolve inside the sandbox"))?
        };

        let handle = HostHandle::open(&resolved, flags).map_err(|e| host_error(e, "path_open"))?;

        //on failure the handle is dropped, which closes it
        let entry = self
            .filedescriptortable
            .insert_fd(handle, flags, &resolved, rights_base, rights_inheriting)
            .map_err(|e| syscall_error(e, "path_open", "could not install descriptor"))?;

        log::trace!("path_open: {:?} -> fd {}", resolved, entry.id);
        Ok(entry.id)
    }

    /// ## ------------------FD_CLOSE SYSCALL------------------
    /// ### Description
    ///
    /// Removes `fd` from the descriptor table and closes its host handle.
    /// Closing stdio only drops the table entry.
    ///
    /// ### Errors
    ///
    /// * `EBADF` - `fd` is not open
    /// * host close errors, translated; the descriptor is gone regardless
    pub fn fd_close_syscall(&mut self, fd: u32) -> Result<(), Errno> {
        self.filedescriptortable
            .remove(fd)
            .map_err(|e| syscall_error(e, "fd_close", "could not close descriptor"))
    }

    /// ## ------------------FD_RENUMBER SYSCALL------------------
    /// ### Description
    ///
    /// Moves the descriptor `from` to id `to`, closing whatever `to` held.
    /// Both ids must be open.
    pub fn fd_renumber_syscall(&mut self, from: u32, to: u32) -> Result<(), Errno> {
        self.filedescriptortable
            .renumber(from, to)
            .map_err(|e| syscall_error(e, "fd_renumber", "could not renumber descriptor"))
    }

    /// ## ------------------FD_PRESTAT_GET SYSCALL------------------
    /// ### Description
    ///
    /// Describes a preopened directory. `pr_name_len` counts the trailing
    /// NUL written by `fd_prestat_dir_name_syscall`.
    ///
    /// ### Errors
    ///
    /// * `EBADF` - `fd` is not open
    /// * `EINVAL` - `fd` is not a preopen
    pub fn fd_prestat_get_syscall(&self, fd: u32) -> Result<Prestat, Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, 0, 0)
            .map_err(|e| syscall_error(e, "fd_prestat_get", "invalid file descriptor"))?;
        if !entry.preopen {
            return Err(syscall_error(Errno::EINVAL, "fd_prestat_get", "not a preopened directory"));
        }

        Ok(Prestat {
            pr_type: PREOPENTYPE_DIR,
            pr_name_len: entry.path.len() + 1,
        })
    }

    /// ## ------------------FD_PRESTAT_DIR_NAME SYSCALL------------------
    /// ### Description
    ///
    /// Copies the mapped name of a preopen, NUL terminated, into `buf`.
    ///
    /// ### Errors
    ///
    /// * `EBADF` - `fd` is not open or not a preopen
    /// * `ENOBUFS` - `buf` cannot hold the name and its NUL
    pub fn fd_prestat_dir_name_syscall(&self, fd: u32, buf: &mut [u8]) -> Result<(), Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, 0, 0)
            .map_err(|e| syscall_error(e, "fd_prestat_dir_name", "invalid file descriptor"))?;
        if !entry.preopen {
            return Err(syscall_error(Errno::EBADF, "fd_prestat_dir_name", "not a preopened directory"));
        }

        let name = entry.path.as_bytes();
        if name.len() + 1 > buf.len() {
            return Err(syscall_error(Errno::ENOBUFS, "fd_prestat_dir_name", "buffer too small"));
        }
        buf[..name.len()].copy_from_slice(name);
        buf[name.len()] = 0;
        Ok(())
    }

    /// ## ------------------FD_FDSTAT_GET SYSCALL------------------
    /// ### Description
    ///
    /// Reports the type, descriptor flags and rights of `fd`. The flags
    /// come from the host handle's current status flags.
    pub fn fd_fdstat_get_syscall(&self, fd: u32) -> Result<Fdstat, Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, 0, 0)
            .map_err(|e| syscall_error(e, "fd_fdstat_get", "invalid file descriptor"))?;

        let hostflags = entry
            .handle
            .status_flags()
            .map_err(|e| host_error(e, "fd_fdstat_get"))?;

        let mut fs_flags: Fdflags = 0;
        if hostflags & O_APPEND != 0 {
            fs_flags |= FDFLAGS_APPEND;
        }
        if hostflags & O_NONBLOCK != 0 {
            fs_flags |= FDFLAGS_NONBLOCK;
        }
        //O_SYNC carries the O_DSYNC bit on linux, so test the wider one first
        if hostflags & O_SYNC == O_SYNC {
            fs_flags |= FDFLAGS_SYNC;
        } else if hostflags & O_DSYNC != 0 {
            fs_flags |= FDFLAGS_DSYNC;
        }

        Ok(Fdstat {
            fs_filetype: entry.filetype,
            fs_flags,
            fs_rights_base: entry.rights_base,
            fs_rights_inheriting: entry.rights_inheriting,
        })
    }

    /// ## ------------------FD_FDSTAT_SET_RIGHTS SYSCALL------------------
    /// ### Description
    ///
    /// Narrows the rights of `fd`.
    ///
    /// ### Errors
    ///
    /// * `EBADF` - `fd` is not open
    /// * `ENOTCAPABLE` - either mask holds a right `fd` does not already have
    pub fn fd_fdstat_set_rights_syscall(
        &mut self,
        fd: u32,
        rights_base: Rights,
        rights_inheriting: Rights,
    ) -> Result<(), Errno> {
        self.filedescriptortable
            .set_rights(fd, rights_base, rights_inheriting)
            .map_err(|e| syscall_error(e, "fd_fdstat_set_rights", "rights may only be narrowed"))
    }

    /// ## ------------------FD_FILESTAT_GET SYSCALL------------------
    /// ### Description
    ///
    /// Stats the open handle behind `fd`. Needs `FD_FILESTAT_GET`.
    pub fn fd_filestat_get_syscall(&self, fd: u32) -> Result<Filestat, Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, RIGHT_FD_FILESTAT_GET, 0)
            .map_err(|e| syscall_error(e, "fd_filestat_get", "descriptor lookup failed"))?;
        entry.handle.filestat().map_err(|e| host_error(e, "fd_filestat_get"))
    }

    /// ## ------------------PATH_CREATE_DIRECTORY SYSCALL------------------
    /// ### Description
    ///
    /// Creates the directory `path` beneath `fd`. Needs
    /// `PATH_CREATE_DIRECTORY`.
    pub fn path_create_directory_syscall(&self, fd: u32, path: &str) -> Result<(), Errno> {
        let resolved =
            self.resolve_beneath(fd, RIGHT_PATH_CREATE_DIRECTORY, path, 0, "path_create_directory")?;
        interface::mkdir(&resolved).map_err(|e| host_error(e, "path_create_directory"))
    }

    /// ## ------------------PATH_REMOVE_DIRECTORY SYSCALL------------------
    /// ### Description
    ///
    /// Removes the empty directory `path` beneath `fd`. Needs
    /// `PATH_REMOVE_DIRECTORY`.
    pub fn path_remove_directory_syscall(&self, fd: u32, path: &str) -> Result<(), Errno> {
        let resolved =
            self.resolve_beneath(fd, RIGHT_PATH_REMOVE_DIRECTORY, path, 0, "path_remove_directory")?;
        interface::rmdir(&resolved).map_err(|e| host_error(e, "path_remove_directory"))
    }

    /// ## ------------------PATH_UNLINK_FILE SYSCALL------------------
    /// ### Description
    ///
    /// Removes the file or symlink `path` beneath `fd`. A symlink is removed
    /// itself, never its target. Needs `PATH_UNLINK_FILE`.
    pub fn path_unlink_file_syscall(&self, fd: u32, path: &str) -> Result<(), Errno> {
        let resolved = self.resolve_beneath(fd, RIGHT_PATH_UNLINK_FILE, path, 0, "path_unlink_file")?;
        interface::unlink(&resolved).map_err(|e| host_error(e, "path_unlink_file"))
    }

    /// ## ------------------PATH_READLINK SYSCALL------------------
    /// ### Description
    ///
    /// Reads the contents of the symlink `path` beneath `fd` into `buf` and
    /// NUL terminates it. Needs `PATH_READLINK`.
    ///
    /// ### Returns
    ///
    /// The number of bytes of `buf` used, the NUL included.
    ///
    /// ### Errors
    ///
    /// * `ENOBUFS` - the contents and the NUL do not fit in `buf`
    /// * `EINVAL` - `path` is not a symlink
    pub fn path_readlink_syscall(&self, fd: u32, path: &str, buf: &mut [u8]) -> Result<usize, Errno> {
        let resolved = self.resolve_beneath(fd, RIGHT_PATH_READLINK, path, 0, "path_readlink")?;
        let target = interface::readlink(&resolved).map_err(|e| host_error(e, "path_readlink"))?;

        let len = target.len();
        if len >= buf.len() {
            return Err(syscall_error(Errno::ENOBUFS, "path_readlink", "buffer too small"));
        }
        buf[..len].copy_from_slice(target.as_bytes());
        buf[len] = 0;
        Ok(len + 1)
    }

    /// ## ------------------PATH_SYMLINK SYSCALL------------------
    /// ### Description
    ///
    /// Creates a symlink at `new_path` beneath `fd` whose contents are
    /// `old_path`. Needs `PATH_SYMLINK`.
    ///
    /// The link is only created if following it would stay inside the
    /// sandbox, so the guest cannot plant a link that points out of it.
    ///
    /// ### Errors
    ///
    /// * `EPERM` - `old_path` is absolute
    /// * `ENOTCAPABLE` - `old_path` or `new_path` leads out of the sandbox
    pub fn path_symlink_syscall(&self, old_path: &str, fd: u32, new_path: &str) -> Result<(), Errno> {
        let entry = self
            .filedescriptortable
            .get(fd, RIGHT_PATH_SYMLINK, 0)
            .map_err(|e| syscall_error(e, "path_symlink", "descriptor lookup failed"))?;
        let root = entry.sandbox_root();

        let resolved_new = resolve_path(&root, new_path, 0)
            .map_err(|e| syscall_error(e, "path_symlink", "link path did not resolve inside the sandbox"))?;
        verify_symlink_target(&root, new_path, old_path)
            .map_err(|e| syscall_error(e, "path_symlink", "link target leads out of the sandbox"))?;

        interface::symlink(old_path, &resolved_new).map_err(|e| host_error(e, "path_symlink"))
    }

    /// ## ------------------PATH_FILESTAT_GET SYSCALL------------------
    /// ### Description
    ///
    /// Stats `path` beneath `fd`. With `LOOKUP_SYMLINK_FOLLOW` a final
    /// symlink is followed (inside the sandbox), otherwise the link itself
    /// is reported. Needs `PATH_FILESTAT_GET`.
    pub fn path_filestat_get_syscall(&self, fd: u32, flags: Lookupflags, path: &str) -> Result<Filestat, Errno> {
        let resolved = self.resolve_beneath(fd, RIGHT_PATH_FILESTAT_GET, path, flags, "path_filestat_get")?;

        let stat = if flags & LOOKUP_SYMLINK_FOLLOW != 0 {
            interface::stat(&resolved)
        } else {
            interface::lstat(&resolved)
        };
        stat.map_err(|e| host_error(e, "path_filestat_get"))
    }

    /// ## ------------------PATH_RENAME SYSCALL------------------
    /// ### Description
    ///
    /// Renames `old_path` beneath `old_fd` to `new_path` beneath `new_fd`.
    /// Needs `PATH_RENAME_SOURCE` on `old_fd` and `PATH_RENAME_TARGET` on
    /// `new_fd`.
    pub fn path_rename_syscall(&self, old_fd: u32, old_path: &str, new_fd: u32, new_path: &str) -> Result<(), Errno> {
        let resolved_old = self.resolve_beneath(old_fd, RIGHT_PATH_RENAME_SOURCE, old_path, 0, "path_rename")?;
        let resolved_new = self.resolve_beneath(new_fd, RIGHT_PATH_RENAME_TARGET, new_path, 0, "path_rename")?;
        interface::rename(&resolved_old, &resolved_new).map_err(|e| host_error(e, "path_rename"))
    }

    /// ## ------------------PATH_LINK SYSCALL------------------
    /// ### Description
    ///
    /// Creates a hard link `new_path` beneath `new_fd` to `old_path` beneath
    /// `old_fd`. `old_flags` decides whether a symlink at `old_path` is
    /// followed. Needs `PATH_LINK_SOURCE` on `old_fd` and `PATH_LINK_TARGET`
    /// on `new_fd`.
    pub fn path_link_syscall(
        &self,
        old_fd: u32,
        old_flags: Lookupflags,
        old_path: &str,
        new_fd: u32,
        new_path: &str,
    ) -> Result<(), Errno> {
        let resolved_old =
            self.resolve_beneath(old_fd, RIGHT_PATH_LINK_SOURCE, old_path, old_flags, "path_link")?;
        let resolved_new = self.resolve_beneath(new_fd, RIGHT_PATH_LINK_TARGET, new_path, 0, "path_link")?;
        interface::hard_link(&resolved_old, &resolved_new).map_err(|e| host_error(e, "path_link"))
    }
}
