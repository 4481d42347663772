// File related interface
//
// Host handles and the handful of path primitives the sandbox hands real,
// already-verified host paths to. Nothing in here knows about virtual paths
// or rights.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, MetadataExt, OpenOptionsExt};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

use crate::interface::types::{Filestat, Filetype};

/// What the host says an open handle refers to. Finer grained than
/// [`Filetype`], since fifos and ttys get their own rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFileKind {
    RegularFile,
    Directory,
    SocketStream,
    SocketDgram,
    Fifo,
    BlockDevice,
    CharDevice { tty: bool },
    SymbolicLink,
    Unknown,
}

#[derive(Debug)]
pub enum HostHandle {
    // borrowed from the embedding process, never closed by us
    Stdio(RawFd),
    File(File),
}

impl HostHandle {
    pub fn stdio(fd: RawFd) -> HostHandle {
        HostHandle::Stdio(fd)
    }

    /// Opens `path` with host `O_*` flags. The access mode bits pick
    /// read/write, everything else is passed through untouched.
    pub fn open(path: &str, flags: i32) -> io::Result<HostHandle> {
        let accmode = flags & libc::O_ACCMODE;
        let mut options = OpenOptions::new();
        options
            .read(accmode == libc::O_RDONLY || accmode == libc::O_RDWR)
            .write(accmode == libc::O_WRONLY || accmode == libc::O_RDWR)
            .custom_flags(flags & !libc::O_ACCMODE)
            .mode(0o666);

        let f = options.open(path)?;
        Ok(HostHandle::File(f))
    }

    pub fn as_raw_fd(&self) -> RawFd {
        match self {
            HostHandle::Stdio(fd) => *fd,
            HostHandle::File(f) => f.as_raw_fd(),
        }
    }

    pub fn kind(&self) -> io::Result<HostFileKind> {
        let fd = self.as_raw_fd();
        let st = fstat_raw(fd)?;

        let kind = match st.st_mode & libc::S_IFMT {
            libc::S_IFREG => HostFileKind::RegularFile,
            libc::S_IFDIR => HostFileKind::Directory,
            libc::S_IFBLK => HostFileKind::BlockDevice,
            libc::S_IFCHR => HostFileKind::CharDevice { tty: unsafe { libc::isatty(fd) } == 1 },
            libc::S_IFLNK => HostFileKind::SymbolicLink,
            libc::S_IFIFO => HostFileKind::Fifo,
            libc::S_IFSOCK => socket_kind(fd)?,
            _ => HostFileKind::Unknown,
        };
        Ok(kind)
    }

    pub fn filestat(&self) -> io::Result<Filestat> {
        let st = fstat_raw(self.as_raw_fd())?;
        Ok(Filestat {
            st_dev: st.st_dev as u64,
            st_ino: st.st_ino as u64,
            st_filetype: filetype_from_mode(st.st_mode as u32),
            st_nlink: st.st_nlink as u64,
            st_size: st.st_size as u64,
            st_atim: to_nanos(st.st_atime as i64, st.st_atime_nsec as i64),
            st_mtim: to_nanos(st.st_mtime as i64, st.st_mtime_nsec as i64),
            st_ctim: to_nanos(st.st_ctime as i64, st.st_ctime_nsec as i64),
        })
    }

    /// Host `O_*` status flags as reported by `fcntl(F_GETFL)`.
    pub fn status_flags(&self) -> io::Result<i32> {
        let flags = unsafe { libc::fcntl(self.as_raw_fd(), libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(flags)
    }

    /// Releases the handle. A stdio handle is left open for the embedder.
    pub fn close(self) -> io::Result<()> {
        match self {
            HostHandle::Stdio(_) => Ok(()),
            HostHandle::File(f) => {
                let fd = f.into_raw_fd();
                if unsafe { libc::close(fd) } == 0 {
                    Ok(())
                } else {
                    Err(io::Error::last_os_error())
                }
            }
        }
    }
}

fn fstat_raw(fd: RawFd) -> io::Result<libc::stat> {
    let mut st = MaybeUninit::<libc::stat>::uninit();
    if unsafe { libc::fstat(fd, st.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { st.assume_init() })
}

fn socket_kind(fd: RawFd) -> io::Result<HostFileKind> {
    let mut socktype: libc::c_int = 0;
    let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
    let r = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_TYPE,
            &mut socktype as *mut libc::c_int as *mut libc::c_void,
            &mut len,
        )
    };
    if r != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(match socktype {
        libc::SOCK_STREAM => HostFileKind::SocketStream,
        libc::SOCK_DGRAM => HostFileKind::SocketDgram,
        _ => HostFileKind::Unknown,
    })
}

fn filetype_from_mode(mode: u32) -> Filetype {
    match mode & (libc::S_IFMT as u32) {
        m if m == libc::S_IFREG as u32 => Filetype::RegularFile,
        m if m == libc::S_IFDIR as u32 => Filetype::Directory,
        m if m == libc::S_IFBLK as u32 => Filetype::BlockDevice,
        m if m == libc::S_IFCHR as u32 => Filetype::CharacterDevice,
        m if m == libc::S_IFLNK as u32 => Filetype::SymbolicLink,
        m if m == libc::S_IFSOCK as u32 => Filetype::SocketStream,
        _ => Filetype::Unknown,
    }
}

fn to_nanos(secs: i64, nsecs: i64) -> u64 {
    (secs.max(0) as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(nsecs.max(0) as u64)
}

fn metadata_to_filestat(md: &fs::Metadata) -> Filestat {
    let ft = md.file_type();
    let st_filetype = if ft.is_file() {
        Filetype::RegularFile
    } else if ft.is_dir() {
        Filetype::Directory
    } else if ft.is_symlink() {
        Filetype::SymbolicLink
    } else if ft.is_block_device() {
        Filetype::BlockDevice
    } else if ft.is_char_device() {
        Filetype::CharacterDevice
    } else if ft.is_socket() {
        Filetype::SocketStream
    } else {
        Filetype::Unknown
    };

    Filestat {
        st_dev: md.dev(),
        st_ino: md.ino(),
        st_filetype,
        st_nlink: md.nlink(),
        st_size: md.size(),
        st_atim: to_nanos(md.atime(), md.atime_nsec()),
        st_mtim: to_nanos(md.mtime(), md.mtime_nsec()),
        st_ctim: to_nanos(md.ctime(), md.ctime_nsec()),
    }
}

fn path_to_string(p: std::path::PathBuf) -> io::Result<String> {
    p.into_os_string()
        .into_string()
        .map_err(|_| io::Error::from_raw_os_error(libc::EILSEQ))
}

pub fn readlink(path: &str) -> io::Result<String> {
    path_to_string(fs::read_link(path)?)
}

pub fn realpath(path: &str) -> io::Result<String> {
    path_to_string(fs::canonicalize(path)?)
}

pub fn mkdir(path: &str) -> io::Result<()> {
    fs::DirBuilder::new().mode(0o777).create(path)
}

pub fn rmdir(path: &str) -> io::Result<()> {
    fs::remove_dir(path)
}

pub fn unlink(path: &str) -> io::Result<()> {
    fs::remove_file(path)
}

pub fn rename(from: &str, to: &str) -> io::Result<()> {
    fs::rename(from, to)
}

pub fn symlink(target: &str, linkpath: &str) -> io::Result<()> {
    std::os::unix::fs::symlink(target, linkpath)
}

pub fn hard_link(from: &str, to: &str) -> io::Result<()> {
    fs::hard_link(from, to)
}

//stat follows links, lstat does not
pub fn stat(path: &str) -> io::Result<Filestat> {
    Ok(metadata_to_filestat(&fs::metadata(path)?))
}

pub fn lstat(path: &str) -> io::Result<Filestat> {
    Ok(metadata_to_filestat(&fs::symlink_metadata(path)?))
}
