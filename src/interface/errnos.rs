//! Capability errno values and host error translation
//!
//! Every fallible call in the crate reports one of the [`Errno`] values below.
//! The numbering is the guest-visible one, so an `Errno` can be handed back to
//! the guest as-is (`errno as u16`).

use std::fmt;
use std::io;

macro_rules! errnos {
    ($($name:ident = $val:literal, $desc:literal;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum Errno {
            $($name = $val,)*
        }

        impl Errno {
            /// Symbolic name, e.g. `"ENOTCAPABLE"`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Errno::$name => stringify!($name),)*
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $(Errno::$name => $desc,)*
                }
            }

            pub fn from_raw(raw: u16) -> Option<Errno> {
                match raw {
                    $($val => Some(Errno::$name),)*
                    _ => None,
                }
            }
        }
    };
}

errnos! {
    ESUCCESS = 0, "No error occurred";
    E2BIG = 1, "Argument list too long";
    EACCES = 2, "Permission denied";
    EADDRINUSE = 3, "Address in use";
    EADDRNOTAVAIL = 4, "Address not available";
    EAFNOSUPPORT = 5, "Address family not supported";
    EAGAIN = 6, "Resource unavailable, or operation would block";
    EALREADY = 7, "Connection already in progress";
    EBADF = 8, "Bad file descriptor";
    EBADMSG = 9, "Bad message";
    EBUSY = 10, "Device or resource busy";
    ECANCELED = 11, "Operation canceled";
    ECHILD = 12, "No child processes";
    ECONNABORTED = 13, "Connection aborted";
    ECONNREFUSED = 14, "Connection refused";
    ECONNRESET = 15, "Connection reset";
    EDEADLK = 16, "Resource deadlock would occur";
    EDESTADDRREQ = 17, "Destination address required";
    EDOM = 18, "Mathematics argument out of domain of function";
    EDQUOT = 19, "Reserved";
    EEXIST = 20, "File exists";
    EFAULT = 21, "Bad address";
    EFBIG = 22, "File too large";
    EHOSTUNREACH = 23, "Host is unreachable";
    EIDRM = 24, "Identifier removed";
    EILSEQ = 25, "Illegal byte sequence";
    EINPROGRESS = 26, "Operation in progress";
    EINTR = 27, "Interrupted function";
    EINVAL = 28, "Invalid argument";
    EIO = 29, "I/O error";
    EISCONN = 30, "Socket is connected";
    EISDIR = 31, "Is a directory";
    ELOOP = 32, "Too many levels of symbolic links";
    EMFILE = 33, "File descriptor value too large";
    EMLINK = 34, "Too many links";
    EMSGSIZE = 35, "Message too large";
    EMULTIHOP = 36, "Reserved";
    ENAMETOOLONG = 37, "Filename too long";
    ENETDOWN = 38, "Network is down";
    ENETRESET = 39, "Connection aborted by network";
    ENETUNREACH = 40, "Network unreachable";
    ENFILE = 41, "Too many files open in system";
    ENOBUFS = 42, "No buffer space available";
    ENODEV = 43, "No such device";
    ENOENT = 44, "No such file or directory";
    ENOEXEC = 45, "Executable file format error";
    ENOLCK = 46, "No locks available";
    ENOLINK = 47, "Reserved";
    ENOMEM = 48, "Not enough space";
    ENOMSG = 49, "No message of the desired type";
    ENOPROTOOPT = 50, "Protocol not available";
    ENOSPC = 51, "No space left on device";
    ENOSYS = 52, "Function not supported";
    ENOTCONN = 53, "The socket is not connected";
    ENOTDIR = 54, "Not a directory or a symbolic link to a directory";
    ENOTEMPTY = 55, "Directory not empty";
    ENOTRECOVERABLE = 56, "State not recoverable";
    ENOTSOCK = 57, "Not a socket";
    ENOTSUP = 58, "Not supported, or operation not supported on socket";
    ENOTTY = 59, "Inappropriate I/O control operation";
    ENXIO = 60, "No such device or address";
    EOVERFLOW = 61, "Value too large to be stored in data type";
    EOWNERDEAD = 62, "Previous owner died";
    EPERM = 63, "Operation not permitted";
    EPIPE = 64, "Broken pipe";
    EPROTO = 65, "Protocol error";
    EPROTONOSUPPORT = 66, "Protocol not supported";
    EPROTOTYPE = 67, "Protocol wrong type for socket";
    ERANGE = 68, "Result too large";
    EROFS = 69, "Read-only file system";
    ESPIPE = 70, "Invalid seek";
    ESRCH = 71, "No such process";
    ESTALE = 72, "Reserved";
    ETIMEDOUT = 73, "Connection timed out";
    ETXTBSY = 74, "Text file busy";
    EXDEV = 75, "Cross-device link";
    ENOTCAPABLE = 76, "Extension: Capabilities insufficient";
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

impl std::error::Error for Errno {}

/// Builds the error returned by a syscall and records why it was rejected.
pub fn syscall_error(e: Errno, syscall: &str, message: &str) -> Errno {
    log::debug!("{}: {} [{}]", syscall, message, e.name());
    e
}

/// Maps a host `errno` value onto the guest numbering. Values with no
/// counterpart come back as `ENOSYS`.
pub fn from_host_errno(code: i32) -> Errno {
    match code {
        0 => Errno::ESUCCESS,
        libc::E2BIG => Errno::E2BIG,
        libc::EACCES => Errno::EACCES,
        libc::EADDRINUSE => Errno::EADDRINUSE,
        libc::EADDRNOTAVAIL => Errno::EADDRNOTAVAIL,
        libc::EAFNOSUPPORT => Errno::EAFNOSUPPORT,
        libc::EAGAIN => Errno::EAGAIN,
        libc::EALREADY => Errno::EALREADY,
        libc::EBADF => Errno::EBADF,
        libc::EBUSY => Errno::EBUSY,
        libc::ECANCELED => Errno::ECANCELED,
        libc::ECONNABORTED => Errno::ECONNABORTED,
        libc::ECONNREFUSED => Errno::ECONNREFUSED,
        libc::ECONNRESET => Errno::ECONNRESET,
        libc::EEXIST => Errno::EEXIST,
        libc::EFAULT => Errno::EFAULT,
        libc::EFBIG => Errno::EFBIG,
        libc::EHOSTUNREACH => Errno::EHOSTUNREACH,
        libc::EINTR => Errno::EINTR,
        libc::EINVAL => Errno::EINVAL,
        libc::EIO => Errno::EIO,
        libc::EISCONN => Errno::EISCONN,
        libc::EISDIR => Errno::EISDIR,
        libc::ELOOP => Errno::ELOOP,
        libc::EMFILE => Errno::EMFILE,
        libc::EMLINK => Errno::EMLINK,
        libc::EMSGSIZE => Errno::EMSGSIZE,
        libc::ENAMETOOLONG => Errno::ENAMETOOLONG,
        libc::ENETDOWN => Errno::ENETDOWN,
        libc::ENETUNREACH => Errno::ENETUNREACH,
        libc::ENFILE => Errno::ENFILE,
        libc::ENOBUFS => Errno::ENOBUFS,
        libc::ENODEV => Errno::ENODEV,
        libc::ENOENT => Errno::ENOENT,
        libc::ENOMEM => Errno::ENOMEM,
        libc::ENOPROTOOPT => Errno::ENOPROTOOPT,
        libc::ENOSPC => Errno::ENOSPC,
        libc::ENOSYS => Errno::ENOSYS,
        libc::ENOTCONN => Errno::ENOTCONN,
        libc::ENOTDIR => Errno::ENOTDIR,
        libc::ENOTEMPTY => Errno::ENOTEMPTY,
        libc::ENOTSOCK => Errno::ENOTSOCK,
        libc::ENOTSUP => Errno::ENOTSUP,
        libc::ENXIO => Errno::ENXIO,
        libc::EOVERFLOW => Errno::EOVERFLOW,
        libc::EPERM => Errno::EPERM,
        libc::EPIPE => Errno::EPIPE,
        libc::EPROTO => Errno::EPROTO,
        libc::EPROTONOSUPPORT => Errno::EPROTONOSUPPORT,
        libc::EPROTOTYPE => Errno::EPROTOTYPE,
        libc::ERANGE => Errno::ERANGE,
        libc::EROFS => Errno::EROFS,
        libc::ESPIPE => Errno::ESPIPE,
        libc::ESRCH => Errno::ESRCH,
        libc::ETIMEDOUT => Errno::ETIMEDOUT,
        libc::ETXTBSY => Errno::ETXTBSY,
        libc::EXDEV => Errno::EXDEV,
        _ => Errno::ENOSYS,
    }
}

/// Translates an error coming out of the host file layer.
pub fn translate_io_error(err: &io::Error) -> Errno {
    if let Some(code) = err.raw_os_error() {
        return from_host_errno(code);
    }

    match err.kind() {
        io::ErrorKind::NotFound => Errno::ENOENT,
        io::ErrorKind::PermissionDenied => Errno::EACCES,
        io::ErrorKind::AlreadyExists => Errno::EEXIST,
        io::ErrorKind::InvalidInput => Errno::EINVAL,
        io::ErrorKind::OutOfMemory => Errno::ENOMEM,
        io::ErrorKind::Unsupported => Errno::ENOTSUP,
        _ => Errno::EIO,
    }
}
