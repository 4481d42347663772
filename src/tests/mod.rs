mod path_tests;

use crate::interface;
use crate::safewasi::cage::*;
use crate::safewasi::syscalls::fs_constants::*;

pub const PREOPEN_FD: u32 = 3;
pub const SANDBOX: &str = "/sandbox";

// a tempdir preopened as /sandbox, plus the cage around it; the tempdir has to
// outlive the cage
pub fn sandbox_cage() -> (tempfile::TempDir, Cage) {
    let dir = tempfile::tempdir().unwrap();
    let cage = cage_with_preopen(&dir, SANDBOX);
    (dir, cage)
}

pub fn cage_with_preopen(dir: &tempfile::TempDir, mapped: &str) -> Cage {
    let options = CageOptions::default().add_preopen(mapped, dir.path().to_str().unwrap());
    Cage::new(&options).unwrap()
}

pub fn host_path(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_str().unwrap().to_string()
}

pub fn file_rights() -> interface::Rights {
    RIGHT_FD_READ | RIGHT_FD_WRITE | RIGHT_FD_SEEK | RIGHT_FD_FILESTAT_GET
}

pub fn cbuf2str(buf: &[u8]) -> &str {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end]).unwrap()
}
