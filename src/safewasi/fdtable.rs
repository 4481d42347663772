//! Descriptor table
//!
//! An arena of [`FdEntry`] slots indexed by guest descriptor id. Ids 0-2 are
//! the rights-less stdio entries; preopens follow during cage setup and every
//! later open takes the lowest free slot.
//!
//! The table never grows. Once every slot is taken inserts fail with
//! `ENOSPC` and leave the table as it was.

use crate::interface::{self, Errno, Filetype, HostHandle, Rights};
use crate::safewasi::filesystem::normalize_root_path;
use crate::safewasi::resolver::SandboxRoot;
use crate::safewasi::rights::{exceeds, get_type_and_rights};
use crate::safewasi::syscalls::fs_constants::*;

#[derive(Debug)]
pub struct FdEntry {
    pub id: u32,
    pub handle: HostHandle,
    pub filetype: Filetype,
    // path the guest knows this descriptor by
    pub path: String,
    pub normalized_path: String,
    // host path the subtree maps onto
    pub real_path: String,
    pub rights_base: Rights,
    pub rights_inheriting: Rights,
    pub preopen: bool,
}

impl FdEntry {
    pub fn sandbox_root(&self) -> SandboxRoot<'_> {
        SandboxRoot {
            normalized_path: &self.normalized_path,
            real_path: &self.real_path,
        }
    }
}

fn copy_str(s: &str) -> Result<String, Errno> {
    let mut owned = String::new();
    owned.try_reserve(s.len()).map_err(|_| Errno::ENOMEM)?;
    owned.push_str(s);
    Ok(owned)
}

#[derive(Debug)]
pub struct FdTable {
    fds: Vec<Option<FdEntry>>,
    used: usize,
}

impl FdTable {
    /// Builds a table of `capacity` slots with stdio in 0, 1 and 2.
    pub fn new(capacity: usize) -> Result<FdTable, Errno> {
        if capacity < STDIO_FD_COUNT as usize {
            return Err(Errno::EINVAL);
        }

        let mut fds = Vec::new();
        fds.try_reserve_exact(capacity).map_err(|_| Errno::ENOMEM)?;
        fds.resize_with(capacity, || None);

        let mut table = FdTable { fds, used: 0 };

        for id in STARTINGFD..STDIO_FD_COUNT {
            let name = match id {
                0 => "<stdin>",
                1 => "<stdout>",
                _ => "<stderr>",
            };
            table.fds[id as usize] = Some(FdEntry {
                id,
                handle: HostHandle::stdio(id as i32),
                filetype: Filetype::CharacterDevice,
                path: name.to_string(),
                normalized_path: name.to_string(),
                real_path: name.to_string(),
                rights_base: 0,
                rights_inheriting: 0,
                preopen: false,
            });
            table.used += 1;
        }

        Ok(table)
    }

    pub fn capacity(&self) -> usize {
        self.fds.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    fn free_slot(&self) -> Option<usize> {
        self.fds.iter().position(|slot| slot.is_none())
    }

    fn insert(&mut self, mut entry: FdEntry) -> Result<&FdEntry, Errno> {
        let index = self.free_slot().ok_or(Errno::ENOSPC)?;
        entry.id = index as u32;
        self.used += 1;
        Ok(self.fds[index].insert(entry))
    }

    /// Installs a sandbox root. `handle` must refer to a directory; the
    /// entry gets the full directory rights.
    pub fn insert_preopen(&mut self, handle: HostHandle, path: &str, real_path: &str) -> Result<&FdEntry, Errno> {
        let kind = handle.kind().map_err(|e| interface::translate_io_error(&e))?;
        let (filetype, base, inheriting) = get_type_and_rights(kind, O_RDONLY)?;
        if filetype != Filetype::Directory {
            return Err(Errno::ENOTDIR);
        }
        if self.free_slot().is_none() {
            return Err(Errno::ENOSPC);
        }

        let entry = FdEntry {
            id: 0,
            handle,
            filetype,
            path: copy_str(path)?,
            normalized_path: normalize_root_path(path)?,
            real_path: copy_str(real_path)?,
            rights_base: base,
            rights_inheriting: inheriting,
            preopen: true,
        };
        self.insert(entry)
    }

    /// Installs a freshly opened handle. Rights are the requested ones cut
    /// down to what the handle's type allows.
    ///
    /// `path` is the resolved host path; it serves as both the virtual and
    /// the real root for lookups through the new descriptor.
    pub fn insert_fd(
        &mut self,
        handle: HostHandle,
        flags: i32,
        path: &str,
        rights_base: Rights,
        rights_inheriting: Rights,
    ) -> Result<&FdEntry, Errno> {
        let kind = handle.kind().map_err(|e| interface::translate_io_error(&e))?;
        let (filetype, max_base, max_inheriting) = get_type_and_rights(kind, flags)?;
        if self.free_slot().is_none() {
            return Err(Errno::ENOSPC);
        }

        let entry = FdEntry {
            id: 0,
            handle,
            filetype,
            path: copy_str(path)?,
            normalized_path: normalize_root_path(path)?,
            real_path: copy_str(path)?,
            rights_base: rights_base & max_base,
            rights_inheriting: rights_inheriting & max_inheriting,
            preopen: false,
        };
        self.insert(entry)
    }

    fn slot_index(&self, id: u32) -> Result<usize, Errno> {
        let index = id as usize;
        match self.fds.get(index) {
            Some(Some(entry)) if entry.id == id => Ok(index),
            _ => Err(Errno::EBADF),
        }
    }

    fn check_rights(entry: &FdEntry, rights_base: Rights, rights_inheriting: Rights) -> Result<(), Errno> {
        if exceeds(rights_base, entry.rights_base) || exceeds(rights_inheriting, entry.rights_inheriting) {
            return Err(Errno::ENOTCAPABLE);
        }
        Ok(())
    }

    /// Looks up `id` and checks it holds all of the given rights.
    pub fn get(&self, id: u32, rights_base: Rights, rights_inheriting: Rights) -> Result<&FdEntry, Errno> {
        let index = self.slot_index(id)?;
        let entry = self.fds[index].as_ref().ok_or(Errno::EBADF)?;
        Self::check_rights(entry, rights_base, rights_inheriting)?;
        Ok(entry)
    }

    pub fn get_mut(&mut self, id: u32, rights_base: Rights, rights_inheriting: Rights) -> Result<&mut FdEntry, Errno> {
        let index = self.slot_index(id)?;
        let entry = self.fds[index].as_mut().ok_or(Errno::EBADF)?;
        Self::check_rights(entry, rights_base, rights_inheriting)?;
        Ok(entry)
    }

    /// Takes `id` out of the table and closes its host handle. The slot is
    /// free afterwards even when the close fails.
    pub fn remove(&mut self, id: u32) -> Result<(), Errno> {
        let index = self.slot_index(id)?;
        let entry = self.fds[index].take().ok_or(Errno::EBADF)?;
        self.used -= 1;

        entry.handle.close().map_err(|e| {
            log::warn!("closing host handle for fd {} ({}) failed: {}", id, entry.path, e);
            interface::translate_io_error(&e)
        })
    }

    /// Replaces the rights of `id`. Rights can only ever shrink.
    pub fn set_rights(&mut self, id: u32, rights_base: Rights, rights_inheriting: Rights) -> Result<(), Errno> {
        let entry = self.get_mut(id, 0, 0)?;

        if (rights_base | entry.rights_base) > entry.rights_base
            || (rights_inheriting | entry.rights_inheriting) > entry.rights_inheriting
        {
            return Err(Errno::ENOTCAPABLE);
        }

        entry.rights_base = rights_base;
        entry.rights_inheriting = rights_inheriting;
        Ok(())
    }

    /// Moves the entry at `from` to `to`, closing whatever `to` held.
    pub fn renumber(&mut self, from: u32, to: u32) -> Result<(), Errno> {
        let from_index = self.slot_index(from)?;
        let to_index = self.slot_index(to)?;
        if from_index == to_index {
            return Ok(());
        }

        let mut entry = self.fds[from_index].take().ok_or(Errno::EBADF)?;
        let replaced = self.fds[to_index].take();
        entry.id = to;
        self.fds[to_index] = Some(entry);
        self.used -= 1;

        match replaced {
            Some(old) => old.handle.close().map_err(|e| interface::translate_io_error(&e)),
            None => Ok(()),
        }
    }
}

impl Drop for FdTable {
    fn drop(&mut self) {
        for slot in self.fds.iter_mut() {
            if let Some(entry) = slot.take() {
                if let Err(e) = entry.handle.close() {
                    log::warn!("closing host handle for fd {} ({}) failed: {}", entry.id, entry.path, e);
                }
            }
        }
        self.used = 0;
    }
}
