//! Locked, zero-on-drop byte buffers
//!
//! Every buffer that holds key material or plaintext during an encrypt or
//! decrypt call is a [`SecureBuf`]. Each buffer owns a private anonymous
//! mapping of whole pages, so locking and unlocking one buffer never
//! touches the pages of another. The pages are `mlock`ed for as long as
//! the buffer lives (when the OS allows it) and overwritten with zeros
//! before they are unlocked and unmapped, so every early return wipes
//! whatever was built so far.

use std::fmt;

use tracing::debug;
use zeroize::Zeroize;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};

use region::Region;

/// Fixed-length buffer for secret bytes on its own locked pages.
///
/// The buffer never grows after construction. Locking is best effort: a
/// process over its `RLIMIT_MEMLOCK` still gets a working buffer that is
/// wiped on drop, it just may be swapped out, and [`is_locked`] says so.
///
/// [`is_locked`]: SecureBuf::is_locked
pub struct SecureBuf {
    region: Region,
    len: usize,
}

impl SecureBuf {
    /// Allocates `len` zero bytes.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut region = Region::map(len).map_err(|e| {
            OtpcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Memory,
                format!("failed to allocate {} byte secure buffer", len),
                e,
            )
        })?;

        if !region.lock() && len > 0 {
            debug!(len, "mlock refused; buffer is still wiped on drop");
        }

        Ok(Self { region, len })
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let mut buf = Self::zeroed(data.len())?;
        buf.as_mut_slice().copy_from_slice(data);
        Ok(buf)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.region.as_slice()[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.region.as_mut_slice()[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the OS currently keeps these bytes out of swap.
    pub fn is_locked(&self) -> bool {
        self.region.is_locked()
    }

    /// Shortens the buffer, wiping the dropped tail. Never reallocates.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.region.as_mut_slice()[len..self.len].zeroize();
            self.len = len;
        }
    }

    /// Overwrites the contents with zeros, keeping the length.
    pub fn wipe(&mut self) {
        self.as_mut_slice().zeroize();
    }
}

impl Drop for SecureBuf {
    fn drop(&mut self) {
        // Whole mapping, not just `len`: truncated tails live there too.
        self.region.as_mut_slice().zeroize();

        #[cfg(test)]
        drop_log::record(self.len, self.region.as_slice());

        // Region's own drop unlocks and unmaps.
    }
}

impl AsRef<[u8]> for SecureBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for SecureBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuf")
            .field("len", &self.len)
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
mod region {
    use std::io;
    use std::ptr::{self, NonNull};
    use std::slice;

    /// Private anonymous mapping of whole pages, owned by one buffer.
    pub(super) struct Region {
        ptr: NonNull<u8>,
        capacity: usize,
        locked: bool,
    }

    // SAFETY: the mapping is owned by exactly one Region and only reached
    // through &self / &mut self.
    unsafe impl Send for Region {}
    unsafe impl Sync for Region {}

    impl Region {
        pub(super) fn map(len: usize) -> io::Result<Self> {
            if len == 0 {
                return Ok(Self {
                    ptr: NonNull::dangling(),
                    capacity: 0,
                    locked: false,
                });
            }

            let capacity = len
                .checked_next_multiple_of(page_size())
                .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;

            // SAFETY: anonymous private mapping; no fd and no fixed address.
            let ptr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    capacity,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }

            let ptr = NonNull::new(ptr.cast::<u8>())
                .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
            Ok(Self {
                ptr,
                capacity,
                locked: false,
            })
        }

        /// Locks every page of the mapping. Returns whether it worked.
        pub(super) fn lock(&mut self) -> bool {
            if self.capacity == 0 {
                return false;
            }
            let addr = self.ptr.as_ptr() as *const libc::c_void;
            // SAFETY: the range is exactly the live mapping we own.
            self.locked = unsafe { libc::mlock(addr, self.capacity) } == 0;
            self.locked
        }

        pub(super) fn is_locked(&self) -> bool {
            self.locked
        }

        pub(super) fn as_slice(&self) -> &[u8] {
            // SAFETY: ptr is valid for capacity bytes (or dangling with 0).
            unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
        }

        pub(super) fn as_mut_slice(&mut self) -> &mut [u8] {
            // SAFETY: as above, and &mut self guarantees exclusive access.
            unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
        }
    }

    impl Drop for Region {
        fn drop(&mut self) {
            if self.capacity == 0 {
                return;
            }
            // SAFETY: the mapping is ours and nothing refers to it past this point.
            unsafe {
                if self.locked {
                    libc::munlock(self.ptr.as_ptr() as *const libc::c_void, self.capacity);
                }
                libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.capacity);
            }
        }
    }

    pub(super) fn page_size() -> usize {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        usize::try_from(size)
            .ok()
            .filter(|&size| size > 0)
            .unwrap_or(4096)
    }
}

#[cfg(not(unix))]
mod region {
    use std::io;

    /// Plain heap storage; there is no page locking on this platform.
    pub(super) struct Region {
        bytes: Vec<u8>,
    }

    impl Region {
        pub(super) fn map(len: usize) -> io::Result<Self> {
            let mut bytes = Vec::new();
            bytes
                .try_reserve_exact(len)
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            bytes.resize(len, 0);
            Ok(Self { bytes })
        }

        pub(super) fn lock(&mut self) -> bool {
            false
        }

        pub(super) fn is_locked(&self) -> bool {
            false
        }

        pub(super) fn as_slice(&self) -> &[u8] {
            &self.bytes
        }

        pub(super) fn as_mut_slice(&mut self) -> &mut [u8] {
            &mut self.bytes
        }
    }
}
