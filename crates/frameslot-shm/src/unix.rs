use std::ffi::CString;
use std::io;

use tracing::debug;

use crate::error::{Result, ShmError};

/// POSIX shared-memory mapping (`shm_open` + `mmap`).
pub(crate) struct Mapping {
    ptr: *mut u8,
    len: usize,
    name: String,
    c_name: CString,
    /// Whether this handle created the name and should unlink it on drop.
    owns_name: bool,
}

// SAFETY: the mapping is plain bytes shared with another process by design;
// in-process aliasing discipline is enforced by the protocol layered on top.
unsafe impl Send for Mapping {}

impl Mapping {
    pub(crate) fn create(name: &str, len: usize) -> Result<Mapping> {
        let c_name = to_c_name(name)?;

        // SAFETY: `c_name` is a valid NUL-terminated string.
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_CREAT | libc::O_RDWR, 0o600) };
        if fd < 0 {
            return Err(ShmError::Create {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        // SAFETY: `fd` is an open descriptor owned by this function.
        let rc = unsafe { libc::ftruncate(fd, len as libc::off_t) };
        if rc != 0 {
            let source = io::Error::last_os_error();
            // SAFETY: `fd` is open; the half-created name must not linger.
            unsafe {
                libc::close(fd);
                libc::shm_unlink(c_name.as_ptr());
            }
            return Err(ShmError::Create {
                name: name.to_string(),
                source,
            });
        }

        let ptr = map_fd(fd, len, name)?;
        debug!(name, len, "created shared-memory region");

        Ok(Mapping {
            ptr,
            len,
            name: name.to_string(),
            c_name,
            owns_name: true,
        })
    }

    pub(crate) fn open(name: &str, len: usize) -> Result<Mapping> {
        let c_name = to_c_name(name)?;

        // SAFETY: `c_name` is a valid NUL-terminated string.
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0) };
        if fd < 0 {
            let source = io::Error::last_os_error();
            return Err(if source.raw_os_error() == Some(libc::ENOENT) {
                ShmError::NotFound {
                    name: name.to_string(),
                }
            } else {
                ShmError::Open {
                    name: name.to_string(),
                    source,
                }
            });
        }

        // SAFETY: `st` is a writable out-parameter for `fstat` on an open fd.
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::fstat(fd, &mut st) };
        if rc != 0 {
            let source = io::Error::last_os_error();
            // SAFETY: `fd` is open.
            unsafe { libc::close(fd) };
            return Err(ShmError::Open {
                name: name.to_string(),
                source,
            });
        }
        if (st.st_size as usize) < len {
            // SAFETY: `fd` is open.
            unsafe { libc::close(fd) };
            return Err(ShmError::SizeMismatch {
                name: name.to_string(),
                expected: len,
                actual: st.st_size as usize,
            });
        }

        let ptr = map_fd(fd, len, name)?;
        debug!(name, len, "mapped shared-memory region");

        Ok(Mapping {
            ptr,
            len,
            name: name.to_string(),
            c_name,
            owns_name: false,
        })
    }

    pub(crate) fn ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// Map `len` bytes of `fd` read/write and close the descriptor.
///
/// The mapping stays valid after the close; POSIX keeps the object alive
/// while any mapping or descriptor references it.
fn map_fd(fd: libc::c_int, len: usize, name: &str) -> Result<*mut u8> {
    // SAFETY: `fd` is an open shared-memory descriptor of at least `len` bytes.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    let map_err = io::Error::last_os_error();
    // SAFETY: `fd` is open and no longer needed once mapped.
    unsafe { libc::close(fd) };
    if ptr == libc::MAP_FAILED {
        return Err(ShmError::Map {
            name: name.to_string(),
            source: map_err,
        });
    }
    Ok(ptr.cast())
}

fn to_c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| ShmError::InvalidName {
        name: name.to_string(),
    })
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` describe the live mapping created in open/create.
        unsafe { libc::munmap(self.ptr.cast(), self.len) };
        if self.owns_name {
            debug!(name = %self.name, "unlinking shared-memory object");
            // SAFETY: `c_name` is the NUL-terminated name this handle created.
            unsafe { libc::shm_unlink(self.c_name.as_ptr()) };
        }
    }
}
