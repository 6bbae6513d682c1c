use std::ffi::CString;
use std::io;

use tracing::debug;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_FILE_NOT_FOUND, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingA, MapViewOfFile, OpenFileMappingA, UnmapViewOfFile, FILE_MAP_ALL_ACCESS,
    MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE,
};

use crate::error::{Result, ShmError};

/// Win32 file-mapping view backed by the page file.
pub(crate) struct Mapping {
    ptr: *mut u8,
    len: usize,
    name: String,
    handle: HANDLE,
}

// SAFETY: the view is plain bytes shared with another process by design;
// in-process aliasing discipline is enforced by the protocol layered on top.
unsafe impl Send for Mapping {}

impl Mapping {
    pub(crate) fn create(name: &str, len: usize) -> Result<Mapping> {
        let c_name = to_c_name(name)?;

        // SAFETY: `c_name` is NUL-terminated; INVALID_HANDLE_VALUE backs the
        // mapping with the page file rather than a disk file.
        let handle = unsafe {
            CreateFileMappingA(
                INVALID_HANDLE_VALUE,
                std::ptr::null(),
                PAGE_READWRITE,
                0,
                len as u32,
                c_name.as_ptr().cast(),
            )
        };
        if handle.is_null() {
            return Err(ShmError::Create {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        let ptr = map_view(handle, len, name)?;
        debug!(name, len, "created shared-memory region");

        Ok(Mapping {
            ptr,
            len,
            name: name.to_string(),
            handle,
        })
    }

    pub(crate) fn open(name: &str, len: usize) -> Result<Mapping> {
        let c_name = to_c_name(name)?;

        // SAFETY: `c_name` is NUL-terminated.
        let handle = unsafe { OpenFileMappingA(FILE_MAP_ALL_ACCESS, 0, c_name.as_ptr().cast()) };
        if handle.is_null() {
            // SAFETY: no intervening Win32 call since OpenFileMappingA.
            let code = unsafe { GetLastError() };
            return Err(if code == ERROR_FILE_NOT_FOUND {
                ShmError::NotFound {
                    name: name.to_string(),
                }
            } else {
                ShmError::Open {
                    name: name.to_string(),
                    source: io::Error::from_raw_os_error(code as i32),
                }
            });
        }

        let ptr = map_view(handle, len, name)?;
        debug!(name, len, "mapped shared-memory region");

        Ok(Mapping {
            ptr,
            len,
            name: name.to_string(),
            handle,
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

/// Map exactly `len` bytes of the object. A view request larger than the
/// object fails, which doubles as the size check Win32 has no direct query
/// for. Closes `handle` on failure.
fn map_view(handle: HANDLE, len: usize, name: &str) -> Result<*mut u8> {
    // SAFETY: `handle` is an open file-mapping handle.
    let view = unsafe { MapViewOfFile(handle, FILE_MAP_ALL_ACCESS, 0, 0, len) };
    if view.Value.is_null() {
        let source = io::Error::last_os_error();
        // SAFETY: `handle` is open and owned by the caller.
        unsafe { CloseHandle(handle) };
        return Err(ShmError::Map {
            name: name.to_string(),
            source,
        });
    }
    Ok(view.Value.cast())
}

fn to_c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| ShmError::InvalidName {
        name: name.to_string(),
    })
}

impl Drop for Mapping {
    fn drop(&mut self) {
        debug!(name = %self.name, "unmapping shared-memory view");
        // SAFETY: `ptr` is the live view and `handle` the open mapping handle.
        // The name disappears once the last handle closes; Win32 refcounts it.
        unsafe {
            UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS {
                Value: self.ptr.cast(),
            });
            CloseHandle(self.handle);
        }
    }
}
