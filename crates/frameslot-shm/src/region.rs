use crate::error::Result;

/// A named shared-memory region mapped read/write into this process.
///
/// On Unix this wraps a POSIX `shm_open` mapping, on Windows a Win32
/// file-mapping view. Dropping the region unmaps it; only the creating
/// handle removes the name (where the platform needs that), so readers can
/// attach and detach without destroying the object.
pub struct ShmRegion {
    inner: Inner,
}

enum Inner {
    #[cfg(unix)]
    Posix(crate::unix::Mapping),
    #[cfg(windows)]
    Win32(crate::windows::Mapping),
}

impl ShmRegion {
    /// Create (or reuse) the named object, size it to `len` bytes, and map
    /// it read/write. The creating handle owns the name.
    pub fn create(name: &str, len: usize) -> Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                inner: Inner::Posix(crate::unix::Mapping::create(name, len)?),
            })
        }
        #[cfg(windows)]
        {
            Ok(Self {
                inner: Inner::Win32(crate::windows::Mapping::create(name, len)?),
            })
        }
    }

    /// Map an existing named object read/write.
    ///
    /// Fails with [`ShmError::NotFound`](crate::ShmError::NotFound) while
    /// the name has not been created, and with
    /// [`ShmError::SizeMismatch`](crate::ShmError::SizeMismatch) if the
    /// object is smaller than `len`.
    pub fn open(name: &str, len: usize) -> Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                inner: Inner::Posix(crate::unix::Mapping::open(name, len)?),
            })
        }
        #[cfg(windows)]
        {
            Ok(Self {
                inner: Inner::Win32(crate::windows::Mapping::open(name, len)?),
            })
        }
    }

    /// Length of the mapped view in bytes.
    pub fn len(&self) -> usize {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(m) => m.len(),
            #[cfg(windows)]
            Inner::Win32(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Base pointer of the mapped view.
    ///
    /// The memory is aliased by the peer process; callers are responsible
    /// for the access discipline that makes reads and writes race-free.
    pub fn as_ptr(&self) -> *mut u8 {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(m) => m.ptr(),
            #[cfg(windows)]
            Inner::Win32(m) => m.ptr(),
        }
    }

    /// The name this region was created or opened under.
    pub fn name(&self) -> &str {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(m) => m.name(),
            #[cfg(windows)]
            Inner::Win32(m) => m.name(),
        }
    }
}

impl std::fmt::Debug for ShmRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShmRegion")
            .field("name", &self.name())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ShmError;

    fn unique_name(tag: &str) -> String {
        format!(
            "/frameslot-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        )
    }

    #[test]
    fn create_then_open_shares_bytes() {
        let name = unique_name("share");
        let writer = ShmRegion::create(&name, 16).expect("create should succeed");
        let reader = ShmRegion::open(&name, 16).expect("open should succeed");

        // SAFETY: both handles map the same 16-byte object; this test is the
        // only writer.
        unsafe {
            writer.as_ptr().add(3).write(0xAB);
            assert_eq!(reader.as_ptr().add(3).read(), 0xAB);
        }
        assert_eq!(writer.len(), 16);
        assert_eq!(reader.len(), 16);
    }

    #[test]
    fn open_missing_name_is_not_found() {
        let name = unique_name("missing");
        let result = ShmRegion::open(&name, 16);
        assert!(matches!(result, Err(ShmError::NotFound { .. })));
    }

    #[test]
    fn open_smaller_object_is_size_mismatch() {
        let name = unique_name("small");
        let _writer = ShmRegion::create(&name, 8).expect("create should succeed");
        let result = ShmRegion::open(&name, 64);
        assert!(matches!(
            result,
            Err(ShmError::SizeMismatch {
                expected: 64,
                actual: 8,
                ..
            })
        ));
    }

    #[test]
    fn reader_survives_creator_unlink() {
        let name = unique_name("unlink");
        let writer = ShmRegion::create(&name, 16).expect("create should succeed");
        let reader = ShmRegion::open(&name, 16).expect("open should succeed");

        drop(writer);

        // The name is gone but the existing mapping stays valid.
        assert!(matches!(
            ShmRegion::open(&name, 16),
            Err(ShmError::NotFound { .. })
        ));
        // SAFETY: `reader` still maps the object.
        unsafe {
            reader.as_ptr().write(7);
            assert_eq!(reader.as_ptr().read(), 7);
        }
    }

    #[test]
    fn interior_nul_is_invalid_name() {
        let result = ShmRegion::open("bad\0name", 16);
        assert!(matches!(result, Err(ShmError::InvalidName { .. })));
    }
}
