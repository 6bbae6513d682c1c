use std::io;

/// Errors that can occur while creating or mapping a shared-memory region.
#[derive(Debug, thiserror::Error)]
pub enum ShmError {
    /// The named object does not exist (yet). Transient: the creating
    /// process may simply not have started.
    #[error("shared-memory object {name:?} does not exist")]
    NotFound { name: String },

    /// Failed to create the named object.
    #[error("failed to create shared-memory object {name:?}: {source}")]
    Create { name: String, source: io::Error },

    /// Failed to open an existing named object.
    #[error("failed to open shared-memory object {name:?}: {source}")]
    Open { name: String, source: io::Error },

    /// Failed to map the object into this process's address space.
    #[error("failed to map shared-memory object {name:?}: {source}")]
    Map { name: String, source: io::Error },

    /// The existing object is smaller than the agreed layout.
    #[error("shared-memory object {name:?} is {actual} bytes, expected at least {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The name cannot be used on this platform (e.g. interior NUL).
    #[error("invalid shared-memory name {name:?}")]
    InvalidName { name: String },
}

pub type Result<T> = std::result::Result<T, ShmError>;
