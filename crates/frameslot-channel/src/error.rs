use frameslot_shm::ShmError;

/// Errors that can occur on the frame channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The slot's shared-memory name is not created yet. Transient: the
    /// producer has not started. Drives the caller's attach-retry loop and
    /// is never surfaced to the user.
    #[error("frame slot {name:?} is not available yet")]
    Unavailable { name: String },

    /// Mapping the slot failed for a non-transient reason (permissions,
    /// size mismatch). Fatal: aborts startup with a diagnostic.
    #[error("failed to map frame slot: {0}")]
    Mapping(ShmError),

    /// The payload handed to the producer does not match the slot layout.
    #[error("frame payload is {len} bytes, slot payload is {expected}")]
    FrameSize { len: usize, expected: usize },
}

impl From<ShmError> for ChannelError {
    fn from(err: ShmError) -> Self {
        match err {
            ShmError::NotFound { name } => ChannelError::Unavailable { name },
            other => ChannelError::Mapping(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
