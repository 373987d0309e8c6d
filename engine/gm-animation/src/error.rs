use thiserror::Error;

/// Error types for animation loading and playback
#[derive(Error, Debug)]
pub enum AnimationError {
    /// The glTF importer failed to read or validate the asset
    #[error("glTF import error: {0}")]
    Gltf(#[from] gltf::Error),

    /// Playback was requested before a skeleton was assigned
    #[error("Skeleton has not been set on the controller")]
    SkeletonNotSet,

    /// An animation channel could not be turned into a track
    #[error("Channel error in clip '{clip}': {reason}")]
    ChannelError { clip: String, reason: String },

    /// A bone or joint id does not exist in the skeleton
    #[error("Joint index {index} is out of range for a skeleton with {count} joints")]
    JointOutOfRange { index: usize, count: usize },

    /// Structural problem in pose or skeleton data
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type using AnimationError
pub type Result<T> = std::result::Result<T, AnimationError>;
