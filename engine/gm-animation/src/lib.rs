//! Skeletal animation for GameMaker
//!
//! The pipeline runs bottom-up:
//! - [`Track`] samples keyframes for one channel (constant, linear or cubic)
//! - [`TransformTrack`] groups the position, rotation and scale tracks of a bone
//! - [`Clip`] poses a whole skeleton at a point in time
//! - [`Pose`] holds local joint transforms and the joint hierarchy
//! - [`Skeleton`] keeps the rest pose, bind pose and inverse bind matrices
//! - [`CrossFadeController`] plays clips and fades between them
//!
//! Skeletons and clips are usually imported with the [`gltf_loader`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gm_animation::{CrossFadeController, ImportOptions, gltf_loader};
//!
//! # fn main() -> gm_animation::Result<()> {
//! let data = gltf_loader::load_document("character.gltf")?;
//! let skeleton = Arc::new(gltf_loader::load_skeleton(&data)?);
//! let clips: Vec<_> = gltf_loader::load_animation_clips(&data, &ImportOptions::default())?
//!     .into_iter()
//!     .map(Arc::new)
//!     .collect();
//!
//! let mut controller = CrossFadeController::new(Arc::clone(&skeleton));
//! controller.play(Arc::clone(&clips[0]))?;
//! controller.fade_to(Arc::clone(&clips[1]), 0.25)?;
//! controller.update(1.0 / 60.0);
//!
//! let mut skin = Vec::new();
//! skeleton.skin_matrices(controller.current_pose(), &mut skin);
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod crossfade;
pub mod error;
pub mod gltf_loader;
pub mod interpolation;
pub mod pose;
pub mod skeleton;
pub mod track;
pub mod transform;
pub mod transform_track;

// Re-export common types
pub use clip::Clip;
pub use crossfade::{CrossFadeController, CrossFadeTarget};
pub use error::{AnimationError, Result};
pub use gltf_loader::{GltfData, ImportOptions};
pub use interpolation::{Interpolation, TrackValue};
pub use pose::Pose;
pub use skeleton::Skeleton;
pub use track::{Keyframe, QuaternionTrack, ScalarTrack, Track, VectorTrack};
pub use transform::Transform;
pub use transform_track::TransformTrack;

pub use glam::{Mat4, Quat, Vec3};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
