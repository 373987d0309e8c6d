//! Skeleton and clip import from glTF 2.0 assets
//!
//! Every node of the document becomes a joint and a bone id is simply the
//! node index, so clips and skeletons loaded from the same file line up
//! without any remapping.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use crate::clip::Clip;
use crate::error::{AnimationError, Result};
use crate::interpolation::{Interpolation, TrackValue};
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::track::{Keyframe, Track};
use crate::transform::Transform;

/// Name given to joints whose node has no name
pub const UNNAMED_JOINT: &str = "EMPTY NODE";

/// A parsed glTF document together with its binary buffers
#[derive(Debug)]
pub struct GltfData {
    document: gltf::Document,
    buffers: Vec<gltf::buffer::Data>,
}

impl GltfData {
    /// Parse a `.gltf` or `.glb` file held in memory
    ///
    /// External buffers cannot be resolved this way; embedded and GLB
    /// buffers work.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;
        Ok(Self { document, buffers })
    }

    pub fn document(&self) -> &gltf::Document {
        &self.document
    }

    pub fn buffers(&self) -> &[gltf::buffer::Data] {
        &self.buffers
    }

    pub fn node_count(&self) -> usize {
        self.document.nodes().len()
    }

    fn buffer(&self, buffer: &gltf::Buffer<'_>) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(|data| &data[..])
    }
}

/// Settings for [`load_animation_clips`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportOptions {
    /// Looping flag given to every imported clip
    pub looping: bool,
    /// Reject channels whose keyframe times are not strictly increasing.
    /// When off they are sorted and repeated times dropped.
    pub strict: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            looping: true,
            strict: true,
        }
    }
}

/// Read a glTF file and all of its buffers
pub fn load_document(path: impl AsRef<Path>) -> Result<GltfData> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)?;
    log::debug!(
        "Read glTF document {} ({} nodes, {} animations, {} buffers)",
        path.display(),
        document.nodes().len(),
        document.animations().len(),
        buffers.len()
    );
    Ok(GltfData { document, buffers })
}

/// Pose built from the node transforms as authored
pub fn load_rest_pose(data: &GltfData) -> Pose {
    let mut pose = Pose::new(data.node_count());

    for node in data.document.nodes() {
        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform::new(
            Vec3::from_array(translation),
            Quat::from_array(rotation).normalize(),
            Vec3::from_array(scale),
        );
        pose.set_local_transform(node.index(), transform);

        for child in node.children() {
            pose.set_parent(child.index(), node.index() as i32);
        }
    }

    pose
}

/// Pose the skinned meshes were bound against
///
/// Starts from the rest pose in model space, replaces every skinned joint
/// with the inverse of its inverse bind matrix, then converts back to local
/// space.
pub fn load_bind_pose(data: &GltfData) -> Pose {
    let rest = load_rest_pose(data);
    let mut world: Vec<Transform> = (0..rest.len()).map(|i| rest.global_transform(i)).collect();

    for skin in data.document.skins() {
        let reader = skin.reader(|buffer| data.buffer(&buffer));
        let Some(matrices) = reader.read_inverse_bind_matrices() else {
            log::trace!("Skin {} has no inverse bind matrices", skin.index());
            continue;
        };

        for (joint, matrix) in skin.joints().zip(matrices) {
            let inv_bind = Mat4::from_cols_array_2d(&matrix);
            if let Some(slot) = world.get_mut(joint.index()) {
                *slot = Transform::from_mat4(&inv_bind.inverse());
            }
        }
    }

    let mut bind = rest;
    for i in 0..bind.len() {
        let mut local = world[i];
        if let Ok(parent) = usize::try_from(bind.parent(i))
            && let Some(parent_world) = world.get(parent)
        {
            local = Transform::combine(&parent_world.inverse(), &local);
        }
        bind.set_local_transform(i, local);
    }

    bind
}

/// One name per node, [`UNNAMED_JOINT`] where the node has none
pub fn load_joint_names(data: &GltfData) -> Vec<String> {
    data.document
        .nodes()
        .map(|node| node.name().unwrap_or(UNNAMED_JOINT).to_string())
        .collect()
}

/// Rest pose, bind pose and names in one skeleton
pub fn load_skeleton(data: &GltfData) -> Result<Skeleton> {
    let rest = load_rest_pose(data);
    rest.validate()?;
    let skeleton = Skeleton::new(rest, load_bind_pose(data), load_joint_names(data))?;
    log::info!("Loaded skeleton with {} joints", skeleton.joint_count());
    Ok(skeleton)
}

/// Every animation in the document as a clip
///
/// Morph target weight channels are skipped.
pub fn load_animation_clips(data: &GltfData, options: &ImportOptions) -> Result<Vec<Clip>> {
    let mut clips = Vec::with_capacity(data.document.animations().len());

    for animation in data.document.animations() {
        let name = animation
            .name()
            .map_or_else(|| format!("animation_{}", animation.index()), str::to_string);
        let mut clip = Clip::new(name);
        clip.set_looping(options.looping);

        for channel in animation.channels() {
            let node = channel.target().node().index();
            let bone_id = node as u32;
            let interpolation = Interpolation::from(channel.sampler().interpolation());
            let reader = channel.reader(|buffer| data.buffer(&buffer));

            let Some(inputs) = reader.read_inputs() else {
                return Err(channel_error(
                    &clip,
                    format!("channel for node {node} has no input times"),
                ));
            };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else {
                return Err(channel_error(
                    &clip,
                    format!("channel for node {node} has no output values"),
                ));
            };

            log::trace!(
                "Clip '{}': {:?} channel on node {} with {} keyframes",
                clip.name(),
                interpolation,
                node,
                times.len()
            );

            match outputs {
                ReadOutputs::Translations(values) => {
                    let values: Vec<Vec3> = values.map(Vec3::from_array).collect();
                    let track =
                        track_from_channel(clip.name(), &times, &values, interpolation, options)?;
                    *clip.track_or_insert(bone_id).position_mut() = track;
                }
                ReadOutputs::Rotations(values) => {
                    let values: Vec<Quat> = values.into_f32().map(Quat::from_array).collect();
                    let track =
                        track_from_channel(clip.name(), &times, &values, interpolation, options)?;
                    *clip.track_or_insert(bone_id).rotation_mut() = track;
                }
                ReadOutputs::Scales(values) => {
                    let values: Vec<Vec3> = values.map(Vec3::from_array).collect();
                    let track =
                        track_from_channel(clip.name(), &times, &values, interpolation, options)?;
                    *clip.track_or_insert(bone_id).scale_mut() = track;
                }
                ReadOutputs::MorphTargetWeights(_) => {
                    log::warn!(
                        "Clip '{}': skipping morph target weight channel on node {}",
                        clip.name(),
                        node
                    );
                }
            }
        }

        clip.recalculate_duration();
        if options.strict {
            clip.validate(data.node_count())?;
        }
        log::debug!(
            "Loaded clip '{}' with {} tracks ({:.3}s to {:.3}s)",
            clip.name(),
            clip.len(),
            clip.start_time(),
            clip.end_time()
        );
        clips.push(clip);
    }

    log::info!("Loaded {} animation clips", clips.len());
    Ok(clips)
}

/// Build a track from one sampler's input times and output values
///
/// Cubic spline samplers store three values per keyframe: in-tangent, value,
/// out-tangent. Other samplers store one.
pub fn track_from_channel<T: TrackValue>(
    clip: &str,
    times: &[f32],
    values: &[T],
    interpolation: Interpolation,
    options: &ImportOptions,
) -> Result<Track<T>> {
    let stride = if interpolation == Interpolation::Cubic { 3 } else { 1 };
    if values.len() != times.len() * stride {
        return Err(AnimationError::ChannelError {
            clip: clip.to_string(),
            reason: format!(
                "{} keyframe times but {} output values for {:?} interpolation",
                times.len(),
                values.len(),
                interpolation
            ),
        });
    }

    if let Some(time) = times.iter().find(|time| !time.is_finite()) {
        return Err(AnimationError::ChannelError {
            clip: clip.to_string(),
            reason: format!("non-finite keyframe time {time}"),
        });
    }

    let mut frames: Vec<Keyframe<T>> = times
        .iter()
        .enumerate()
        .map(|(i, &time)| {
            if stride == 3 {
                Keyframe::with_tangents(time, values[3 * i + 1], values[3 * i], values[3 * i + 2])
            } else {
                Keyframe::new(time, values[i])
            }
        })
        .collect();

    let increasing = frames.windows(2).all(|w| w[0].time < w[1].time);
    if !increasing {
        if options.strict {
            return Err(AnimationError::ChannelError {
                clip: clip.to_string(),
                reason: "keyframe times are not strictly increasing".to_string(),
            });
        }
        log::warn!("Clip '{clip}': sorting out-of-order keyframes");
        frames.sort_by(|a, b| a.time.total_cmp(&b.time));
        frames.dedup_by(|later, earlier| later.time == earlier.time);
    }

    Ok(Track::from_keyframes(frames, interpolation))
}

fn channel_error(clip: &Clip, reason: String) -> AnimationError {
    AnimationError::ChannelError {
        clip: clip.name().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT: ImportOptions = ImportOptions {
        looping: true,
        strict: true,
    };
    const LENIENT: ImportOptions = ImportOptions {
        looping: true,
        strict: false,
    };

    #[test]
    fn test_default_options() {
        let options = ImportOptions::default();
        assert!(options.looping);
        assert!(options.strict);
    }

    #[test]
    fn test_linear_channel() {
        let track =
            track_from_channel("walk", &[0.0, 1.0], &[1.0_f32, 3.0], Interpolation::Linear, &STRICT)
                .unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track[1].value, 3.0);
        assert_eq!(track[1].in_tangent, 0.0);
        assert_eq!(track.interpolation(), Interpolation::Linear);
    }

    #[test]
    fn test_cubic_channel_splits_triplets() {
        // in, value, out per keyframe
        let values = [
            Vec3::splat(-1.0),
            Vec3::ZERO,
            Vec3::splat(1.0),
            Vec3::splat(-2.0),
            Vec3::Y,
            Vec3::splat(2.0),
        ];
        let track =
            track_from_channel("jump", &[0.0, 0.5], &values, Interpolation::Cubic, &STRICT).unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track[0].in_tangent, Vec3::splat(-1.0));
        assert_eq!(track[0].value, Vec3::ZERO);
        assert_eq!(track[0].out_tangent, Vec3::splat(1.0));
        assert_eq!(track[1].value, Vec3::Y);
        assert_eq!(track[1].time, 0.5);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let values = [Vec3::ZERO; 2];
        let result = track_from_channel("run", &[0.0, 1.0], &values, Interpolation::Cubic, &STRICT);
        assert!(matches!(result, Err(AnimationError::ChannelError { .. })));
    }

    #[test]
    fn test_non_finite_time_is_error() {
        let times = [0.0, f32::NAN];
        let result = track_from_channel("run", &times, &[0.0_f32, 1.0], Interpolation::Linear, &LENIENT);
        assert!(matches!(result, Err(AnimationError::ChannelError { .. })));
    }

    #[test]
    fn test_unsorted_strict_vs_lenient() {
        let times = [0.0, 2.0, 1.0, 1.0];
        let values = [0.0_f32, 20.0, 10.0, 11.0];

        let strict = track_from_channel("idle", &times, &values, Interpolation::Linear, &STRICT);
        assert!(matches!(strict, Err(AnimationError::ChannelError { .. })));

        let track =
            track_from_channel("idle", &times, &values, Interpolation::Linear, &LENIENT).unwrap();
        assert!(track.is_sorted_by_time());
        assert_eq!(track.len(), 3);
        assert_eq!(track[1].value, 10.0);
        assert_eq!(track[2].value, 20.0);
    }
}
