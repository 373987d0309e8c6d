//! Skeletal animation command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;

use gm_animation::gltf_loader;
use gm_animation::{Clip, CrossFadeController, ImportOptions, Skeleton};

use crate::utils::{add_table_row, create_table, format_parent, format_seconds, format_vec3};

#[derive(Subcommand)]
pub enum AnimCommands {
    /// List the joints and clips of a glTF file
    Info {
        /// Path to the glTF file
        file: PathBuf,

        #[command(flatten)]
        import: ImportArgs,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Sample one clip into the rest pose and print the joint positions
    Sample {
        /// Path to the glTF file
        file: PathBuf,

        /// Name of the clip to sample
        #[arg(short, long)]
        clip: String,

        /// Time in seconds
        #[arg(short, long, default_value = "0.0", allow_negative_numbers = true)]
        time: f32,

        #[command(flatten)]
        import: ImportArgs,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Play one clip, cross-fade to another and print every frame
    Fade {
        /// Path to the glTF file
        file: PathBuf,

        /// Clip to start playing
        #[arg(long)]
        from: String,

        /// Clip to fade to
        #[arg(long)]
        to: String,

        /// Fade length in seconds
        #[arg(long, default_value = "0.25")]
        fade: f32,

        /// Total simulated time in seconds
        #[arg(short, long, default_value = "1.0")]
        duration: f32,

        /// Simulated frames per second
        #[arg(long, default_value = "30")]
        fps: u32,

        #[command(flatten)]
        import: ImportArgs,
    },
}

/// Import settings shared by every animation command
#[derive(Args, Debug, Clone, Copy)]
pub struct ImportArgs {
    /// Import clips as play-once instead of looping
    #[arg(long)]
    no_loop: bool,

    /// Sort out-of-order keyframes instead of rejecting them
    #[arg(long)]
    lenient: bool,
}

impl From<ImportArgs> for ImportOptions {
    fn from(args: ImportArgs) -> Self {
        Self {
            looping: !args.no_loop,
            strict: !args.lenient,
        }
    }
}

pub fn execute(cmd: AnimCommands) -> Result<()> {
    match cmd {
        AnimCommands::Info { file, import, json } => handle_info(&file, import.into(), json),
        AnimCommands::Sample {
            file,
            clip,
            time,
            import,
            json,
        } => handle_sample(&file, &clip, time, import.into(), json),
        AnimCommands::Fade {
            file,
            from,
            to,
            fade,
            duration,
            fps,
            import,
        } => handle_fade(&file, &from, &to, fade, duration, fps, import.into()),
    }
}

#[derive(Serialize)]
struct InfoReport {
    file: String,
    joints: Vec<JointReport>,
    clips: Vec<ClipReport>,
}

#[derive(Serialize)]
struct JointReport {
    index: usize,
    name: String,
    parent: i32,
}

#[derive(Serialize)]
struct ClipReport {
    name: String,
    start_time: f32,
    end_time: f32,
    duration: f32,
    tracks: usize,
    looping: bool,
}

#[derive(Serialize)]
struct SampleReport {
    clip: String,
    requested_time: f32,
    sampled_time: f32,
    joints: Vec<SampledJoint>,
}

#[derive(Serialize)]
struct SampledJoint {
    index: usize,
    name: String,
    local_position: [f32; 3],
    global_position: [f32; 3],
}

fn load_asset(path: &Path, options: ImportOptions) -> Result<(Skeleton, Vec<Arc<Clip>>)> {
    log::info!("Loading glTF file: {}", path.display());

    let data = gltf_loader::load_document(path)
        .with_context(|| format!("Failed to load glTF file {}", path.display()))?;
    let skeleton = gltf_loader::load_skeleton(&data)
        .with_context(|| format!("Failed to build skeleton from {}", path.display()))?;
    let clips = gltf_loader::load_animation_clips(&data, &options)
        .with_context(|| format!("Failed to import animations from {}", path.display()))?;

    Ok((skeleton, clips.into_iter().map(Arc::new).collect()))
}

/// Shared handle to the clip called `name`
///
/// The controller compares clips by pointer, so every lookup of the same
/// name must hand back the same allocation.
fn find_clip(clips: &[Arc<Clip>], name: &str) -> Result<Arc<Clip>> {
    if let Some(clip) = clips.iter().find(|clip| clip.name() == name) {
        return Ok(Arc::clone(clip));
    }

    let available: Vec<&str> = clips.iter().map(|clip| clip.name()).collect();
    if available.is_empty() {
        bail!("Clip '{name}' not found: the file has no animations");
    }
    bail!(
        "Clip '{name}' not found. Available clips: {}",
        available.join(", ")
    )
}

fn handle_info(path: &Path, options: ImportOptions, json: bool) -> Result<()> {
    let (skeleton, clips) = load_asset(path, options)?;

    let report = InfoReport {
        file: path.display().to_string(),
        joints: skeleton
            .joint_names()
            .iter()
            .enumerate()
            .map(|(index, name)| JointReport {
                index,
                name: name.clone(),
                parent: skeleton.rest_pose().parent(index),
            })
            .collect(),
        clips: clips
            .iter()
            .map(|clip| ClipReport {
                name: clip.name().to_string(),
                start_time: clip.start_time(),
                end_time: clip.end_time(),
                duration: clip.duration(),
                tracks: clip.len(),
                looping: clip.is_looping(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== Skeleton ({} joints) ===", report.joints.len());
    let mut table = create_table(&["#", "Name", "Parent"]);
    for joint in &report.joints {
        add_table_row(
            &mut table,
            vec![
                joint.index.to_string(),
                joint.name.clone(),
                format_parent(joint.parent),
            ],
        );
    }
    table.printstd();

    println!("\n=== Clips ({}) ===", report.clips.len());
    let mut table = create_table(&["Name", "Start", "End", "Duration", "Tracks", "Looping"]);
    for clip in &report.clips {
        add_table_row(
            &mut table,
            vec![
                clip.name.clone(),
                format_seconds(clip.start_time),
                format_seconds(clip.end_time),
                format_seconds(clip.duration),
                clip.tracks.to_string(),
                if clip.looping { "yes" } else { "no" }.to_string(),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn handle_sample(
    path: &Path,
    clip_name: &str,
    time: f32,
    options: ImportOptions,
    json: bool,
) -> Result<()> {
    let (skeleton, clips) = load_asset(path, options)?;
    let clip = find_clip(&clips, clip_name)?;

    let mut pose = skeleton.rest_pose().clone();
    let sampled_time = clip.sample(&mut pose, time);

    let report = SampleReport {
        clip: clip.name().to_string(),
        requested_time: time,
        sampled_time,
        joints: (0..pose.len())
            .map(|index| SampledJoint {
                index,
                name: skeleton.joint_name(index).unwrap_or_default().to_string(),
                local_position: pose.local_transform(index).position.to_array(),
                global_position: pose.global_transform(index).position.to_array(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Clip '{}' sampled at {} (requested {})",
        report.clip,
        format_seconds(report.sampled_time),
        format_seconds(report.requested_time)
    );
    let mut table = create_table(&["#", "Name", "Local position", "Global position"]);
    for joint in &report.joints {
        add_table_row(
            &mut table,
            vec![
                joint.index.to_string(),
                joint.name.clone(),
                format_vec3(joint.local_position.into()),
                format_vec3(joint.global_position.into()),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn check_fade_args(fade: f32, duration: f32, fps: u32) -> Result<()> {
    if fps == 0 {
        bail!("--fps must be greater than zero");
    }
    if !fade.is_finite() {
        bail!("--fade must be a finite number of seconds, got {fade}");
    }
    if !duration.is_finite() {
        bail!("--duration must be a finite number of seconds, got {duration}");
    }
    Ok(())
}

fn handle_fade(
    path: &Path,
    from: &str,
    to: &str,
    fade: f32,
    duration: f32,
    fps: u32,
    options: ImportOptions,
) -> Result<()> {
    check_fade_args(fade, duration, fps)?;

    let (skeleton, clips) = load_asset(path, options)?;
    let from_clip = find_clip(&clips, from)?;
    let to_clip = find_clip(&clips, to)?;

    let mut controller = CrossFadeController::new(Arc::new(skeleton));
    controller.play(from_clip)?;
    controller.fade_to(to_clip, fade)?;

    let delta = 1.0 / fps as f32;
    let frames = (duration.max(0.0) * fps as f32).ceil() as u32;

    println!(
        "Fading '{from}' -> '{to}' over {} at {fps} fps",
        format_seconds(fade)
    );
    let mut table = create_table(&["Frame", "Elapsed", "Clip", "Playhead", "Pending fades"]);
    for frame in 1..=frames {
        controller.update(delta);
        let clip_name = controller
            .current_clip()
            .map_or_else(String::new, |clip| clip.name().to_string());
        add_table_row(
            &mut table,
            vec![
                frame.to_string(),
                format_seconds(frame as f32 * delta),
                clip_name,
                format_seconds(controller.time()),
                controller.targets().len().to_string(),
            ],
        );
    }
    table.printstd();

    Ok(())
}
