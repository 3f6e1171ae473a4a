//! Motion CLI commands
//!
//! Commands for inspecting, sampling, and baking motion files.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step};
use crate::formats::motion::{TrackChannel, read_motion_file};
use crate::inspect::inspect_motion;
use crate::options::DecodeOptions;

/// One track sampled at every whole frame.
#[derive(Debug, Serialize)]
struct BakedTrack {
    bone: usize,
    channel: TrackChannel,
    /// `[frame, value]` pairs
    frames: Vec<(u16, f32)>,
}

/// Inspect a motion file and list its tracks, or write them as JSON.
pub fn inspect(path: &Path, output: Option<&Path>, options: &DecodeOptions) -> anyhow::Result<()> {
    println!("Inspecting motion file: {}", path.display());
    println!();

    let info = inspect_motion(path, options)?;

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&info)?;
        std::fs::write(output, json)?;
        println!("Written to: {}", output.display());
        return Ok(());
    }

    println!("Motion File Information");
    println!("=======================");
    println!("Id:          {}", info.id);
    println!("Frames:      {} - {}", info.start_frame, info.end_frame);
    println!("Bones:       {}", info.bone_count);
    println!(
        "Tracks:      {} decoded / {} declared",
        info.decoded_track_count, info.declared_track_count
    );
    println!();

    println!("Tracks:");
    println!("-------");
    for track in &info.tracks {
        println!(
            "  bone {:3} {:2} | {:12} | {:4} keys | frames {} - {}",
            track.bone,
            track.channel.short_name(),
            track.compression_name(),
            track.key_count,
            track.first_frame.unwrap_or(0),
            track.last_frame.unwrap_or(0)
        );
    }

    if !info.skipped.is_empty() {
        println!();
        println!("Skipped ({}):", info.skipped.len());
        for track in &info.skipped {
            println!(
                "  bone {:3} {:2} | {}",
                track.bone,
                track.channel.short_name(),
                track.compression_name()
            );
        }
    }

    Ok(())
}

/// Sample one bone channel at `frame` and print the value.
pub fn sample(
    path: &Path,
    bone: usize,
    channel: TrackChannel,
    frame: f64,
    options: &DecodeOptions,
) -> anyhow::Result<()> {
    let motion = read_motion_file(path, options)?;
    let track = motion
        .group(bone)
        .and_then(|group| group.track(channel))
        .ok_or_else(|| anyhow::anyhow!("bone {bone} has no {channel} track"))?;

    let value = track.sample(frame)?;
    println!("bone {bone} {channel} @ {frame}: {value}");
    Ok(())
}

/// Bake every decoded track to per-frame samples and write JSON.
pub fn bake(
    path: &Path,
    output: &Path,
    options: &DecodeOptions,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", path.display()));
    }
    let motion = read_motion_file(path, options)?;

    let mut baked = Vec::with_capacity(motion.decoded_track_count());
    for group in &motion.groups {
        for track in group.tracks.iter().filter(|t| !t.keys.is_empty()) {
            baked.push(BakedTrack {
                bone: group.bone,
                channel: track.channel,
                frames: track.bake()?,
            });
        }
    }

    if !quiet {
        print_step(2, 2, DISK, &format!("Writing {} tracks...", baked.len()));
    }
    std::fs::write(output, serde_json::to_string_pretty(&baked)?)?;

    if !quiet {
        print_done(started.elapsed());
    }
    Ok(())
}
