//! The `extract` subcommand: write selected tracks into standalone files.

use anyhow::{bail, Context};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mkrip_mkv::{codec, extract_track, Scanner, TrackEntry};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn run(input: &Path, output_dir: Option<&Path>, tracks: &[u64]) -> anyhow::Result<()> {
    let output_dir = output_dir.unwrap_or(Path::new("."));

    // One pass to learn the track layout; each extraction re-scans the file
    // because the cluster stream is consumed per track.
    let selected = {
        let file = File::open(input)
            .with_context(|| format!("could not open input file: {}", input.display()))?;
        let scanner = Scanner::open(BufReader::new(file))?;
        select_tracks(scanner.tracks().entries.as_slice(), tracks)?
    };

    let mut failures = 0usize;
    for track in &selected {
        let path = output_path(output_dir, input, track);
        let spinner = ProgressBar::new_spinner().with_message(format!(
            "Extracting track {:02} [{}] to {}",
            track.number,
            track.codec_id,
            path.display()
        ));
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("static template"));
        spinner.enable_steady_tick(Duration::from_millis(120));

        match extract_one(input, track, &path) {
            Ok(()) => {
                spinner.finish_with_message(format!(
                    "Track {:02} [{}] -> {}",
                    track.number,
                    track.codec_id,
                    path.display()
                ));
            }
            Err(e) => {
                spinner.abandon_with_message(format!(
                    "Track {:02} [{}] {}",
                    track.number,
                    track.codec_id,
                    style("failed").red()
                ));
                // A failed extraction leaves a partial file behind.
                let _ = std::fs::remove_file(&path);
                eprintln!(
                    "{} could not extract track {}: {e:#}",
                    style("error:").red().bold(),
                    track.number
                );
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} track(s) failed", failures, selected.len());
    }
    Ok(())
}

fn extract_one(input: &Path, track: &TrackEntry, path: &Path) -> anyhow::Result<()> {
    let file = File::open(input)
        .with_context(|| format!("could not open input file: {}", input.display()))?;
    let mut scanner = Scanner::open(BufReader::new(file))?;
    let out = File::create(path)
        .with_context(|| format!("could not create output file: {}", path.display()))?;
    let mut out = BufWriter::new(out);
    extract_track(&mut scanner, track, &mut out)?;
    Ok(())
}

/// Resolve the requested track numbers; an empty request selects every
/// track.
fn select_tracks(entries: &[TrackEntry], requested: &[u64]) -> anyhow::Result<Vec<TrackEntry>> {
    if requested.is_empty() {
        return Ok(entries.to_vec());
    }
    let mut selected = Vec::with_capacity(requested.len());
    for &number in requested {
        match entries.iter().find(|t| t.number == number) {
            Some(track) => selected.push(track.clone()),
            None => bail!("no track with number {}", number),
        }
    }
    Ok(selected)
}

/// `<input-basename>_Track_<NN>[_k]<ext>`, incrementing `k` while the name
/// is taken.
fn output_path(dir: &Path, input: &Path, track: &TrackEntry) -> PathBuf {
    let base = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    let ext = extension_for(&track.codec_id);
    let stem = format!("{}_Track_{:02}", base, track.number);

    let mut candidate = dir.join(format!("{}{}", stem, ext));
    let mut k = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}{}", stem, k, ext));
        k += 1;
    }
    candidate
}

/// Output file extension for a codec ID; unknown codecs get none.
fn extension_for(codec_id: &str) -> &'static str {
    match codec_id {
        // Audio
        codec::codec_ids::A_AAC => ".aac",
        codec::codec_ids::A_AC3 => ".ac3",
        codec::codec_ids::A_MPEG_L2 => ".mp2",
        codec::codec_ids::A_MPEG_L3 => ".mp3",
        codec::codec_ids::A_VORBIS => ".ogg",
        // Video
        codec::codec_ids::V_MS_VFW_FOURCC => ".avi",
        // Subtitles
        codec::codec_ids::S_TEXT_ASS | codec::codec_ids::S_ASS => ".ass",
        codec::codec_ids::S_TEXT_SSA | codec::codec_ids::S_SSA => ".ssa",
        codec::codec_ids::S_TEXT_UTF8 | codec::codec_ids::S_TEXT_ASCII => ".srt",
        codec::codec_ids::S_VOBSUB | codec::codec_ids::S_VOBSUB_ZLIB => ".idx",
        codec::codec_ids::S_TEXT_WEBVTT => ".vtt",
        _ => "",
    }
}
