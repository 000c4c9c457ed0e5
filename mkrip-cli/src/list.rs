//! The `list` subcommand: print the element tree of a Matroska file.
//!
//! Driven directly by the EBML tree walker with a printing visitor. Children
//! of a BlockGroup are buffered and flushed when the group closes, so
//! BlockDuration and ReferenceBlock lines can be scaled with the track of
//! the group's own Block.

use anyhow::Context;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use mkrip_mkv::block::{Block, Lacing};
use mkrip_mkv::ebml::{self, ElementHeader, Value, Visitor};
use mkrip_mkv::elements::{self, ElementKind, SchemaEntry};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Suffix columns selected on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub show_position: bool,
    pub show_size: bool,
    pub show_data_size: bool,
}

pub fn run(input: &Path, options: Options) -> anyhow::Result<()> {
    let file = File::open(input)
        .with_context(|| format!("could not open input file: {}", input.display()))?;
    let mut src = ebml::SeekSource::new(BufReader::new(file));

    let stdout = io::stdout();
    let mut printer = TreePrinter::new(BufWriter::new(stdout.lock()), options);
    ebml::walk(&mut src, &mut printer).context("could not list document")?;
    match printer.finish() {
        Ok(()) => Ok(()),
        // A closed pipe ends the listing, not the process' success.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Per-track scaling state gathered while walking.
#[derive(Debug, Clone, Copy)]
struct TrackScale {
    timestamp_scale: f64,
    codec_delay: u64,
}

impl Default for TrackScale {
    fn default() -> Self {
        TrackScale {
            timestamp_scale: 1.0,
            codec_delay: 0,
        }
    }
}

/// A visitor event held back while a BlockGroup is open.
enum Buffered {
    Found {
        el: ElementHeader,
        schema: SchemaEntry,
        offset: u64,
    },
    Decoded {
        el: ElementHeader,
        schema: SchemaEntry,
        offset: u64,
        value: Value,
    },
}

/// Context extracted from a finished BlockGroup.
#[derive(Default, Clone, Copy)]
struct GroupContext {
    track: TrackScale,
}

struct TreePrinter<W: Write> {
    out: W,
    options: Options,
    depth: usize,
    /// Nanoseconds per segment tick.
    scale: u64,
    cluster_timestamp: u64,
    tracks: HashMap<u64, TrackScale>,
    current_track: (Option<u64>, TrackScale),
    /// Events buffered inside the currently open BlockGroup.
    group: Option<Vec<Buffered>>,
    io_error: Option<io::Error>,
}

impl<W: Write> TreePrinter<W> {
    fn new(out: W, options: Options) -> Self {
        TreePrinter {
            out,
            options,
            depth: 0,
            scale: mkrip_mkv::model::DEFAULT_TIMESTAMP_SCALE,
            cluster_timestamp: 0,
            tracks: HashMap::new(),
            current_track: (None, TrackScale::default()),
            group: None,
            io_error: None,
        }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(e) = self.io_error.take() {
            return Err(e);
        }
        self.out.flush()
    }

    fn println(&mut self, line: std::fmt::Arguments<'_>) {
        if self.io_error.is_some() {
            return;
        }
        let indent = if self.depth == 0 {
            String::new()
        } else {
            format!("|{}", " ".repeat(self.depth - 1))
        };
        if let Err(e) = writeln!(self.out, "{}+ {}", indent, line) {
            self.io_error = Some(e);
        }
    }

    fn suffix(&self, el: &ElementHeader, offset: u64) -> String {
        let mut suffix = String::new();
        if self.options.show_position {
            suffix.push_str(&format!(", at {}", offset));
        }
        if self.options.show_size {
            match el.size {
                Some(size) => {
                    suffix.push_str(&format!(", size {}", el.header_size as u64 + size))
                }
                None => suffix.push_str(", size unknown"),
            }
        }
        if self.options.show_data_size {
            match el.size {
                Some(size) => suffix.push_str(&format!(", data size {}", size)),
                None => suffix.push_str(", data size unknown"),
            }
        }
        suffix
    }

    fn handle_found(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64) {
        if schema.kind != ElementKind::Master {
            return; // leaves print once decoded
        }
        let suffix = self.suffix(el, offset);
        self.println(format_args!("{}{}", schema.name, suffix));
        self.depth += 1;
        if el.id == elements::TRACK_ENTRY {
            self.current_track = (None, TrackScale::default());
        }
    }

    fn handle_decoded(
        &mut self,
        el: &ElementHeader,
        schema: SchemaEntry,
        offset: u64,
        value: &Value,
        group: Option<GroupContext>,
    ) {
        // State the pretty-printers depend on.
        match (el.id, value) {
            (elements::TIMESTAMP_SCALE, Value::Uint(v)) if *v > 0 => self.scale = *v,
            (elements::TIMESTAMP, Value::Uint(v)) => self.cluster_timestamp = *v,
            (elements::TRACK_NUMBER, Value::Uint(v)) => self.current_track.0 = Some(*v),
            (elements::TRACK_TIMESTAMP_SCALE, Value::Float(v)) => {
                self.current_track.1.timestamp_scale = *v
            }
            (elements::CODEC_DELAY, Value::Uint(v)) => self.current_track.1.codec_delay = *v,
            _ => {}
        }

        let suffix = self.suffix(el, offset);
        match el.id {
            elements::DURATION => {
                // Stored as a float count of segment ticks.
                if let Value::Float(v) = value {
                    let ns = (*v * self.scale as f64) as i64;
                    self.println(format_args!(
                        "{}: {}{}",
                        schema.name,
                        fmt_duration(ns),
                        suffix
                    ));
                    return;
                }
            }
            elements::TIMESTAMP | elements::CUE_DURATION => {
                if let Value::Uint(v) = value {
                    let ns = (*v).saturating_mul(self.scale) as i64;
                    self.println(format_args!(
                        "{}: {}{}",
                        schema.name,
                        fmt_duration(ns),
                        suffix
                    ));
                    return;
                }
            }
            elements::SEEK_ID => {
                if let Value::Binary(bytes) = value {
                    let id = ebml::parse_unsigned(bytes) as u32;
                    let name = elements::schema(id).unwrap_or(elements::UNKNOWN).name;
                    self.println(format_args!(
                        "{}: 0x{:X} {}{}",
                        schema.name, id, name, suffix
                    ));
                    return;
                }
            }
            elements::BLOCK_DURATION | elements::REFERENCE_BLOCK => {
                // Track ticks; scaled with the track of the sibling Block.
                let track = group.map(|g| g.track).unwrap_or_default();
                let ticks = match value {
                    Value::Uint(v) => *v as i64,
                    Value::Int(v) => *v,
                    _ => 0,
                };
                let ns = (ticks as f64 * self.scale as f64 * track.timestamp_scale) as i64;
                self.println(format_args!(
                    "{}: {}{}",
                    schema.name,
                    fmt_duration(ns),
                    suffix
                ));
                return;
            }
            elements::BLOCK | elements::SIMPLE_BLOCK => {
                if let Value::Binary(bytes) = value {
                    self.print_block(el, schema, offset, bytes, &suffix, group);
                    return;
                }
            }
            _ => {}
        }

        match value {
            Value::Uint(v) => self.println(format_args!("{}: {}{}", schema.name, v, suffix)),
            Value::Int(v) => self.println(format_args!("{}: {}{}", schema.name, v, suffix)),
            Value::Float(v) => {
                self.println(format_args!("{}: {:.6}{}", schema.name, v, suffix))
            }
            Value::Str(v) => self.println(format_args!("{}: {}{}", schema.name, v, suffix)),
            Value::Date(v) => {
                self.println(format_args!("{}: {}{}", schema.name, fmt_date(*v), suffix))
            }
            Value::Binary(_) => self.println(format_args!("{}{}", schema.name, suffix)),
        }
    }

    fn print_block(
        &mut self,
        el: &ElementHeader,
        schema: SchemaEntry,
        offset: u64,
        bytes: &[u8],
        suffix: &str,
        group: Option<GroupContext>,
    ) {
        let block = match Block::read(bytes) {
            Ok(b) => b,
            Err(_) => {
                self.println(format_args!("{}: damaged{}", schema.name, suffix));
                return;
            }
        };
        let frames = match block.frames() {
            Ok(f) => f,
            Err(_) => {
                self.println(format_args!("{}: damaged lacing{}", schema.name, suffix));
                return;
            }
        };

        let track = group
            .map(|g| g.track)
            .or_else(|| self.tracks.get(&block.track_number).copied())
            .unwrap_or_default();
        let ticks = self.cluster_timestamp as i64 + block.rel_timestamp as i64;
        let ns = (ticks as f64 * self.scale as f64 * track.timestamp_scale) as i64
            - track.codec_delay as i64;

        self.println(format_args!(
            "{}: track number {}, {} frame(s), timestamp {}{}",
            schema.name,
            block.track_number,
            frames.len(),
            fmt_duration(ns),
            suffix
        ));

        // Frame offsets are back-computed from the element end and ignore
        // the lacing header, so they are approximate for laced bodies.
        let approximate = block.lacing() != Lacing::None;
        let data_size = el.size.unwrap_or(bytes.len() as u64);
        let mut frame_offset =
            offset as i64 + el.header_size as i64 + data_size as i64;
        for frame in &frames {
            frame_offset -= frame.len() as i64;
        }
        self.depth += 1;
        for frame in &frames {
            if approximate {
                self.println(format_args!(
                    "Frame at {} size {} (approximate)",
                    frame_offset,
                    frame.len()
                ));
            } else {
                self.println(format_args!("Frame at {} size {}", frame_offset, frame.len()));
            }
            frame_offset += frame.len() as i64;
        }
        self.depth -= 1;
    }

    fn flush_group(&mut self, events: Vec<Buffered>) {
        // The group's own track drives BlockDuration/ReferenceBlock scaling.
        let mut context = GroupContext::default();
        for event in &events {
            if let Buffered::Decoded {
                el,
                value: Value::Binary(bytes),
                ..
            } = event
            {
                if el.id == elements::BLOCK {
                    if let Ok(block) = Block::read(bytes) {
                        context.track = self
                            .tracks
                            .get(&block.track_number)
                            .copied()
                            .unwrap_or_default();
                    }
                }
            }
        }
        for event in events {
            match event {
                Buffered::Found { el, schema, offset } => {
                    self.handle_found(&el, schema, offset)
                }
                Buffered::Decoded {
                    el,
                    schema,
                    offset,
                    value,
                } => self.handle_decoded(&el, schema, offset, &value, Some(context)),
            }
        }
    }
}

impl<W: Write> Visitor for TreePrinter<W> {
    fn found(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64) {
        if let Some(events) = &mut self.group {
            events.push(Buffered::Found {
                el: *el,
                schema,
                offset,
            });
            return;
        }
        if el.id == elements::BLOCK_GROUP {
            self.group = Some(vec![Buffered::Found {
                el: *el,
                schema,
                offset,
            }]);
            return;
        }
        self.handle_found(el, schema, offset);
    }

    fn decoded(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64, value: &Value) {
        if let Some(events) = &mut self.group {
            events.push(Buffered::Decoded {
                el: *el,
                schema,
                offset,
                value: value.clone(),
            });
            return;
        }
        self.handle_decoded(el, schema, offset, value, None);
    }

    fn closed(&mut self, el: &ElementHeader, _schema: SchemaEntry, _offset: u64) {
        if el.id == elements::BLOCK_GROUP {
            if let Some(events) = self.group.take() {
                self.flush_group(events);
            }
        } else if self.group.is_some() {
            return; // masters do not nest inside a BlockGroup here
        }
        if el.id == elements::TRACK_ENTRY {
            if let (Some(number), scale) = self.current_track {
                self.tracks.insert(number, scale);
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Format nanoseconds the way durations read in log output: `1m27.336s`,
/// `150ms`, `0s`.
fn fmt_duration(ns: i64) -> String {
    if ns == 0 {
        return "0s".to_string();
    }
    let sign = if ns < 0 { "-" } else { "" };
    let ns = ns.unsigned_abs();
    if ns < 1_000 {
        return format!("{}{}ns", sign, ns);
    }
    if ns < 1_000_000 {
        return format!("{}{}µs", sign, trim_decimal(ns as f64 / 1_000.0));
    }
    if ns < 1_000_000_000 {
        return format!("{}{}ms", sign, trim_decimal(ns as f64 / 1_000_000.0));
    }
    let total_seconds = ns / 1_000_000_000;
    let frac = ns % 1_000_000_000;
    let hours = total_seconds / 3600;
    let minutes = total_seconds / 60 % 60;
    let seconds = total_seconds % 60;
    let seconds_part = trim_decimal(seconds as f64 + frac as f64 / 1_000_000_000.0);

    let mut out = String::from(sign);
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", seconds_part));
    out
}

fn trim_decimal(v: f64) -> String {
    let s = format!("{:.6}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Matroska dates count nanoseconds from 2001-01-01T00:00:00 UTC.
fn fmt_date(ns: i64) -> String {
    let base = match Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0) {
        chrono::LocalResult::Single(t) => t,
        _ => return format!("{} ns", ns),
    };
    (base + ChronoDuration::nanoseconds(ns))
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(0), "0s");
        assert_eq!(fmt_duration(500), "500ns");
        assert_eq!(fmt_duration(1_500), "1.5µs");
        assert_eq!(fmt_duration(150_000_000), "150ms");
        assert_eq!(fmt_duration(4_200_000_000), "4.2s");
        assert_eq!(fmt_duration(87_336_000_000), "1m27.336s");
        assert_eq!(fmt_duration(3_600_000_000_000), "1h0m0s");
        assert_eq!(fmt_duration(-500_000_000), "-500ms");
    }

    #[test]
    fn test_fmt_date() {
        assert_eq!(fmt_date(0), "2001-01-01 00:00:00 UTC");
        // 2010-08-21 07:23:03 UTC in nanoseconds since 2001-01-01.
        let ns = 304_068_183_000_000_000;
        assert_eq!(fmt_date(ns), "2010-08-21 07:23:03 UTC");
    }

    #[test]
    fn test_listing_output() {
        use mkrip_mkv::ebml::{walk, SliceSource};

        // EBML head with a DocType, then a Segment with Info/TimestampScale.
        let mut doc = vec![0x1A, 0x45, 0xDF, 0xA3, 0x8B];
        doc.extend_from_slice(&[0x42, 0x82, 0x88]);
        doc.extend_from_slice(b"matroska");
        doc.extend_from_slice(&[0x18, 0x53, 0x80, 0x67, 0x8C]);
        doc.extend_from_slice(&[0x15, 0x49, 0xA9, 0x66, 0x87]);
        doc.extend_from_slice(&[0x2A, 0xD7, 0xB1, 0x83, 0x0F, 0x42, 0x40]);

        let mut out = Vec::new();
        {
            let mut printer = TreePrinter::new(
                &mut out,
                Options {
                    show_position: true,
                    ..Options::default()
                },
            );
            let mut src = SliceSource::new(&doc, 0);
            walk(&mut src, &mut printer).unwrap();
            printer.finish().unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "+ EBML, at 0");
        assert_eq!(lines[1], "|+ DocType: matroska, at 5");
        assert_eq!(lines[2], "+ Segment, at 16");
        assert_eq!(lines[3], "|+ Info, at 21");
        assert_eq!(lines[4], "| + TimestampScale: 1000000, at 26");
    }

    #[test]
    fn test_block_group_lines_are_deferred_with_context() {
        use mkrip_mkv::ebml::{walk, SliceSource};

        // Cluster { Timestamp 100, BlockGroup { Block(track 1), BlockDuration 32 } }
        let mut doc = vec![0x1F, 0x43, 0xB6, 0x75, 0x91];
        doc.extend_from_slice(&[0xE7, 0x81, 0x64]); // Timestamp 100
        doc.extend_from_slice(&[0xA0, 0x8C]); // BlockGroup, 12 bytes
        doc.extend_from_slice(&[0xA1, 0x87, 0x81, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC]);
        doc.extend_from_slice(&[0x9B, 0x81, 0x20]); // BlockDuration 32

        let mut out = Vec::new();
        {
            let mut printer = TreePrinter::new(&mut out, Options::default());
            let mut src = SliceSource::new(&doc, 0);
            walk(&mut src, &mut printer).unwrap();
            printer.finish().unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "+ Cluster");
        assert_eq!(lines[1], "|+ Timestamp: 100ms");
        assert_eq!(lines[2], "|+ BlockGroup");
        assert_eq!(lines[3], "| + Block: track number 1, 1 frame(s), timestamp 100ms");
        assert_eq!(lines[4], "|  + Frame at 16 size 3");
        assert_eq!(lines[5], "| + BlockDuration: 32ms");
    }
}
