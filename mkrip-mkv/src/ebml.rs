//! EBML (Extensible Binary Meta Language) parsing utilities.
//!
//! EBML is the binary format underlying Matroska. It uses variable-length
//! integers (VINTs) for both element IDs and sizes. This module provides the
//! VINT codec, element-header reading over an abstract byte source, leaf
//! value decoding, and a schema-driven tree walker with a visitor hook for
//! inspection tools.

use crate::elements::{self, ElementKind, SchemaEntry};
use crate::error::{MkvError, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// Maximum element ID length in bytes.
pub const MAX_ID_LENGTH: usize = 4;

/// Maximum element size length in bytes.
pub const MAX_SIZE_LENGTH: usize = 8;

/// Maximum recursion depth for nested master elements.
pub const MAX_RECURSION_DEPTH: u32 = 64;

// ---------------------------------------------------------------------------
// Byte sources
// ---------------------------------------------------------------------------

/// A positioned byte source for EBML reading.
///
/// Matroska can be read both from seekable files and from forward-only
/// streams; the scanner asks [`EbmlSource::is_seekable`] before attempting
/// any SeekHead-directed jump.
pub trait EbmlSource {
    /// Fill `buf` completely or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Absolute position of the cursor.
    fn position(&self) -> u64;

    /// Advance the cursor by `n` bytes without interpreting them.
    fn skip(&mut self, n: u64) -> io::Result<()>;

    /// Whether [`EbmlSource::seek_to`] is available.
    fn is_seekable(&self) -> bool;

    /// Move the cursor to an absolute position.
    fn seek_to(&mut self, pos: u64) -> io::Result<u64>;
}

/// Seekable source over any `Read + Seek`.
///
/// The reader must be positioned at the start of the document; positions
/// reported by the source are relative to that point.
pub struct SeekSource<R: Read + Seek> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> SeekSource<R> {
    /// Wrap a seekable reader.
    pub fn new(inner: R) -> Self {
        SeekSource { inner, pos: 0 }
    }
}

impl<R: Read + Seek> EbmlSource for SeekSource<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn skip(&mut self, n: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Current(n as i64))?;
        self.pos += n;
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_to(&mut self, pos: u64) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(pos)
    }
}

/// Forward-only source over any `Read`; skips by discarding.
pub struct ForwardSource<R: Read> {
    inner: R,
    pos: u64,
}

impl<R: Read> ForwardSource<R> {
    /// Wrap a forward-only reader.
    pub fn new(inner: R) -> Self {
        ForwardSource { inner, pos: 0 }
    }
}

impl<R: Read> EbmlSource for ForwardSource<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn skip(&mut self, n: u64) -> io::Result<()> {
        let copied = io::copy(&mut self.inner.by_ref().take(n), &mut io::sink())?;
        self.pos += copied;
        if copied < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended while skipping",
            ));
        }
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn seek_to(&mut self, _pos: u64) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source is not seekable",
        ))
    }
}

/// In-memory source over a byte slice.
///
/// `base` is the absolute offset of the first byte, so positions keep their
/// document-absolute meaning when a buffered master element is re-decoded.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> SliceSource<'a> {
    /// Wrap a slice whose first byte sits at absolute offset `base`.
    pub fn new(data: &'a [u8], base: u64) -> Self {
        SliceSource { data, pos: 0, base }
    }
}

impl EbmlSource for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if self.data.len() - self.pos < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "slice exhausted",
            ));
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    fn skip(&mut self, n: u64) -> io::Result<()> {
        if ((self.data.len() - self.pos) as u64) < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "slice exhausted",
            ));
        }
        self.pos += n as usize;
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_to(&mut self, pos: u64) -> io::Result<u64> {
        if pos < self.base || pos > self.base + self.data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek outside buffered element",
            ));
        }
        self.pos = (pos - self.base) as usize;
        Ok(pos)
    }
}

// ---------------------------------------------------------------------------
// VINT codec
// ---------------------------------------------------------------------------

/// Decode a VINT from a slice with the width marker cleared.
///
/// Returns the value and the number of bytes consumed. This is the form used
/// for block track numbers and EBML lacing sizes.
pub fn read_vint_data(data: &[u8]) -> Result<(u64, usize)> {
    let first = *data.first().ok_or(MkvError::InvalidVintLength { offset: 0 })?;
    if first == 0 {
        return Err(MkvError::InvalidVintLength { offset: 0 });
    }
    let width = first.leading_zeros() as usize + 1;
    if width > MAX_SIZE_LENGTH || data.len() < width {
        return Err(MkvError::InvalidVintLength { offset: 0 });
    }
    let mut value = (first & ((0xFFu16 >> width) as u8)) as u64;
    for &byte in &data[1..width] {
        value = (value << 8) | byte as u64;
    }
    Ok((value, width))
}

/// Read an element ID from a source.
///
/// Element IDs keep the VINT marker bits as part of the ID and are at most
/// four bytes long.
pub fn read_element_id<S: EbmlSource + ?Sized>(src: &mut S) -> Result<(u32, usize)> {
    let offset = src.position();
    let mut first = [0u8; 1];
    src.read_exact(&mut first)
        .map_err(|e| map_eof(e, offset))?;

    if first[0] == 0 {
        return Err(MkvError::InvalidVintLength { offset });
    }
    let width = first[0].leading_zeros() as usize + 1;
    if width > MAX_ID_LENGTH {
        return Err(MkvError::InvalidVintLength { offset });
    }

    let mut value = first[0] as u32;
    if width > 1 {
        let mut rest = [0u8; 3];
        src.read_exact(&mut rest[..width - 1])
            .map_err(|e| map_eof(e, offset))?;
        for &byte in &rest[..width - 1] {
            value = (value << 8) | byte as u32;
        }
    }
    Ok((value, width))
}

/// Read an element data size from a source.
///
/// Returns `None` when the size is unknown (all payload bits set).
pub fn read_element_size<S: EbmlSource + ?Sized>(src: &mut S) -> Result<(Option<u64>, usize)> {
    let offset = src.position();
    let mut first = [0u8; 1];
    src.read_exact(&mut first)
        .map_err(|e| map_eof(e, offset))?;

    if first[0] == 0 {
        return Err(MkvError::InvalidVintLength { offset });
    }
    let width = first[0].leading_zeros() as usize + 1;
    if width > MAX_SIZE_LENGTH {
        return Err(MkvError::InvalidVintLength { offset });
    }

    let mut value = (first[0] & ((0xFFu16 >> width) as u8)) as u64;
    if width > 1 {
        let mut rest = [0u8; 7];
        src.read_exact(&mut rest[..width - 1])
            .map_err(|e| map_eof(e, offset))?;
        for &byte in &rest[..width - 1] {
            value = (value << 8) | byte as u64;
        }
    }

    // All payload bits set marks an unknown size.
    let unknown = (1u64 << (7 * width)) - 1;
    if value == unknown {
        Ok((None, width))
    } else {
        Ok((Some(value), width))
    }
}

/// Smallest VINT width able to carry `value` as a data size.
pub fn vint_length(value: u64) -> usize {
    let mut width = 1;
    // The all-ones payload is reserved for the unknown size.
    while width < 8 && value >= (1u64 << (7 * width)) - 1 {
        width += 1;
    }
    width
}

/// Encode a data size as a VINT, returning the bytes and the width.
///
/// Values of `2^56 - 1` and above are not representable.
pub fn encode_vint(value: u64) -> Option<([u8; 8], usize)> {
    if value >= (1u64 << 56) - 1 {
        return None;
    }
    let width = vint_length(value);
    let mut bytes = [0u8; 8];
    let mut v = value;
    for i in (0..width).rev() {
        bytes[i] = (v & 0xFF) as u8;
        v >>= 8;
    }
    bytes[0] |= 0x80 >> (width - 1);
    Some((bytes, width))
}

fn map_eof(e: io::Error, offset: u64) -> MkvError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        MkvError::UnexpectedEof { offset }
    } else {
        MkvError::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Element headers
// ---------------------------------------------------------------------------

/// An EBML element header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// The element ID (marker bits included).
    pub id: u32,
    /// The element data size (`None` for unknown size).
    pub size: Option<u64>,
    /// Total header length in bytes.
    pub header_size: usize,
}

impl ElementHeader {
    /// Read the next element header.
    ///
    /// Returns `Ok(None)` on a clean end of stream before the first header
    /// byte.
    pub fn read<S: EbmlSource + ?Sized>(src: &mut S) -> Result<Option<Self>> {
        let offset = src.position();
        let (id, id_len) = match read_element_id(src) {
            Ok(v) => v,
            Err(MkvError::UnexpectedEof { offset: at }) if at == offset => return Ok(None),
            Err(e) => return Err(e),
        };
        let (size, size_len) = read_element_size(src)?;
        Ok(Some(ElementHeader {
            id,
            size,
            header_size: id_len + size_len,
        }))
    }

    /// Schema entry for this element, or the unknown sentinel.
    pub fn schema(&self) -> SchemaEntry {
        elements::schema(self.id).unwrap_or(elements::UNKNOWN)
    }
}

// ---------------------------------------------------------------------------
// Leaf value decoding
// ---------------------------------------------------------------------------

/// Decode a big-endian unsigned integer of 0..=8 bytes.
pub fn parse_unsigned(data: &[u8]) -> u64 {
    let mut value = 0u64;
    for &byte in data {
        value = (value << 8) | byte as u64;
    }
    value
}

/// Decode a big-endian signed integer of 0..=8 bytes, sign-extended.
pub fn parse_signed(data: &[u8]) -> i64 {
    if data.is_empty() {
        return 0;
    }
    let mut value = if data[0] & 0x80 != 0 { -1i64 } else { 0i64 };
    for &byte in data {
        value = (value << 8) | byte as i64;
    }
    value
}

/// Decode an IEEE 754 float of 0, 4 or 8 bytes.
pub fn parse_float(data: &[u8]) -> f64 {
    match data.len() {
        0 => 0.0,
        4 => f32::from_be_bytes([data[0], data[1], data[2], data[3]]) as f64,
        8 => f64::from_be_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]),
        _ => f64::NAN,
    }
}

/// Decode a string, trimming at the first NUL byte.
pub fn parse_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

/// Decode a date (signed nanoseconds since 2001-01-01T00:00:00 UTC).
pub fn parse_date(data: &[u8]) -> i64 {
    parse_signed(data)
}

/// Read `size` raw bytes from a source.
pub fn decode_bytes<S: EbmlSource + ?Sized>(src: &mut S, size: u64) -> Result<Vec<u8>> {
    let offset = src.position();
    let mut data = vec![0u8; size as usize];
    src.read_exact(&mut data).map_err(|e| map_eof(e, offset))?;
    Ok(data)
}

/// Read and decode an unsigned integer element payload.
pub fn decode_uint<S: EbmlSource + ?Sized>(src: &mut S, size: u64) -> Result<u64> {
    Ok(parse_unsigned(&decode_bytes(src, size)?))
}

/// Read and decode a signed integer element payload.
pub fn decode_int<S: EbmlSource + ?Sized>(src: &mut S, size: u64) -> Result<i64> {
    Ok(parse_signed(&decode_bytes(src, size)?))
}

/// Read and decode a float element payload.
pub fn decode_float<S: EbmlSource + ?Sized>(src: &mut S, size: u64) -> Result<f64> {
    Ok(parse_float(&decode_bytes(src, size)?))
}

/// Read and decode a string element payload.
pub fn decode_string<S: EbmlSource + ?Sized>(src: &mut S, size: u64) -> Result<String> {
    Ok(parse_string(&decode_bytes(src, size)?))
}

// ---------------------------------------------------------------------------
// IEEE CRC-32 (for EBML CRC-32 elements)
// ---------------------------------------------------------------------------

static CRC32_IEEE_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Reflected IEEE CRC-32, as stored by EBML `CRC-32` elements.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC32_IEEE_TABLE[idx] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// Visitor / tree walking
// ---------------------------------------------------------------------------

/// A decoded leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unsigned integer.
    Uint(u64),
    /// Signed integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// ASCII or UTF-8 string.
    Str(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Nanoseconds since 2001-01-01T00:00:00 UTC.
    Date(i64),
}

/// Callbacks fired by [`walk`].
///
/// `found` runs for every element before any descent, `decoded` after a leaf
/// payload has been read, `closed` when a master element ends. All offsets
/// are absolute.
pub trait Visitor {
    /// An element header was read at `offset`.
    fn found(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64) {
        let _ = (el, schema, offset);
    }

    /// A leaf element's payload was decoded.
    fn decoded(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64, value: &Value) {
        let _ = (el, schema, offset, value);
    }

    /// A master element ended (its last child was consumed).
    fn closed(&mut self, el: &ElementHeader, schema: SchemaEntry, offset: u64) {
        let _ = (el, schema, offset);
    }
}

/// Walk a whole EBML document, reporting every element to `visitor`.
///
/// Master elements are descended according to the schema table; unknown
/// elements are reported and skipped. Unknown-size masters terminate on the
/// first element that cannot occur inside them.
pub fn walk<S: EbmlSource, V: Visitor>(src: &mut S, visitor: &mut V) -> Result<()> {
    let mut pending = None;
    loop {
        let header = match take_header(src, &mut pending)? {
            Some(h) => h,
            None => return Ok(()),
        };
        pending = walk_element(src, visitor, header.0, header.1, 0)?;
    }
}

type Pending = Option<(ElementHeader, u64)>;

fn take_header<S: EbmlSource>(src: &mut S, pending: &mut Pending) -> Result<Pending> {
    if let Some(h) = pending.take() {
        return Ok(Some(h));
    }
    let offset = src.position();
    Ok(ElementHeader::read(src)?.map(|el| (el, offset)))
}

/// Process one element; returns a pushed-back header when an unknown-size
/// master was terminated by an element belonging to an outer scope.
fn walk_element<S: EbmlSource, V: Visitor>(
    src: &mut S,
    visitor: &mut V,
    el: ElementHeader,
    offset: u64,
    depth: u32,
) -> Result<Pending> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(MkvError::RecursionLimit { depth });
    }
    let schema = el.schema();
    visitor.found(&el, schema, offset);

    if schema.kind == ElementKind::Master {
        let mut pending: Pending = None;
        let end = el.size.map(|s| src.position() + s);
        loop {
            match end {
                Some(end) if src.position() >= end => break,
                _ => {}
            }
            let (mut child, child_offset) = match take_header(src, &mut pending)? {
                Some(h) => h,
                None => break, // EOF terminates an unknown-size master
            };
            if end.is_none() && elements::ends_unknown_size(el.id, child.id) {
                visitor.closed(&el, schema, src.position());
                return Ok(Some((child, child_offset)));
            }
            // Clamp children that overflow a known-size parent.
            if let (Some(end), Some(size)) = (end, child.size) {
                let remaining = end.saturating_sub(src.position());
                if size > remaining {
                    child.size = Some(remaining);
                }
            }
            pending = walk_element(src, visitor, child, child_offset, depth + 1)?;
        }
        visitor.closed(&el, schema, src.position());
        return Ok(None);
    }

    // Leaf: a payload of unknown size is unreadable.
    let size = el.size.ok_or_else(|| {
        MkvError::InvalidHeader(format!("{} has unknown size", schema.name))
    })?;
    let data = decode_bytes(src, size)?;
    let value = match schema.kind {
        ElementKind::UnsignedInt => Value::Uint(parse_unsigned(&data)),
        ElementKind::SignedInt => Value::Int(parse_signed(&data)),
        ElementKind::Float => Value::Float(parse_float(&data)),
        ElementKind::String | ElementKind::Utf8 => Value::Str(parse_string(&data)),
        ElementKind::Date => Value::Date(parse_date(&data)),
        ElementKind::Binary | ElementKind::Master => Value::Binary(data),
    };
    visitor.decoded(&el, schema, offset, &value);
    Ok(None)
}
