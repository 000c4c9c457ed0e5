//! Random-access RIFF chunk writer
//!
//! RIFF stores every chunk as an 8-byte header (FourCC + little-endian u32
//! size) followed by the data and a zero pad byte when the size is odd. The
//! size of a LIST is only known once its children are written, so this
//! writer records the offset of every open size field and patches it by
//! seeking back when the list is closed. Lists close in LIFO order; the root
//! `RIFF` chunk is patched by [`RiffWriter::finish`].

use crate::chunks::{ids, FourCC};
use crate::error::{AviError, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Seek, SeekFrom, Write};

/// RIFF writer over a seekable sink.
pub struct RiffWriter<W: Write + Seek> {
    sink: W,
    /// Offsets of the size fields of the root chunk and every open list.
    open_sizes: Vec<u64>,
    /// Size-field offset of an open (incrementally written) chunk.
    open_chunk: Option<u64>,
}

impl<W: Write + Seek> RiffWriter<W> {
    /// Start a RIFF file of the given type (e.g. `AVI `).
    pub fn new(mut sink: W, file_type: FourCC) -> Result<Self> {
        sink.write_all(ids::RIFF.as_bytes())?;
        let size_at = sink.stream_position()?;
        sink.write_u32::<LittleEndian>(0)?;
        sink.write_all(file_type.as_bytes())?;
        Ok(RiffWriter {
            sink,
            open_sizes: vec![size_at],
            open_chunk: None,
        })
    }

    /// Current absolute position in the sink.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.sink.stream_position()?)
    }

    /// Open a nested LIST chunk.
    pub fn begin_list(&mut self, list_type: FourCC) -> Result<()> {
        self.require_closed_chunk()?;
        self.sink.write_all(ids::LIST.as_bytes())?;
        let size_at = self.sink.stream_position()?;
        self.sink.write_u32::<LittleEndian>(0)?;
        self.sink.write_all(list_type.as_bytes())?;
        self.open_sizes.push(size_at);
        Ok(())
    }

    /// Close the innermost open LIST and patch its size.
    pub fn end_list(&mut self) -> Result<()> {
        self.require_closed_chunk()?;
        if self.open_sizes.len() <= 1 {
            return Err(AviError::UnbalancedList { open: 0 });
        }
        let size_at = self.open_sizes.pop().expect("checked above");
        self.patch_size(size_at)
    }

    /// Write a complete chunk.
    pub fn chunk(&mut self, id: FourCC, data: &[u8]) -> Result<()> {
        self.begin_chunk(id)?;
        self.sink.write_all(data)?;
        self.end_chunk()
    }

    /// Open a chunk whose data is written incrementally through
    /// [`RiffWriter::write_data`].
    pub fn begin_chunk(&mut self, id: FourCC) -> Result<()> {
        self.require_closed_chunk()?;
        self.sink.write_all(id.as_bytes())?;
        let size_at = self.sink.stream_position()?;
        self.sink.write_u32::<LittleEndian>(0)?;
        self.open_chunk = Some(size_at);
        Ok(())
    }

    /// Append data to the currently open chunk.
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        if self.open_chunk.is_none() {
            return Err(AviError::NoOpenChunk);
        }
        self.sink.write_all(data)?;
        Ok(())
    }

    /// Close the open chunk, patch its size and pad to even length.
    pub fn end_chunk(&mut self) -> Result<()> {
        let size_at = self.open_chunk.take().ok_or(AviError::NoOpenChunk)?;
        self.patch_size(size_at)
    }

    /// Overwrite a u32 at an absolute offset, restoring the cursor.
    pub fn patch_u32(&mut self, offset: u64, value: u32) -> Result<()> {
        let pos = self.sink.stream_position()?;
        self.sink.seek(SeekFrom::Start(offset))?;
        self.sink.write_u32::<LittleEndian>(value)?;
        self.sink.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Close the root chunk and return the sink.
    ///
    /// All lists must have been closed; the total emitted length is
    /// 8 + root size (+ 1 pad byte if the root size is odd).
    pub fn finish(mut self) -> Result<W> {
        self.require_closed_chunk()?;
        if self.open_sizes.len() != 1 {
            return Err(AviError::UnbalancedList {
                open: self.open_sizes.len() - 1,
            });
        }
        let size_at = self.open_sizes.pop().expect("root size offset");
        self.patch_size(size_at)?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn require_closed_chunk(&self) -> Result<()> {
        if self.open_chunk.is_some() {
            return Err(AviError::ChunkStillOpen);
        }
        Ok(())
    }

    /// Patch the size field at `size_at` with the byte count written since,
    /// padding the content to even length first.
    fn patch_size(&mut self, size_at: u64) -> Result<()> {
        let end = self.sink.stream_position()?;
        let len = end - size_at - 4;
        if len > u32::MAX as u64 {
            return Err(AviError::DataTooLong { len });
        }
        if len & 1 == 1 {
            self.sink.write_all(&[0])?;
        }
        let after_pad = self.sink.stream_position()?;
        self.sink.seek(SeekFrom::Start(size_at))?;
        self.sink.write_u32::<LittleEndian>(len as u32)?;
        self.sink.seek(SeekFrom::Start(after_pad))?;
        Ok(())
    }
}
