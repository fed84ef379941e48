//! Chunked Seekable Assembler: wraps an incoming byte stream of declared
//! size `N` as a single `Read + Seek` object, keeping a bounded prefix in
//! memory and spilling the remainder to a temp file.
//!
//! Grounded on `examples/original_source/multi_readseeker.go`: the Go
//! `multiReadSeeker` concatenates an ordered list of `io.ReadSeeker`s,
//! each with its own `startOffset`, and `NewCombinedBuf` is the
//! literal-ingestion entrypoint. The seek algebra below preserves that
//! source's approach exactly: segment lengths are discovered via each
//! segment's own end-seek (minus its start offset), and `Seek(SET)` into
//! segment `i` rewinds every later segment back to its `start_offset` so
//! sequential reads resume at the right place.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::config::AssemblerConfig;
use crate::error::AssemblerError;

/// One segment of the concatenation: either the in-memory prefix or the
/// temp-file spill. `start_offset` lets a segment hide a header prefix
/// from the logical stream (unused today but kept to mirror the source's
/// generality, per the "do not rely on source-end-of-file as a proxy for
/// source length" design note).
enum Segment {
    Mem(Cursor<Vec<u8>>),
    File(File),
}

impl Segment {
    fn len(&mut self, start_offset: u64) -> io::Result<u64> {
        let end = match self {
            Segment::Mem(c) => c.seek(SeekFrom::End(0))?,
            Segment::File(f) => f.seek(SeekFrom::End(0))?,
        };
        Ok(end.saturating_sub(start_offset))
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        match self {
            Segment::Mem(c) => {
                c.seek(SeekFrom::Start(offset))?;
            }
            Segment::File(f) => {
                f.seek(SeekFrom::Start(offset))?;
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Segment::Mem(c) => c.read(buf),
            Segment::File(f) => f.read(buf),
        }
    }
}

/// A seekable concatenation of an in-memory prefix and an optional
/// temp-file spill, totaling exactly `size` bytes.
pub struct Assembler {
    segments: Vec<(Segment, u64)>, // (segment, start_offset)
    size: u64,
    pos: u64,
    temp_path: Option<tempfile::TempPath>,
}

impl Assembler {
    /// Reads exactly `input_size` bytes from `reader`, per §4.1: fails
    /// immediately if `input_size` exceeds `cfg.max_bytes`; buffers up to
    /// `min(input_size, cfg.mem_bytes)` in memory; spills the rest to a
    /// uniquely-named temp file. Any short read is an unexpected-EOF
    /// error, and the temp file (if created) is removed before returning.
    pub fn from_reader<R: Read>(
        mut reader: R,
        input_size: u64,
        cfg: &AssemblerConfig,
    ) -> Result<Self, AssemblerError> {
        if input_size > cfg.max_bytes {
            return Err(AssemblerError::TooBig);
        }

        let mem_target = std::cmp::min(input_size, cfg.mem_bytes);
        let mut mem_buf = vec![0u8; mem_target as usize];
        let mut total_read: u64 = 0;
        read_exact_up_to(&mut reader, &mut mem_buf, &mut total_read)?;

        let mut segments = Vec::new();
        let mut temp_path = None;

        segments.push((Segment::Mem(Cursor::new(mem_buf)), 0u64));

        let remaining = input_size - mem_target;
        if remaining > 0 {
            let named = tempfile::Builder::new()
                .prefix(&cfg.temp_file_prefix)
                .tempfile()
                .map_err(AssemblerError::Io)?;
            let (mut file, path) = named.into_parts();

            let copy_result = copy_exact(&mut reader, &mut file, remaining, &mut total_read);
            if let Err(e) = copy_result {
                // Cleanup on the error path: the temp file must not leak.
                drop(file);
                let _ = path.close();
                return Err(e);
            }
            file.seek(SeekFrom::Start(0)).map_err(AssemblerError::Io)?;
            segments.push((Segment::File(file), 0u64));
            temp_path = Some(path);
        }

        if total_read != input_size {
            if let Some(path) = temp_path {
                let _ = path.close();
            }
            return Err(AssemblerError::UnexpectedEof);
        }

        Ok(Self {
            segments,
            size: input_size,
            pos: 0,
            temp_path,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Alias of `size()` — the source exposes both `Size()` and `Len()`.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes the temp file, if one was created. Idempotent.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(path) = self.temp_path.take() {
            path.close()?;
        }
        Ok(())
    }
}

impl Drop for Assembler {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl Read for Assembler {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.size || buf.is_empty() {
            return Ok(0);
        }
        // Find the segment containing `self.pos` and read from there.
        let mut offset_before: u64 = 0;
        for (seg, start_offset) in self.segments.iter_mut() {
            let seg_len = seg.len(*start_offset)?;
            if self.pos < offset_before + seg_len {
                let within = self.pos - offset_before;
                seg.seek_to(*start_offset + within)?;
                let max_read = std::cmp::min(buf.len() as u64, seg_len - within) as usize;
                let n = seg.read(&mut buf[..max_read])?;
                self.pos += n as u64;
                return Ok(n);
            }
            offset_before += seg_len;
        }
        Ok(0)
    }
}

impl Seek for Assembler {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos: i64 = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(n) => self.size as i64 + n,
            SeekFrom::Current(n) => self.pos as i64 + n,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to negative position",
            ));
        }
        let new_pos = new_pos as u64;

        // Walk segments to find which one `new_pos` lands in, and rewind
        // every later segment back to its start_offset so subsequent
        // sequential reads find them at zero (per the source's seek
        // algebra).
        let mut offset_before: u64 = 0;
        let mut landed = false;
        let n_segments = self.segments.len();
        for i in 0..n_segments {
            let (seg, start_offset) = &mut self.segments[i];
            let seg_len = seg.len(*start_offset)?;
            if !landed && new_pos <= offset_before + seg_len {
                let within = new_pos - offset_before;
                seg.seek_to(*start_offset + within)?;
                landed = true;
            } else if landed {
                let so = *start_offset;
                seg.seek_to(so)?;
            }
            offset_before += seg_len;
        }

        self.pos = new_pos;
        Ok(self.pos)
    }
}

/// Reads into `buf` until it's full or the underlying reader returns EOF,
/// accumulating the running total byte count into `total_read`.
fn read_exact_up_to<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    total_read: &mut u64,
) -> Result<(), AssemblerError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        *total_read += n as u64;
    }
    Ok(())
}

/// Copies exactly `remaining` bytes from `reader` into `writer`,
/// accumulating into `total_read`. Short reads end the copy early (the
/// caller checks `total_read` against the declared size afterward).
fn copy_exact<R: Read>(
    reader: &mut R,
    writer: &mut File,
    remaining: u64,
    total_read: &mut u64,
) -> Result<(), AssemblerError> {
    use std::io::Write;
    let mut buf = [0u8; 64 * 1024];
    let mut left = remaining;
    while left > 0 {
        let want = std::cmp::min(left, buf.len() as u64) as usize;
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        left -= n as u64;
        *total_read += n as u64;
    }
    Ok(())
}
