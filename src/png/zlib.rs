//! The zlib side of PNG.
//!
//! All `IDAT` payloads of an image form one zlib stream, split at arbitrary
//! points. The decoder feeds the payloads in order to a streaming inflater
//! and pulls out exactly one filtered line at a time, so the full
//! decompressed image never has to exist in memory at once.

use miniz_oxide::{
  inflate::stream::{inflate, InflateState},
  DataFormat, MZError, MZFlush, MZStatus,
};

use super::*;

/// Pulls filtered lines out of a zlib stream spread over many slices.
///
/// The stream is forward-only and can't be restarted.
pub struct ScanlineInflater<'b, I> {
  state: Box<InflateState>,
  pieces: I,
  current: &'b [u8],
  stream_ended: bool,
  total_out: usize,
}
impl<'b, I> Debug for ScanlineInflater<'b, I> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ScanlineInflater")
      .field("current", &self.current.len())
      .field("stream_ended", &self.stream_ended)
      .field("total_out", &self.total_out)
      .finish()
  }
}
impl<'b, I> ScanlineInflater<'b, I>
where
  I: Iterator<Item = &'b [u8]>,
{
  /// Starts inflating the concatenation of all the pieces.
  #[inline]
  pub fn new<II>(pieces: II) -> Self
  where
    II: IntoIterator<IntoIter = I>,
  {
    Self {
      state: InflateState::new_boxed(DataFormat::Zlib),
      pieces: pieces.into_iter(),
      current: &[],
      stream_ended: false,
      total_out: 0,
    }
  }

  /// Total decompressed bytes handed out so far.
  #[inline]
  #[must_use]
  pub const fn total_out(&self) -> usize {
    self.total_out
  }

  /// Moves to the next non-empty piece, returns `false` if there isn't one.
  fn advance_piece(&mut self) -> bool {
    while self.current.is_empty() {
      match self.pieces.next() {
        Some(piece) => self.current = piece,
        None => return false,
      }
    }
    true
  }

  /// Runs one step of the inflater into `out`, returning bytes written.
  fn step(&mut self, out: &mut [u8]) -> Result<usize, DecompressionError> {
    let have_input = self.advance_piece();
    let res = inflate(&mut self.state, self.current, out, MZFlush::None);
    self.current = &self.current[res.bytes_consumed..];
    match res.status {
      Ok(MZStatus::StreamEnd) => self.stream_ended = true,
      Ok(MZStatus::Ok) => {
        if res.bytes_consumed == 0 && res.bytes_written == 0 && !have_input {
          return Err(DecompressionError::Truncated);
        }
      }
      // PNG never uses a preset dictionary.
      Ok(MZStatus::NeedDict) => return Err(DecompressionError::CorruptData),
      Err(MZError::Data) => return Err(DecompressionError::CorruptData),
      Err(MZError::Buf) => {
        if have_input {
          return Err(DecompressionError::Internal);
        } else {
          return Err(DecompressionError::Truncated);
        }
      }
      Err(_) => return Err(DecompressionError::Internal),
    }
    self.total_out += res.bytes_written;
    Ok(res.bytes_written)
  }

  /// Fills all of `out` with the next decompressed bytes.
  ///
  /// ## Failure
  /// * [`DecompressionError::NotEnoughData`] if the stream ends first.
  /// * [`DecompressionError::Truncated`] if the input runs out first.
  /// * [`DecompressionError::CorruptData`] for bad deflate data.
  pub fn read_exact(&mut self, out: &mut [u8]) -> Result<(), DecompressionError> {
    let mut filled = 0;
    while filled < out.len() {
      if self.stream_ended {
        return Err(DecompressionError::NotEnoughData);
      }
      filled += self.step(&mut out[filled..])?;
    }
    Ok(())
  }

  /// Runs the stream to its end, which verifies the Adler-32 trailer.
  ///
  /// Returns how many extra decompressed bytes there were past what was
  /// read, and how many compressed bytes came after the end of the stream.
  /// Neither is an error, PNG decoders traditionally ignore both.
  pub fn finish(mut self) -> Result<(usize, usize), DecompressionError> {
    let mut scratch = [0_u8; 256];
    let mut extra_out = 0_usize;
    while !self.stream_ended {
      extra_out = extra_out.saturating_add(self.step(&mut scratch)?);
    }
    let mut extra_in = self.current.len();
    for piece in self.pieces {
      extra_in = extra_in.saturating_add(piece.len());
    }
    Ok((extra_out, extra_in))
  }
}

/// Compresses all of the filtered image data into one zlib stream.
///
/// Levels above 9 are treated as 9.
#[inline]
#[must_use]
pub fn compress_image_data(filtered: &[u8], level: u8) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(filtered, level.min(9))
}

/// Writes a zlib stream as a series of `IDAT` chunks of at most `max_len`
/// bytes each.
///
/// An empty stream still gets one (empty) `IDAT`, since every PNG needs at
/// least one.
pub fn write_idat_chunks(writer: &mut ChunkWriter, zlib: &[u8], max_len: usize) -> PngResult<()> {
  let max_len = max_len.clamp(1, PNG_MAX_LENGTH as usize);
  if zlib.is_empty() {
    return writer.write_chunk(ChunkType::IDAT, &[]);
  }
  let mut count = 0_usize;
  for piece in zlib.chunks(max_len) {
    writer.write_chunk(ChunkType::IDAT, piece)?;
    count += 1;
  }
  trace!("wrote {count} IDAT chunks ({} zlib bytes)", zlib.len());
  Ok(())
}

/// Inflates a small self-contained zlib stream, like a compressed text
/// chunk's payload.
pub fn inflate_small(data: &[u8], limit: usize) -> Result<Vec<u8>, DecompressionError> {
  use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
  decompress_to_vec_zlib_with_limit(data, limit).map_err(|e| match e.status {
    TINFLStatus::NeedsMoreInput | TINFLStatus::FailedCannotMakeProgress => {
      DecompressionError::Truncated
    }
    TINFLStatus::HasMoreOutput => DecompressionError::NotEnoughData,
    TINFLStatus::Failed | TINFLStatus::Adler32Mismatch => DecompressionError::CorruptData,
    _ => DecompressionError::Internal,
  })
}
