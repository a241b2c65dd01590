use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Chunk lengths (and image dimensions) are limited to `2^31 - 1`.
pub const PNG_MAX_LENGTH: u32 = (1 << 31) - 1;

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// The four byte type tag of a chunk.
///
/// The case of each letter is a property bit:
/// * 1st letter: uppercase is critical, lowercase is ancillary.
/// * 2nd letter: uppercase is public, lowercase is private.
/// * 3rd letter: must be uppercase (reserved).
/// * 4th letter: uppercase is unsafe to copy, lowercase is safe to copy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const gAMA: Self = Self(*b"gAMA");
  pub const cHRM: Self = Self(*b"cHRM");
  pub const sRGB: Self = Self(*b"sRGB");
  pub const iCCP: Self = Self(*b"iCCP");
  pub const sBIT: Self = Self(*b"sBIT");
  pub const tEXt: Self = Self(*b"tEXt");
  pub const zTXt: Self = Self(*b"zTXt");
  pub const iTXt: Self = Self(*b"iTXt");
  pub const bKGD: Self = Self(*b"bKGD");
  pub const hIST: Self = Self(*b"hIST");
  pub const pHYs: Self = Self(*b"pHYs");
  pub const sPLT: Self = Self(*b"sPLT");
  pub const tIME: Self = Self(*b"tIME");
}
impl ChunkType {
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0x20) == 0
  }
  #[inline]
  #[must_use]
  pub const fn is_ancillary(self) -> bool {
    !self.is_critical()
  }
  #[inline]
  #[must_use]
  pub const fn is_public(self) -> bool {
    (self.0[1] & 0x20) == 0
  }
  #[inline]
  #[must_use]
  pub const fn is_reserved_bit_valid(self) -> bool {
    (self.0[2] & 0x20) == 0
  }
  #[inline]
  #[must_use]
  pub const fn is_safe_to_copy(self) -> bool {
    (self.0[3] & 0x20) != 0
  }
  /// All four bytes must be ASCII letters.
  #[inline]
  #[must_use]
  pub const fn is_valid(self) -> bool {
    self.0[0].is_ascii_alphabetic()
      && self.0[1].is_ascii_alphabetic()
      && self.0[2].is_ascii_alphabetic()
      && self.0[3].is_ascii_alphabetic()
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
///
/// The data is borrowed from the input, the CRC is whatever the chunk declared.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChunk<'b> {
  pub(crate) ty: ChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) declared_crc: u32,
}
impl Debug for RawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawChunk")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> RawChunk<'b> {
  #[inline]
  #[must_use]
  pub const fn ty(&self) -> ChunkType {
    self.ty
  }
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  #[inline]
  #[must_use]
  pub fn compute_crc(&self) -> u32 {
    chunk_crc(self.ty.0, self.data)
  }
  /// Checks the declared CRC against the chunk's actual contents.
  #[inline]
  pub fn verify_crc(&self) -> Result<(), IntegrityError> {
    let actual_crc = self.compute_crc();
    if actual_crc == self.declared_crc {
      Ok(())
    } else {
      Err(IntegrityError { chunk: self.ty, declared_crc: self.declared_crc, actual_crc })
    }
  }
}

#[inline]
fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

/// A forward-only cursor over the chunks of a PNG datastream.
///
/// The signature is checked once, when the reader is made. After that each
/// call to [`next_chunk`](Self::next_chunk) hands out the next chunk. CRCs are
/// *not* checked by the reader, the caller decides what a mismatch means with
/// [`RawChunk::verify_crc`].
///
/// After any error the reader is exhausted.
#[derive(Debug, Clone)]
pub struct ChunkReader<'b> {
  rest: &'b [u8],
  offset: usize,
}
impl<'b> ChunkReader<'b> {
  /// Pass the full PNG bytes, including the signature.
  #[inline]
  pub fn new(bytes: &'b [u8]) -> Result<Self, FormatError> {
    if is_png_signature_correct(bytes) {
      Ok(Self { rest: &bytes[PNG_SIGNATURE.len()..], offset: PNG_SIGNATURE.len() })
    } else {
      Err(FormatError::BadSignature)
    }
  }

  /// Byte offset of the next chunk within the original input.
  #[inline]
  #[must_use]
  pub const fn offset(&self) -> usize {
    self.offset
  }

  /// Bytes not yet consumed.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> &'b [u8] {
    self.rest
  }

  /// Reads the next chunk.
  ///
  /// * `Ok(None)` when the input is fully consumed.
  /// * Fails when there's a partial chunk or an oversized length.
  ///
  /// The chunk type isn't validated here: a damaged type should be reported
  /// by the CRC check first.
  pub fn next_chunk(&mut self) -> Result<Option<RawChunk<'b>>, FormatError> {
    if self.rest.is_empty() {
      return Ok(None);
    }
    match self.parse_next() {
      Ok(chunk) => Ok(Some(chunk)),
      Err(e) => {
        self.rest = &[];
        Err(e)
      }
    }
  }

  fn parse_next(&mut self) -> Result<RawChunk<'b>, FormatError> {
    let (len_bytes, rest) =
      try_split_off_byte_array::<4>(self.rest).ok_or(FormatError::TruncatedChunk)?;
    let len = u32::from_be_bytes(len_bytes);
    if len > PNG_MAX_LENGTH {
      return Err(FormatError::ChunkTooLong);
    }
    let (ty_bytes, rest) =
      try_split_off_byte_array::<4>(rest).ok_or(FormatError::TruncatedChunk)?;
    let ty = ChunkType(ty_bytes);
    let len = len as usize;
    if rest.len() < len {
      return Err(FormatError::TruncatedChunk);
    }
    let (data, rest) = rest.split_at(len);
    let (crc_bytes, rest) =
      try_split_off_byte_array::<4>(rest).ok_or(FormatError::TruncatedChunk)?;
    self.offset += 12 + len;
    self.rest = rest;
    Ok(RawChunk { ty, data, declared_crc: u32::from_be_bytes(crc_bytes) })
  }
}
impl<'b> Iterator for ChunkReader<'b> {
  type Item = Result<RawChunk<'b>, FormatError>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.next_chunk().transpose()
  }
}

/// A permissive iterator that produces successive raw chunks from PNG bytes.
///
/// This never fails and never panics. The first 8 bytes are skipped whether or
/// not they're the PNG signature, and iteration just stops at the first
/// incomplete chunk. It's meant for inspection tools, use [`ChunkReader`] when
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawChunkIter<'b>(&'b [u8]);
impl<'b> RawChunkIter<'b> {
  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  #[inline]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }
}
impl<'b> Iterator for RawChunkIter<'b> {
  type Item = RawChunk<'b>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let (len_bytes, rest) = try_split_off_byte_array::<4>(self.0)?;
    let (ty_bytes, rest) = try_split_off_byte_array::<4>(rest)?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    if rest.len() < len {
      self.0 = &[];
      return None;
    }
    let (data, rest) = rest.split_at(len);
    let (crc_bytes, rest) = match try_split_off_byte_array::<4>(rest) {
      Some(x) => x,
      None => {
        self.0 = &[];
        return None;
      }
    };
    self.0 = rest;
    Some(RawChunk { ty: ChunkType(ty_bytes), data, declared_crc: u32::from_be_bytes(crc_bytes) })
  }
}

/// Writes chunks into a byte buffer.
///
/// Each chunk is written as big-endian length, type, data, then the CRC of the
/// type and data.
#[derive(Debug, Clone, Default)]
pub struct ChunkWriter {
  out: Vec<u8>,
}
impl ChunkWriter {
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { out: Vec::new() }
  }

  /// Makes a writer that has already written the PNG signature.
  #[inline]
  pub fn with_signature() -> PngResult<Self> {
    let mut w = Self::new();
    w.write_signature()?;
    Ok(w)
  }

  #[inline]
  pub fn write_signature(&mut self) -> PngResult<()> {
    self.out.try_reserve(PNG_SIGNATURE.len())?;
    self.out.extend_from_slice(&PNG_SIGNATURE);
    Ok(())
  }

  pub fn write_chunk(&mut self, ty: ChunkType, data: &[u8]) -> PngResult<()> {
    if !ty.is_valid() {
      return Err(FormatError::BadChunkType.into());
    }
    let len = u32::try_from(data.len()).map_err(|_| FormatError::ChunkTooLong)?;
    if len > PNG_MAX_LENGTH {
      return Err(FormatError::ChunkTooLong.into());
    }
    self.out.try_reserve(12 + data.len())?;
    self.out.extend_from_slice(&len.to_be_bytes());
    self.out.extend_from_slice(&ty.0);
    self.out.extend_from_slice(data);
    self.out.extend_from_slice(&chunk_crc(ty.0, data).to_be_bytes());
    trace!("wrote {:?} chunk, {} bytes", ty, data.len());
    Ok(())
  }

  #[inline]
  pub fn write_iend(&mut self) -> PngResult<()> {
    self.write_chunk(ChunkType::IEND, &[])
  }

  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.out
  }

  #[inline]
  #[must_use]
  pub fn into_bytes(self) -> Vec<u8> {
    self.out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn one_chunk_png(ty: ChunkType, data: &[u8]) -> Vec<u8> {
    let mut w = ChunkWriter::with_signature().unwrap();
    w.write_chunk(ty, data).unwrap();
    w.into_bytes()
  }

  #[test]
  fn test_chunk_type_properties() {
    assert!(ChunkType::IHDR.is_critical());
    assert!(ChunkType::IDAT.is_public());
    assert!(ChunkType::gAMA.is_ancillary());
    assert!(!ChunkType::IHDR.is_safe_to_copy());
    assert!(ChunkType::tEXt.is_safe_to_copy());
    assert!(ChunkType(*b"prVt").is_ancillary());
    assert!(!ChunkType(*b"prVt").is_public());
    assert!(!ChunkType(*b"abcd").is_reserved_bit_valid());
    assert!(!ChunkType(*b"AB1D").is_valid());
    assert_eq!(alloc::format!("{:?}", ChunkType::IDAT), "IDAT");
  }

  #[test]
  fn test_reader_rejects_bad_signature() {
    assert_eq!(ChunkReader::new(b"not a png at all").unwrap_err(), FormatError::BadSignature);
    assert_eq!(ChunkReader::new(&PNG_SIGNATURE[..7]).unwrap_err(), FormatError::BadSignature);
  }

  #[test]
  fn test_writer_then_reader() {
    let mut w = ChunkWriter::with_signature().unwrap();
    w.write_chunk(ChunkType::tEXt, b"Title\0hello").unwrap();
    w.write_iend().unwrap();
    let bytes = w.into_bytes();
    // IEND is always the same 12 bytes.
    assert_eq!(&bytes[bytes.len() - 12..], b"\0\0\0\0IEND\xAE\x42\x60\x82");

    let mut r = ChunkReader::new(&bytes).unwrap();
    let text = r.next_chunk().unwrap().unwrap();
    assert_eq!(text.ty(), ChunkType::tEXt);
    assert_eq!(text.data(), b"Title\0hello");
    assert!(text.verify_crc().is_ok());
    let iend = r.next_chunk().unwrap().unwrap();
    assert_eq!(iend.ty(), ChunkType::IEND);
    assert_eq!(r.offset(), bytes.len());
    assert_eq!(r.next_chunk(), Ok(None));
  }

  #[test]
  fn test_reader_length_past_end_is_format_error() {
    let mut bytes = one_chunk_png(ChunkType::IDAT, &[1, 2, 3, 4]);
    // claim a longer data section than there is
    bytes[8..12].copy_from_slice(&100_u32.to_be_bytes());
    let mut r = ChunkReader::new(&bytes).unwrap();
    assert_eq!(r.next_chunk(), Err(FormatError::TruncatedChunk));
    // the reader is exhausted after an error
    assert_eq!(r.next_chunk(), Ok(None));
  }

  #[test]
  fn test_reader_missing_crc_is_format_error() {
    let bytes = one_chunk_png(ChunkType::IDAT, &[1, 2, 3, 4]);
    let mut r = ChunkReader::new(&bytes[..bytes.len() - 2]).unwrap();
    assert_eq!(r.next_chunk(), Err(FormatError::TruncatedChunk));
  }

  #[test]
  fn test_reader_oversized_length() {
    let mut bytes = one_chunk_png(ChunkType::IDAT, &[]);
    bytes[8..12].copy_from_slice(&0x8000_0000_u32.to_be_bytes());
    let mut r = ChunkReader::new(&bytes).unwrap();
    assert_eq!(r.next_chunk(), Err(FormatError::ChunkTooLong));
  }

  #[test]
  fn test_crc_flip_detected() {
    let bytes = one_chunk_png(ChunkType::tEXt, b"Key\0value");
    // every bit of the type and data is covered by the CRC
    for i in 12..(bytes.len() - 4) {
      for bit in 0..8 {
        let mut flipped = bytes.clone();
        flipped[i] ^= 1 << bit;
        let mut r = ChunkReader::new(&flipped).unwrap();
        let chunk = r.next_chunk().unwrap().unwrap();
        assert!(chunk.verify_crc().is_err(), "byte {i} bit {bit}");
      }
    }
  }

  #[test]
  fn test_raw_chunk_iter_never_panics_on_garbage() {
    let garbage: Vec<u8> = (0..=255_u8).cycle().take(2000).collect();
    for start in 0..64 {
      for _ in RawChunkIter::new(&garbage[start..]) {}
    }
    assert_eq!(RawChunkIter::new(&[1, 2, 3]).count(), 0);
  }
}
