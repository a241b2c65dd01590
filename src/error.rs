use core::{
  fmt::{self, Display},
  num::TryFromIntError,
};

use crate::png::ChunkType;

/// An error from the `pngkit` crate.
///
/// Every error is terminal for the operation that produced it. A decode that
/// fails never hands back a partial image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// Malformed container, signature, or header fields.
  Format(FormatError),
  /// A chunk's CRC didn't match its contents.
  Integrity(IntegrityError),
  /// The zlib stream of the image data is corrupt.
  Decompression(DecompressionError),
  /// Chunks appeared in an illegal order, or a mandatory chunk is missing.
  Structural(StructuralError),
  /// The data is legal PNG, but uses something this crate doesn't do.
  Unsupported(UnsupportedFeature),

  /// The allocator couldn't give us enough space.
  Alloc,

  /// The image is larger than the configured decode limits.
  DimensionsTooLarge,

  /// The operation was cancelled through its cancel flag.
  Cancelled,
}

/// The coarse classification of a [`PngError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PngErrorKind {
  Format,
  Integrity,
  Decompression,
  Structural,
  Unsupported,
  /// Allocation failure, size limits, and cancellation.
  Resource,
}

impl PngError {
  #[inline]
  #[must_use]
  pub const fn kind(&self) -> PngErrorKind {
    match self {
      Self::Format(_) => PngErrorKind::Format,
      Self::Integrity(_) => PngErrorKind::Integrity,
      Self::Decompression(_) => PngErrorKind::Decompression,
      Self::Structural(_) => PngErrorKind::Structural,
      Self::Unsupported(_) => PngErrorKind::Unsupported,
      Self::Alloc | Self::DimensionsTooLarge | Self::Cancelled => PngErrorKind::Resource,
    }
  }
}

/// Details for [`PngError::Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
  /// The first 8 bytes aren't the PNG signature.
  BadSignature,
  /// The input ended in the middle of a chunk.
  TruncatedChunk,
  /// A chunk length was larger than `2^31 - 1`.
  ChunkTooLong,
  /// A chunk type had a byte that isn't an ASCII letter.
  BadChunkType,
  /// The IHDR data wasn't exactly 13 bytes.
  BadHeaderLength,
  /// Width or height of the image was 0.
  WidthOrHeightZero,
  /// The width or height was larger than `2^31 - 1`.
  DimensionTooLarge,
  /// The bit depth isn't allowed for the color type.
  IllegalBitDepth { color_type: u8, bit_depth: u8 },
  /// The color type byte isn't 0, 2, 3, 4, or 6.
  IllegalColorType(u8),
  /// The compression method byte isn't 0.
  IllegalCompressionMethod(u8),
  /// The filter method byte isn't 0.
  IllegalFilterMethod(u8),
  /// The interlace method byte isn't 0 or 1.
  IllegalInterlaceMethod(u8),
  /// A scanline's filter type byte was above 4.
  IllegalFilterType(u8),
  /// The palette length wasn't a non-zero multiple of 3, or had too many
  /// entries.
  BadPaletteLength(usize),
  /// A palette index in the image data is past the end of the palette.
  PaletteIndexOutOfRange(u8),
  /// A known ancillary chunk had malformed contents.
  BadAncillaryChunk(ChunkType),
  /// A text keyword was empty or longer than 79 bytes.
  BadTextKeyword,
  /// Raster data didn't have the length its header requires.
  RasterLengthMismatch { expected: usize, actual: usize },
}

/// Details for [`PngError::Integrity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityError {
  pub chunk: ChunkType,
  pub declared_crc: u32,
  pub actual_crc: u32,
}

/// Details for [`PngError::Decompression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressionError {
  /// The deflate data is invalid (bad codes, bad distances, bad header, or an
  /// Adler-32 mismatch).
  CorruptData,
  /// The compressed stream ended before it should have.
  Truncated,
  /// The stream finished before all scanlines were produced.
  NotEnoughData,
  /// The decompressor reported an internal error.
  Internal,
}

/// Details for [`PngError::Structural`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
  /// There were no chunks after the signature.
  MissingHeader,
  /// The first chunk wasn't IHDR.
  FirstChunkNotHeader(ChunkType),
  /// There was more than one IHDR.
  DuplicateHeader,
  /// There was more than one PLTE.
  DuplicatePalette,
  /// PLTE appeared after IDAT.
  PaletteAfterImageData,
  /// A palette image had no PLTE before the first IDAT.
  MissingPalette,
  /// A PLTE appeared in a grayscale image.
  UnexpectedPalette,
  /// No IDAT chunk was found.
  MissingImageData,
  /// The data ended without an IEND chunk.
  MissingEnd,
  /// Chunks appeared after IEND (strict trailing mode only).
  ChunkAfterEnd(ChunkType),
  /// An ancillary chunk appeared in a position it isn't allowed in.
  MisplacedChunk(ChunkType),
  /// An ancillary chunk that may appear only once appeared again.
  DuplicateChunk(ChunkType),
}

/// Details for [`PngError::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
  /// A critical chunk this crate doesn't understand.
  UnknownCriticalChunk(ChunkType),
}

impl From<FormatError> for PngError {
  #[inline]
  fn from(e: FormatError) -> Self {
    Self::Format(e)
  }
}
impl From<IntegrityError> for PngError {
  #[inline]
  fn from(e: IntegrityError) -> Self {
    Self::Integrity(e)
  }
}
impl From<DecompressionError> for PngError {
  #[inline]
  fn from(e: DecompressionError) -> Self {
    Self::Decompression(e)
  }
}
impl From<StructuralError> for PngError {
  #[inline]
  fn from(e: StructuralError) -> Self {
    Self::Structural(e)
  }
}
impl From<UnsupportedFeature> for PngError {
  #[inline]
  fn from(e: UnsupportedFeature) -> Self {
    Self::Unsupported(e)
  }
}
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
impl From<TryFromIntError> for PngError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::Format(FormatError::DimensionTooLarge)
  }
}

impl Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Format(e) => write!(f, "format error: {e}"),
      Self::Integrity(e) => write!(f, "integrity error: {e}"),
      Self::Decompression(e) => write!(f, "decompression error: {e}"),
      Self::Structural(e) => write!(f, "structural error: {e}"),
      Self::Unsupported(e) => write!(f, "unsupported: {e}"),
      Self::Alloc => f.write_str("allocation failed"),
      Self::DimensionsTooLarge => f.write_str("image dimensions exceed the decode limits"),
      Self::Cancelled => f.write_str("operation cancelled"),
    }
  }
}

impl Display for FormatError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadSignature => f.write_str("missing PNG signature"),
      Self::TruncatedChunk => f.write_str("input ends inside a chunk"),
      Self::ChunkTooLong => f.write_str("chunk length exceeds 2^31-1"),
      Self::BadChunkType => f.write_str("chunk type is not four ASCII letters"),
      Self::BadHeaderLength => f.write_str("IHDR is not 13 bytes"),
      Self::WidthOrHeightZero => f.write_str("width and height must be non-zero"),
      Self::DimensionTooLarge => f.write_str("width or height exceeds 2^31-1"),
      Self::IllegalBitDepth { color_type, bit_depth } => {
        write!(f, "bit depth {bit_depth} is illegal for color type {color_type}")
      }
      Self::IllegalColorType(c) => write!(f, "illegal color type {c}"),
      Self::IllegalCompressionMethod(m) => write!(f, "illegal compression method {m}"),
      Self::IllegalFilterMethod(m) => write!(f, "illegal filter method {m}"),
      Self::IllegalInterlaceMethod(m) => write!(f, "illegal interlace method {m}"),
      Self::IllegalFilterType(t) => write!(f, "illegal scanline filter type {t}"),
      Self::BadPaletteLength(len) => write!(f, "bad palette length {len}"),
      Self::PaletteIndexOutOfRange(i) => write!(f, "palette index {i} out of range"),
      Self::BadAncillaryChunk(ty) => write!(f, "malformed {ty:?} chunk"),
      Self::BadTextKeyword => f.write_str("text keyword must be 1 to 79 bytes"),
      Self::RasterLengthMismatch { expected, actual } => {
        write!(f, "raster has {actual} bytes, header requires {expected}")
      }
    }
  }
}

impl Display for IntegrityError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:?} chunk CRC mismatch (declared {:08X}, actual {:08X})",
      self.chunk, self.declared_crc, self.actual_crc
    )
  }
}

impl Display for DecompressionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::CorruptData => "corrupt zlib data",
      Self::Truncated => "zlib stream is truncated",
      Self::NotEnoughData => "zlib stream ended before the last scanline",
      Self::Internal => "internal decompressor error",
    })
  }
}

impl Display for StructuralError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingHeader => f.write_str("no IHDR chunk"),
      Self::FirstChunkNotHeader(ty) => write!(f, "first chunk is {ty:?}, not IHDR"),
      Self::DuplicateHeader => f.write_str("more than one IHDR"),
      Self::DuplicatePalette => f.write_str("more than one PLTE"),
      Self::PaletteAfterImageData => f.write_str("PLTE after IDAT"),
      Self::MissingPalette => f.write_str("palette image without PLTE"),
      Self::UnexpectedPalette => f.write_str("PLTE in a grayscale image"),
      Self::MissingImageData => f.write_str("no IDAT chunk"),
      Self::MissingEnd => f.write_str("no IEND chunk"),
      Self::ChunkAfterEnd(ty) => write!(f, "{ty:?} chunk after IEND"),
      Self::MisplacedChunk(ty) => write!(f, "{ty:?} chunk is out of place"),
      Self::DuplicateChunk(ty) => write!(f, "duplicate {ty:?} chunk"),
    }
  }
}

impl Display for UnsupportedFeature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnknownCriticalChunk(ty) => write!(f, "unknown critical chunk {ty:?}"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for PngError {}

/// Shorthand for results from this crate.
pub type PngResult<T> = Result<T, PngError>;
