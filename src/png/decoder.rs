use core::sync::atomic::AtomicBool;

use super::*;

/// Settings for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// When `true` (the default) any problem with an ancillary chunk (bad CRC,
  /// bad contents, bad position, duplicates) fails the decode. When `false`
  /// the chunk is dropped with a warning.
  ///
  /// Problems with critical chunks always fail the decode.
  pub strict_ancillary: bool,
  /// Images wider than this are rejected before any pixel data is touched.
  pub max_width: u32,
  /// Images taller than this are rejected before any pixel data is touched.
  pub max_height: u32,
  /// Images with more pixels than this are rejected before any pixel data is
  /// touched.
  pub max_pixels: u64,
  /// Images whose decoded raster would be more bytes than this are rejected
  /// before the raster is allocated.
  pub max_raster_bytes: usize,
  /// When `true`, data after `IEND` fails the decode. When `false` (the
  /// default) it's ignored with a warning.
  pub strict_trailing: bool,
}
impl Default for DecodeOptions {
  #[inline]
  fn default() -> Self {
    Self::DEFAULT
  }
}
impl DecodeOptions {
  pub const DEFAULT: Self = Self {
    strict_ancillary: true,
    max_width: 1 << 24,
    max_height: 1 << 24,
    max_pixels: 1 << 30,
    max_raster_bytes: 1 << 28,
    strict_trailing: false,
  };

  /// Default limits, but ancillary chunk problems are only warnings.
  #[inline]
  #[must_use]
  pub fn lenient() -> Self {
    Self { strict_ancillary: false, ..Self::default() }
  }
  #[inline]
  #[must_use]
  pub const fn with_strict_ancillary(self, strict_ancillary: bool) -> Self {
    Self { strict_ancillary, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_max_dimensions(self, max_width: u32, max_height: u32) -> Self {
    Self { max_width, max_height, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_max_pixels(self, max_pixels: u64) -> Self {
    Self { max_pixels, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_max_raster_bytes(self, max_raster_bytes: usize) -> Self {
    Self { max_raster_bytes, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_strict_trailing(self, strict_trailing: bool) -> Self {
    Self { strict_trailing, ..self }
  }

  fn check_limits(&self, header: &ImageHeader) -> PngResult<()> {
    let pixels = u64::from(header.width) * u64::from(header.height);
    if header.width > self.max_width || header.height > self.max_height || pixels > self.max_pixels
    {
      return Err(PngError::DimensionsTooLarge);
    }
    match header.raster_len() {
      Some(len) if len <= self.max_raster_bytes => Ok(()),
      _ => Err(PngError::DimensionsTooLarge),
    }
  }
}

/// Where a [`Decoder`] is in its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeState {
  /// Nothing has been read yet.
  AwaitSignature,
  /// The signature was fine, the header hasn't been read.
  ReadingChunks,
  /// `IHDR` was read.
  HeaderSeen,
  /// `PLTE` was read.
  PaletteSeen,
  /// At least one `IDAT` was read.
  AccumulatingImageData,
  /// `IEND` was read, the image data is complete.
  ImageDataEnded,
  /// Inflating, unfiltering, and placing the scanlines. These three run
  /// together, one scanline at a time.
  Reconstructing,
  /// The image was decoded.
  Done,
  /// The decode failed. There's no partial result.
  Failed,
}

/// The output of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPng {
  pub header: ImageHeader,
  /// Required for palette images, optional (a suggested palette) for RGB and
  /// RGBA images.
  pub palette: Option<Palette>,
  pub image: RasterImage,
  pub metadata: Metadata,
}
impl DecodedPng {
  /// Converts the image to 8-bit RGBA, using the palette and transparency
  /// that came with it.
  #[inline]
  pub fn to_rgba8(&self) -> PngResult<Vec<RGBA8>> {
    self.image.to_rgba8(self.palette.as_ref(), self.metadata.transparency.as_ref())
  }

  /// Encodes this image again, with its palette and all its metadata.
  #[inline]
  pub fn encode(&self, options: EncodeOptions) -> PngResult<Vec<u8>> {
    let encoder = Encoder::new(&self.image, options).with_metadata(&self.metadata);
    match &self.palette {
      Some(palette) => encoder.with_palette(palette).encode(),
      None => encoder.encode(),
    }
  }
}

/// Ancillary chunks that can appear at most once.
const SINGLE_INSTANCE: [ChunkType; 10] = [
  ChunkType::gAMA,
  ChunkType::cHRM,
  ChunkType::sRGB,
  ChunkType::iCCP,
  ChunkType::sBIT,
  ChunkType::tRNS,
  ChunkType::bKGD,
  ChunkType::hIST,
  ChunkType::pHYs,
  ChunkType::tIME,
];

/// Ancillary chunks that, when there's a `PLTE`, must come after it.
const AFTER_PALETTE: [ChunkType; 3] = [ChunkType::tRNS, ChunkType::bKGD, ChunkType::hIST];

/// Checks an ancillary chunk's position against the chunks seen so far.
fn ancillary_position_ok(
  ty: ChunkType, color_type: ColorType, palette_seen: bool, image_data_seen: bool,
) -> bool {
  match ty {
    ChunkType::gAMA | ChunkType::cHRM | ChunkType::sRGB | ChunkType::iCCP | ChunkType::sBIT => {
      !palette_seen && !image_data_seen
    }
    ChunkType::tRNS | ChunkType::bKGD => {
      !image_data_seen && (palette_seen || color_type != ColorType::Palette)
    }
    ChunkType::hIST => !image_data_seen && palette_seen,
    ChunkType::pHYs | ChunkType::sPLT => !image_data_seen,
    _ => true,
  }
}

/// The data of an `IDAT` chunk that the input ends in the middle of.
fn partial_image_data(rest: &[u8]) -> Option<&[u8]> {
  match rest {
    [l0, l1, l2, l3, b'I', b'D', b'A', b'T', data @ ..] => {
      let len = u32::from_be_bytes([*l0, *l1, *l2, *l3]) as usize;
      Some(&data[..len.min(data.len())])
    }
    _ => None,
  }
}

/// Decodes one PNG held entirely in memory.
///
/// ```no_run
/// # fn main() -> Result<(), pngkit::PngError> {
/// # let bytes: &[u8] = &[];
/// use pngkit::png::{DecodeOptions, Decoder};
/// let mut decoder = Decoder::new(bytes).with_options(DecodeOptions::lenient());
/// let decoded = decoder.decode()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Decoder<'b, 'c> {
  bytes: &'b [u8],
  options: DecodeOptions,
  cancel: Option<&'c AtomicBool>,
  state: DecodeState,
}
impl<'b, 'c> Decoder<'b, 'c> {
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self {
      bytes,
      options: DecodeOptions::DEFAULT,
      cancel: None,
      state: DecodeState::AwaitSignature,
    }
  }

  #[inline]
  #[must_use]
  pub const fn with_options(self, options: DecodeOptions) -> Self {
    Self { options, ..self }
  }

  /// Sets a flag that's checked between scanlines. If it's ever `true` the
  /// decode stops with [`PngError::Cancelled`].
  #[inline]
  #[must_use]
  pub const fn with_cancel_flag(self, cancel: &'c AtomicBool) -> Self {
    Self { cancel: Some(cancel), ..self }
  }

  #[inline]
  #[must_use]
  pub const fn state(&self) -> DecodeState {
    self.state
  }

  /// Runs the decode.
  ///
  /// Any error is terminal: the state becomes [`DecodeState::Failed`] and
  /// nothing is returned but the error.
  pub fn decode(&mut self) -> PngResult<DecodedPng> {
    let result = self.run();
    self.state = match &result {
      Ok(_) => DecodeState::Done,
      Err(e) => {
        debug!("decode failed: {e}");
        DecodeState::Failed
      }
    };
    result
  }

  /// Either fails, or logs and drops the chunk, depending on strictness.
  fn ancillary_problem(&self, ty: ChunkType, e: PngError) -> PngResult<()> {
    if self.options.strict_ancillary {
      Err(e)
    } else {
      warn!("ignoring {ty:?} chunk: {e}");
      Ok(())
    }
  }

  fn run(&mut self) -> PngResult<DecodedPng> {
    self.state = DecodeState::AwaitSignature;
    let mut reader = ChunkReader::new(self.bytes)?;
    self.state = DecodeState::ReadingChunks;

    let first = reader.next_chunk()?.ok_or(StructuralError::MissingHeader)?;
    first.verify_crc()?;
    if first.ty() != ChunkType::IHDR {
      return Err(StructuralError::FirstChunkNotHeader(first.ty()).into());
    }
    let header = ImageHeader::from_ihdr_data(first.data())?;
    debug!("IHDR: {header:?}");
    self.options.check_limits(&header)?;
    self.state = DecodeState::HeaderSeen;

    let mut palette: Option<Palette> = None;
    let mut metadata = Metadata::default();
    let mut image_data: Vec<&'b [u8]> = Vec::new();
    let mut seen_once: Vec<ChunkType> = Vec::new();
    let mut after_palette_seen: Option<ChunkType> = None;
    // Running out of input after some IDAT is reported only if the image data
    // itself turns out to be fine.
    let mut deferred: Option<PngError> = None;

    loop {
      let before = reader.remaining();
      let chunk = match reader.next_chunk() {
        Ok(Some(chunk)) => chunk,
        Ok(None) => {
          deferred = Some(StructuralError::MissingEnd.into());
          break;
        }
        Err(FormatError::TruncatedChunk)
          if !image_data.is_empty() || partial_image_data(before).is_some() =>
        {
          if let Some(partial) = partial_image_data(before) {
            image_data.try_reserve(1)?;
            image_data.push(partial);
          }
          deferred = Some(FormatError::TruncatedChunk.into());
          break;
        }
        Err(e) => return Err(e.into()),
      };
      let ty = chunk.ty();
      trace!("{ty:?}: {} bytes", chunk.data().len());
      if let Err(e) = chunk.verify_crc() {
        if ty.is_critical() {
          return Err(e.into());
        }
        self.ancillary_problem(ty, e.into())?;
        continue;
      }
      if !ty.is_valid() {
        return Err(FormatError::BadChunkType.into());
      }
      match ty {
        ChunkType::IHDR => return Err(StructuralError::DuplicateHeader.into()),
        ChunkType::PLTE => {
          if palette.is_some() {
            return Err(StructuralError::DuplicatePalette.into());
          }
          if !image_data.is_empty() {
            return Err(StructuralError::PaletteAfterImageData.into());
          }
          if matches!(header.color_type, ColorType::Grayscale | ColorType::GrayscaleAlpha) {
            return Err(StructuralError::UnexpectedPalette.into());
          }
          let p = Palette::from_plte_data(chunk.data())?;
          if header.color_type == ColorType::Palette {
            p.check_fits_bit_depth(header.bit_depth)?;
          }
          if let Some(early) = after_palette_seen {
            self.ancillary_problem(early, StructuralError::MisplacedChunk(early).into())?;
          }
          debug!("PLTE: {} entries", p.len());
          palette = Some(p);
          self.state = DecodeState::PaletteSeen;
        }
        ChunkType::IDAT => {
          if header.color_type == ColorType::Palette && palette.is_none() {
            return Err(StructuralError::MissingPalette.into());
          }
          image_data.try_reserve(1)?;
          image_data.push(chunk.data());
          self.state = DecodeState::AccumulatingImageData;
        }
        ChunkType::IEND => {
          if !chunk.data().is_empty() {
            warn!("IEND has {} bytes of data", chunk.data().len());
          }
          break;
        }
        _ if ty.is_critical() => {
          return Err(UnsupportedFeature::UnknownCriticalChunk(ty).into());
        }
        _ => {
          if !ancillary_position_ok(ty, header.color_type, palette.is_some(), !image_data.is_empty())
          {
            self.ancillary_problem(ty, StructuralError::MisplacedChunk(ty).into())?;
            continue;
          }
          if SINGLE_INSTANCE.contains(&ty) {
            if seen_once.contains(&ty) {
              self.ancillary_problem(ty, StructuralError::DuplicateChunk(ty).into())?;
              continue;
            }
            seen_once.try_reserve(1)?;
            seen_once.push(ty);
          }
          if palette.is_none() && AFTER_PALETTE.contains(&ty) {
            after_palette_seen = Some(ty);
          }
          let palette_len = palette.as_ref().map(Palette::len);
          if let Err(e) = metadata.read_chunk(ty, chunk.data(), &header, palette_len) {
            self.ancillary_problem(ty, e)?;
          }
        }
      }
    }

    if image_data.is_empty() {
      return Err(deferred.unwrap_or(StructuralError::MissingImageData.into()));
    }
    if deferred.is_none() {
      self.state = DecodeState::ImageDataEnded;
      self.check_trailing(&mut reader)?;
    }
    debug!(
      "{} IDAT chunks, {} compressed bytes",
      image_data.len(),
      image_data.iter().map(|d| d.len()).sum::<usize>()
    );

    self.state = DecodeState::Reconstructing;
    let mut inflater = ScanlineInflater::new(image_data.iter().copied());
    let raster = assemble_image(&header, &mut inflater, self.cancel)?;
    let (extra_out, extra_in) = inflater.finish()?;
    if extra_out > 0 {
      warn!("{extra_out} extra bytes of decompressed image data ignored");
    }
    if extra_in > 0 {
      warn!("{extra_in} bytes after the end of the zlib stream ignored");
    }
    if let Some(e) = deferred {
      return Err(e);
    }
    let image = RasterImage::new(header, raster)?;
    debug!("decoded {}x{}", header.width, header.height);
    Ok(DecodedPng { header, palette, image, metadata })
  }

  fn check_trailing(&self, reader: &mut ChunkReader<'b>) -> PngResult<()> {
    let rest = reader.remaining();
    if rest.is_empty() {
      return Ok(());
    }
    if self.options.strict_trailing {
      match reader.next_chunk()? {
        Some(chunk) => Err(StructuralError::ChunkAfterEnd(chunk.ty()).into()),
        None => Ok(()),
      }
    } else {
      warn!("{} bytes after IEND ignored", rest.len());
      Ok(())
    }
  }
}

/// Decodes a PNG with the default options.
#[inline]
pub fn decode(bytes: &[u8]) -> PngResult<DecodedPng> {
  Decoder::new(bytes).decode()
}

/// Decodes a PNG with the given options.
#[inline]
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> PngResult<DecodedPng> {
  Decoder::new(bytes).with_options(*options).decode()
}

/// Reads just the signature and the `IHDR` chunk.
pub fn read_header(bytes: &[u8]) -> PngResult<ImageHeader> {
  let mut reader = ChunkReader::new(bytes)?;
  let first = reader.next_chunk()?.ok_or(StructuralError::MissingHeader)?;
  first.verify_crc()?;
  if first.ty() != ChunkType::IHDR {
    return Err(StructuralError::FirstChunkNotHeader(first.ty()).into());
  }
  Ok(ImageHeader::from_ihdr_data(first.data())?)
}
