use core::sync::atomic::AtomicBool;

use super::*;

/// Settings for encoding.
///
/// None of these change the decoded pixels, only the size of the output and
/// how long it takes to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  /// 0 (store only) to 9 (smallest). Default 6.
  pub compression_level: u8,
  pub filter_strategy: FilterStrategy,
  /// Write the image with Adam7 interlacing.
  pub interlace: bool,
  /// The most zlib bytes to put in one `IDAT`. 0 means the default (8192).
  pub idat_chunk_size: usize,
}
impl Default for EncodeOptions {
  #[inline]
  fn default() -> Self {
    Self::DEFAULT
  }
}
impl EncodeOptions {
  pub const DEFAULT_IDAT_CHUNK_SIZE: usize = 8192;

  pub const DEFAULT: Self = Self {
    compression_level: 6,
    filter_strategy: FilterStrategy::Heuristic,
    interlace: false,
    idat_chunk_size: Self::DEFAULT_IDAT_CHUNK_SIZE,
  };

  /// Levels above 9 are clamped to 9.
  #[inline]
  #[must_use]
  pub const fn with_compression_level(self, level: u8) -> Self {
    let compression_level = if level > 9 { 9 } else { level };
    Self { compression_level, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_filter_strategy(self, filter_strategy: FilterStrategy) -> Self {
    Self { filter_strategy, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_interlace(self, interlace: bool) -> Self {
    Self { interlace, ..self }
  }
  #[inline]
  #[must_use]
  pub const fn with_idat_chunk_size(self, idat_chunk_size: usize) -> Self {
    Self { idat_chunk_size, ..self }
  }

  #[inline]
  const fn effective_idat_chunk_size(&self) -> usize {
    if self.idat_chunk_size == 0 {
      Self::DEFAULT_IDAT_CHUNK_SIZE
    } else {
      self.idat_chunk_size
    }
  }
}

/// Encodes one image as a complete PNG.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'i, 'c> {
  image: &'i RasterImage,
  palette: Option<&'i Palette>,
  metadata: Option<&'i Metadata>,
  options: EncodeOptions,
  cancel: Option<&'c AtomicBool>,
}
impl<'i, 'c> Encoder<'i, 'c> {
  #[inline]
  #[must_use]
  pub const fn new(image: &'i RasterImage, options: EncodeOptions) -> Self {
    Self { image, palette: None, metadata: None, options, cancel: None }
  }

  /// Required for palette images, and allowed (as a suggested palette) for
  /// RGB and RGBA images.
  #[inline]
  #[must_use]
  pub const fn with_palette(self, palette: &'i Palette) -> Self {
    Self { palette: Some(palette), ..self }
  }

  /// Ancillary data to write along with the image.
  #[inline]
  #[must_use]
  pub const fn with_metadata(self, metadata: &'i Metadata) -> Self {
    Self { metadata: Some(metadata), ..self }
  }

  /// Sets a flag that's checked between scanlines. If it's ever `true` the
  /// encode stops with [`PngError::Cancelled`].
  #[inline]
  #[must_use]
  pub const fn with_cancel_flag(self, cancel: &'c AtomicBool) -> Self {
    Self { cancel: Some(cancel), ..self }
  }

  /// The header that will be written.
  #[inline]
  #[must_use]
  pub fn header(&self) -> ImageHeader {
    let interlace =
      if self.options.interlace { InterlaceMethod::Adam7 } else { InterlaceMethod::None };
    self.image.header().with_interlace(interlace)
  }

  fn check_palette(&self, header: &ImageHeader) -> PngResult<()> {
    match (header.color_type, self.palette) {
      (ColorType::Palette, None) => Err(StructuralError::MissingPalette.into()),
      (ColorType::Palette, Some(palette)) => {
        palette.check_fits_bit_depth(header.bit_depth)?;
        let len = palette.len();
        for y in 0..header.height {
          let row = self.image.row(y).ok_or(PngError::DimensionsTooLarge)?;
          for x in 0..header.width as usize {
            let index = if header.bit_depth == 8 {
              row[x]
            } else {
              read_packed(row, x, header.bit_depth)
            };
            if usize::from(index) >= len {
              return Err(FormatError::PaletteIndexOutOfRange(index).into());
            }
          }
        }
        Ok(())
      }
      (ColorType::Grayscale | ColorType::GrayscaleAlpha, Some(_)) => {
        Err(StructuralError::UnexpectedPalette.into())
      }
      _ => Ok(()),
    }
  }

  /// Filters every scanline of every pass into one buffer, filter bytes
  /// included.
  fn filter_image(&self, header: &ImageHeader) -> PngResult<Vec<u8>> {
    let mut filtered = Vec::new();
    filtered.try_reserve(header.zlib_decompression_requirement())?;
    let bpp = header.filter_bytes_per_pixel();
    let raster = self.image.data();
    let mut raw = Vec::new();
    let mut prior = Vec::new();
    let mut scratch = Vec::new();
    for (pass_index, (pass, reduced_width, reduced_height)) in image_passes(header).enumerate() {
      if reduced_width == 0 || reduced_height == 0 {
        trace!("pass {pass_index} is empty");
        continue;
      }
      let line_len = header.bytes_per_scanline(reduced_width);
      raw.clear();
      raw.try_reserve(line_len)?;
      raw.resize(line_len, 0);
      prior.clear();
      prior.try_reserve(line_len)?;
      prior.resize(line_len, 0);
      for reduced_y in 0..reduced_height {
        check_cancel(self.cancel)?;
        gather_line(header, raster, pass, reduced_y, reduced_width, &mut raw);
        let filter = filter_line_with_strategy(
          self.options.filter_strategy,
          bpp,
          &prior,
          &raw,
          &mut scratch,
          &mut filtered,
        )?;
        trace!("pass {pass_index} line {reduced_y}: {filter:?}");
        core::mem::swap(&mut prior, &mut raw);
      }
    }
    Ok(filtered)
  }

  /// Runs the encode.
  pub fn encode(&self) -> PngResult<Vec<u8>> {
    let header = self.header();
    header.validate()?;
    let expected = header.raster_len().ok_or(PngError::DimensionsTooLarge)?;
    if self.image.data().len() != expected {
      return Err(
        FormatError::RasterLengthMismatch { expected, actual: self.image.data().len() }.into(),
      );
    }
    self.check_palette(&header)?;
    let palette_len = self.palette.map(Palette::len);
    if let Some(metadata) = self.metadata {
      metadata.check_for_header(&header, palette_len)?;
    }
    debug!("encoding {header:?} with {:?}", self.options);

    let filtered = self.filter_image(&header)?;
    let zlib = compress_image_data(&filtered, self.options.compression_level);
    debug!("{} filtered bytes compressed to {}", filtered.len(), zlib.len());

    let mut w = ChunkWriter::with_signature()?;
    w.write_chunk(ChunkType::IHDR, &header.to_ihdr_data())?;
    if let Some(metadata) = self.metadata {
      metadata.write_before_palette(&mut w)?;
    }
    if let Some(palette) = self.palette {
      w.write_chunk(ChunkType::PLTE, palette.as_plte_data())?;
    }
    if let Some(metadata) = self.metadata {
      metadata.write_before_image_data(&mut w, self.options.compression_level)?;
    }
    write_idat_chunks(&mut w, &zlib, self.options.effective_idat_chunk_size())?;
    w.write_iend()?;
    Ok(w.into_bytes())
  }
}

/// Encodes an image with no metadata.
///
/// `palette` is required for palette images.
#[inline]
pub fn encode(
  image: &RasterImage, palette: Option<&Palette>, options: &EncodeOptions,
) -> PngResult<Vec<u8>> {
  let encoder = Encoder::new(image, *options);
  match palette {
    Some(p) => encoder.with_palette(p).encode(),
    None => encoder.encode(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gradient(header: ImageHeader) -> RasterImage {
    let len = header.raster_len().unwrap();
    RasterImage::new(header, (0..len).map(|i| (i * 3 + i / 7) as u8).collect()).unwrap()
  }

  #[test]
  fn test_round_trip_every_color_type() {
    for (depth, color) in [
      (1, ColorType::Grayscale),
      (2, ColorType::Grayscale),
      (4, ColorType::Grayscale),
      (8, ColorType::Grayscale),
      (16, ColorType::Grayscale),
      (8, ColorType::Rgb),
      (16, ColorType::Rgb),
      (8, ColorType::GrayscaleAlpha),
      (16, ColorType::GrayscaleAlpha),
      (8, ColorType::Rgba),
      (16, ColorType::Rgba),
    ] {
      for interlace in [false, true] {
        let image = gradient(ImageHeader::new(13, 7, depth, color).unwrap());
        let options = EncodeOptions::default().with_interlace(interlace);
        let png = encode(&image, None, &options).unwrap();
        let d = decode(&png).unwrap();
        assert_eq!(d.image.data(), image.data(), "{color:?} {depth} {interlace}");
        assert_eq!(d.header.is_interlaced(), interlace);
      }
    }
  }

  #[test]
  fn test_palette_validation() {
    let header = ImageHeader::new(4, 1, 2, ColorType::Palette).unwrap();
    let image = RasterImage::new(header, vec![0b00_01_10_00]).unwrap();
    let small = Palette::new(vec![RGB8::default(); 2]).unwrap();
    assert_eq!(
      encode(&image, Some(&small), &EncodeOptions::default()),
      Err(FormatError::PaletteIndexOutOfRange(2).into())
    );
    assert_eq!(
      encode(&image, None, &EncodeOptions::default()),
      Err(StructuralError::MissingPalette.into())
    );
    let pal = Palette::new(vec![RGB8 { r: 1, g: 2, b: 3 }; 3]).unwrap();
    let png = encode(&image, Some(&pal), &EncodeOptions::default()).unwrap();
    let d = decode(&png).unwrap();
    assert_eq!(d.palette.as_ref(), Some(&pal));
    assert_eq!(d.image, image);

    let gray = gradient(ImageHeader::new(2, 2, 8, ColorType::Grayscale).unwrap());
    assert_eq!(
      encode(&gray, Some(&pal), &EncodeOptions::default()),
      Err(StructuralError::UnexpectedPalette.into())
    );
  }

  #[test]
  fn test_idat_chunk_size_and_fixed_filter() {
    let image = gradient(ImageHeader::new(64, 64, 8, ColorType::Rgba).unwrap());
    let options = EncodeOptions::default()
      .with_compression_level(0)
      .with_filter_strategy(FilterStrategy::Fixed(FilterType::Paeth))
      .with_idat_chunk_size(1000);
    let png = encode(&image, None, &options).unwrap();
    let idat_lens: Vec<usize> = RawChunkIter::new(&png)
      .filter(|c| c.ty() == ChunkType::IDAT)
      .map(|c| c.data().len())
      .collect();
    assert!(idat_lens.len() > 1);
    assert!(idat_lens.iter().all(|&len| len <= 1000));
    assert_eq!(decode(&png).unwrap().image, image);
    assert_eq!(EncodeOptions::default().with_compression_level(200).compression_level, 9);
  }

  #[test]
  fn test_metadata_round_trip() {
    let header = ImageHeader::new(3, 3, 8, ColorType::Palette).unwrap();
    let image = RasterImage::new(header, vec![0, 1, 2, 2, 1, 0, 0, 0, 0]).unwrap();
    let pal = Palette::new(vec![RGB8 { r: 9, g: 9, b: 9 }; 3]).unwrap();
    let metadata = Metadata {
      text: vec![
        TextEntry::new("Title", "tiny"),
        TextEntry { kind: TextKind::Compressed, ..TextEntry::new("Comment", "zzzzzzzz") },
      ],
      gamma: Some(45455),
      srgb_intent: Some(SrgbIntent::Saturation),
      physical: Some(PhysicalDimensions {
        pixels_per_unit_x: 1,
        pixels_per_unit_y: 2,
        unit_is_meter: false,
      }),
      modified: Some(Timestamp { year: 1999, month: 12, day: 31, hour: 23, minute: 59, second: 60 }),
      transparency: Some(Transparency::Palette(vec![0, 128])),
      background: Some(vec![2]),
      chromaticities: Some([31270, 32900, 64000, 33000, 30000, 60000, 15000, 6000]),
      significant_bits: Some(vec![5, 6, 5]),
      unknown: vec![
        UnknownChunk { ty: ChunkType(*b"prVt"), data: vec![1, 2, 3] },
        UnknownChunk { ty: ChunkType::hIST, data: vec![0, 1, 0, 2, 0, 3] },
      ],
    };
    let png = Encoder::new(&image, EncodeOptions::default())
      .with_palette(&pal)
      .with_metadata(&metadata)
      .encode()
      .unwrap();
    let d = decode(&png).unwrap();
    assert_eq!(d.metadata, metadata);
    assert_eq!(d.image, image);
  }

  #[test]
  fn test_cancel_flag() {
    let image = gradient(ImageHeader::new(4, 4, 8, ColorType::Grayscale).unwrap());
    let flag = AtomicBool::new(true);
    let res = Encoder::new(&image, EncodeOptions::default()).with_cancel_flag(&flag).encode();
    assert_eq!(res, Err(PngError::Cancelled));
  }
}
