use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Greyscale
  Grayscale = 0,
  /// Red, Green, Blue
  Rgb = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Palette = 3,
  /// Greyscale + Alpha
  GrayscaleAlpha = 4,
  /// Red, Green, Blue, Alpha
  Rgba = 6,
}
impl ColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Grayscale => 1,
      Self::Rgb => 3,
      Self::Palette => 1,
      Self::GrayscaleAlpha => 2,
      Self::Rgba => 4,
    }
  }

  /// If the bit depth is legal with this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Grayscale => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Palette => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::Rgb | Self::GrayscaleAlpha | Self::Rgba => matches!(bit_depth, 8 | 16),
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = FormatError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => ColorType::Grayscale,
      2 => ColorType::Rgb,
      3 => ColorType::Palette,
      4 => ColorType::GrayscaleAlpha,
      6 => ColorType::Rgba,
      _ => return Err(FormatError::IllegalColorType(value)),
    })
  }
}

/// How the image data is ordered within the zlib stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum InterlaceMethod {
  /// Scanlines top to bottom.
  #[default]
  None = 0,
  /// Seven reduced images, see [`adam7`](crate::png::adam7).
  Adam7 = 1,
}
impl TryFrom<u8> for InterlaceMethod {
  type Error = FormatError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::None),
      1 => Ok(Self::Adam7),
      _ => Err(FormatError::IllegalInterlaceMethod(value)),
    }
  }
}

/// Image Header (the contents of the `IHDR` chunk).
///
/// Once a decode has its header, the header doesn't change.
///
/// The compression method and filter method are always 0, so they're not
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageHeader {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: ColorType,
  /// if the image data is stored interlaced.
  pub interlace_method: InterlaceMethod,
}
impl ImageHeader {
  /// Makes a non-interlaced header, checking that all the values are legal.
  #[inline]
  pub fn new(width: u32, height: u32, bit_depth: u8, color_type: ColorType) -> PngResult<Self> {
    let h =
      Self { width, height, bit_depth, color_type, interlace_method: InterlaceMethod::None };
    h.validate()?;
    Ok(h)
  }

  /// Same header, with the interlace method changed.
  #[inline]
  #[must_use]
  pub const fn with_interlace(self, interlace_method: InterlaceMethod) -> Self {
    Self { interlace_method, ..self }
  }

  #[inline]
  #[must_use]
  pub const fn is_interlaced(&self) -> bool {
    matches!(self.interlace_method, InterlaceMethod::Adam7)
  }

  /// Checks the rules about which field values are allowed.
  pub fn validate(&self) -> Result<(), FormatError> {
    if self.width == 0 || self.height == 0 {
      return Err(FormatError::WidthOrHeightZero);
    }
    if self.width > PNG_MAX_LENGTH || self.height > PNG_MAX_LENGTH {
      return Err(FormatError::DimensionTooLarge);
    }
    if !self.color_type.allows_bit_depth(self.bit_depth) {
      return Err(FormatError::IllegalBitDepth {
        color_type: self.color_type as u8,
        bit_depth: self.bit_depth,
      });
    }
    Ok(())
  }

  /// Parses the 13 bytes of `IHDR` chunk data.
  pub fn from_ihdr_data(data: &[u8]) -> Result<Self, FormatError> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        if compression_method != 0 {
          return Err(FormatError::IllegalCompressionMethod(compression_method));
        }
        if filter_method != 0 {
          return Err(FormatError::IllegalFilterMethod(filter_method));
        }
        let header = Self {
          width: u32::from_be_bytes([w0, w1, w2, w3]),
          height: u32::from_be_bytes([h0, h1, h2, h3]),
          bit_depth,
          color_type: ColorType::try_from(color_type)?,
          interlace_method: InterlaceMethod::try_from(interlace_method)?,
        };
        header.validate()?;
        Ok(header)
      }
      _ => Err(FormatError::BadHeaderLength),
    }
  }

  /// The 13 bytes of `IHDR` chunk data for this header.
  #[must_use]
  pub fn to_ihdr_data(&self) -> [u8; 13] {
    let mut out = [0_u8; 13];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.bit_depth;
    out[9] = self.color_type as u8;
    // out[10] compression method, out[11] filter method: always 0
    out[12] = self.interlace_method as u8;
    out
  }

  #[inline]
  #[must_use]
  pub const fn channel_count(&self) -> usize {
    self.color_type.channel_count()
  }

  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The "bpp" that filters use to find the byte to the left.
  ///
  /// Filtering is per byte within a pixel when pixels are more than 1 byte
  /// each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn filter_bytes_per_pixel(&self) -> usize {
    let bits = self.bits_per_pixel();
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }

  /// Bytes of pixel data in one scanline of the given width (no filter byte).
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so we must round up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    let bits_per_line = self.bits_per_pixel().saturating_mul(width as usize);
    (bits_per_line / 8) + (bits_per_line % 8 != 0) as usize
  }

  /// Bytes of one filtered line: the filter type byte plus the pixel data.
  #[inline]
  #[must_use]
  pub const fn bytes_per_filterline(&self, width: u32) -> usize {
    if width == 0 {
      0
    } else {
      1 + self.bytes_per_scanline(width)
    }
  }

  /// The row stride of the full, de-interlaced raster.
  #[inline]
  #[must_use]
  pub const fn stride(&self) -> usize {
    self.bytes_per_scanline(self.width)
  }

  /// Bytes of the full, de-interlaced raster.
  #[inline]
  #[must_use]
  pub fn raster_len(&self) -> Option<usize> {
    self.stride().checked_mul(self.height as usize)
  }

  /// Gets the size of the decompressed (still filtered) image data.
  ///
  /// * Interlaced images add up the filtered bytes of all 7 reduced images.
  /// * Non-interlaced images use just their full dimensions.
  #[must_use]
  pub fn zlib_decompression_requirement(&self) -> usize {
    #[inline]
    #[must_use]
    fn temp_bytes_for_image(header: &ImageHeader, width: u32, height: u32) -> usize {
      if width == 0 {
        return 0;
      }
      header.bytes_per_filterline(width).saturating_mul(height as usize)
    }
    if self.is_interlaced() {
      let mut total = 0_usize;
      for (width, height) in reduced_image_dimensions(self.width, self.height).into_iter().skip(1)
      {
        total = total.saturating_add(temp_bytes_for_image(self, width, height));
      }
      total
    } else {
      temp_bytes_for_image(self, self.width, self.height)
    }
  }
}
