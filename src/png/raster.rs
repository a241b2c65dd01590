use bitfrob::u8_replicate_bits;

use super::*;

/// A fully decoded image, or an image ready to be encoded.
///
/// The pixel data is stored exactly the way PNG lays out a scanline, minus the
/// filter byte:
/// * Rows are top to bottom, with no padding between rows. Each row is
///   [`stride`](Self::stride) bytes.
/// * Samples with a bit depth below 8 are packed MSB first. Any unused low
///   bits at the end of a row are always 0.
/// * 16-bit samples are big-endian.
///
/// Interlaced images are always stored de-interlaced. The header still says
/// what the source used, and the encoder will interlace based on its own
/// options.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RasterImage {
  header: ImageHeader,
  stride: usize,
  data: Vec<u8>,
}
impl Debug for RasterImage {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RasterImage")
      .field("header", &self.header)
      .field("stride", &self.stride)
      .field("data.len()", &self.data.len())
      .finish()
  }
}
impl RasterImage {
  /// Wraps pixel data for a header.
  ///
  /// The header must be legal and the data must be exactly `stride * height`
  /// bytes. Unused bits at the end of each row are cleared.
  pub fn new(header: ImageHeader, mut data: Vec<u8>) -> PngResult<Self> {
    header.validate()?;
    let expected = header.raster_len().ok_or(PngError::DimensionsTooLarge)?;
    if data.len() != expected {
      return Err(FormatError::RasterLengthMismatch { expected, actual: data.len() }.into());
    }
    let stride = header.stride();
    let used_bits = (header.bits_per_pixel() * header.width as usize) % 8;
    if used_bits != 0 {
      let keep: u8 = !(0xFF_u8 >> used_bits);
      for row in data.chunks_exact_mut(stride) {
        if let Some(last) = row.last_mut() {
          *last &= keep;
        }
      }
    }
    Ok(Self { header, stride, data })
  }

  #[inline]
  #[must_use]
  pub const fn header(&self) -> &ImageHeader {
    &self.header
  }

  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.header.width
  }

  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.header.height
  }

  /// Bytes per row.
  #[inline]
  #[must_use]
  pub const fn stride(&self) -> usize {
    self.stride
  }

  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  #[inline]
  #[must_use]
  pub fn into_data(self) -> Vec<u8> {
    self.data
  }

  /// The bytes of row `y`, if it's in bounds.
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[u8]> {
    let start = (y as usize).checked_mul(self.stride)?;
    self.data.get(start..start.checked_add(self.stride)?)
  }

  /// Gets channel `c` of the pixel at `(x, y)`, at its original bit depth.
  #[must_use]
  pub fn sample(&self, x: u32, y: u32, c: usize) -> Option<u16> {
    let channels = self.header.channel_count();
    if x >= self.header.width || c >= channels {
      return None;
    }
    let row = self.row(y)?;
    let index = (x as usize) * channels + c;
    Some(match self.header.bit_depth {
      16 => u16::from_be_bytes([row[index * 2], row[index * 2 + 1]]),
      8 => u16::from(row[index]),
      depth => u16::from(read_packed(row, index, depth)),
    })
  }

  /// Converts the image to 8-bit RGBA.
  ///
  /// * Sub-byte samples are scaled up by bit replication, 16-bit samples keep
  ///   their high byte.
  /// * Palette images look up each index, taking alpha from the `tRNS`
  ///   entries when given (255 past the end of the list).
  /// * Grayscale and RGB images with a color key get alpha 0 on pixels that
  ///   exactly match the key, and 255 elsewhere.
  pub fn to_rgba8(
    &self, palette: Option<&Palette>, transparency: Option<&Transparency>,
  ) -> PngResult<Vec<RGBA8>> {
    let ImageHeader { width, height, bit_depth, color_type, .. } = self.header;
    let pixel_count = (width as usize).checked_mul(height as usize).ok_or(PngError::Alloc)?;
    let mut out = Vec::new();
    out.try_reserve(pixel_count)?;
    let to8 = |v: u16| -> u8 {
      match bit_depth {
        16 => (v >> 8) as u8,
        8 => v as u8,
        depth => u8_replicate_bits(u32::from(depth), v as u8),
      }
    };
    let palette = match (color_type, palette) {
      (ColorType::Palette, None) => return Err(StructuralError::MissingPalette.into()),
      (_, p) => p,
    };
    for y in 0..height {
      for x in 0..width {
        // in bounds by construction
        let s = |c: usize| self.sample(x, y, c).unwrap_or(0);
        let px = match color_type {
          ColorType::Grayscale => {
            let v = s(0);
            let a = match transparency {
              Some(Transparency::Gray(key)) if *key == v => 0,
              _ => 255,
            };
            RGBA8 { a, ..RGBA8::gray(to8(v)) }
          }
          ColorType::Rgb => {
            let (r, g, b) = (s(0), s(1), s(2));
            let a = match transparency {
              Some(Transparency::Rgb(key)) if *key == [r, g, b] => 0,
              _ => 255,
            };
            RGBA8 { r: to8(r), g: to8(g), b: to8(b), a }
          }
          ColorType::Palette => {
            let index = s(0) as u8;
            let entry = palette
              .and_then(|p| p.get(index))
              .ok_or(FormatError::PaletteIndexOutOfRange(index))?;
            let a = match transparency {
              Some(Transparency::Palette(alphas)) => {
                alphas.get(usize::from(index)).copied().unwrap_or(255)
              }
              _ => 255,
            };
            RGBA8 { a, ..RGBA8::from(entry) }
          }
          ColorType::GrayscaleAlpha => RGBA8 { a: to8(s(1)), ..RGBA8::gray(to8(s(0))) },
          ColorType::Rgba => RGBA8 { r: to8(s(0)), g: to8(s(1)), b: to8(s(2)), a: to8(s(3)) },
        };
        out.push(px);
      }
    }
    Ok(out)
  }
}

/// Reads the `index`th packed sample of a row with the given sub-byte depth.
#[inline]
#[must_use]
pub(crate) fn read_packed(row: &[u8], index: usize, depth: u8) -> u8 {
  let depth = usize::from(depth);
  let bit = index * depth;
  let shift = 8 - depth - (bit % 8);
  let mask = (1_u16 << depth) as u8;
  (row[bit / 8] >> shift) & mask.wrapping_sub(1)
}

/// Writes the `index`th packed sample of a row with the given sub-byte depth.
#[inline]
pub(crate) fn write_packed(row: &mut [u8], index: usize, depth: u8, value: u8) {
  let depth = usize::from(depth);
  let bit = index * depth;
  let shift = 8 - depth - (bit % 8);
  let mask = ((1_u16 << depth) as u8).wrapping_sub(1);
  let byte = &mut row[bit / 8];
  *byte = (*byte & !(mask << shift)) | ((value & mask) << shift);
}
