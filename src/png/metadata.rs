//! Ancillary chunk contents.
//!
//! None of this is needed to get the pixels out of a PNG, but a decoder
//! collects it all into [`Metadata`] so that it can be inspected, and so that
//! an encoder can write it back out.

use super::*;

/// The longest decompressed text a compressed text chunk may hold.
pub const MAX_TEXT_LEN: usize = 1 << 24;

/// Transparency data (the contents of a `tRNS` chunk).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transparency {
  /// This grayscale sample value is fully transparent.
  Gray(u16),
  /// This RGB sample value is fully transparent.
  Rgb([u16; 3]),
  /// Alpha for each palette index, in order.
  ///
  /// This can be shorter than the palette, any later entries are opaque.
  Palette(Vec<u8>),
}
impl Debug for Transparency {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Gray(y) => f.debug_tuple("Gray").field(y).finish(),
      Self::Rgb(rgb) => f.debug_tuple("Rgb").field(rgb).finish(),
      Self::Palette(alphas) => f.debug_tuple("Palette").field(&alphas.len()).finish(),
    }
  }
}
impl Transparency {
  /// Parses `tRNS` data for an image with the given header.
  ///
  /// Color types that already have alpha can't have a `tRNS` chunk, and a
  /// gray or RGB key must fit in the image's bit depth.
  pub fn from_trns_data(
    data: &[u8], header: &ImageHeader, palette_len: Option<usize>,
  ) -> Result<Self, FormatError> {
    let bad = FormatError::BadAncillaryChunk(ChunkType::tRNS);
    let fits = |v: u16| header.bit_depth >= 16 || u32::from(v) < (1_u32 << header.bit_depth);
    let trns = match (header.color_type, data) {
      (ColorType::Grayscale, [y0, y1]) => Self::Gray(u16::from_be_bytes([*y0, *y1])),
      (ColorType::Rgb, [r0, r1, g0, g1, b0, b1]) => Self::Rgb([
        u16::from_be_bytes([*r0, *r1]),
        u16::from_be_bytes([*g0, *g1]),
        u16::from_be_bytes([*b0, *b1]),
      ]),
      (ColorType::Palette, alphas) => {
        let max = palette_len.unwrap_or(Palette::MAX_ENTRIES);
        if alphas.is_empty() || alphas.len() > max {
          return Err(bad);
        }
        Self::Palette(alphas.to_vec())
      }
      _ => return Err(bad),
    };
    match &trns {
      Self::Gray(y) if !fits(*y) => Err(bad),
      Self::Rgb(rgb) if !rgb.iter().all(|c| fits(*c)) => Err(bad),
      _ => Ok(trns),
    }
  }

  /// Checks that this can be written for an image with the given header.
  pub fn check_header(
    &self, header: &ImageHeader, palette_len: Option<usize>,
  ) -> Result<(), FormatError> {
    Self::from_trns_data(&self.to_trns_data(), header, palette_len).map(|_| ())
  }

  /// The `tRNS` chunk data.
  #[must_use]
  pub fn to_trns_data(&self) -> Vec<u8> {
    match self {
      Self::Gray(y) => y.to_be_bytes().to_vec(),
      Self::Rgb(rgb) => rgb.iter().flat_map(|c| c.to_be_bytes()).collect(),
      Self::Palette(alphas) => alphas.clone(),
    }
  }
}

/// Physical pixel dimensions (the contents of a `pHYs` chunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalDimensions {
  pub pixels_per_unit_x: u32,
  pub pixels_per_unit_y: u32,
  /// If `false` the values only give the aspect ratio.
  pub unit_is_meter: bool,
}
impl PhysicalDimensions {
  pub fn from_phys_data(data: &[u8]) -> Result<Self, FormatError> {
    match *data {
      [x0, x1, x2, x3, y0, y1, y2, y3, unit @ (0 | 1)] => Ok(Self {
        pixels_per_unit_x: u32::from_be_bytes([x0, x1, x2, x3]),
        pixels_per_unit_y: u32::from_be_bytes([y0, y1, y2, y3]),
        unit_is_meter: unit == 1,
      }),
      _ => Err(FormatError::BadAncillaryChunk(ChunkType::pHYs)),
    }
  }

  #[must_use]
  pub fn to_phys_data(&self) -> [u8; 9] {
    let mut out = [0_u8; 9];
    out[0..4].copy_from_slice(&self.pixels_per_unit_x.to_be_bytes());
    out[4..8].copy_from_slice(&self.pixels_per_unit_y.to_be_bytes());
    out[8] = u8::from(self.unit_is_meter);
    out
  }
}

/// Image last-modification time (the contents of a `tIME` chunk), in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
  pub year: u16,
  pub month: u8,
  pub day: u8,
  pub hour: u8,
  pub minute: u8,
  /// 60 is allowed, for leap seconds.
  pub second: u8,
}
impl Timestamp {
  pub fn from_time_data(data: &[u8]) -> Result<Self, FormatError> {
    match *data {
      [y0, y1, month @ 1..=12, day @ 1..=31, hour @ 0..=23, minute @ 0..=59, second @ 0..=60] => {
        Ok(Self { year: u16::from_be_bytes([y0, y1]), month, day, hour, minute, second })
      }
      _ => Err(FormatError::BadAncillaryChunk(ChunkType::tIME)),
    }
  }

  #[must_use]
  pub fn to_time_data(&self) -> [u8; 7] {
    let [y0, y1] = self.year.to_be_bytes();
    [y0, y1, self.month, self.day, self.hour, self.minute, self.second]
  }
}

/// Which text chunk a [`TextEntry`] came from (or will be written as).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TextKind {
  /// `tEXt`: Latin-1, uncompressed.
  #[default]
  Plain,
  /// `zTXt`: Latin-1, compressed.
  Compressed,
  /// `iTXt`: UTF-8, optionally compressed.
  International { language_tag: String, translated_keyword: String, compressed: bool },
}

/// One keyword/text pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEntry {
  /// 1 to 79 bytes of printable Latin-1.
  pub keyword: String,
  pub text: String,
  pub kind: TextKind,
}

fn latin1_to_string(bytes: &[u8]) -> String {
  bytes.iter().map(|&b| char::from(b)).collect()
}

fn string_to_latin1(s: &str, ty: ChunkType) -> Result<Vec<u8>, FormatError> {
  s.chars()
    .map(|c| u8::try_from(u32::from(c)).map_err(|_| FormatError::BadAncillaryChunk(ty)))
    .collect()
}

/// Splits at the first null byte, dropping it.
fn split_nul(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
  let i = bytes.iter().position(|&b| b == 0)?;
  Some((&bytes[..i], &bytes[i + 1..]))
}

/// Keywords are 1 to 79 bytes of printable Latin-1 (space is allowed).
fn check_keyword(keyword: &[u8]) -> Result<(), FormatError> {
  let printable = |b: &u8| matches!(b, 32..=126 | 161..=255);
  if (1..=79).contains(&keyword.len()) && keyword.iter().all(printable) {
    Ok(())
  } else {
    Err(FormatError::BadTextKeyword)
  }
}

impl TextEntry {
  /// Makes a `tEXt` entry.
  #[inline]
  pub fn new(keyword: &str, text: &str) -> Self {
    Self { keyword: keyword.into(), text: text.into(), kind: TextKind::Plain }
  }

  pub fn from_text_data(data: &[u8]) -> Result<Self, FormatError> {
    let (keyword, text) =
      split_nul(data).ok_or(FormatError::BadAncillaryChunk(ChunkType::tEXt))?;
    check_keyword(keyword)?;
    Ok(Self {
      keyword: latin1_to_string(keyword),
      text: latin1_to_string(text),
      kind: TextKind::Plain,
    })
  }

  pub fn from_ztxt_data(data: &[u8]) -> PngResult<Self> {
    let bad = FormatError::BadAncillaryChunk(ChunkType::zTXt);
    let (keyword, rest) = split_nul(data).ok_or(bad)?;
    check_keyword(keyword)?;
    let compressed = match rest {
      [0, compressed @ ..] => compressed,
      _ => return Err(bad.into()),
    };
    let text = inflate_small(compressed, MAX_TEXT_LEN).map_err(|_| bad)?;
    Ok(Self {
      keyword: latin1_to_string(keyword),
      text: latin1_to_string(&text),
      kind: TextKind::Compressed,
    })
  }

  pub fn from_itxt_data(data: &[u8]) -> PngResult<Self> {
    let bad = FormatError::BadAncillaryChunk(ChunkType::iTXt);
    let (keyword, rest) = split_nul(data).ok_or(bad)?;
    check_keyword(keyword)?;
    let (compressed, rest) = match rest {
      [0, _, rest @ ..] => (false, rest),
      [1, 0, rest @ ..] => (true, rest),
      _ => return Err(bad.into()),
    };
    let (language_tag, rest) = split_nul(rest).ok_or(bad)?;
    let (translated_keyword, text) = split_nul(rest).ok_or(bad)?;
    let text = if compressed {
      inflate_small(text, MAX_TEXT_LEN).map_err(|_| bad)?
    } else {
      text.to_vec()
    };
    let utf8 = |v: Vec<u8>| String::from_utf8(v).map_err(|_| bad);
    Ok(Self {
      keyword: latin1_to_string(keyword),
      text: utf8(text)?,
      kind: TextKind::International {
        language_tag: utf8(language_tag.to_vec())?,
        translated_keyword: utf8(translated_keyword.to_vec())?,
        compressed,
      },
    })
  }

  /// The chunk type this entry is written as.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    match self.kind {
      TextKind::Plain => ChunkType::tEXt,
      TextKind::Compressed => ChunkType::zTXt,
      TextKind::International { .. } => ChunkType::iTXt,
    }
  }

  /// Serializes this entry as chunk data for [`chunk_type`](Self::chunk_type).
  pub fn to_chunk_data(&self, compression_level: u8) -> PngResult<Vec<u8>> {
    let ty = self.chunk_type();
    let mut out = string_to_latin1(&self.keyword, ty)?;
    check_keyword(&out)?;
    out.push(0);
    match &self.kind {
      TextKind::Plain => out.extend(string_to_latin1(&self.text, ty)?),
      TextKind::Compressed => {
        out.push(0);
        let text = string_to_latin1(&self.text, ty)?;
        out.extend(compress_image_data(&text, compression_level));
      }
      TextKind::International { language_tag, translated_keyword, compressed } => {
        out.push(u8::from(*compressed));
        out.push(0);
        out.extend_from_slice(language_tag.as_bytes());
        out.push(0);
        out.extend_from_slice(translated_keyword.as_bytes());
        out.push(0);
        if *compressed {
          out.extend(compress_image_data(self.text.as_bytes(), compression_level));
        } else {
          out.extend_from_slice(self.text.as_bytes());
        }
      }
    }
    Ok(out)
  }
}

/// An ancillary chunk kept as-is.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnknownChunk {
  pub ty: ChunkType,
  pub data: Vec<u8>,
}
impl Debug for UnknownChunk {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("UnknownChunk").field("ty", &self.ty).field("len", &self.data.len()).finish()
  }
}

/// Everything from the ancillary chunks of a PNG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
  /// From `tEXt`, `zTXt`, and `iTXt`, in file order.
  pub text: Vec<TextEntry>,
  /// `gAMA`: the image gamma times 100_000.
  pub gamma: Option<u32>,
  /// `sRGB`
  pub srgb_intent: Option<SrgbIntent>,
  /// `pHYs`
  pub physical: Option<PhysicalDimensions>,
  /// `tIME`
  pub modified: Option<Timestamp>,
  /// `tRNS`
  pub transparency: Option<Transparency>,
  /// `bKGD`, as stored: a palette index, a gray sample, or an RGB sample.
  pub background: Option<Vec<u8>>,
  /// `cHRM`: white point x/y, then red, green, blue x/y, each times 100_000.
  pub chromaticities: Option<[u32; 8]>,
  /// `sBIT`, as stored: the significant bits of each channel.
  pub significant_bits: Option<Vec<u8>>,
  /// Every other ancillary chunk (`iCCP`, `hIST`, `sPLT`, and chunks this
  /// crate has never heard of), in file order.
  pub unknown: Vec<UnknownChunk>,
}

fn check_background(data: &[u8], header: &ImageHeader, palette_len: Option<usize>) -> bool {
  match (header.color_type, data) {
    (ColorType::Palette, [i]) => palette_len.map_or(true, |len| usize::from(*i) < len),
    (ColorType::Grayscale | ColorType::GrayscaleAlpha, [_, _]) => true,
    (ColorType::Rgb | ColorType::Rgba, [_, _, _, _, _, _]) => true,
    _ => false,
  }
}

fn check_significant_bits(data: &[u8], header: &ImageHeader) -> bool {
  let (count, max) = match header.color_type {
    ColorType::Palette => (3, 8),
    other => (other.channel_count(), header.bit_depth),
  };
  data.len() == count && data.iter().all(|&b| b >= 1 && b <= max)
}

impl Metadata {
  /// Reads one ancillary chunk into the metadata.
  ///
  /// Chunks with no dedicated field go into [`unknown`](Self::unknown).
  /// Malformed contents are an error, and the metadata is left unchanged.
  pub fn read_chunk(
    &mut self, ty: ChunkType, data: &[u8], header: &ImageHeader, palette_len: Option<usize>,
  ) -> PngResult<()> {
    let bad = FormatError::BadAncillaryChunk(ty);
    match ty {
      ChunkType::tEXt => self.text.push(TextEntry::from_text_data(data)?),
      ChunkType::zTXt => self.text.push(TextEntry::from_ztxt_data(data)?),
      ChunkType::iTXt => self.text.push(TextEntry::from_itxt_data(data)?),
      ChunkType::gAMA => match *data {
        [a, b, c, d] => self.gamma = Some(u32::from_be_bytes([a, b, c, d])),
        _ => return Err(bad.into()),
      },
      ChunkType::sRGB => match *data {
        [b] => self.srgb_intent = Some(SrgbIntent::from_png_byte(b).ok_or(bad)?),
        _ => return Err(bad.into()),
      },
      ChunkType::pHYs => self.physical = Some(PhysicalDimensions::from_phys_data(data)?),
      ChunkType::tIME => self.modified = Some(Timestamp::from_time_data(data)?),
      ChunkType::tRNS => {
        self.transparency = Some(Transparency::from_trns_data(data, header, palette_len)?)
      }
      ChunkType::bKGD => {
        if !check_background(data, header, palette_len) {
          return Err(bad.into());
        }
        self.background = Some(data.to_vec());
      }
      ChunkType::cHRM => {
        if data.len() != 32 {
          return Err(bad.into());
        }
        let mut values = [0_u32; 8];
        for (v, bytes) in values.iter_mut().zip(data.chunks_exact(4)) {
          *v = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        self.chromaticities = Some(values);
      }
      ChunkType::sBIT => {
        if !check_significant_bits(data, header) {
          return Err(bad.into());
        }
        self.significant_bits = Some(data.to_vec());
      }
      _ => {
        let mut v = Vec::new();
        v.try_reserve(data.len())?;
        v.extend_from_slice(data);
        self.unknown.push(UnknownChunk { ty, data: v });
      }
    }
    Ok(())
  }

  /// Writes the chunks that must come before `PLTE`.
  pub(crate) fn write_before_palette(&self, w: &mut ChunkWriter) -> PngResult<()> {
    if let Some(gamma) = self.gamma {
      w.write_chunk(ChunkType::gAMA, &gamma.to_be_bytes())?;
    }
    if let Some(values) = &self.chromaticities {
      let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
      w.write_chunk(ChunkType::cHRM, &data)?;
    }
    if let Some(intent) = self.srgb_intent {
      w.write_chunk(ChunkType::sRGB, &[intent.to_png_byte()])?;
    }
    for chunk in self.unknown.iter().filter(|c| c.ty == ChunkType::iCCP) {
      w.write_chunk(chunk.ty, &chunk.data)?;
    }
    if let Some(sbit) = &self.significant_bits {
      w.write_chunk(ChunkType::sBIT, sbit)?;
    }
    Ok(())
  }

  /// Writes the chunks that go after `PLTE` and before `IDAT`.
  pub(crate) fn write_before_image_data(
    &self, w: &mut ChunkWriter, compression_level: u8,
  ) -> PngResult<()> {
    if let Some(trns) = &self.transparency {
      w.write_chunk(ChunkType::tRNS, &trns.to_trns_data())?;
    }
    if let Some(bkgd) = &self.background {
      w.write_chunk(ChunkType::bKGD, bkgd)?;
    }
    if let Some(phys) = &self.physical {
      w.write_chunk(ChunkType::pHYs, &phys.to_phys_data())?;
    }
    if let Some(time) = &self.modified {
      w.write_chunk(ChunkType::tIME, &time.to_time_data())?;
    }
    for entry in &self.text {
      w.write_chunk(entry.chunk_type(), &entry.to_chunk_data(compression_level)?)?;
    }
    for chunk in self.unknown.iter().filter(|c| c.ty != ChunkType::iCCP) {
      w.write_chunk(chunk.ty, &chunk.data)?;
    }
    Ok(())
  }

  /// Checks that everything here can legally go with this header.
  pub(crate) fn check_for_header(
    &self, header: &ImageHeader, palette_len: Option<usize>,
  ) -> PngResult<()> {
    if let Some(trns) = &self.transparency {
      trns.check_header(header, palette_len)?;
    }
    if let Some(bkgd) = &self.background {
      if !check_background(bkgd, header, palette_len) {
        return Err(FormatError::BadAncillaryChunk(ChunkType::bKGD).into());
      }
    }
    if let Some(sbit) = &self.significant_bits {
      if !check_significant_bits(sbit, header) {
        return Err(FormatError::BadAncillaryChunk(ChunkType::sBIT).into());
      }
    }
    for chunk in &self.unknown {
      if !chunk.ty.is_valid() || chunk.ty.is_critical() {
        return Err(FormatError::BadChunkType.into());
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gray8() -> ImageHeader {
    ImageHeader::new(4, 4, 8, ColorType::Grayscale).unwrap()
  }

  #[test]
  fn test_trns_by_color_type() {
    let rgb8 = ImageHeader::new(4, 4, 8, ColorType::Rgb).unwrap();
    let indexed = ImageHeader::new(4, 4, 8, ColorType::Palette).unwrap();
    let gray_alpha = ImageHeader::new(4, 4, 8, ColorType::GrayscaleAlpha).unwrap();
    assert_eq!(Transparency::from_trns_data(&[0, 7], &gray8(), None), Ok(Transparency::Gray(7)));
    assert_eq!(
      Transparency::from_trns_data(&[0, 1, 0, 2, 0, 3], &rgb8, None),
      Ok(Transparency::Rgb([1, 2, 3]))
    );
    assert!(Transparency::from_trns_data(&[1, 2, 3], &indexed, Some(2)).is_err());
    assert!(Transparency::from_trns_data(&[0, 0], &gray_alpha, None).is_err());
    assert!(Transparency::from_trns_data(&[0], &gray8(), None).is_err());
  }

  #[test]
  fn test_trns_key_must_fit_bit_depth() {
    let bad = Err(FormatError::BadAncillaryChunk(ChunkType::tRNS));
    assert_eq!(Transparency::from_trns_data(&[0x12, 0x34], &gray8(), None), bad);
    assert_eq!(Transparency::from_trns_data(&[0x01, 0x00], &gray8(), None), bad);
    let white = Transparency::from_trns_data(&[0, 0xFF], &gray8(), None);
    assert_eq!(white, Ok(Transparency::Gray(255)));
    let gray4 = ImageHeader::new(4, 4, 4, ColorType::Grayscale).unwrap();
    assert_eq!(Transparency::from_trns_data(&[0, 15], &gray4, None), Ok(Transparency::Gray(15)));
    assert_eq!(Transparency::from_trns_data(&[0, 16], &gray4, None), bad);
    let gray16 = ImageHeader::new(4, 4, 16, ColorType::Grayscale).unwrap();
    assert_eq!(
      Transparency::from_trns_data(&[0x12, 0x34], &gray16, None),
      Ok(Transparency::Gray(0x1234))
    );
    let rgb8 = ImageHeader::new(4, 4, 8, ColorType::Rgb).unwrap();
    assert_eq!(Transparency::from_trns_data(&[0, 1, 1, 0, 0, 3], &rgb8, None), bad);
    let wide = Transparency::Rgb([1, 256, 3]);
    assert!(wide.check_header(&rgb8, None).is_err());

    let mut m = Metadata::default();
    let e = m.read_chunk(ChunkType::tRNS, &[0x12, 0x34], &gray8(), None);
    assert_eq!(e, Err(FormatError::BadAncillaryChunk(ChunkType::tRNS).into()));
    assert_eq!(m.transparency, None);
  }

  #[test]
  fn test_text_chunks() {
    let t = TextEntry::from_text_data(b"Title\0caf\xe9").unwrap();
    assert_eq!(t.keyword, "Title");
    assert_eq!(t.text, "café");
    assert_eq!(t.to_chunk_data(6).unwrap(), b"Title\0caf\xe9");
    assert_eq!(TextEntry::from_text_data(b"\0x"), Err(FormatError::BadTextKeyword));
    assert!(TextEntry::from_text_data(b"no separator").is_err());
    let long = [b'k'; 80];
    let mut data = long.to_vec();
    data.push(0);
    assert_eq!(TextEntry::from_text_data(&data), Err(FormatError::BadTextKeyword));
  }

  #[test]
  fn test_compressed_text_chunks() {
    let z = TextEntry { kind: TextKind::Compressed, ..TextEntry::new("Comment", "aaaaaaaaaaaaaaaa") };
    let data = z.to_chunk_data(9).unwrap();
    assert_eq!(TextEntry::from_ztxt_data(&data), Ok(z));

    let i = TextEntry {
      keyword: "Author".into(),
      text: "Łukasz ✓".into(),
      kind: TextKind::International {
        language_tag: "pl".into(),
        translated_keyword: "Autor".into(),
        compressed: true,
      },
    };
    let data = i.to_chunk_data(6).unwrap();
    assert_eq!(TextEntry::from_itxt_data(&data), Ok(i));

    // utf-8 can't go in a Latin-1 chunk
    let bad = TextEntry::new("Author", "✓");
    assert!(bad.to_chunk_data(6).is_err());
  }

  #[test]
  fn test_read_chunk_fields() {
    let h = gray8();
    let mut m = Metadata::default();
    m.read_chunk(ChunkType::gAMA, &45455_u32.to_be_bytes(), &h, None).unwrap();
    m.read_chunk(ChunkType::sRGB, &[0], &h, None).unwrap();
    m.read_chunk(ChunkType::pHYs, &[0, 0, 0x0B, 0x13, 0, 0, 0x0B, 0x13, 1], &h, None).unwrap();
    m.read_chunk(ChunkType::tIME, &[0x07, 0xE8, 2, 29, 23, 59, 60], &h, None).unwrap();
    m.read_chunk(ChunkType::bKGD, &[0, 9], &h, None).unwrap();
    m.read_chunk(ChunkType::sBIT, &[5], &h, None).unwrap();
    m.read_chunk(ChunkType(*b"prVt"), &[1, 2, 3], &h, None).unwrap();
    assert_eq!(m.gamma, Some(45455));
    assert_eq!(m.srgb_intent, Some(SrgbIntent::Perceptual));
    assert_eq!(
      m.physical,
      Some(PhysicalDimensions { pixels_per_unit_x: 2835, pixels_per_unit_y: 2835, unit_is_meter: true })
    );
    assert_eq!(m.modified.map(|t| t.year), Some(2024));
    assert_eq!(m.background.as_deref(), Some(&[0_u8, 9][..]));
    assert_eq!(m.unknown.len(), 1);

    assert!(m.read_chunk(ChunkType::sRGB, &[4], &h, None).is_err());
    assert!(m.read_chunk(ChunkType::tIME, &[0x07, 0xE8, 13, 1, 0, 0, 0], &h, None).is_err());
    assert!(m.read_chunk(ChunkType::sBIT, &[9], &h, None).is_err());
    assert!(m.read_chunk(ChunkType::bKGD, &[9], &h, None).is_err());
    assert!(m.read_chunk(ChunkType::cHRM, &[0; 31], &h, None).is_err());
  }
}
