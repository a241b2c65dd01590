use super::*;

/// Palette data
///
/// Palette entries are always RGB.
///
/// If you want to have a paletted image with transparency then the transparency
/// info goes in a separate transparency chunk (see
/// [`Transparency::Palette`]).
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Palette(Vec<RGB8>);
impl Debug for Palette {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("Palette").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}
impl Palette {
  /// The most entries any palette can have.
  pub const MAX_ENTRIES: usize = 256;

  /// Makes a palette from entries, there must be 1 to 256 of them.
  #[inline]
  pub fn new(entries: Vec<RGB8>) -> Result<Self, FormatError> {
    if entries.is_empty() || entries.len() > Self::MAX_ENTRIES {
      Err(FormatError::BadPaletteLength(entries.len() * 3))
    } else {
      Ok(Self(entries))
    }
  }

  /// Parses `PLTE` chunk data.
  ///
  /// The length must be a non-zero multiple of 3, with no more than 256
  /// entries.
  pub fn from_plte_data(data: &[u8]) -> PngResult<Self> {
    let entries: &[RGB8] = bytemuck::try_cast_slice(data)
      .map_err(|_| FormatError::BadPaletteLength(data.len()))?;
    if entries.is_empty() || entries.len() > Self::MAX_ENTRIES {
      return Err(FormatError::BadPaletteLength(data.len()).into());
    }
    let mut v = Vec::new();
    v.try_reserve(entries.len())?;
    v.extend_from_slice(entries);
    Ok(Self(v))
  }

  /// The `PLTE` chunk data for this palette.
  #[inline]
  #[must_use]
  pub fn as_plte_data(&self) -> &[u8] {
    bytemuck::cast_slice(&self.0)
  }

  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[RGB8] {
    &self.0
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[inline]
  #[must_use]
  pub fn get(&self, index: u8) -> Option<RGB8> {
    self.0.get(usize::from(index)).copied()
  }

  /// Checks that a palette image of this bit depth can use every entry.
  ///
  /// A palette can't have more entries than the bit depth can index.
  #[inline]
  pub fn check_fits_bit_depth(&self, bit_depth: u8) -> Result<(), FormatError> {
    let max = 1_usize << bit_depth.min(8);
    if self.0.len() > max {
      Err(FormatError::BadPaletteLength(self.0.len() * 3))
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_palette_lengths() {
    assert_eq!(
      Palette::from_plte_data(&[]),
      Err(PngError::Format(FormatError::BadPaletteLength(0)))
    );
    assert_eq!(
      Palette::from_plte_data(&[1, 2, 3, 4]),
      Err(PngError::Format(FormatError::BadPaletteLength(4)))
    );
    let too_big = [7_u8; 257 * 3];
    assert!(Palette::from_plte_data(&too_big).is_err());
    let full = [7_u8; 256 * 3];
    let p = Palette::from_plte_data(&full).unwrap();
    assert_eq!(p.len(), 256);
    assert!(p.check_fits_bit_depth(8).is_ok());
    assert!(p.check_fits_bit_depth(4).is_err());
  }

  #[test]
  fn test_palette_entries() {
    let p = Palette::from_plte_data(&[1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(p.get(1), Some(RGB8 { r: 4, g: 5, b: 6 }));
    assert_eq!(p.get(2), None);
    assert_eq!(p.as_plte_data(), &[1, 2, 3, 4, 5, 6]);
  }
}
