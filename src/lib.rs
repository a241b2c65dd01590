#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![forbid(unsafe_code)]

//! A crate for PNG encoding and decoding.
//!
//! The whole codec lives in the [`png`] module: chunk parsing and writing,
//! the five scanline filters, Adam7 interlacing, and the plumbing between all
//! of that and the zlib stream. Actual DEFLATE work is handed off to
//! [`miniz_oxide`].
//!
//! ```no_run
//! # fn main() -> Result<(), pngkit::PngError> {
//! let bytes: &[u8] = unimplemented!("data from somewhere");
//! let decoded = pngkit::png::decode(bytes)?;
//! println!("{}x{}", decoded.header.width, decoded.header.height);
//! let again = pngkit::png::encode(
//!   &decoded.image,
//!   decoded.palette.as_ref(),
//!   &pngkit::png::EncodeOptions::default(),
//! )?;
//! # Ok(())
//! # }
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod png;

/// Used by image formats that support sRGB colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SrgbIntent {
  /// for images preferring good adaptation to the output device gamut at the
  /// expense of colorimetric accuracy, such as photographs.
  Perceptual,
  /// for images requiring colour appearance matching (relative to the output
  /// device white point), such as logos.
  RelativeColorimetric,
  /// for images preferring preservation of saturation at the expense of hue and
  /// lightness, such as charts and graphs.
  Saturation,
  /// for images requiring preservation of absolute colorimetry, such as
  /// previews of images destined for a different output device (proofs).
  AbsoluteColorimetric,
}
impl SrgbIntent {
  /// Parses the PNG `sRGB` byte.
  #[inline]
  #[must_use]
  pub const fn from_png_byte(b: u8) -> Option<Self> {
    Some(match b {
      0 => Self::Perceptual,
      1 => Self::RelativeColorimetric,
      2 => Self::Saturation,
      3 => Self::AbsoluteColorimetric,
      _ => return None,
    })
  }
  /// The PNG `sRGB` byte for this intent.
  #[inline]
  #[must_use]
  pub const fn to_png_byte(self) -> u8 {
    match self {
      Self::Perceptual => 0,
      Self::RelativeColorimetric => 1,
      Self::Saturation => 2,
      Self::AbsoluteColorimetric => 3,
    }
  }
}
