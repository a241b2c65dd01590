//! Module for pixel formats.
//!
//! The decoder hands out raw sample data in whatever layout the PNG used (see
//! [`RasterImage`](crate::png::RasterImage)). The types here are for the two
//! places where a fixed layout is needed: palette entries, which PNG always
//! stores as 8-bit RGB, and the RGBA8 conversion for display.
//!
//! ### Between Bit Depths
//! When increasing a bit depth with integer math you should use the current
//! bit pattern as the top bits, and then copy that bit pattern down however
//! many times is required to fill in all newly added bits. When reducing a bit
//! depth just keep the top bits.

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl From<RGB8> for RGBA8 {
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: u8::MAX }
  }
}

impl RGBA8 {
  /// An opaque gray pixel.
  #[inline]
  #[must_use]
  pub const fn gray(y: u8) -> Self {
    Self { r: y, g: y, b: y, a: u8::MAX }
  }
}
