//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Library Design Assumptions
//!
//! * The entire PNG encoded source data stream is a single byte slice.
//! * The decoded image is a single [`RasterImage`] buffer, in the same packed
//!   layout that PNG scanlines use.
//!
//! The compressed image data is *not* gathered into one buffer, and the
//! decompressed (filtered) data never exists all at once either. Each `IDAT`
//! slice is fed straight from the input to the inflater, and scanlines come
//! out one at a time to be unfiltered and placed into the final image.
//!
//! ## Decoding
//!
//! Call [`decode`] (or [`decode_with`] for custom [`DecodeOptions`]). You get
//! back a [`DecodedPng`] with the header, the palette (if any), the pixels,
//! and the ancillary [`Metadata`]. Use [`Decoder`] directly to also get a
//! cancel flag.
//!
//! The stages are:
//!
//! 1) The signature is checked, and chunks are read one at a time with
//!    [`ChunkReader`]. Every chunk's CRC is checked.
//! 2) The first chunk must be `IHDR`, which gives the [`ImageHeader`].
//! 3) `PLTE` and ancillary chunks are collected, and the data of every `IDAT`
//!    is noted, up to `IEND`.
//! 4) The `IDAT` data is inflated as one zlib stream. Each line is unfiltered
//!    against the line before it, then placed into the raster (spread out
//!    according to [`adam7`] if the image is interlaced).
//!
//! ## Encoding
//!
//! Call [`encode`], or use [`Encoder`] to also write [`Metadata`]. This runs
//! the same stages backwards.
//!
//! ## Parsing Errors
//!
//! Quoting [section 13.2 of the PNG
//! spec](https://www.w3.org/TR/2003/REC-PNG-20031110/#13Decoders.Errors):
//!
//! > Errors that have little or no effect on the processing of the image may be
//! > ignored, while those that affect critical data shall be dealt with in a
//! > manner appropriate to the application.
//!
//! Anything wrong with critical data (the signature, `IHDR`, `PLTE`, `IDAT`,
//! `IEND`, chunk order, CRCs of critical chunks, the zlib stream and its
//! Adler-32) always fails the decode. Ancillary chunk problems fail the decode
//! by default, but [`DecodeOptions::lenient`] turns them into log warnings
//! and drops the chunk. Nothing is ever returned from a failed decode.

use core::{
  fmt::{Debug, Write},
  sync::atomic::{AtomicBool, Ordering},
};

use alloc::{boxed::Box, string::String, vec::Vec};

#[cfg(test)]
use alloc::vec;

use log::{debug, trace, warn};

use crate::{
  pixel_formats::{RGB8, RGBA8},
  DecompressionError, FormatError, IntegrityError, PngError, PngResult, SrgbIntent,
  StructuralError, UnsupportedFeature,
};

pub mod adam7;
pub use adam7::*;

mod assemble;
use assemble::*;

mod chunk;
pub use chunk::*;

mod crc32;
pub use crc32::*;

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;

mod filter;
pub use filter::*;

mod header;
pub use header::*;

mod metadata;
pub use metadata::*;

mod palette;
pub use palette::*;

mod raster;
pub use raster::*;

mod zlib;
pub use zlib::*;


/// Fails with [`PngError::Cancelled`] once the flag is set.
#[inline]
fn check_cancel(flag: Option<&AtomicBool>) -> PngResult<()> {
  match flag {
    Some(flag) if flag.load(Ordering::Relaxed) => Err(PngError::Cancelled),
    _ => Ok(()),
  }
}
