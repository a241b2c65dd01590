//! Moving reconstructed scanlines into (and out of) the full raster.
//!
//! For a non-interlaced image each line is a row of the raster. For an Adam7
//! image each line is a row of one reduced image, and every pixel of it is
//! sent out to its position in the full image.

use core::sync::atomic::AtomicBool;

use super::*;

/// The reduced images of a header, in stream order.
///
/// Non-interlaced images are a single "pass" covering everything, with no
/// pass geometry. Empty Adam7 passes are still listed.
pub(crate) fn image_passes(
  header: &ImageHeader,
) -> impl Iterator<Item = (Option<Adam7Pass>, u32, u32)> {
  let interlaced = header.is_interlaced();
  let full = (!interlaced).then_some((None, header.width, header.height));
  full.into_iter().chain(
    passes_with_dimensions(header.width, header.height)
      .filter(move |_| interlaced)
      .map(|(_, pass, w, h)| (Some(pass), w, h)),
  )
}

/// Copies one reconstructed line of a reduced image into the full raster.
///
/// `line` holds `reduced_width` pixels without the filter byte.
pub(crate) fn place_line(
  header: &ImageHeader, raster: &mut [u8], pass: Option<Adam7Pass>, reduced_y: u32,
  reduced_width: u32, line: &[u8],
) {
  let stride = header.stride();
  let pass = match pass {
    None => {
      let start = reduced_y as usize * stride;
      raster[start..start + stride].copy_from_slice(line);
      return;
    }
    Some(pass) => pass,
  };
  let (_, full_y) = pass.full_pos(0, reduced_y);
  let start = full_y as usize * stride;
  let row = &mut raster[start..start + stride];
  match header.bit_depth {
    1 | 2 | 4 => {
      for reduced_x in 0..reduced_width {
        let (full_x, _) = pass.full_pos(reduced_x, reduced_y);
        let v = read_packed(line, reduced_x as usize, header.bit_depth);
        write_packed(row, full_x as usize, header.bit_depth, v);
      }
    }
    _ => {
      let bytes_per_pixel = header.filter_bytes_per_pixel();
      for (reduced_x, pixel) in line.chunks_exact(bytes_per_pixel).enumerate() {
        let (full_x, _) = pass.full_pos(reduced_x as u32, reduced_y);
        let at = full_x as usize * bytes_per_pixel;
        row[at..at + bytes_per_pixel].copy_from_slice(pixel);
      }
    }
  }
}

/// Pulls one line of a reduced image out of the full raster.
///
/// This is the inverse of [`place_line`]. `out` must be exactly one scanline
/// of `reduced_width` pixels.
pub(crate) fn gather_line(
  header: &ImageHeader, raster: &[u8], pass: Option<Adam7Pass>, reduced_y: u32,
  reduced_width: u32, out: &mut [u8],
) {
  let stride = header.stride();
  let pass = match pass {
    None => {
      let start = reduced_y as usize * stride;
      out.copy_from_slice(&raster[start..start + stride]);
      return;
    }
    Some(pass) => pass,
  };
  let (_, full_y) = pass.full_pos(0, reduced_y);
  let start = full_y as usize * stride;
  let row = &raster[start..start + stride];
  match header.bit_depth {
    1 | 2 | 4 => {
      out.fill(0);
      for reduced_x in 0..reduced_width {
        let (full_x, _) = pass.full_pos(reduced_x, reduced_y);
        let v = read_packed(row, full_x as usize, header.bit_depth);
        write_packed(out, reduced_x as usize, header.bit_depth, v);
      }
    }
    _ => {
      let bytes_per_pixel = header.filter_bytes_per_pixel();
      for (reduced_x, pixel) in out.chunks_exact_mut(bytes_per_pixel).enumerate() {
        let (full_x, _) = pass.full_pos(reduced_x as u32, reduced_y);
        let at = full_x as usize * bytes_per_pixel;
        pixel.copy_from_slice(&row[at..at + bytes_per_pixel]);
      }
    }
  }
}

/// Decompresses, unfilters, and de-interlaces all of the image data.
///
/// Each line is unfiltered against the previous reconstructed line of the same
/// reduced image, and the first line of every reduced image uses an all-zero
/// prior line.
pub(crate) fn assemble_image<'b, I>(
  header: &ImageHeader, inflater: &mut ScanlineInflater<'b, I>, cancel: Option<&AtomicBool>,
) -> PngResult<Vec<u8>>
where
  I: Iterator<Item = &'b [u8]>,
{
  let raster_len = header.raster_len().ok_or(PngError::DimensionsTooLarge)?;
  let mut raster = Vec::new();
  raster.try_reserve_exact(raster_len)?;
  raster.resize(raster_len, 0);

  let bpp = header.filter_bytes_per_pixel();
  let longest = header.bytes_per_filterline(header.width);
  let mut line: Vec<u8> = Vec::new();
  line.try_reserve(longest)?;
  let mut prior: Vec<u8> = Vec::new();
  prior.try_reserve(longest)?;

  for (pass_index, (pass, reduced_width, reduced_height)) in image_passes(header).enumerate() {
    if reduced_width == 0 || reduced_height == 0 {
      trace!("pass {pass_index} is empty");
      continue;
    }
    trace!("pass {pass_index}: {reduced_width}x{reduced_height}");
    let line_len = header.bytes_per_scanline(reduced_width);
    prior.clear();
    prior.resize(line_len, 0);
    line.clear();
    line.resize(1 + line_len, 0);
    for reduced_y in 0..reduced_height {
      check_cancel(cancel)?;
      inflater.read_exact(&mut line)?;
      let filter = FilterType::try_from(line[0])?;
      unfilter_line(filter, bpp, &prior, &mut line[1..]);
      place_line(header, &mut raster, pass, reduced_y, reduced_width, &line[1..]);
      prior.copy_from_slice(&line[1..]);
    }
  }
  Ok(raster)
}
