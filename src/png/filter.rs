//! The five per-scanline filters.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each filter predicts a byte from its neighbors, and the filtered byte is
//! the difference from that prediction (mod 256). The neighbors are:
//! * `a`: the byte `bpp` bytes to the left (0 at the left edge)
//! * `b`: the byte directly above, in the previous *reconstructed* line (0 on
//!   the first line)
//! * `c`: the byte above and `bpp` to the left (0 when either is missing)
//!
//! Here `bpp` is bytes per complete pixel, rounded up to 1 for pixels
//! smaller than a byte.

use super::*;

/// The filter type byte at the start of each filtered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl FilterType {
  pub const ALL: [FilterType; 5] =
    [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = FormatError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(FormatError::IllegalFilterType(value)),
    })
  }
}

/// How the encoder picks the filter for each line.
///
/// This only affects the compression ratio, any choice decodes the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
  /// Every line uses this filter.
  Fixed(FilterType),
  /// Each line tries all five filters and keeps the one with the smallest sum
  /// of absolute values (bytes taken as signed). Ties go to the lower filter
  /// type.
  #[default]
  Heuristic,
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value.
///
/// If any neighboring pixel isn't present because this is the top or left edge
/// of the image just substitute 0 in that postition.
#[inline]
#[must_use]
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // The calculations have to be exact, i32 can't overflow for any u8 inputs.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is fixed by the format.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reconstruct Filter Type 1
#[inline]
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
#[inline]
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
///
/// The average is computed without overflow, then the add wraps.
#[inline]
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(((ra as u16 + rb as u16) / 2) as u8)
}

/// Reconstruct Filter Type 4
#[inline]
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predictor(ra, rb, rc))
}

/// Unfilters one line in place.
///
/// * `line` is the filtered pixel bytes (not including the filter type byte).
/// * `prior` is the previous line *after* it was reconstructed. For the first
///   line of an image (or of a reduced image) pass all zeroes.
///
/// ## Panics
/// * If `prior` and `line` aren't the same length, or `bpp` is 0.
pub fn unfilter_line(filter: FilterType, bpp: usize, prior: &[u8], line: &mut [u8]) {
  assert_eq!(prior.len(), line.len());
  assert!(bpp > 0);
  let lead = bpp.min(line.len());
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      // the leftmost pixel has a == 0, so it's already correct.
      for x in bpp..line.len() {
        line[x] = reconstruct_sub(line[x], line[x - bpp]);
      }
    }
    FilterType::Up => {
      line.iter_mut().zip(prior.iter()).for_each(|(x, b)| *x = reconstruct_up(*x, *b));
    }
    FilterType::Average => {
      for x in 0..lead {
        line[x] = reconstruct_average(line[x], 0, prior[x]);
      }
      for x in bpp..line.len() {
        line[x] = reconstruct_average(line[x], line[x - bpp], prior[x]);
      }
    }
    FilterType::Paeth => {
      for x in 0..lead {
        line[x] = reconstruct_paeth(line[x], 0, prior[x], 0);
      }
      for x in bpp..line.len() {
        line[x] = reconstruct_paeth(line[x], line[x - bpp], prior[x], prior[x - bpp]);
      }
    }
  }
}

/// Filters one line of raw bytes into `out`.
///
/// This is the inverse of [`unfilter_line`]: `prior` is the previous line of
/// *raw* bytes (zeroes for the first line).
///
/// ## Panics
/// * If `prior`, `raw`, and `out` aren't all the same length, or `bpp` is 0.
pub fn filter_line(filter: FilterType, bpp: usize, prior: &[u8], raw: &[u8], out: &mut [u8]) {
  assert_eq!(prior.len(), raw.len());
  assert_eq!(out.len(), raw.len());
  assert!(bpp > 0);
  for x in 0..raw.len() {
    let a = if x >= bpp { raw[x - bpp] } else { 0 };
    let b = prior[x];
    let c = if x >= bpp { prior[x - bpp] } else { 0 };
    let predicted = match filter {
      FilterType::None => 0,
      FilterType::Sub => a,
      FilterType::Up => b,
      FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
      FilterType::Paeth => paeth_predictor(a, b, c),
    };
    out[x] = raw[x].wrapping_sub(predicted);
  }
}

/// Sum of absolute values with each byte taken as signed.
#[inline]
fn heuristic_cost(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}

/// Filters a line according to the strategy, appending the filter type byte
/// and the filtered bytes to `out`.
///
/// `scratch` is reused between calls to avoid allocation, its contents don't
/// matter.
pub fn filter_line_with_strategy(
  strategy: FilterStrategy, bpp: usize, prior: &[u8], raw: &[u8], scratch: &mut Vec<u8>,
  out: &mut Vec<u8>,
) -> PngResult<FilterType> {
  let chosen = match strategy {
    FilterStrategy::Fixed(filter) => filter,
    FilterStrategy::Heuristic => {
      scratch.clear();
      scratch.try_reserve(raw.len())?;
      scratch.resize(raw.len(), 0);
      let mut best = (FilterType::None, u64::MAX);
      for filter in FilterType::ALL {
        filter_line(filter, bpp, prior, raw, scratch);
        let cost = heuristic_cost(scratch);
        if cost < best.1 {
          best = (filter, cost);
        }
      }
      best.0
    }
  };
  out.try_reserve(1 + raw.len())?;
  out.push(chosen as u8);
  let start = out.len();
  out.resize(start + raw.len(), 0);
  filter_line(chosen, bpp, prior, raw, &mut out[start..]);
  Ok(chosen)
}
