//! Adam7 interlacing geometry.
//!
//! The PNG interlacing scheme converts a full image to 7 reduced images, each
//! with potentially separate dimensions. Each reduced image is filtered on its
//! own, as if it were a separate small image.
//!
//! ```text
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```

/// Where one pass's pixels come from in the full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Adam7Pass {
  pub x_start: u32,
  pub y_start: u32,
  pub x_step: u32,
  pub y_step: u32,
}
impl Adam7Pass {
  /// Converts a reduced image location into the full image location.
  #[inline]
  #[must_use]
  pub const fn full_pos(&self, reduced_x: u32, reduced_y: u32) -> (u32, u32) {
    (self.x_start + reduced_x * self.x_step, self.y_start + reduced_y * self.y_step)
  }
}

/// The seven passes, in stream order.
pub const ADAM7_PASSES: [Adam7Pass; 7] = [
  Adam7Pass { x_start: 0, y_start: 0, x_step: 8, y_step: 8 },
  Adam7Pass { x_start: 4, y_start: 0, x_step: 8, y_step: 8 },
  Adam7Pass { x_start: 0, y_start: 4, x_step: 4, y_step: 8 },
  Adam7Pass { x_start: 2, y_start: 0, x_step: 4, y_step: 4 },
  Adam7Pass { x_start: 0, y_start: 2, x_step: 2, y_step: 4 },
  Adam7Pass { x_start: 1, y_start: 0, x_step: 2, y_step: 2 },
  Adam7Pass { x_start: 0, y_start: 1, x_step: 1, y_step: 2 },
];

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// Knowing the size of each reduced image is important for the unfiltering
/// process.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[inline]
#[must_use]
pub const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let full_patterns_wide = full_width / 8;
  let full_patterns_high = full_height / 8;
  //
  let partial_pattern_width = full_width % 8;
  let partial_pattern_height = full_height % 8;
  //
  let zero = (full_width, full_height);
  //
  let first = (
    full_patterns_wide + (partial_pattern_width + 7) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let second = (
    full_patterns_wide + (partial_pattern_width + 3) / 8,
    full_patterns_high + (partial_pattern_height + 7) / 8,
  );
  let third = (
    full_patterns_wide * 2 + ((partial_pattern_width + 3) / 4),
    full_patterns_high + ((partial_pattern_height + 3) / 8),
  );
  let fourth = (
    full_patterns_wide * 2 + (partial_pattern_width + 1) / 4,
    full_patterns_high * 2 + (partial_pattern_height + 3) / 4,
  );
  let fifth = (
    full_patterns_wide * 4 + ((partial_pattern_width + 1) / 2),
    full_patterns_high * 2 + (partial_pattern_height + 1) / 4,
  );
  let sixth = (
    full_patterns_wide * 4 + partial_pattern_width / 2,
    full_patterns_high * 4 + ((partial_pattern_height + 1) / 2),
  );
  let seventh = (
    full_patterns_wide * 8 + partial_pattern_width,
    full_patterns_high * 4 + (partial_pattern_height / 2),
  );
  //
  [zero, first, second, third, fourth, fifth, sixth, seventh]
}

/// The passes of an image along with each one's reduced dimensions.
///
/// Passes with no pixels (zero width or zero height) are still listed, it's
/// up to the caller to skip them.
#[inline]
pub fn passes_with_dimensions(
  full_width: u32, full_height: u32,
) -> impl Iterator<Item = (usize, Adam7Pass, u32, u32)> {
  let dims = reduced_image_dimensions(full_width, full_height);
  ADAM7_PASSES.into_iter().enumerate().map(move |(i, pass)| (i, pass, dims[i + 1].0, dims[i + 1].1))
}
