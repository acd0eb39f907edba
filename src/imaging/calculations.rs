//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size after shrinking to fit within `max_dimension`.
///
/// Images whose larger side is already within the limit keep their size.
/// Otherwise the larger side becomes `max_dimension` and the smaller side is
/// scaled by the same factor, truncating any fraction (never below 1px).
///
/// # Examples
/// ```
/// # use quire::imaging::shrink_dimensions;
/// // Landscape: 1024x768 bounded by 512 → 512x384
/// assert_eq!(shrink_dimensions((1024, 768), 512), (512, 384));
///
/// // Portrait: 600x1000 bounded by 512 → 307x512 (307.2 truncated)
/// assert_eq!(shrink_dimensions((600, 1000), 512), (307, 512));
/// ```
pub fn shrink_dimensions(size: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (w, h) = size;
    if w == 0 || h == 0 || w.max(h) <= max_dimension {
        return size;
    }

    let max = u64::from(max_dimension);
    if w > h {
        let scaled = max * u64::from(h) / u64::from(w);
        (max_dimension, (scaled as u32).max(1))
    } else {
        let scaled = max * u64::from(w) / u64::from(h);
        ((scaled as u32).max(1), max_dimension)
    }
}

/// Side length and paste offset for centring an image on a square canvas.
///
/// Returns `(side, x, y)`: the canvas is `side`×`side` where `side` is the
/// larger input dimension, and the image goes at `(x, y)`.
pub fn square_canvas(size: (u32, u32)) -> (u32, u32, u32) {
    let (w, h) = size;
    let side = w.max(h);
    (side, (side - w) / 2, (side - h) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // shrink_dimensions tests
    // =========================================================================

    #[test]
    fn landscape_bounded_by_width() {
        assert_eq!(shrink_dimensions((1024, 768), 512), (512, 384));
    }

    #[test]
    fn portrait_bounded_by_height() {
        assert_eq!(shrink_dimensions((768, 1024), 512), (384, 512));
    }

    #[test]
    fn fractional_side_truncates() {
        assert_eq!(shrink_dimensions((1000, 333), 512), (512, 170));
    }

    #[test]
    fn square_shrinks_both_sides() {
        assert_eq!(shrink_dimensions((2000, 2000), 512), (512, 512));
    }

    #[test]
    fn small_image_unchanged() {
        assert_eq!(shrink_dimensions((300, 200), 512), (300, 200));
    }

    #[test]
    fn exact_limit_unchanged() {
        assert_eq!(shrink_dimensions((512, 100), 512), (512, 100));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(shrink_dimensions((10_000, 1), 512), (512, 1));
    }

    #[test]
    fn large_dimensions_do_not_overflow() {
        assert_eq!(
            shrink_dimensions((u32::MAX, u32::MAX / 2), 1000),
            (1000, 499)
        );
    }

    // =========================================================================
    // square_canvas tests
    // =========================================================================

    #[test]
    fn square_canvas_centres_landscape() {
        assert_eq!(square_canvas((400, 300)), (400, 0, 50));
    }

    #[test]
    fn square_canvas_centres_portrait() {
        assert_eq!(square_canvas((300, 401)), (401, 50, 0));
    }

    #[test]
    fn square_canvas_of_square_is_identity() {
        assert_eq!(square_canvas((64, 64)), (64, 0, 0));
    }
}
