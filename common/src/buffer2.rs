use std::ops::{Index, IndexMut};
use std::slice;

/// Row-major two-dimensional pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.pixels.iter()
    }
}

impl<T: Copy + PartialOrd> Buffer2<T> {
    /// Largest pixel value, or `None` when no pixel is comparable.
    ///
    /// Incomparable values (NaN) are skipped.
    pub fn max_value(&self) -> Option<T> {
        let mut iter = self
            .pixels
            .iter()
            .copied()
            .filter(|v| v.partial_cmp(v).is_some());
        let first = iter.next()?;
        Some(iter.fold(first, |max, v| if v > max { v } else { max }))
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }
}

impl<'a, T> IntoIterator for &'a Buffer2<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.len(), 6);
        assert!(!buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = Buffer2::from_fn(3, 2, |x, y| (y * 10 + x) as u16);
        assert_eq!(buf.pixels(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(buf[(2, 1)], 12);
    }

    #[test]
    fn test_index_mut_tuple() {
        let mut buf = Buffer2::new_filled(2, 2, 0.0f32);
        buf[(1, 1)] = 7.5;
        assert_eq!(buf.pixels(), &[0.0, 0.0, 0.0, 7.5]);
    }

    #[test]
    fn test_max_value() {
        let buf = Buffer2::new(2, 2, vec![3.0f32, 9.5, 1.0, 9.0]);
        assert_eq!(buf.max_value(), Some(9.5));
    }

    #[test]
    fn test_max_value_empty() {
        let buf: Buffer2<f32> = Buffer2::new(0, 0, Vec::new());
        assert_eq!(buf.max_value(), None);
    }

    #[test]
    fn test_max_value_skips_nan() {
        let buf = Buffer2::new(3, 1, vec![2.0f32, f32::NAN, 4.0]);
        assert_eq!(buf.max_value(), Some(4.0));

        let nan_first = Buffer2::new(3, 1, vec![f32::NAN, 5.0f32, 9.0]);
        assert_eq!(nan_first.max_value(), Some(9.0));
    }

    #[test]
    fn test_max_value_all_nan() {
        let buf = Buffer2::new(2, 1, vec![f32::NAN, f32::NAN]);
        assert_eq!(buf.max_value(), None);
    }
}
