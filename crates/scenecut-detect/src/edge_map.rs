//! Binary edge masks and the morphology applied to them.
//!
//! Masks hold `0` or `255` per pixel. All operations work on the whole array
//! and return a new mask.

/// Value of a set pixel.
pub const ON: u8 = 255;

/// Per-frame binary mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl EdgeMap {
    /// All-zero mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Number of set pixels.
    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Swap set and unset pixels.
    pub fn invert(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|v| 255 - v).collect(),
        }
    }

    /// Grayscale dilation with a `side × side` square footprint.
    ///
    /// For even sides a set pixel grows one pixel further down/right than
    /// up/left.
    pub fn dilate_square(&self, side: usize) -> Self {
        if side <= 1 || self.data.is_empty() {
            return self.clone();
        }
        let before = side / 2;
        let after = side - 1 - before;
        let (w, h) = (self.width, self.height);

        // Separable max filter: rows, then columns.
        let mut rows = vec![0u8; w * h];
        for y in 0..h {
            let row = &self.data[y * w..(y + 1) * w];
            for x in 0..w {
                let lo = x.saturating_sub(before);
                let hi = (x + after).min(w - 1);
                rows[y * w + x] = row[lo..=hi].iter().copied().max().unwrap_or(0);
            }
        }

        let mut out = vec![0u8; w * h];
        for x in 0..w {
            for y in 0..h {
                let lo = y.saturating_sub(before);
                let hi = (y + after).min(h - 1);
                out[y * w + x] = (lo..=hi).map(|yi| rows[yi * w + x]).max().unwrap_or(0);
            }
        }

        Self {
            width: w,
            height: h,
            data: out,
        }
    }

    /// Elementwise saturating add. Masks must have equal dimensions.
    pub fn saturating_add(&self, other: &Self) -> Self {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a.saturating_add(*b))
                .collect(),
        }
    }
}
