//! Per-stroke coverage bookkeeping

/// Highest alpha already applied to each pixel during the current stroke.
///
/// Consecutive segments of one stroke overlap at their joins. Blending each
/// segment independently would darken the overlap; instead only the coverage
/// that exceeds what the stroke already laid down is applied, so the whole
/// stroke composites as a single path.
pub struct CoverageMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
    /// Region written since the last reset (x_min, y_min, x_max, y_max), exclusive max
    touched: Option<(u32, u32, u32, u32)>,
}

impl CoverageMask {
    /// Create an empty mask; storage is allocated on first use
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: Vec::new(),
            touched: None,
        }
    }

    /// Forget all coverage, zeroing only the region touched since the last reset
    pub fn reset(&mut self) {
        let Some((x_min, y_min, x_max, y_max)) = self.touched.take() else {
            return;
        };
        for y in y_min..y_max {
            let row = (y as usize) * (self.width as usize);
            self.values[row + x_min as usize..row + x_max as usize].fill(0.0);
        }
    }

    /// Coverage already applied at a pixel
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if self.values.is_empty() || x >= self.width || y >= self.height {
            return 0.0;
        }
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Raise the coverage at a pixel to `target`.
    ///
    /// Returns the incremental alpha to composite so that the pixel ends up
    /// as if `target` had been applied once, or None when the stroke already
    /// covers it at least that much.
    #[inline]
    pub fn raise(&mut self, x: u32, y: u32, target: f32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        if self.values.is_empty() {
            self.values = vec![0.0; (self.width as usize) * (self.height as usize)];
        }
        let index = (y as usize) * (self.width as usize) + x as usize;
        let previous = self.values[index];
        if target <= previous || previous >= 1.0 {
            return None;
        }
        self.values[index] = target;
        self.touch(x, y);
        Some((target - previous) / (1.0 - previous))
    }

    fn touch(&mut self, x: u32, y: u32) {
        self.touched = Some(match self.touched {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }
}
