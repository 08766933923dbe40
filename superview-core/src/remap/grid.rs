// ============================================================================
// superview-core/src/remap/grid.rs
// ============================================================================
//
// REMAP GRID GENERATOR: Superview displacement field
//
// Computes, for every output pixel, the source column ffmpeg's remap filter
// should sample. The warp only ever moves pixels horizontally, so the vertical
// map is the identity and every row of the horizontal map is the same.
//
// Two geometries are supported:
// - Stretch: widen the frame to 16:9 (output width derived from the height),
//   stretching the edges more than the centre.
// - Squeeze: keep the frame size and undo a 4:3 -> 16:9 anamorphic stretch.
//
// The generator is a pure function of (width, height, squeeze). Source
// coordinates are NOT clamped to the input width; see `generate`.

/// Which correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarpMode {
    /// Dynamic stretch to 16:9
    Stretch,
    /// Undo a 4:3 footage stretched into 16:9
    Squeeze,
}

impl From<bool> for WarpMode {
    fn from(squeeze: bool) -> Self {
        if squeeze {
            WarpMode::Squeeze
        } else {
            WarpMode::Stretch
        }
    }
}

/// Output dimensions for an input of `width` x `height`.
///
/// In stretch mode the width is `height * 16 / 9` rounded down to an even
/// number, since hardware encoders reject odd widths with 4:2:0 chroma.
pub fn output_dimensions(width: u32, height: u32, mode: WarpMode) -> (u32, u32) {
    match mode {
        WarpMode::Squeeze => (width, height),
        WarpMode::Stretch => {
            let widened = (u64::from(height) * 16 / 9).min(u64::from(u32::MAX)) as u32;
            (widened & !1, height)
        }
    }
}

/// Two dense, same-shaped integer maps (row-major, origin top-left) telling
/// the remap filter which source pixel feeds each output pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapGrid {
    width: u32,
    height: u32,
    x_map: Vec<i32>,
    y_map: Vec<i32>,
}

impl RemapGrid {
    /// Output width (columns of each map).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height (rows of each map).
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn x_map(&self) -> &[i32] {
        &self.x_map
    }

    pub fn y_map(&self) -> &[i32] {
        &self.y_map
    }

    /// Source column sampled for output pixel `(x, y)`.
    pub fn x_at(&self, x: u32, y: u32) -> i32 {
        self.x_map[self.index(x, y)]
    }

    /// Source row sampled for output pixel `(x, y)`.
    pub fn y_at(&self, x: u32, y: u32) -> i32 {
        self.y_map[self.index(x, y)]
    }

    /// Rows of the horizontal map.
    pub fn x_rows(&self) -> impl Iterator<Item = &[i32]> {
        self.x_map.chunks(self.row_len())
    }

    /// Rows of the vertical map.
    pub fn y_rows(&self) -> impl Iterator<Item = &[i32]> {
        self.y_map.chunks(self.row_len())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        y as usize * self.width as usize + x as usize
    }

    // chunks() panics on zero, an empty grid simply yields no rows
    fn row_len(&self) -> usize {
        (self.width as usize).max(1)
    }
}

/// Generates the remap grid for an input of `width` x `height`.
///
/// The horizontal source coordinate is `floor(sx ∓ offset)` where `sx` centres
/// the input inside the output and `offset` is the mode-specific warp. Values
/// are left unclamped: at the extreme edges they may fall outside
/// `[0, width)` and ffmpeg's remap filter decides what to sample there.
pub fn generate(width: u32, height: u32, squeeze: bool) -> RemapGrid {
    let mode = WarpMode::from(squeeze);
    let (out_w, out_h) = output_dimensions(width, height, mode);

    let row: Vec<i32> = (0..out_w)
        .map(|x| source_column(x, out_w, width, mode))
        .collect();

    let cells = out_w as usize * out_h as usize;
    let mut x_map = Vec::with_capacity(cells);
    let mut y_map = Vec::with_capacity(cells);
    for y in 0..out_h {
        x_map.extend_from_slice(&row);
        y_map.extend(std::iter::repeat_n(y as i32, out_w as usize));
    }

    log::debug!(
        "Generated {:?} remap grid {}x{} -> {}x{}",
        mode,
        width,
        height,
        out_w,
        out_h
    );

    RemapGrid {
        width: out_w,
        height: out_h,
        x_map,
        y_map,
    }
}

/// Source column for output column `x`.
fn source_column(x: u32, out_w: u32, width: u32, mode: WarpMode) -> i32 {
    let xf = f64::from(x);
    // integer difference first, then halve
    let half_diff = (i64::from(out_w) - i64::from(width)) as f64 / 2.0;
    let sx = xf - half_diff;
    let tx = (xf / f64::from(out_w) - 0.5) * 2.0;

    let source = match mode {
        WarpMode::Stretch => {
            let mut offset = tx * tx * half_diff;
            if tx < 0.0 {
                offset = -offset;
            }
            sx - offset
        }
        WarpMode::Squeeze => {
            let inv = 1.0 - tx.abs();
            // the 7/16 band factors use integer division on the width
            let band = f64::from((out_w / 16) * 7) / 2.0;
            let spread = f64::from((out_w / 7) * 16) / 2.0;
            let scaled = inv / 16.0 * 7.0;
            let mut offset = inv * band - scaled * scaled * spread;
            if tx < 0.0 {
                offset = -offset;
            }
            sx + offset
        }
    };

    source.floor() as i32
}
