use crate::glyphs::{drawn_chars, glyph, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use image::{Rgb, RgbImage};

pub(crate) type Color = [u8; 3];

/// A raster surface addressed in layout pixels. Every operation is scaled to
/// device pixels and alpha blended onto an opaque background.
pub(crate) struct Canvas {
    image: RgbImage,
    scale: f64,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32, scale: f64, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
            scale,
        }
    }

    pub(crate) fn into_image(self) -> RgbImage {
        self.image
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f64) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height())
        {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (channel, value) in pixel.0.iter_mut().zip(color) {
            let mixed = f64::from(*channel) * (1.0 - alpha) + f64::from(value) * alpha;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    fn device(&self, value: f64) -> f64 {
        value * self.scale
    }

    pub(crate) fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, alpha: f64) {
        let (left, top) = (self.device(x).floor() as i64, self.device(y).floor() as i64);
        let right = self.device(x + width).ceil() as i64;
        let bottom = self.device(y + height).ceil() as i64;
        for py in top..bottom {
            for px in left..right {
                self.blend(px, py, color, alpha);
            }
        }
    }

    pub(crate) fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let line = 1.0;
        self.fill_rect(x, y, width, line, color, 1.0);
        self.fill_rect(x, y + height - line, width, line, color, 1.0);
        self.fill_rect(x, y, line, height, color, 1.0);
        self.fill_rect(x + width - line, y, line, height, color, 1.0);
    }

    /// Fills a ring between `inner` and `outer` radius. An `inner` of zero
    /// gives a disc.
    pub(crate) fn fill_ring(&mut self, cx: f64, cy: f64, inner: f64, outer: f64, color: Color, alpha: f64) {
        let (cx, cy) = (self.device(cx), self.device(cy));
        let (inner, outer) = (self.device(inner), self.device(outer));
        let (top, bottom) = ((cy - outer).floor() as i64, (cy + outer).ceil() as i64);
        let (left, right) = ((cx - outer).floor() as i64, (cx + outer).ceil() as i64);
        for py in top..=bottom {
            for px in left..=right {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance <= outer && distance >= inner {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    pub(crate) fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color, alpha: f64) {
        self.fill_ring(cx, cy, 0.0, radius, color, alpha);
    }

    pub(crate) fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
        let steps = (self.device(length).ceil() as usize).max(1);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            self.fill_circle(x, y, width / 2.0, color, 1.0);
        }
    }

    /// Alternating `dash` long strokes and gaps.
    pub(crate) fn dashed_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, dash: f64, color: Color) {
        let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
        if length == 0.0 {
            return;
        }
        let (ux, uy) = ((to.0 - from.0) / length, (to.1 - from.1) / length);
        let mut start = 0.0;
        while start < length {
            let end = (start + dash).min(length);
            self.line(
                (from.0 + ux * start, from.1 + uy * start),
                (from.0 + ux * end, from.1 + uy * end),
                width,
                color,
            );
            start += dash * 2.0;
        }
    }

    /// Draws `text` with its top left corner at `(x, y)`. Every glyph pixel
    /// becomes a `cell` sized square.
    pub(crate) fn text(&mut self, x: f64, y: f64, text: &str, cell: f64, color: Color, alpha: f64) {
        for (index, ch) in drawn_chars(text).enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let left = x + (index as f64) * f64::from(ADVANCE) * cell;
            for (row, bits) in rows.into_iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        self.fill_rect(
                            left + f64::from(col) * cell,
                            y + row as f64 * cell,
                            cell,
                            cell,
                            color,
                            alpha,
                        );
                    }
                }
            }
        }
    }
}

pub(crate) fn text_width(text: &str, cell: f64) -> f64 {
    match drawn_chars(text).count() {
        0 => 0.0,
        count => (count as f64 * f64::from(ADVANCE) - 1.0) * cell,
    }
}

pub(crate) fn text_height(cell: f64) -> f64 {
    f64::from(GLYPH_HEIGHT) * cell
}
