use image::{GrayImage, Luma};

use super::{Canvas, CanvasState, Paint};
use crate::geometry::Rect;
use crate::matrix::Matrix;

/// An alpha-only offscreen bitmap.
#[derive(Debug, Clone)]
pub struct MaskBuffer {
    pixels: GrayImage,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y).0[0]
    }

    /// Alpha with out-of-range coordinates clamped to the nearest edge pixel.
    pub fn alpha_at_clamped(&self, x: i64, y: i64) -> u8 {
        if self.width() == 0 || self.height() == 0 {
            return 0;
        }
        let x = x.clamp(0, self.width() as i64 - 1) as u32;
        let y = y.clamp(0, self.height() as i64 - 1) as u32;
        self.alpha_at(x, y)
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Luma([0]);
        }
    }

    pub fn image(&self) -> &GrayImage {
        &self.pixels
    }

    fn blend(&mut self, x: u32, y: u32, src: u8) {
        let dst = self.alpha_at(x, y) as u32;
        let src = src as u32;
        let out = src + dst * (255 - src) / 255;
        self.pixels.put_pixel(x, y, Luma([out.min(255) as u8]));
    }
}

/// Rasterizes shapes into a [`MaskBuffer`]. Only coverage is kept; a pixel
/// is covered when its center falls inside the shape.
pub struct MaskCanvas<'a> {
    buffer: &'a mut MaskBuffer,
    state: CanvasState,
}

impl<'a> MaskCanvas<'a> {
    pub fn new(buffer: &'a mut MaskBuffer) -> Self {
        Self {
            buffer,
            state: CanvasState::new(),
        }
    }

    fn fill(&mut self, local_bounds: Rect, alpha: u8, inside: impl Fn(f32, f32) -> bool) {
        if alpha == 0 {
            return;
        }
        let mut area = self.state.map_rect(local_bounds);
        if let Some(clip) = self.state.clip() {
            area = area.intersect(&clip);
        }
        area = area.intersect(&Rect::new(
            0.0,
            0.0,
            self.buffer.width() as f32,
            self.buffer.height() as f32,
        ));
        if area.is_empty() {
            return;
        }

        let inverse = self.state.matrix().inverse();
        let x0 = area.left().floor().max(0.0) as u32;
        let y0 = area.top().floor().max(0.0) as u32;
        let x1 = (area.right().ceil() as u32).min(self.buffer.width());
        let y1 = (area.bottom().ceil() as u32).min(self.buffer.height());
        let clip = self.state.clip();
        for y in y0..y1 {
            for x in x0..x1 {
                let (dx, dy) = (x as f32 + 0.5, y as f32 + 0.5);
                if clip.is_some_and(|clip| !clip.contains(dx, dy)) {
                    continue;
                }
                let (lx, ly) = inverse.map_point(dx, dy);
                if inside(lx, ly) {
                    self.buffer.blend(x, y, alpha);
                }
            }
        }
    }
}

impl Canvas for MaskCanvas<'_> {
    fn save(&mut self) -> usize {
        self.state.save()
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn save_count(&self) -> usize {
        self.state.save_count()
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.concat(&Matrix::translate(dx, dy));
    }

    fn rotate(&mut self, degrees: f32) {
        self.state.concat(&Matrix::rotate_degrees(degrees));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.concat(&Matrix::scale_xy(sx, sy));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.fill(rect, paint.alpha(), |x, y| rect.contains(x, y));
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let bounds = Rect::from_ltrb(cx - radius, cy - radius, cx + radius, cy + radius);
        let r2 = radius * radius;
        self.fill(bounds, paint.alpha(), |x, y| {
            let (dx, dy) = (x - cx, y - cy);
            dx * dx + dy * dy <= r2
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_rect_fill_with_translate() {
        let mut buffer = MaskBuffer::new(10, 10);
        {
            let mut canvas = MaskCanvas::new(&mut buffer);
            canvas.translate(-10.0, -10.0);
            canvas.draw_rect(Rect::new(12.0, 12.0, 3.0, 3.0), &Paint::new(Color::BLACK));
        }
        assert_eq!(buffer.alpha_at(2, 2), 255);
        assert_eq!(buffer.alpha_at(4, 4), 255);
        assert_eq!(buffer.alpha_at(5, 5), 0);
        assert_eq!(buffer.alpha_at(1, 1), 0);
    }

    #[test]
    fn test_translucent_blend_and_clear() {
        let mut buffer = MaskBuffer::new(4, 4);
        let paint = Paint::new(Color::BLACK.with_alpha(128));
        {
            let mut canvas = MaskCanvas::new(&mut buffer);
            canvas.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), &paint);
            canvas.draw_rect(Rect::new(0.0, 0.0, 2.0, 2.0), &paint);
        }
        assert_eq!(buffer.alpha_at(3, 3), 128);
        assert!(buffer.alpha_at(0, 0) > 128);
        buffer.clear();
        assert_eq!(buffer.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_circle_and_clip() {
        let mut buffer = MaskBuffer::new(20, 20);
        {
            let mut canvas = MaskCanvas::new(&mut buffer);
            canvas.clip_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
            canvas.draw_circle(10.0, 10.0, 5.0, &Paint::new(Color::WHITE));
        }
        assert_eq!(buffer.alpha_at(8, 10), 255);
        assert_eq!(buffer.alpha_at(12, 10), 0);
        assert_eq!(buffer.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_clamped_lookup() {
        let mut buffer = MaskBuffer::new(2, 1);
        buffer.blend(1, 0, 200);
        assert_eq!(buffer.alpha_at_clamped(50, -3), 200);
        assert_eq!(buffer.alpha_at_clamped(-50, 0), 0);
    }
}
