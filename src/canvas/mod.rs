//! The drawing surface drawables paint into.
//!
//! [`Canvas`] is the narrow interface every drawable draws through. Two
//! implementations ship with the crate: [`RecordingCanvas`], a display list
//! that can also stand in for a hardware-accelerated surface, and
//! [`MaskCanvas`], a tiny rasterizer used to render alpha masks.

mod mask;
mod property;
mod recording;

use std::sync::Arc;

pub use mask::{MaskBuffer, MaskCanvas};
pub use property::{
    AnimatedProperty, CanvasPaintProperty, CanvasProperty, PropertyCanvas, RenderThreadAnimator,
};
pub use recording::{DrawOp, RecordedCircle, RecordingCanvas};

use crate::color::Color;
use crate::geometry::Rect;
use crate::matrix::Matrix;

pub trait Canvas {
    /// Push the current transform and clip. Returns the save count before the push.
    fn save(&mut self) -> usize;

    /// Pop one saved transform and clip.
    fn restore(&mut self);

    fn save_count(&self) -> usize;

    /// Pop saved states until the save count equals `count`.
    fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    fn translate(&mut self, dx: f32, dy: f32);

    /// Rotate clockwise, in degrees, about the current origin.
    fn rotate(&mut self, degrees: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    fn clip_rect(&mut self, rect: Rect);

    fn draw_rect(&mut self, rect: Rect, paint: &Paint);

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint);

    fn is_hardware_accelerated(&self) -> bool {
        false
    }

    /// The property-animation API, when this canvas records for a render thread.
    fn property_canvas(&mut self) -> Option<&mut dyn PropertyCanvas> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    SrcOver,
    /// Keep the destination's coverage, take the source's color.
    SrcIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorFilter {
    PorterDuff { color: Color, mode: BlendMode },
}

/// Source of per-pixel coverage for a paint.
#[derive(Debug, Clone)]
pub enum Shader {
    /// An alpha mask, clamped at its edges. `offset` maps the mask's origin
    /// into the local coordinates of whatever is drawn with it.
    Mask {
        buffer: Arc<MaskBuffer>,
        offset: (f32, f32),
    },
}

impl PartialEq for Shader {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Shader::Mask { buffer, offset },
                Shader::Mask {
                    buffer: other_buffer,
                    offset: other_offset,
                },
            ) => Arc::ptr_eq(buffer, other_buffer) && offset == other_offset,
        }
    }
}

impl Shader {
    /// Mask coverage at a point in the drawing's local coordinates.
    pub fn coverage_at(&self, x: f32, y: f32) -> u8 {
        match self {
            Shader::Mask { buffer, offset } => {
                buffer.alpha_at_clamped((x - offset.0).floor() as i64, (y - offset.1).floor() as i64)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub shader: Option<Shader>,
    pub color_filter: Option<ColorFilter>,
    pub anti_alias: bool,
}

impl Paint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            shader: None,
            color_filter: None,
            anti_alias: true,
        }
    }

    pub fn alpha(&self) -> u8 {
        self.color.alpha()
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.color = self.color.with_alpha(alpha);
    }

    pub fn with_alpha(&self, alpha: u8) -> Paint {
        let mut paint = self.clone();
        paint.set_alpha(alpha);
        paint
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

/// Transform and clip bookkeeping shared by the bundled canvases.
#[derive(Debug, Clone)]
pub(crate) struct CanvasState {
    matrix: Matrix,
    /// Device-space clip bounds
    clip: Option<Rect>,
    stack: Vec<(Matrix, Option<Rect>)>,
}

impl CanvasState {
    pub(crate) fn new() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            clip: None,
            stack: Vec::with_capacity(4),
        }
    }

    pub(crate) fn matrix(&self) -> Matrix {
        self.matrix
    }

    pub(crate) fn clip(&self) -> Option<Rect> {
        self.clip
    }

    pub(crate) fn save(&mut self) -> usize {
        let count = self.save_count();
        self.stack.push((self.matrix, self.clip));
        count
    }

    pub(crate) fn restore(&mut self) {
        if let Some((matrix, clip)) = self.stack.pop() {
            self.matrix = matrix;
            self.clip = clip;
        }
    }

    pub(crate) fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    pub(crate) fn concat(&mut self, m: &Matrix) {
        self.matrix = self.matrix.then(m);
    }

    pub(crate) fn clip_rect(&mut self, rect: Rect) {
        let device = self.map_rect(rect);
        self.clip = Some(match self.clip {
            Some(clip) => clip.intersect(&device),
            None => device,
        });
    }

    /// Device-space bounding box of a local rect.
    pub(crate) fn map_rect(&self, rect: Rect) -> Rect {
        let corners = [
            self.matrix.map_point(rect.left(), rect.top()),
            self.matrix.map_point(rect.right(), rect.top()),
            self.matrix.map_point(rect.left(), rect.bottom()),
            self.matrix.map_point(rect.right(), rect.bottom()),
        ];
        let (mut left, mut top) = corners[0];
        let (mut right, mut bottom) = corners[0];
        for (x, y) in &corners[1..] {
            left = left.min(*x);
            top = top.min(*y);
            right = right.max(*x);
            bottom = bottom.max(*y);
        }
        Rect::from_ltrb(left, top, right, bottom)
    }
}
