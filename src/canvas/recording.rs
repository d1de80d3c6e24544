//! Display-list canvas.

use std::sync::Arc;
use std::time::Instant;

use super::{
    Canvas, CanvasPaintProperty, CanvasProperty, CanvasState, Paint, PropertyCanvas,
    RenderThreadAnimator,
};
use crate::geometry::Rect;
use crate::matrix::Matrix;

/// A single recorded canvas operation.
///
/// Draw operations carry the transform and clip that were current when they
/// were recorded, so they can be inspected without replaying the list.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Save,
    Restore,
    Translate {
        dx: f32,
        dy: f32,
    },
    Rotate {
        degrees: f32,
    },
    Scale {
        sx: f32,
        sy: f32,
    },
    ClipRect {
        rect: Rect,
    },
    Rect {
        rect: Rect,
        paint: Paint,
        matrix: Matrix,
        clip: Option<Rect>,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        paint: Paint,
        matrix: Matrix,
        clip: Option<Rect>,
    },
    /// A circle whose geometry and alpha are read at render time.
    PropertyCircle {
        cx: CanvasProperty,
        cy: CanvasProperty,
        radius: CanvasProperty,
        paint: CanvasPaintProperty,
        matrix: Matrix,
        clip: Option<Rect>,
    },
}

/// A circle as it would be rendered now, in device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCircle {
    pub center: (f32, f32),
    pub radius: f32,
    pub paint: Paint,
    pub clip: Option<Rect>,
    /// Whether the circle came from a property draw.
    pub from_properties: bool,
}

/// Records draw operations instead of rasterizing them.
///
/// In hardware mode the canvas also accepts property draws and hosts the
/// render-thread animators started against it; [`advance_animations`]
/// plays the role of the render thread.
///
/// [`advance_animations`]: RecordingCanvas::advance_animations
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    state: CanvasState,
    hardware: bool,
    animators: Vec<Arc<RenderThreadAnimator>>,
}

impl RecordingCanvas {
    /// A plain software canvas.
    pub fn new() -> Self {
        Self::with_capacity(32, false)
    }

    /// A canvas that reports hardware acceleration and supports property draws.
    pub fn hardware() -> Self {
        Self::with_capacity(32, true)
    }

    /// Create a canvas with pre-allocated capacity to avoid per-frame allocations
    pub fn with_capacity(ops: usize, hardware: bool) -> Self {
        Self {
            ops: Vec::with_capacity(ops),
            state: CanvasState::new(),
            hardware,
            animators: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Clear recorded operations for the next frame. Animators keep running.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.state = CanvasState::new();
    }

    /// Every circle draw resolved against current property values.
    pub fn circles(&self) -> Vec<RecordedCircle> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle {
                    center,
                    radius,
                    paint,
                    matrix,
                    clip,
                } => Some(RecordedCircle {
                    center: matrix.map_point(center.0, center.1),
                    radius: *radius,
                    paint: paint.clone(),
                    clip: *clip,
                    from_properties: false,
                }),
                DrawOp::PropertyCircle {
                    cx,
                    cy,
                    radius,
                    paint,
                    matrix,
                    clip,
                } => Some(RecordedCircle {
                    center: matrix.map_point(cx.get(), cy.get()),
                    radius: radius.get(),
                    paint: paint.paint(),
                    clip: *clip,
                    from_properties: true,
                }),
                _ => None,
            })
            .collect()
    }

    /// Device-space rects drawn, with their paints.
    pub fn rects(&self) -> Vec<(Rect, Paint)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect {
                    rect,
                    paint,
                    matrix,
                    ..
                } => {
                    let (x, y) = matrix.map_point(rect.x, rect.y);
                    Some((Rect::new(x, y, rect.width, rect.height), paint.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn clips(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ClipRect { rect } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Advance every started render-thread animator to `now`, dropping finished ones.
    pub fn advance_animations(&mut self, now: Instant) {
        self.animators.retain(|animator| animator.tick(now));
    }

    pub fn running_animators(&self) -> usize {
        self.animators.len()
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) -> usize {
        self.ops.push(DrawOp::Save);
        self.state.save()
    }

    fn restore(&mut self) {
        if self.state.save_count() > 1 {
            self.ops.push(DrawOp::Restore);
            self.state.restore();
        }
    }

    fn save_count(&self) -> usize {
        self.state.save_count()
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(DrawOp::Translate { dx, dy });
        self.state.concat(&Matrix::translate(dx, dy));
    }

    fn rotate(&mut self, degrees: f32) {
        self.ops.push(DrawOp::Rotate { degrees });
        self.state.concat(&Matrix::rotate_degrees(degrees));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(DrawOp::Scale { sx, sy });
        self.state.concat(&Matrix::scale_xy(sx, sy));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClipRect { rect });
        self.state.clip_rect(rect);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.ops.push(DrawOp::Rect {
            rect,
            paint: paint.clone(),
            matrix: self.state.matrix(),
            clip: self.state.clip(),
        });
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        self.ops.push(DrawOp::Circle {
            center: (cx, cy),
            radius,
            paint: paint.clone(),
            matrix: self.state.matrix(),
            clip: self.state.clip(),
        });
    }

    fn is_hardware_accelerated(&self) -> bool {
        self.hardware
    }

    fn property_canvas(&mut self) -> Option<&mut dyn PropertyCanvas> {
        if self.hardware {
            Some(self)
        } else {
            None
        }
    }
}

impl PropertyCanvas for RecordingCanvas {
    fn draw_circle_props(
        &mut self,
        cx: &CanvasProperty,
        cy: &CanvasProperty,
        radius: &CanvasProperty,
        paint: &CanvasPaintProperty,
    ) {
        self.ops.push(DrawOp::PropertyCircle {
            cx: cx.clone(),
            cy: cy.clone(),
            radius: radius.clone(),
            paint: paint.clone(),
            matrix: self.state.matrix(),
            clip: self.state.clip(),
        });
    }

    fn start_animator(&mut self, animator: Arc<RenderThreadAnimator>, now: Instant) {
        animator.start(now);
        self.animators.push(animator);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::Transition;
    use crate::canvas::AnimatedProperty;
    use crate::color::Color;

    #[test]
    fn test_circles_report_device_space() {
        let mut canvas = RecordingCanvas::new();
        let count = canvas.save();
        canvas.translate(50.0, 40.0);
        canvas.draw_circle(5.0, -5.0, 10.0, &Paint::new(Color::WHITE));
        canvas.restore_to_count(count);
        canvas.draw_circle(0.0, 0.0, 1.0, &Paint::new(Color::WHITE));

        let circles = canvas.circles();
        assert_eq!(circles.len(), 2);
        assert_eq!(circles[0].center, (55.0, 35.0));
        assert_eq!(circles[1].center, (0.0, 0.0));
        assert_eq!(canvas.save_count(), 1);
    }

    #[test]
    fn test_software_canvas_has_no_property_api() {
        let mut canvas = RecordingCanvas::new();
        assert!(!canvas.is_hardware_accelerated());
        assert!(canvas.property_canvas().is_none());

        let mut canvas = RecordingCanvas::hardware();
        assert!(canvas.is_hardware_accelerated());
        assert!(canvas.property_canvas().is_some());
    }

    #[test]
    fn test_render_thread_animators_advance() {
        let mut canvas = RecordingCanvas::hardware();
        let radius = CanvasProperty::new(0.0);
        let animator = Arc::new(RenderThreadAnimator::new(
            AnimatedProperty::Float(radius.clone()),
            10.0,
            Transition::linear_ms(100),
        ));
        let start = Instant::now();
        canvas.start_animator(animator.clone(), start);
        assert_eq!(canvas.running_animators(), 1);
        canvas.advance_animations(start + Duration::from_millis(50));
        assert!((radius.get() - 5.0).abs() < 1e-3);
        canvas.advance_animations(start + Duration::from_millis(100));
        assert_eq!(canvas.running_animators(), 0);
        assert!(animator.is_finished());
    }
}
