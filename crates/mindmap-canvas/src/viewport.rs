//! Pan/zoom viewport over the logical canvas.

use glam::DVec2;
use mindmap_tree::{bounding_box, NodeId, NodeMap, Point, Rect};

/// Smallest zoom factor callers should allow.
pub const MIN_SCALE: f64 = 0.1;

/// Largest zoom factor callers should allow.
pub const MAX_SCALE: f64 = 5.0;

/// Scale change per wheel notch.
pub const WHEEL_STEP: f64 = 0.1;

/// Space left around the content by zoom-to-fit, in logical units.
pub const FIT_MARGIN: f64 = 40.0;

/// Clamp a requested scale into [`MIN_SCALE`, `MAX_SCALE`].
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

pub(crate) fn to_vec(p: Point) -> DVec2 {
    DVec2::new(p.x, p.y)
}

pub(crate) fn to_point(v: DVec2) -> Point {
    Point::new(v.x, v.y)
}

/// Maps logical canvas space to device pixels: `device = logical * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Pan, in device pixels
    pub offset: DVec2,
    /// Zoom multiplier, always positive
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: DVec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with an explicit transform.
    pub fn new(offset: DVec2, scale: f64) -> Self {
        let mut viewport = Self {
            offset,
            ..Default::default()
        };
        viewport.set_scale(scale);
        viewport
    }

    /// Shift the canvas by a device-space delta.
    pub fn pan(&mut self, delta: DVec2) {
        self.offset += delta;
    }

    /// Replace the scale. Non-finite or non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.scale = scale;
        true
    }

    /// Device point to logical canvas point.
    pub fn to_logical(&self, device: DVec2) -> Point {
        to_point((device - self.offset) / self.scale)
    }

    /// Logical canvas point to device point.
    pub fn to_device(&self, logical: Point) -> DVec2 {
        to_vec(logical) * self.scale + self.offset
    }

    /// Device-space movement expressed in logical units.
    pub fn logical_delta(&self, device_delta: DVec2) -> Point {
        to_point(device_delta / self.scale)
    }

    /// Change scale while the logical point under `anchor` stays put.
    pub fn zoom_at(&mut self, anchor: DVec2, scale: f64) -> bool {
        let logical = to_vec(self.to_logical(anchor));
        if !self.set_scale(scale) {
            return false;
        }
        self.offset = anchor - logical * self.scale;
        true
    }

    /// One wheel notch around the pointer; negative `delta_y` zooms in.
    pub fn wheel(&mut self, anchor: DVec2, delta_y: f64) {
        let step = if delta_y < 0.0 { WHEEL_STEP } else { -WHEEL_STEP };
        self.zoom_at(anchor, clamp_scale(self.scale + step));
    }

    /// Fit `bounds` into a viewport of `size` pixels, never zooming past 1.0,
    /// and center it.
    pub fn fit(&mut self, bounds: Rect, size: DVec2) -> bool {
        let (w, h) = (bounds.width(), bounds.height());
        if w <= 0.0 || h <= 0.0 || size.x <= 0.0 || size.y <= 0.0 {
            return false;
        }
        let scale = (size.x / w).min(size.y / h).min(1.0);
        let extent = DVec2::new(w, h) * scale;
        self.scale = scale;
        self.offset = (size - extent) / 2.0 - to_vec(bounds.min) * scale;
        true
    }

    /// Fit every visible node (plus [`FIT_MARGIN`]) into the viewport.
    ///
    /// Leaves the transform alone when nothing is visible.
    pub fn zoom_to_fit(&mut self, nodes: &NodeMap, root: Option<&NodeId>, size: DVec2) -> bool {
        match bounding_box(nodes, root, FIT_MARGIN) {
            Some(bounds) => self.fit(bounds, size),
            None => false,
        }
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
