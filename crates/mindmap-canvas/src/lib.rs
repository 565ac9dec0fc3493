//! Mind Map Canvas
//!
//! The viewport transform between logical canvas space (where node positions
//! live) and device pixels. Independent of tree data and never persisted
//! remotely.
//!
//! ```text
//! device  = logical * scale + offset
//! logical = (device - offset) / scale
//! ```

mod viewport;

pub use glam::DVec2;
pub use viewport::{clamp_scale, Viewport, FIT_MARGIN, MAX_SCALE, MIN_SCALE, WHEEL_STEP};
