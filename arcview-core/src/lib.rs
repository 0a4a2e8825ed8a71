//! Camera control model for the arcview viewer.
//!
//! Converts raw pointer and scroll events into an orbiting view transform
//! and a perspective projection. No windowing or GPU types appear here; the
//! host feeds events in through [`CameraControl`] and reads matrices back out.

mod arc;
mod config;
mod control;
mod projection;

pub use arc::{ArcCameraControl, CameraState};
pub use config::{CameraConfig, ConfigError};
pub use control::{ButtonState, CameraControl, MouseButton};
pub use projection::{Perspective, Viewport};
