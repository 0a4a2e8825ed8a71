use std::f64::consts::FRAC_PI_2;

use glam::{DMat4, DQuat, DVec2, DVec3};

use crate::config::{CameraConfig, ConfigError};
use crate::control::{ButtonState, CameraControl, MouseButton};
use crate::projection::{Perspective, Viewport};

//
// ──────────────────────────────────────────────────────────────
//   Camera state (Z-up, right-handed)
//
//   The eye sits on a sphere of radius `distance` around `center`:
//     theta = azimuth, rotation about world +Z
//     phi   = elevation, rotation about the azimuth-rotated +Y
//             (negative phi lifts the eye above the XY plane)
//
//   The view matrix uses world +Z as its up reference. That is only
//   well defined while phi stays away from ±π/2, which is what the
//   elevation clamp guarantees. Widening the clamp to the poles
//   would make the look-at basis degenerate.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct CameraState
{
  pub center: DVec3,
  pub distance: f64,
  pub theta: f64,
  pub phi: f64,

  pub last_cursor: DVec2,
  pub buttons: ButtonState,
  pub viewport: Viewport,
}

//
// ──────────────────────────────────────────────────────────────
//   ArcCameraControl
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct ArcCameraControl
{
  config: CameraConfig,
  perspective: Perspective,
  state: CameraState,
}

impl ArcCameraControl
{
  pub fn new() -> Self
  {
    let config = CameraConfig::default();
    let state = initial_state(&config, Viewport::default());

    Self { perspective: config.perspective(), config, state }
  }

  pub fn with_config(config: CameraConfig) -> Result<Self, ConfigError>
  {
    config.validate()?;

    let state = initial_state(&config, Viewport::default());
    log::debug!(
      "arc camera: distance={:.3} theta={:.3} phi={:.3} fov={}",
      state.distance,
      state.theta,
      state.phi,
      config.fov_degrees
    );

    Ok(Self { perspective: config.perspective(), config, state })
  }

  pub fn state(&self) -> &CameraState
  {
    &self.state
  }

  pub fn config(&self) -> &CameraConfig
  {
    &self.config
  }

  /// True while any tracked button is held.
  pub fn is_dragging(&self) -> bool
  {
    self.state.buttons.any()
  }

  /// Restore the initial pose and release all buttons. The viewport is kept.
  pub fn reset(&mut self)
  {
    self.state = initial_state(&self.config, self.state.viewport);
  }

  fn rotate(&mut self, delta: DVec2)
  {
    let k = self.config.rotation_sensitivity;

    self.state.theta -= delta.x * k;
    self.state.phi = clamp_elevation(self.state.phi - delta.y * k, self.config.elevation_margin);
  }

  /// Screen delta `(-dx, dy)` turned into the azimuthal frame and scaled by
  /// the orbit distance, so the pan rate feels the same at any zoom.
  fn pan(&mut self, delta: DVec2)
  {
    let frame = DQuat::from_rotation_z(self.state.theta + FRAC_PI_2);
    let screen = DVec3::new(-delta.x, delta.y, 0.0);
    let scale = self.state.distance * self.config.pan_sensitivity;

    self.state.center += frame * screen * scale;
  }
}

impl Default for ArcCameraControl
{
  fn default() -> Self
  {
    Self::new()
  }
}

impl CameraControl for ArcCameraControl
{
  fn set_window_size(&mut self, width: u32, height: u32)
  {
    self.state.viewport = Viewport::new(width, height);
  }

  fn on_mouse_button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool)
  {
    if self.state.buttons.set(button, pressed)
    {
      log::trace!("camera button {:?} pressed={}", button, pressed);
    }

    self.state.last_cursor = DVec2::new(x, y);
  }

  fn on_mouse_move(&mut self, x: f64, y: f64)
  {
    let buttons = self.state.buttons;
    if !buttons.any()
    {
      return;
    }

    let cursor = DVec2::new(x, y);
    let delta = cursor - self.state.last_cursor;

    // Left wins over right; middle is reserved and has no motion effect.
    if buttons.left
    {
      self.rotate(delta);
    }
    else if buttons.right
    {
      self.pan(delta);
    }

    self.state.last_cursor = cursor;
  }

  /// Only the sign of `y_offset` matters. Zero (a horizontal-only wheel)
  /// and NaN leave the distance alone rather than zooming out.
  fn on_mouse_scroll(&mut self, _x_offset: f64, y_offset: f64)
  {
    let factor = if y_offset > 0.0
    {
      self.config.zoom_factor_in
    }
    else if y_offset < 0.0
    {
      self.config.zoom_factor_out
    }
    else
    {
      return;
    };

    self.state.distance = (self.state.distance * factor).max(self.config.min_distance);
  }

  fn view_matrix(&self) -> DMat4
  {
    // Standard right-handed look-at: rows {s, u, -f}, translation
    // (-s·eye, -u·eye, f·eye).
    DMat4::look_at_rh(eye_position(&self.state), self.state.center, DVec3::Z)
  }

  fn projection_matrix(&self) -> DMat4
  {
    self.perspective.matrix(self.state.viewport)
  }

  fn eye_position(&self) -> DVec3
  {
    eye_position(&self.state)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

fn initial_state(config: &CameraConfig, viewport: Viewport) -> CameraState
{
  CameraState {
    center: DVec3::ZERO,
    distance: config.initial_distance.max(config.min_distance),
    theta: config.initial_theta_degrees.to_radians(),
    phi: clamp_elevation(config.initial_phi_degrees.to_radians(), config.elevation_margin),

    last_cursor: DVec2::ZERO,
    buttons: ButtonState::default(),
    viewport,
  }
}

fn clamp_elevation(phi: f64, margin: f64) -> f64
{
  phi.clamp(-FRAC_PI_2 + margin, FRAC_PI_2 - margin)
}

fn orbit_rotation(state: &CameraState) -> DQuat
{
  DQuat::from_rotation_z(state.theta) * DQuat::from_rotation_y(state.phi)
}

fn eye_position(state: &CameraState) -> DVec3
{
  state.center + orbit_rotation(state) * DVec3::new(state.distance, 0.0, 0.0)
}
