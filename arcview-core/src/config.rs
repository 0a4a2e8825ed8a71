use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projection::Perspective;

//
// ──────────────────────────────────────────────────────────────
//   Errors
// ──────────────────────────────────────────────────────────────
//

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError
{
  #[error("{field} must be a finite number, got {value}")]
  NotFinite
  {
    field: &'static str, value: f64
  },

  #[error("{field} out of range: {value} ({expected})")]
  OutOfRange
  {
    field: &'static str,
    value: f64,
    expected: &'static str,
  },

  #[error("near plane {near} must be closer than far plane {far}")]
  ClipPlanes
  {
    near: f64, far: f64
  },
}

//
// ──────────────────────────────────────────────────────────────
//   CameraConfig
//
//   Sensitivities, zoom factors and intrinsics of the arc-ball
//   camera. Every field falls back to its default when missing
//   from a serialized config.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig
{
  /// Radians of orbit per pixel of left-drag.
  pub rotation_sensitivity: f64,
  /// Pan distance per pixel, as a fraction of the orbit distance.
  pub pan_sensitivity: f64,
  pub zoom_factor_in: f64,
  pub zoom_factor_out: f64,
  pub min_distance: f64,

  pub fov_degrees: f64,
  pub near_plane: f64,
  pub far_plane: f64,

  pub initial_distance: f64,
  pub initial_theta_degrees: f64,
  pub initial_phi_degrees: f64,

  /// Gap (radians) kept between the elevation and the poles.
  pub elevation_margin: f64,
}

impl Default for CameraConfig
{
  fn default() -> Self
  {
    Self {
      rotation_sensitivity: 0.01,
      pan_sensitivity: 0.001,
      zoom_factor_in: 0.9,
      zoom_factor_out: 1.1,
      min_distance: 0.1,

      fov_degrees: 30.0,
      near_plane: 0.1,
      far_plane: 1000.0,

      initial_distance: 30.0,
      initial_theta_degrees: -45.0,
      initial_phi_degrees: -45.0,

      elevation_margin: 0.01,
    }
  }
}

impl CameraConfig
{
  pub fn validate(&self) -> Result<(), ConfigError>
  {
    let fields = [
      ("rotation_sensitivity", self.rotation_sensitivity),
      ("pan_sensitivity", self.pan_sensitivity),
      ("zoom_factor_in", self.zoom_factor_in),
      ("zoom_factor_out", self.zoom_factor_out),
      ("min_distance", self.min_distance),
      ("fov_degrees", self.fov_degrees),
      ("near_plane", self.near_plane),
      ("far_plane", self.far_plane),
      ("initial_distance", self.initial_distance),
      ("initial_theta_degrees", self.initial_theta_degrees),
      ("initial_phi_degrees", self.initial_phi_degrees),
      ("elevation_margin", self.elevation_margin),
    ];

    for (field, value) in fields
    {
      if !value.is_finite()
      {
        return Err(ConfigError::NotFinite { field, value });
      }
    }

    check(self.rotation_sensitivity >= 0.0, "rotation_sensitivity", self.rotation_sensitivity, ">= 0")?;
    check(self.pan_sensitivity >= 0.0, "pan_sensitivity", self.pan_sensitivity, ">= 0")?;
    check(
      self.zoom_factor_in > 0.0 && self.zoom_factor_in < 1.0,
      "zoom_factor_in",
      self.zoom_factor_in,
      "between 0 and 1",
    )?;
    check(self.zoom_factor_out > 1.0, "zoom_factor_out", self.zoom_factor_out, "> 1")?;
    check(self.min_distance > 0.0, "min_distance", self.min_distance, "> 0")?;
    check(
      self.fov_degrees > 0.0 && self.fov_degrees < 180.0,
      "fov_degrees",
      self.fov_degrees,
      "between 0 and 180",
    )?;
    check(self.near_plane > 0.0, "near_plane", self.near_plane, "> 0")?;
    check(
      self.elevation_margin > 0.0 && self.elevation_margin < std::f64::consts::FRAC_PI_2,
      "elevation_margin",
      self.elevation_margin,
      "between 0 and pi/2",
    )?;

    if self.near_plane >= self.far_plane
    {
      return Err(ConfigError::ClipPlanes { near: self.near_plane, far: self.far_plane });
    }

    Ok(())
  }

  pub fn perspective(&self) -> Perspective
  {
    Perspective::new(self.fov_degrees, self.near_plane, self.far_plane)
  }
}

fn check(ok: bool, field: &'static str, value: f64, expected: &'static str) -> Result<(), ConfigError>
{
  if ok
  {
    Ok(())
  }
  else
  {
    Err(ConfigError::OutOfRange { field, value, expected })
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn defaults_are_valid()
  {
    assert_eq!(CameraConfig::default().validate(), Ok(()));
  }

  #[test]
  fn partial_json_keeps_defaults()
  {
    let cfg: CameraConfig =
      serde_json::from_str(r#"{ "fov_degrees": 45.0, "pan_sensitivity": 0.002 }"#).unwrap();

    assert_eq!(cfg.fov_degrees, 45.0);
    assert_eq!(cfg.pan_sensitivity, 0.002);
    assert_eq!(cfg.zoom_factor_in, 0.9);
    assert_eq!(cfg.initial_distance, 30.0);
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn rejects_zoom_factors_that_do_not_zoom()
  {
    let cfg = CameraConfig { zoom_factor_in: 1.0, ..Default::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "zoom_factor_in", .. })));

    let cfg = CameraConfig { zoom_factor_out: 0.5, ..Default::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "zoom_factor_out", .. })));
  }

  #[test]
  fn rejects_non_positive_distance_floor()
  {
    let cfg = CameraConfig { min_distance: 0.0, ..Default::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "min_distance", .. })));
  }

  #[test]
  fn rejects_inverted_clip_planes()
  {
    let cfg = CameraConfig { near_plane: 10.0, far_plane: 1.0, ..Default::default() };
    assert_eq!(cfg.validate(), Err(ConfigError::ClipPlanes { near: 10.0, far: 1.0 }));
  }

  #[test]
  fn rejects_nan()
  {
    let cfg = CameraConfig { rotation_sensitivity: f64::NAN, ..Default::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::NotFinite { field: "rotation_sensitivity", .. })));
  }

  #[test]
  fn rejects_margin_that_reaches_the_pole()
  {
    let cfg = CameraConfig { elevation_margin: 2.0, ..Default::default() };
    assert!(cfg.validate().is_err());
  }
}
