use std::path::Path;

use anyhow::Context;
use arcview_core::CameraConfig;
use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   Render options
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode
{
  /// Rainbow ramp over world z across `z_range`.
  Height,
  /// Plain vertex colour.
  White,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions
{
  pub background: [f32; 3],
  pub axes_scale: f32,
  pub color_mode: ColorMode,
  pub z_clipping: bool,
  pub z_range: [f32; 2],
}

impl Default for RenderOptions
{
  fn default() -> Self
  {
    Self {
      background: [0.5, 0.5, 0.5],
      axes_scale: 3.0,
      color_mode: ColorMode::Height,
      z_clipping: false,
      z_range: [-5.0, 10.0],
    }
  }
}

impl RenderOptions
{
  /// Repair values the shader cannot use. Never fails.
  pub fn sanitize(&mut self)
  {
    let defaults = Self::default();

    if !(self.axes_scale.is_finite() && self.axes_scale > 0.0)
    {
      log::warn!("axes_scale {} is not usable, using {}", self.axes_scale, defaults.axes_scale);
      self.axes_scale = defaults.axes_scale;
    }

    let [lo, hi] = self.z_range;
    if !(lo.is_finite() && hi.is_finite()) || lo == hi
    {
      log::warn!("z_range {:?} is not usable, using {:?}", self.z_range, defaults.z_range);
      self.z_range = defaults.z_range;
    }
    else if lo > hi
    {
      self.z_range = [hi, lo];
    }

    for c in &mut self.background
    {
      *c = if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 };
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Viewer configuration file (JSON)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig
{
  pub camera: CameraConfig,
  pub render: RenderOptions,
}

impl ViewerConfig
{
  pub fn load(path: &Path) -> anyhow::Result<Self>
  {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;

    let config = Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))?;
    log::info!("loaded viewer config from {}", path.display());

    Ok(config)
  }

  pub fn from_json(text: &str) -> anyhow::Result<Self>
  {
    let mut config: Self = serde_json::from_str(text)?;

    config.camera.validate()?;
    config.render.sanitize();

    Ok(config)
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn empty_object_gives_defaults()
  {
    let config = ViewerConfig::from_json("{}").unwrap();
    assert_eq!(config, ViewerConfig::default());
  }

  #[test]
  fn partial_sections_are_merged_with_defaults()
  {
    let config = ViewerConfig::from_json(
      r#"{
        "camera": { "fov_degrees": 60.0 },
        "render": { "color_mode": "white", "z_clipping": true }
      }"#,
    )
    .unwrap();

    assert_eq!(config.camera.fov_degrees, 60.0);
    assert_eq!(config.camera.rotation_sensitivity, 0.01);
    assert_eq!(config.render.color_mode, ColorMode::White);
    assert!(config.render.z_clipping);
    assert_eq!(config.render.z_range, [-5.0, 10.0]);
  }

  #[test]
  fn invalid_camera_section_is_an_error()
  {
    let err = ViewerConfig::from_json(r#"{ "camera": { "near_plane": 5.0, "far_plane": 1.0 } }"#);
    assert!(err.is_err());
  }

  #[test]
  fn unknown_color_mode_is_an_error()
  {
    assert!(ViewerConfig::from_json(r#"{ "render": { "color_mode": "sepia" } }"#).is_err());
  }

  #[test]
  fn sanitize_repairs_render_options()
  {
    let mut options = RenderOptions {
      background: [2.0, -1.0, f32::NAN],
      axes_scale: 0.0,
      z_range: [8.0, -2.0],
      ..Default::default()
    };

    options.sanitize();

    assert_eq!(options.background, [1.0, 0.0, 0.0]);
    assert_eq!(options.axes_scale, 3.0);
    assert_eq!(options.z_range, [-2.0, 8.0]);

    let mut flat = RenderOptions { z_range: [1.0, 1.0], ..Default::default() };
    flat.sanitize();
    assert_eq!(flat.z_range, [-5.0, 10.0]);
  }
}
