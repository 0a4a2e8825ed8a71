use arcview_core::ArcCameraControl;

use crate::settings::{ColorMode, RenderOptions};

/// What the user asked for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HudResponse
{
  pub reset_view: bool,
  pub options_changed: bool,
}

/// Camera readout plus the render toggles.
pub fn draw_hud(
  ctx: &egui::Context,
  camera: &ArcCameraControl,
  point_count: usize,
  options: &mut RenderOptions,
) -> HudResponse
{
  let mut response = HudResponse::default();
  let state = camera.state();

  egui::Window::new("View")
    .default_pos([12.0, 12.0])
    .default_width(220.0)
    .resizable(false)
    .show(ctx, |ui| {
      ui.label(format!("Distance: {:.3}", state.distance));
      ui.label(format!("Azimuth: {:.1}°", state.theta.to_degrees()));
      ui.label(format!("Elevation: {:.1}°", state.phi.to_degrees()));
      ui.label(format!("Center: ({:.2}, {:.2}, {:.2})", state.center.x, state.center.y, state.center.z));
      ui.label(format!("Points: {}", point_count));

      ui.separator();

      ui.horizontal(|ui| {
        ui.label("Colour:");
        response.options_changed |= ui.radio_value(&mut options.color_mode, ColorMode::Height, "Height").changed();
        response.options_changed |= ui.radio_value(&mut options.color_mode, ColorMode::White, "White").changed();
      });

      let clip_label = format!("Clip z to [{}, {}]", options.z_range[0], options.z_range[1]);
      response.options_changed |= ui.checkbox(&mut options.z_clipping, clip_label).changed();

      ui.separator();

      if ui.button("Reset view").clicked()
      {
        response.reset_view = true;
      }
    });

  response
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn idle_frame_requests_nothing()
  {
    let ctx = egui::Context::default();
    let camera = ArcCameraControl::new();
    let mut options = RenderOptions::default();
    let mut response = HudResponse { reset_view: true, options_changed: true };

    let _ = ctx.run(egui::RawInput::default(), |ctx| {
      response = draw_hud(ctx, &camera, 42, &mut options);
    });

    assert_eq!(response, HudResponse::default());
    assert_eq!(options, RenderOptions::default());
  }
}
