use arcview_core::MouseButton;
use winit::event::MouseScrollDelta;

//
// ──────────────────────────────────────────────────────────────
//   winit → camera vocabulary
// ──────────────────────────────────────────────────────────────
//

// Trackpads report scroll in pixels; treat this many as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

pub fn map_button(button: winit::event::MouseButton) -> MouseButton
{
  match button
  {
    winit::event::MouseButton::Left => MouseButton::Left,
    winit::event::MouseButton::Right => MouseButton::Right,
    winit::event::MouseButton::Middle => MouseButton::Middle,
    winit::event::MouseButton::Back => MouseButton::Other(3),
    winit::event::MouseButton::Forward => MouseButton::Other(4),
    winit::event::MouseButton::Other(id) => MouseButton::Other(id),
  }
}

/// Scroll offset in wheel lines, positive = away from the user (zoom in).
///
/// The camera zooms one fixed step per event whatever the magnitude, so a
/// trackpad gesture (many small pixel events) zooms faster than a wheel.
pub fn scroll_offset(delta: &MouseScrollDelta) -> (f64, f64)
{
  match delta
  {
    MouseScrollDelta::LineDelta(x, y) => (f64::from(*x), f64::from(*y)),
    MouseScrollDelta::PixelDelta(p) => (p.x / PIXELS_PER_LINE, p.y / PIXELS_PER_LINE),
  }
}

#[cfg(test)]
mod tests
{
  use super::*;
  use winit::dpi::PhysicalPosition;

  #[test]
  fn buttons_map_onto_camera_buttons()
  {
    assert_eq!(map_button(winit::event::MouseButton::Left), MouseButton::Left);
    assert_eq!(map_button(winit::event::MouseButton::Right), MouseButton::Right);
    assert_eq!(map_button(winit::event::MouseButton::Middle), MouseButton::Middle);
    assert_eq!(map_button(winit::event::MouseButton::Other(9)), MouseButton::Other(9));
  }

  #[test]
  fn line_and_pixel_scroll()
  {
    assert_eq!(scroll_offset(&MouseScrollDelta::LineDelta(0.0, -2.0)), (0.0, -2.0));

    let (x, y) = scroll_offset(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(20.0, 80.0)));
    assert_eq!((x, y), (0.5, 2.0));
  }
}
