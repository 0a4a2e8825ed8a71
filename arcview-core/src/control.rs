use glam::{DMat4, DVec3};

//
// ──────────────────────────────────────────────────────────────
//   Mouse buttons
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton
{
  Left,
  Right,
  Middle,
  Other(u16),
}

impl MouseButton
{
  /// Map a raw button id (0 = left, 1 = right, 2 = middle) to a button.
  pub fn from_id(id: u16) -> Self
  {
    match id
    {
      0 => MouseButton::Left,
      1 => MouseButton::Right,
      2 => MouseButton::Middle,
      other => MouseButton::Other(other),
    }
  }
}

/// Held/released flags for the three tracked buttons.
/// Independent toggles; any combination may be held at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState
{
  pub left: bool,
  pub middle: bool,
  pub right: bool,
}

impl ButtonState
{
  pub fn any(&self) -> bool
  {
    self.left || self.middle || self.right
  }

  /// Record a press/release. Returns false for buttons that are not tracked.
  pub fn set(&mut self, button: MouseButton, pressed: bool) -> bool
  {
    match button
    {
      MouseButton::Left => self.left = pressed,
      MouseButton::Right => self.right = pressed,
      MouseButton::Middle => self.middle = pressed,
      MouseButton::Other(_) => return false,
    }

    true
  }
}

//
// ──────────────────────────────────────────────────────────────
//   CameraControl
//
//   Input handlers mutate the camera state; the matrix accessors
//   are pure reads of it. All calls come from the thread driving
//   the event loop.
// ──────────────────────────────────────────────────────────────
//

pub trait CameraControl
{
  /// Record the viewport size in pixels. Only the aspect ratio is used.
  fn set_window_size(&mut self, width: u32, height: u32);

  /// Record a button toggle and restart the drag at `(x, y)`.
  fn on_mouse_button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool);

  /// Apply the drag delta since the last recorded cursor position.
  fn on_mouse_move(&mut self, x: f64, y: f64);

  /// Positive `y_offset` zooms in, negative zooms out.
  fn on_mouse_scroll(&mut self, x_offset: f64, y_offset: f64);

  /// Right-handed world → view transform (column-vector convention).
  fn view_matrix(&self) -> DMat4;

  /// Perspective projection with OpenGL clip depth in `[-1, 1]`.
  fn projection_matrix(&self) -> DMat4;

  /// World-space eye position.
  fn eye_position(&self) -> DVec3;

  fn view_projection(&self) -> DMat4
  {
    self.projection_matrix() * self.view_matrix()
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn raw_ids_follow_left_right_middle_order()
  {
    assert_eq!(MouseButton::from_id(0), MouseButton::Left);
    assert_eq!(MouseButton::from_id(1), MouseButton::Right);
    assert_eq!(MouseButton::from_id(2), MouseButton::Middle);
    assert_eq!(MouseButton::from_id(7), MouseButton::Other(7));
  }

  #[test]
  fn buttons_toggle_independently()
  {
    let mut buttons = ButtonState::default();
    assert!(!buttons.any());

    assert!(buttons.set(MouseButton::Left, true));
    assert!(buttons.set(MouseButton::Right, true));
    assert!(buttons.left && buttons.right && !buttons.middle);

    assert!(buttons.set(MouseButton::Left, false));
    assert!(buttons.right);
    assert!(buttons.any());

    assert!(!buttons.set(MouseButton::Other(4), true));
    assert_eq!(buttons, ButtonState { left: false, middle: false, right: true });
  }
}
