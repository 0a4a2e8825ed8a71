mod camera_control;

use arcview_core::{CameraControl, MouseButton};
use winit::event::{ElementState, WindowEvent};

use camera_control::{map_button, scroll_offset};

//
// ──────────────────────────────────────────────────────────────
//   Pointer events
//
//   The subset of window events the camera cares about, already
//   converted to camera units.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent
{
  Resized
  {
    width: u32, height: u32
  },
  Button
  {
    button: MouseButton, pressed: bool
  },
  Moved
  {
    x: f64, y: f64
  },
  Scroll
  {
    x: f64, y: f64
  },
}

impl PointerEvent
{
  pub fn from_window_event(event: &WindowEvent) -> Option<Self>
  {
    match event
    {
      WindowEvent::Resized(size) => Some(Self::Resized { width: size.width, height: size.height }),

      WindowEvent::MouseInput { state, button, .. } =>
      {
        Some(Self::Button { button: map_button(*button), pressed: *state == ElementState::Pressed })
      }

      WindowEvent::CursorMoved { position, .. } => Some(Self::Moved { x: position.x, y: position.y }),

      WindowEvent::MouseWheel { delta, .. } =>
      {
        let (x, y) = scroll_offset(delta);
        Some(Self::Scroll { x, y })
      }

      _ => None,
    }
  }

  /// Events the overlay may swallow. Releases and motion always reach the
  /// camera so a drag that ends over the overlay does not leave a button stuck.
  pub fn can_be_captured(&self) -> bool
  {
    match self
    {
      Self::Button { pressed, .. } => *pressed,
      Self::Scroll { .. } => true,
      Self::Resized { .. } | Self::Moved { .. } => false,
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   InputRouter
//
//   Button events from the window carry no position, so the router
//   remembers the last cursor position and hands it to the camera
//   together with the press/release.
// ──────────────────────────────────────────────────────────────
//

pub struct InputRouter
{
  cursor_x: f64,
  cursor_y: f64,
}

impl InputRouter
{
  pub fn new() -> Self
  {
    Self { cursor_x: 0.0, cursor_y: 0.0 }
  }

  #[cfg(test)]
  pub fn cursor(&self) -> (f64, f64)
  {
    (self.cursor_x, self.cursor_y)
  }

  /// Forward one event to the camera. Returns true if the view may have changed.
  pub fn apply(&mut self, event: PointerEvent, camera: &mut dyn CameraControl) -> bool
  {
    match event
    {
      PointerEvent::Resized { width, height } =>
      {
        camera.set_window_size(width, height);
        true
      }

      PointerEvent::Button { button, pressed } =>
      {
        camera.on_mouse_button(self.cursor_x, self.cursor_y, button, pressed);
        false
      }

      PointerEvent::Moved { x, y } =>
      {
        self.cursor_x = x;
        self.cursor_y = y;
        camera.on_mouse_move(x, y);
        true
      }

      PointerEvent::Scroll { x, y } =>
      {
        camera.on_mouse_scroll(x, y);
        true
      }
    }
  }
}

#[cfg(test)]
mod tests
{
  use super::*;
  use arcview_core::ArcCameraControl;
  use glam::{DMat4, DVec3};

  #[derive(Default)]
  struct Recorder
  {
    calls: Vec<String>,
  }

  impl CameraControl for Recorder
  {
    fn set_window_size(&mut self, width: u32, height: u32)
    {
      self.calls.push(format!("size {}x{}", width, height));
    }

    fn on_mouse_button(&mut self, x: f64, y: f64, button: MouseButton, pressed: bool)
    {
      self.calls.push(format!("button {:?} {} at {},{}", button, pressed, x, y));
    }

    fn on_mouse_move(&mut self, x: f64, y: f64)
    {
      self.calls.push(format!("move {},{}", x, y));
    }

    fn on_mouse_scroll(&mut self, x_offset: f64, y_offset: f64)
    {
      self.calls.push(format!("scroll {},{}", x_offset, y_offset));
    }

    fn view_matrix(&self) -> DMat4
    {
      DMat4::IDENTITY
    }

    fn projection_matrix(&self) -> DMat4
    {
      DMat4::IDENTITY
    }

    fn eye_position(&self) -> DVec3
    {
      DVec3::ZERO
    }
  }

  #[test]
  fn button_events_carry_the_last_cursor_position()
  {
    let mut router = InputRouter::new();
    let mut camera = Recorder::default();

    router.apply(PointerEvent::Moved { x: 12.0, y: 34.0 }, &mut camera);
    router.apply(PointerEvent::Button { button: MouseButton::Left, pressed: true }, &mut camera);
    router.apply(PointerEvent::Scroll { x: 0.0, y: -1.0 }, &mut camera);
    router.apply(PointerEvent::Resized { width: 800, height: 0 }, &mut camera);

    assert_eq!(
      camera.calls,
      vec![
        "move 12,34".to_string(),
        "button Left true at 12,34".to_string(),
        "scroll 0,-1".to_string(),
        "size 800x0".to_string(),
      ]
    );
    assert_eq!(router.cursor(), (12.0, 34.0));
  }

  #[test]
  fn routed_drag_orbits_the_arc_camera()
  {
    let mut router = InputRouter::new();
    let mut camera = ArcCameraControl::new();
    let theta0 = camera.state().theta;

    router.apply(PointerEvent::Moved { x: 100.0, y: 100.0 }, &mut camera);
    router.apply(PointerEvent::Button { button: MouseButton::Left, pressed: true }, &mut camera);
    router.apply(PointerEvent::Moved { x: 110.0, y: 100.0 }, &mut camera);
    router.apply(PointerEvent::Button { button: MouseButton::Left, pressed: false }, &mut camera);

    assert!((camera.state().theta - (theta0 - 0.1)).abs() < 1e-12);
    assert!(!camera.is_dragging());
  }

  #[test]
  fn only_presses_and_scrolls_can_be_captured()
  {
    assert!(PointerEvent::Button { button: MouseButton::Left, pressed: true }.can_be_captured());
    assert!(!PointerEvent::Button { button: MouseButton::Left, pressed: false }.can_be_captured());
    assert!(PointerEvent::Scroll { x: 0.0, y: 1.0 }.can_be_captured());
    assert!(!PointerEvent::Moved { x: 0.0, y: 0.0 }.can_be_captured());
    assert!(!PointerEvent::Resized { width: 1, height: 1 }.can_be_captured());
  }
}
