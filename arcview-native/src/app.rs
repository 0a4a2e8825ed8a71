use std::sync::Arc;

use anyhow::Context;
use arcview_core::{ArcCameraControl, CameraControl};
use winit::{
  application::ApplicationHandler,
  dpi::PhysicalSize,
  event::WindowEvent,
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  window::{Window, WindowId},
};

use crate::cloud::PointCloud;
use crate::input::{InputRouter, PointerEvent};
use crate::renderer::{GuiRenderer, Renderer};
use crate::settings::RenderOptions;
use crate::ui::{draw_hud, HudResponse};

/// Everything the window needs before it exists.
pub struct Launch
{
  pub title: String,
  pub width: u32,
  pub height: u32,
  pub camera: ArcCameraControl,
  pub options: RenderOptions,
  pub cloud: Option<PointCloud>,
}

pub fn run(launch: Launch) -> anyhow::Result<()>
{
  let event_loop = EventLoop::new().context("failed to create event loop")?;
  let mut app = ArcviewApp::new(launch);

  event_loop.run_app(&mut app).context("event loop terminated abnormally")?;

  match app.fatal.take()
  {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

//
// ──────────────────────────────────────────────────────────────
//   ArcviewApp
//
//   Owns the camera control directly and lends it to the input
//   router and the renderer on each event. Nothing is shared.
// ──────────────────────────────────────────────────────────────
//

struct ArcviewApp
{
  title: String,
  initial_size: PhysicalSize<u32>,

  window: Option<Arc<Window>>,
  renderer: Option<Renderer>,
  gui: Option<GuiRenderer>,

  camera: ArcCameraControl,
  input: InputRouter,
  options: RenderOptions,
  cloud: Option<PointCloud>,

  fatal: Option<anyhow::Error>,
}

impl ArcviewApp
{
  fn new(launch: Launch) -> Self
  {
    Self {
      title: launch.title,
      initial_size: PhysicalSize::new(launch.width.max(1), launch.height.max(1)),
      window: None,
      renderer: None,
      gui: None,
      camera: launch.camera,
      input: InputRouter::new(),
      options: launch.options,
      cloud: launch.cloud,
      fatal: None,
    }
  }

  fn init_window_and_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()>
  {
    if self.window.is_some()
    {
      return Ok(());
    }

    let attrs = Window::default_attributes().with_title(self.title.clone()).with_inner_size(self.initial_size);
    let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

    let size = window.inner_size();
    self.camera.set_window_size(size.width, size.height);

    let renderer = pollster::block_on(Renderer::new(window.clone(), &self.options, self.cloud.as_ref()))?;
    let gui = GuiRenderer::new(renderer.device(), renderer.format(), &window);

    window.request_redraw();

    self.window = Some(window);
    self.renderer = Some(renderer);
    self.gui = Some(gui);

    Ok(())
  }

  fn handle_window_event(&mut self, elwt: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    let window = match &self.window
    {
      Some(w) if w.id() == window_id => w.clone(),
      _ => return,
    };

    let consumed = match &mut self.gui
    {
      Some(gui) => gui.on_window_event(&window, &event),
      None => false,
    };

    if let Some(pointer) = PointerEvent::from_window_event(&event)
    {
      if !(consumed && pointer.can_be_captured()) && self.input.apply(pointer, &mut self.camera)
      {
        window.request_redraw();
      }
    }

    match event
    {
      WindowEvent::CloseRequested =>
      {
        elwt.exit();
      }

      WindowEvent::Resized(size) =>
      {
        if let Some(renderer) = &mut self.renderer
        {
          renderer.resize(size.width, size.height);
        }
      }

      WindowEvent::RedrawRequested =>
      {
        if let Err(err) = self.frame(&window)
        {
          log::error!("{err:#}");
          self.fatal = Some(err);
          elwt.exit();
        }
      }

      _ =>
      {}
    }
  }

  fn frame(&mut self, window: &Window) -> anyhow::Result<()>
  {
    let (Some(renderer), Some(gui)) = (&mut self.renderer, &mut self.gui)
    else
    {
      return Ok(());
    };

    let point_count = self.cloud.as_ref().map_or(0, PointCloud::len);
    let mut hud = HudResponse::default();

    let full_output = gui.run(window, |ctx| {
      hud = draw_hud(ctx, &self.camera, point_count, &mut self.options);
    });

    if hud.reset_view
    {
      log::debug!("view reset");
      self.camera.reset();
    }

    if hud.options_changed
    {
      renderer.apply_options(&self.options);
    }

    let repaint_now = full_output
      .viewport_output
      .get(&egui::ViewportId::ROOT)
      .is_some_and(|v| v.repaint_delay.is_zero());

    renderer.update_camera(&self.camera);
    renderer.render(gui, window, full_output)?;

    if repaint_now || hud.reset_view || hud.options_changed
    {
      window.request_redraw();
    }

    Ok(())
  }
}

impl ApplicationHandler for ArcviewApp
{
  fn resumed(&mut self, event_loop: &ActiveEventLoop)
  {
    event_loop.set_control_flow(ControlFlow::Wait);

    if let Err(err) = self.init_window_and_renderer(event_loop)
    {
      log::error!("{err:#}");
      self.fatal = Some(err);
      event_loop.exit();
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    self.handle_window_event(event_loop, window_id, event);
  }
}
