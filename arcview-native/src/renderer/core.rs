use std::sync::Arc;

use anyhow::Context;
use arcview_core::CameraControl;
use winit::window::Window;

use super::axes::AxesMesh;
use super::depth::{DepthResources, DEPTH_FORMAT};
use super::draw::{create_draw_bind_group_layout, DrawUniform};
use super::gui::GuiRenderer;
use super::points::PointCloudMesh;
use super::Vertex;
use crate::camera::SceneUniform;
use crate::cloud::PointCloud;
use crate::settings::RenderOptions;

pub struct Renderer
{
  surface: wgpu::Surface<'static>,
  device: wgpu::Device,
  queue: wgpu::Queue,
  config: wgpu::SurfaceConfiguration,

  depth: DepthResources,
  scene_buffer: wgpu::Buffer,
  scene_bind_group: wgpu::BindGroup,

  triangle_pipeline: wgpu::RenderPipeline,
  point_pipeline: wgpu::RenderPipeline,

  axes: AxesMesh,
  cloud: Option<PointCloudMesh>,
  clear_color: wgpu::Color,
}

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

impl Renderer
{
  pub async fn new(window: Arc<Window>, options: &RenderOptions, cloud: Option<&PointCloud>) -> anyhow::Result<Self>
  {
    let instance = wgpu::Instance::default();
    let size = window.inner_size();
    let surface = instance.create_surface(window).context("failed to create surface")?;

    let adapter = request_adapter(&instance, &surface).await?;
    let (device, queue) = request_device(&adapter).await?;

    let config = configure_surface(size.width, size.height, &surface, &adapter, &device)?;
    let depth = DepthResources::create(&device, &config);

    let (scene_buffer, scene_bind_group, scene_bgl) = create_scene_resources(&device);
    let draw_bgl = create_draw_bind_group_layout(&device);

    let triangle_pipeline = create_pipeline(
      &device,
      &config,
      &[&scene_bgl, &draw_bgl],
      wgpu::PrimitiveTopology::TriangleList,
      "Axes Pipeline",
    );
    let point_pipeline = create_pipeline(
      &device,
      &config,
      &[&scene_bgl, &draw_bgl],
      wgpu::PrimitiveTopology::PointList,
      "Point Cloud Pipeline",
    );

    let axes = AxesMesh::create(&device, &draw_bgl, options);
    let cloud = match cloud
    {
      Some(c) => PointCloudMesh::create(&device, &draw_bgl, c, options)?,
      None => None,
    };

    log::info!(
      "Renderer ready: {}x{} {:?}, {} points uploaded",
      config.width,
      config.height,
      config.format,
      cloud.as_ref().map_or(0, |c| c.vertex_count)
    );

    Ok(Self {
      surface,
      device,
      queue,
      config,
      depth,
      scene_buffer,
      scene_bind_group,
      triangle_pipeline,
      point_pipeline,
      axes,
      cloud,
      clear_color: clear_color(options),
    })
  }

  pub fn device(&self) -> &wgpu::Device
  {
    &self.device
  }

  pub fn format(&self) -> wgpu::TextureFormat
  {
    self.config.format
  }

  pub fn resize(&mut self, width: u32, height: u32)
  {
    if width == 0 || height == 0
    {
      return;
    }

    self.config.width = width;
    self.config.height = height;
    self.surface.configure(&self.device, &self.config);
    self.depth = DepthResources::create(&self.device, &self.config);
  }

  pub fn update_camera(&mut self, camera: &dyn CameraControl)
  {
    let uniform = SceneUniform::from_camera(camera);
    self.queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniform));
  }

  /// Push edited render options to the GPU. The axes keep their own styling.
  pub fn apply_options(&mut self, options: &RenderOptions)
  {
    if let Some(cloud) = &self.cloud
    {
      cloud.draw.update(&self.queue, DrawUniform::cloud(options));
    }

    self.clear_color = clear_color(options);
  }

  pub fn render(&mut self, gui: &mut GuiRenderer, window: &Window, full_output: egui::FullOutput) -> anyhow::Result<()>
  {
    let frame = match self.surface.get_current_texture()
    {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) =>
      {
        log::debug!("Surface lost or outdated, reconfiguring");
        self.surface.configure(&self.device, &self.config);
        return Ok(());
      }
      Err(wgpu::SurfaceError::OutOfMemory) =>
      {
        anyhow::bail!("surface out of memory");
      }
      Err(e) =>
      {
        log::warn!("Skipping frame: {e}");
        return Ok(());
      }
    };

    let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = self
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });

    self.record_scene_pass(&mut encoder, &view);
    gui.render(&self.device, &self.queue, &mut encoder, window, &view, full_output);

    self.queue.submit(Some(encoder.finish()));
    frame.present();

    Ok(())
  }

  //
  // ──────────────────────────────────────────────────────────────
  //   Render Pass
  // ──────────────────────────────────────────────────────────────
  //

  fn record_scene_pass(&self, encoder: &mut wgpu::CommandEncoder, color_view: &wgpu::TextureView)
  {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Scene Pass"),
      color_attachments: &[Some(wgpu::RenderPassColorAttachment {
        view: color_view,
        resolve_target: None,
        ops: wgpu::Operations { load: wgpu::LoadOp::Clear(self.clear_color), store: wgpu::StoreOp::Store },
        depth_slice: None,
      })],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: &self.depth.view,
        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
        stencil_ops: None,
      }),
      ..Default::default()
    });

    pass.set_bind_group(0, &self.scene_bind_group, &[]);

    if let Some(cloud) = &self.cloud
    {
      pass.set_pipeline(&self.point_pipeline);
      pass.set_bind_group(1, &cloud.draw.bind_group, &[]);
      pass.set_vertex_buffer(0, cloud.vertex_buffer.slice(..));
      pass.draw(0..cloud.vertex_count, 0..1);
    }

    pass.set_pipeline(&self.triangle_pipeline);
    pass.set_bind_group(1, &self.axes.draw.bind_group, &[]);
    pass.set_vertex_buffer(0, self.axes.vertex_buffer.slice(..));
    pass.set_index_buffer(self.axes.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    pass.draw_indexed(0..self.axes.index_count, 0, 0..1);
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Initialization Helpers
// ──────────────────────────────────────────────────────────────
//

async fn request_adapter(instance: &wgpu::Instance, surface: &wgpu::Surface<'_>) -> anyhow::Result<wgpu::Adapter>
{
  let adapter = instance
    .request_adapter(&wgpu::RequestAdapterOptions {
      power_preference: wgpu::PowerPreference::HighPerformance,
      compatible_surface: Some(surface),
      force_fallback_adapter: false,
    })
    .await
    .context("no suitable GPU adapter found")?;

  let info = adapter.get_info();
  log::info!("Using adapter {} ({:?})", info.name, info.backend);

  Ok(adapter)
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)>
{
  adapter
    .request_device(&wgpu::DeviceDescriptor {
      label: Some("Arcview Device"),
      required_features: wgpu::Features::empty(),
      required_limits: wgpu::Limits::default(),
      ..Default::default()
    })
    .await
    .context("failed to create device")
}

fn configure_surface(
  width: u32,
  height: u32,
  surface: &wgpu::Surface<'_>,
  adapter: &wgpu::Adapter,
  device: &wgpu::Device,
) -> anyhow::Result<wgpu::SurfaceConfiguration>
{
  let caps = surface.get_capabilities(adapter);

  // egui and the background colour both expect a non-sRGB target
  let format = caps
    .formats
    .iter()
    .copied()
    .find(|f| !f.is_srgb())
    .or_else(|| caps.formats.first().copied())
    .context("surface reports no supported formats")?;

  let config = wgpu::SurfaceConfiguration {
    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
    format,
    width: width.max(1),
    height: height.max(1),
    present_mode: wgpu::PresentMode::Fifo,
    alpha_mode: wgpu::CompositeAlphaMode::Auto,
    view_formats: vec![],
    desired_maximum_frame_latency: 2,
  };

  surface.configure(device, &config);
  Ok(config)
}

fn create_scene_resources(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::BindGroup, wgpu::BindGroupLayout)
{
  let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
    label: Some("Scene Buffer"),
    size: std::mem::size_of::<SceneUniform>() as u64,
    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    mapped_at_creation: false,
  });

  let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Scene BGL"),
    entries: &[wgpu::BindGroupLayoutEntry {
      binding: 0,
      visibility: wgpu::ShaderStages::VERTEX,
      ty: wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
      },
      count: None,
    }],
  });

  let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Scene BG"),
    layout: &scene_bgl,
    entries: &[wgpu::BindGroupEntry { binding: 0, resource: scene_buffer.as_entire_binding() }],
  });

  (scene_buffer, scene_bind_group, scene_bgl)
}

fn create_pipeline(
  device: &wgpu::Device,
  config: &wgpu::SurfaceConfiguration,
  bind_group_layouts: &[&wgpu::BindGroupLayout],
  topology: wgpu::PrimitiveTopology,
  label: &str,
) -> wgpu::RenderPipeline
{
  let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
    label: Some("Scene Shader"),
    source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
  });

  let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
    label: Some(label),
    bind_group_layouts,
    push_constant_ranges: &[],
  });

  device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
    label: Some(label),
    layout: Some(&layout),
    vertex: wgpu::VertexState {
      module: &shader,
      entry_point: Some("vs_main"),
      buffers: &[wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
      }],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    },
    fragment: Some(wgpu::FragmentState {
      module: &shader,
      entry_point: Some("fs_main"),
      targets: &[Some(wgpu::ColorTargetState {
        format: config.format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
      })],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    }),
    primitive: wgpu::PrimitiveState { topology, cull_mode: None, ..Default::default() },
    depth_stencil: Some(wgpu::DepthStencilState {
      format: DEPTH_FORMAT,
      depth_write_enabled: true,
      depth_compare: wgpu::CompareFunction::Less,
      stencil: wgpu::StencilState::default(),
      bias: wgpu::DepthBiasState::default(),
    }),
    multisample: wgpu::MultisampleState::default(),
    multiview: None,
    cache: None,
  })
}

fn clear_color(options: &RenderOptions) -> wgpu::Color
{
  let [r, g, b] = options.background;
  wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: 1.0 }
}
