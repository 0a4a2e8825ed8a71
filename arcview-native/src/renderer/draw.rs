use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::settings::{ColorMode, RenderOptions};

pub const COLOR_MODE_HEIGHT: u32 = 0;
pub const COLOR_MODE_VERTEX: u32 = 1;

//
// ──────────────────────────────────────────────────────────────
//   Draw Uniform (GPU side, one per mesh)
//
//   WGSL layout (scene.wgsl, group 1):
//     model      : mat4x4<f32>  → 64 bytes
//     z_range    : vec2<f32>    → 8 bytes
//     color_mode : u32          → 4 bytes
//     z_clipping : u32          → 4 bytes
//   Total: 80 bytes
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform
{
  pub model: [[f32; 4]; 4],
  pub z_range: [f32; 2],
  pub color_mode: u32,
  pub z_clipping: u32,
}

const _: () = assert!(std::mem::size_of::<DrawUniform>() == 80);

impl DrawUniform
{
  /// Axes gizmo: scaled, vertex coloured, never clipped.
  pub fn axes(options: &RenderOptions) -> Self
  {
    Self {
      model: Mat4::from_scale(glam::Vec3::splat(options.axes_scale)).to_cols_array_2d(),
      z_range: options.z_range,
      color_mode: COLOR_MODE_VERTEX,
      z_clipping: 0,
    }
  }

  /// Point cloud: identity model, colour and clipping from the options.
  pub fn cloud(options: &RenderOptions) -> Self
  {
    let color_mode = match options.color_mode
    {
      ColorMode::Height => COLOR_MODE_HEIGHT,
      ColorMode::White => COLOR_MODE_VERTEX,
    };

    Self {
      model: Mat4::IDENTITY.to_cols_array_2d(),
      z_range: options.z_range,
      color_mode,
      z_clipping: u32::from(options.z_clipping),
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   DrawBinding (uniform buffer + bind group)
// ──────────────────────────────────────────────────────────────
//

pub struct DrawBinding
{
  buffer: wgpu::Buffer,
  pub bind_group: wgpu::BindGroup,
}

impl DrawBinding
{
  pub fn create(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, uniform: DrawUniform) -> Self
  {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some(label),
      contents: bytemuck::bytes_of(&uniform),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some(label),
      layout,
      entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });

    Self { buffer, bind_group }
  }

  pub fn update(&self, queue: &wgpu::Queue, uniform: DrawUniform)
  {
    queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
  }
}

pub fn create_draw_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout
{
  device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Draw BGL"),
    entries: &[wgpu::BindGroupLayoutEntry {
      binding: 0,
      visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
      ty: wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
      },
      count: None,
    }],
  })
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn axes_ignore_cloud_styling()
  {
    let options = RenderOptions { z_clipping: true, axes_scale: 2.0, ..Default::default() };
    let u = DrawUniform::axes(&options);

    assert_eq!(u.color_mode, COLOR_MODE_VERTEX);
    assert_eq!(u.z_clipping, 0);
    assert_eq!(u.model[0][0], 2.0);
    assert_eq!(u.model[3], [0.0, 0.0, 0.0, 1.0]);
  }

  #[test]
  fn cloud_follows_options()
  {
    let options = RenderOptions { z_clipping: true, z_range: [0.0, 4.0], ..Default::default() };
    let u = DrawUniform::cloud(&options);

    assert_eq!(u.color_mode, COLOR_MODE_HEIGHT);
    assert_eq!(u.z_clipping, 1);
    assert_eq!(u.z_range, [0.0, 4.0]);

    let white = DrawUniform::cloud(&RenderOptions { color_mode: ColorMode::White, ..Default::default() });
    assert_eq!(white.color_mode, COLOR_MODE_VERTEX);
    assert_eq!(white.z_clipping, 0);
  }
}
