use anyhow::Context;
use wgpu::util::DeviceExt;

use super::draw::{DrawBinding, DrawUniform};
use super::Vertex;
use crate::cloud::PointCloud;
use crate::settings::RenderOptions;

// Base colour; the height ramp replaces it unless the colour mode is "white"
const COL_POINT: [f32; 3] = [1.0, 1.0, 1.0];

pub struct PointCloudMesh
{
  pub vertex_buffer: wgpu::Buffer,
  pub vertex_count: u32,
  pub draw: DrawBinding,
}

impl PointCloudMesh
{
  /// Upload the cloud once. Returns None for an empty cloud.
  pub fn create(
    device: &wgpu::Device,
    draw_bgl: &wgpu::BindGroupLayout,
    cloud: &PointCloud,
    options: &RenderOptions,
  ) -> anyhow::Result<Option<Self>>
  {
    if cloud.is_empty()
    {
      return Ok(None);
    }

    let vertex_count = draw_count(cloud.len())?;
    let vertices = build_vertices(cloud);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Point Cloud Vertex Buffer"),
      contents: bytemuck::cast_slice(&vertices),
      usage: wgpu::BufferUsages::VERTEX,
    });

    let draw = DrawBinding::create(device, draw_bgl, "Point Cloud Draw Uniform", DrawUniform::cloud(options));

    Ok(Some(Self { vertex_buffer, vertex_count, draw }))
  }
}

fn draw_count(points: usize) -> anyhow::Result<u32>
{
  u32::try_from(points).with_context(|| format!("{} points exceed a single draw call", points))
}

fn build_vertices(cloud: &PointCloud) -> Vec<Vertex>
{
  cloud
    .points
    .iter()
    .map(|p| [p[0], p[1], p[2], COL_POINT[0], COL_POINT[1], COL_POINT[2]])
    .collect()
}
