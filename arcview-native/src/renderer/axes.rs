use glam::Vec3;
use wgpu::util::DeviceExt;

use super::draw::{DrawBinding, DrawUniform};
use super::Vertex;
use crate::settings::RenderOptions;

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

// Half-width of each axis bar, in unscaled model units
const LINE_HALF_WIDTH: f32 = 0.01;

const COL_X: [f32; 3] = [1.0, 0.0, 0.0];
const COL_Y: [f32; 3] = [0.0, 1.0, 0.0];
const COL_Z: [f32; 3] = [0.0, 0.0, 1.0];

// Four side faces of one bar, two triangles each. Corner order:
//   0,1 = start/end at -x   2,3 = start/end at +x
//   4,5 = start/end at -y   6,7 = start/end at +y
#[rustfmt::skip]
const BAR_INDICES: [u16; 24] = [
  0, 1, 4,  1, 5, 4,
  4, 5, 2,  5, 3, 2,
  2, 3, 6,  3, 6, 7,
  6, 7, 0,  7, 1, 0,
];

const INDEX_COUNT: u32 = 3 * BAR_INDICES.len() as u32;

//
// ──────────────────────────────────────────────────────────────
//   AxesMesh
//
//   Unit-length X/Y/Z bars from the origin. Each bar is a thin
//   box of triangles so its width does not depend on line
//   rasterisation support.
// ──────────────────────────────────────────────────────────────
//

pub struct AxesMesh
{
  pub vertex_buffer: wgpu::Buffer,
  pub index_buffer: wgpu::Buffer,
  pub index_count: u32,
  pub draw: DrawBinding,
}

impl AxesMesh
{
  pub fn create(device: &wgpu::Device, draw_bgl: &wgpu::BindGroupLayout, options: &RenderOptions) -> Self
  {
    let (vertices, indices) = build_geometry();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Axes Vertex Buffer"),
      contents: bytemuck::cast_slice(&vertices),
      usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Axes Index Buffer"),
      contents: bytemuck::cast_slice(&indices),
      usage: wgpu::BufferUsages::INDEX,
    });

    let draw = DrawBinding::create(device, draw_bgl, "Axes Draw Uniform", DrawUniform::axes(options));

    Self { vertex_buffer, index_buffer, index_count: INDEX_COUNT, draw }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Geometry builder
// ──────────────────────────────────────────────────────────────
//

fn make_vertex(pos: Vec3, col: [f32; 3]) -> Vertex
{
  [pos.x, pos.y, pos.z, col[0], col[1], col[2]]
}

fn push_bar(vertices: &mut Vec<Vertex>, indices: &mut Vec<u16>, start: Vec3, end: Vec3, col: [f32; 3])
{
  let dir = (end - start).normalize();

  // any reference axis not parallel to the bar works
  let reference = if dir.dot(Vec3::Z).abs() < 0.9 { Vec3::Z } else { Vec3::X };
  let local_x = reference.cross(dir).normalize() * LINE_HALF_WIDTH;
  let local_y = local_x.cross(dir).normalize() * LINE_HALF_WIDTH;

  let base = vertices.len() as u16;

  for offset in [-local_x, local_x, -local_y, local_y]
  {
    vertices.push(make_vertex(start + offset, col));
    vertices.push(make_vertex(end + offset, col));
  }

  indices.extend(BAR_INDICES.iter().map(|i| base + i));
}

fn build_geometry() -> (Vec<Vertex>, Vec<u16>)
{
  let mut vertices = Vec::with_capacity(24);
  let mut indices = Vec::with_capacity(72);

  push_bar(&mut vertices, &mut indices, Vec3::ZERO, Vec3::X, COL_X);
  push_bar(&mut vertices, &mut indices, Vec3::ZERO, Vec3::Y, COL_Y);
  push_bar(&mut vertices, &mut indices, Vec3::ZERO, Vec3::Z, COL_Z);

  (vertices, indices)
}
