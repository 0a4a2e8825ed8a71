use arcview_core::CameraControl;
use glam::DMat4;

//
// ──────────────────────────────────────────────────────────────
//   Scene Uniform (GPU side)
//
//   WGSL layout (scene.wgsl, group 0):
//     view : mat4x4<f32>   → 64 bytes
//     proj : mat4x4<f32>   → 64 bytes
//   Total: 128 bytes
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform
{
  pub view: [[f32; 4]; 4],
  pub proj: [[f32; 4]; 4],
}

// Catch CPU/GPU layout mismatches at compile time
const _: () = assert!(std::mem::size_of::<SceneUniform>() == 128);

// The camera produces OpenGL clip depth in [-1, 1]; wgpu expects [0, 1].
#[rustfmt::skip]
const GL_TO_WGPU_DEPTH: DMat4 = DMat4::from_cols_array(&[
  1.0, 0.0, 0.0, 0.0,
  0.0, 1.0, 0.0, 0.0,
  0.0, 0.0, 0.5, 0.0,
  0.0, 0.0, 0.5, 1.0,
]);

impl SceneUniform
{
  pub fn from_camera(camera: &dyn CameraControl) -> Self
  {
    let view = camera.view_matrix();
    let proj = GL_TO_WGPU_DEPTH * camera.projection_matrix();

    Self { view: view.as_mat4().to_cols_array_2d(), proj: proj.as_mat4().to_cols_array_2d() }
  }
}
