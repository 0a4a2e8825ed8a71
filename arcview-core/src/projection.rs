use glam::DMat4;

//
// ──────────────────────────────────────────────────────────────
//   Viewport
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport
{
  pub width: u32,
  pub height: u32,
}

impl Viewport
{
  pub fn new(width: u32, height: u32) -> Self
  {
    Self { width, height }
  }

  /// Width over height. A zero dimension counts as one pixel so the
  /// ratio is always finite and positive.
  pub fn aspect(&self) -> f64
  {
    f64::from(self.width.max(1)) / f64::from(self.height.max(1))
  }
}

impl Default for Viewport
{
  fn default() -> Self
  {
    Self::new(100, 100)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Perspective intrinsics
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective
{
  pub fov_degrees: f64,
  pub near: f64,
  pub far: f64,
}

impl Perspective
{
  pub fn new(fov_degrees: f64, near: f64, far: f64) -> Self
  {
    Self { fov_degrees, near, far }
  }

  /// Symmetric OpenGL-style perspective (same as `glm::perspective`):
  ///
  /// ```text
  /// [ 1/(a·t)   0      0               0            ]
  /// [ 0         1/t    0               0            ]
  /// [ 0         0      -(f+n)/(f-n)    -2fn/(f-n)   ]
  /// [ 0         0      -1              0            ]
  /// ```
  ///
  /// with `t = tan(fovy/2)` and `a` the viewport aspect.
  pub fn matrix(&self, viewport: Viewport) -> DMat4
  {
    DMat4::perspective_rh_gl(self.fov_degrees.to_radians(), viewport.aspect(), self.near, self.far)
  }
}

impl Default for Perspective
{
  fn default() -> Self
  {
    Self::new(30.0, 0.1, 1000.0)
  }
}

#[cfg(test)]
mod tests
{
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn aspect_guards_zero_dimensions()
  {
    assert_relative_eq!(Viewport::new(0, 0).aspect(), 1.0);
    assert_relative_eq!(Viewport::new(640, 0).aspect(), 640.0);
    assert_relative_eq!(Viewport::new(0, 480).aspect(), 1.0 / 480.0);
    assert_relative_eq!(Viewport::new(1280, 720).aspect(), 1280.0 / 720.0);
  }

  #[test]
  fn matrix_matches_classic_gl_layout()
  {
    let persp = Perspective::default();
    let m = persp.matrix(Viewport::new(200, 100));

    let t = (15.0_f64).to_radians().tan();
    let (n, f) = (0.1, 1000.0);

    // glam is column-major: m.col(c)[r]
    assert_relative_eq!(m.col(0)[0], 1.0 / (2.0 * t), epsilon = 1e-12);
    assert_relative_eq!(m.col(1)[1], 1.0 / t, epsilon = 1e-12);
    assert_relative_eq!(m.col(2)[2], -(f + n) / (f - n), epsilon = 1e-12);
    assert_relative_eq!(m.col(2)[3], -1.0);
    assert_relative_eq!(m.col(3)[2], -2.0 * f * n / (f - n), epsilon = 1e-12);
    assert_relative_eq!(m.col(3)[3], 0.0);
  }

  #[test]
  fn near_and_far_map_to_gl_depth_range()
  {
    let persp = Perspective::default();
    let m = persp.matrix(Viewport::default());

    let near = m.project_point3(glam::DVec3::new(0.0, 0.0, -persp.near));
    let far = m.project_point3(glam::DVec3::new(0.0, 0.0, -persp.far));

    assert_relative_eq!(near.z, -1.0, epsilon = 1e-9);
    assert_relative_eq!(far.z, 1.0, epsilon = 1e-9);
  }

  #[test]
  fn zero_viewport_gives_finite_matrix()
  {
    let m = Perspective::default().matrix(Viewport::new(0, 0));
    assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
  }
}
