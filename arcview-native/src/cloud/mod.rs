pub mod pcd;

use std::path::Path;

pub use pcd::CloudError;

//
// ──────────────────────────────────────────────────────────────
//   PointCloud (xyz only, world units)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds
{
  pub min: [f32; 3],
  pub max: [f32; 3],
}

#[derive(Debug, Clone, Default)]
pub struct PointCloud
{
  pub points: Vec<[f32; 3]>,
}

impl PointCloud
{
  pub fn from_points(points: Vec<[f32; 3]>) -> Self
  {
    Self { points }
  }

  pub fn load(path: &Path) -> Result<Self, CloudError>
  {
    let cloud = pcd::read_file(path)?;

    match cloud.bounds()
    {
      Some(b) => log::info!(
        "loaded {} points from {} (bounds {:?} .. {:?})",
        cloud.len(),
        path.display(),
        b.min,
        b.max
      ),
      None => log::warn!("{} contains no finite points", path.display()),
    }

    Ok(cloud)
  }

  pub fn len(&self) -> usize
  {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool
  {
    self.points.is_empty()
  }

  pub fn bounds(&self) -> Option<Bounds>
  {
    let first = *self.points.first()?;

    let bounds = self.points.iter().fold(Bounds { min: first, max: first }, |mut b, p| {
      for i in 0..3
      {
        b.min[i] = b.min[i].min(p[i]);
        b.max[i] = b.max[i].max(p[i]);
      }
      b
    });

    Some(bounds)
  }
}
