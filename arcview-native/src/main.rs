mod app;
mod camera;
mod cloud;
mod input;
mod renderer;
mod settings;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use arcview_core::ArcCameraControl;
use clap::Parser;

use crate::cloud::PointCloud;
use crate::settings::ViewerConfig;

/// Point-cloud viewer with an arc-ball camera.
///
/// Left drag orbits, right drag pans, the wheel zooms.
#[derive(Parser, Debug)]
#[command(name = "arcview", version, about)]
struct Args
{
  /// Point cloud to display (.pcd, ascii or binary)
  cloud: Option<PathBuf>,

  /// Viewer configuration file (JSON)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Initial window width in pixels
  #[arg(long, default_value_t = 1280)]
  width: u32,

  /// Initial window height in pixels
  #[arg(long, default_value_t = 720)]
  height: u32,
}

fn main() -> anyhow::Result<()>
{
  // wgpu validation errors and warnings go to the console.
  // RUST_LOG overrides the default, e.g. RUST_LOG=wgpu=debug.
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,wgpu_hal=off,naga=warn"))
    .init();

  let args = Args::parse();

  let config = match &args.config
  {
    Some(path) => ViewerConfig::load(path)?,
    None => ViewerConfig::default(),
  };

  let camera = ArcCameraControl::with_config(config.camera.clone()).context("invalid camera configuration")?;

  // A bad cloud is not fatal; the axes are still worth showing
  let cloud = args.cloud.as_deref().and_then(|path| match PointCloud::load(path)
  {
    Ok(cloud) => Some(cloud),
    Err(err) =>
    {
      log::error!("failed to load {}: {}", path.display(), err);
      None
    }
  });

  app::run(app::Launch {
    title: "arcview".to_string(),
    width: args.width,
    height: args.height,
    camera,
    options: config.render,
    cloud,
  })
}
