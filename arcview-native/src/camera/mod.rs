mod uniform;

pub use uniform::SceneUniform;
