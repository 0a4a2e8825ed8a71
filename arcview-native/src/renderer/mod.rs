mod axes;
mod core;
mod depth;
mod draw;
mod gui;
mod points;

pub use self::core::Renderer;
pub use gui::GuiRenderer;

//
// ──────────────────────────────────────────────────────────────
//   Vertex layout shared by every scene mesh: [x, y, z,  r, g, b]
// ──────────────────────────────────────────────────────────────
//

pub type Vertex = [f32; 6];
