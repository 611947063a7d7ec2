// Chart model: viewport transform, price scale, overlays and the frame pipeline
pub mod overlay;
pub mod renderer;
pub mod scale;
pub mod scene;
pub mod viewport;

pub use renderer::ChartRenderer;
pub use scene::Scene;
