// GUI components module
pub mod chart;
pub mod command_palette;
pub mod toolbar;

pub use chart::ChartView;
pub use command_palette::AssetPalette;
pub use toolbar::Toolbar;
