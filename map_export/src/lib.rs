mod canvas;
mod glyphs;
pub mod options;
pub mod render;

pub use options::{
    ExportFormat, ExportOptions, ExportQuality, ExportSize, ExportStyle, ExportTheme,
    UnknownOption,
};
pub use render::{file_name, render, render_framed, ExportError, ExportPoint, RenderedMap};
