//! Plot stage outputs: the SVG figure and a terminal preview.

pub mod ascii;
pub mod figure;

pub use ascii::render_ascii_curves;
pub use figure::render_curves_svg;
