// Paginated layout engine: measurement primitives, greedy wrap, page breaks.

pub mod engine;
pub mod font_metrics;

pub use engine::{render_document, PageRenderer, PageSink};
pub use font_metrics::{Font, Geometry};
