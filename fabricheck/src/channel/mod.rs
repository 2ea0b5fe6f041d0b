//! Channel layer: output accumulation and prompt detection.

mod buffer;

pub use buffer::PatternBuffer;
