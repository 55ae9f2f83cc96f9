/// Scroll progress sampling and frame quantization.
pub mod progress;
