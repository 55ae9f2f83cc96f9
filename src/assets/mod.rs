/// Frame decoding into drawable RGBA images.
pub mod decode;
/// Byte retrieval by locator.
pub mod fetch;
