pub mod decoder;
pub mod framer;

pub use decoder::TextDecoder;
pub use framer::LineFramer;
