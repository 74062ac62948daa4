pub mod parser;
pub mod types;

pub use parser::{classify_line, parse_components, LineClass, ReadingClassifier, ReadingKind};
pub use types::*;
