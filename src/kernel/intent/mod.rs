pub mod matchers;
pub mod parser;
pub mod types;
pub mod vocab;

pub use parser::IntentParser;
pub use types::*;
