mod gemini;
pub use gemini::*;

pub mod annotator;
pub mod export;
pub mod markdown;

pub use annotator::Annotator;
