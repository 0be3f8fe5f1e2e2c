pub mod annotate;
pub mod index;

pub use annotate::*;
pub use index::*;
