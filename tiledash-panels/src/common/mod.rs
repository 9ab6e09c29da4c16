pub mod colors;
pub mod formatting;
pub mod highlight;

pub use colors::*;
pub use formatting::*;
pub use highlight::Highlighter;
