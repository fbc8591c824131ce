//! Small formatting helpers shared by the renderer, feeds and CLI

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
