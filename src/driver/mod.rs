pub mod chrome;
pub mod html;
pub mod traits;
pub mod types;

pub use chrome::ChromeDocument;
pub use html::HtmlDocument;
pub use traits::Document;
pub use types::{normalize_whitespace, Query, TextMatch};
