pub mod traits;
pub mod http;
pub mod parser;

pub use traits::DocumentFetcher;
pub use http::{HttpFetcher, FETCH_TIMEOUT};
pub use parser::{parse_document, ParsedFeedDocument, ParsedItem};
