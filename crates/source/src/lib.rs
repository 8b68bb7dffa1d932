pub mod error;
pub mod reader;

pub use error::{SourceError, is_transient};
pub use reader::SourceReader;
