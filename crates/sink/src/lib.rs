pub mod client;
pub mod error;
pub mod mappings;

pub use client::SinkWriter;
pub use error::{SinkError, is_transient};
