pub mod config;
pub mod dto;
pub mod error;

pub use config::{Config, PostgresConfig, SinkConfig};
pub use dto::{FilmPerson, FilmWorkAssembled, Genre, MovieWatermarks, Person, Role};
pub use error::{ConfigError, Result};

/// Implemented by sink document types so the sink writer can build bulk
/// action lines (`_id = str(doc.id)`) without depending on `transform`'s
/// concrete document types.
pub trait Identified {
  fn id(&self) -> uuid::Uuid;
}
