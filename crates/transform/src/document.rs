use etl_core::Identified;
use serde::Serialize;
use uuid::Uuid;

/// A genre or person reference embedded in a movie document as a nested
/// field — indexed as a hidden sub-document so a query on `genres.id` or
/// `actors.id` cannot conflate two different elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedRef {
  pub id: Uuid,
  pub name: String,
}

/// The denormalised movie document written to the `movies` index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDocument {
  pub id: Uuid,
  pub imdb_rating: Option<f64>,
  pub genres: Vec<NestedRef>,
  pub title: String,
  pub description: Option<String>,
  pub directors_names: Vec<String>,
  pub actors_names: Vec<String>,
  pub writers_names: Vec<String>,
  pub directors: Vec<NestedRef>,
  pub actors: Vec<NestedRef>,
  pub writers: Vec<NestedRef>,
}

impl Identified for MovieDocument {
  fn id(&self) -> Uuid {
    self.id
  }
}

/// The document written to the `genres` index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDocument {
  pub id: Uuid,
  pub name: String,
}

impl Identified for GenreDocument {
  fn id(&self) -> Uuid {
    self.id
  }
}

/// The document written to the `persons` index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDocument {
  pub id: Uuid,
  pub name: String,
}

impl Identified for PersonDocument {
  fn id(&self) -> Uuid {
    self.id
  }
}
