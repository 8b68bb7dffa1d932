use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person's role on a film work, as recorded in `person_film_work`.
///
/// Roles outside this set are still representable (`Role::from_str` never
/// fails to parse a row) but are dropped by the transformer — see
/// [`transform`](https://docs.rs/transform) — rather than rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Actor,
  Director,
  Writer,
}

impl std::str::FromStr for Role {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "actor" => Ok(Role::Actor),
      "director" => Ok(Role::Director),
      "writer" => Ok(Role::Writer),
      _ => Err(()),
    }
  }
}

/// A genre as read from `content.genre`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
  pub id: Uuid,
  pub name: String,
}

/// A person as read from `content.person`, with no role attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id: Uuid,
  pub full_name: String,
}

/// A person embedded in an assembled film work, carrying the join role.
///
/// `role` is `None` when the source string did not parse as a known
/// [`Role`] — the row still exists, it just carries no role the
/// transformer recognises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmPerson {
  pub id: Uuid,
  pub full_name: String,
  pub role: Option<Role>,
}

/// The full denormalised film work, assembled by the source reader's
/// `AssembleFilmWorks` join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmWorkAssembled {
  pub id: Uuid,
  pub title: String,
  pub rating: Option<f64>,
  pub description: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
  pub genres: Vec<Genre>,
  pub persons: Vec<FilmPerson>,
}

/// The five watermarks that gate the movies pipeline's fan-in.
///
/// A `None` means "from the beginning" — no row in that table has ever been
/// reflected into the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieWatermarks {
  pub film_work_ts: Option<DateTime<Utc>>,
  pub genre_ts: Option<DateTime<Utc>>,
  pub person_ts: Option<DateTime<Utc>>,
  pub genre_film_work_ts: Option<DateTime<Utc>>,
  pub person_film_work_ts: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn role_parses_known_values() {
    assert_eq!(Role::from_str("actor"), Ok(Role::Actor));
    assert_eq!(Role::from_str("director"), Ok(Role::Director));
    assert_eq!(Role::from_str("writer"), Ok(Role::Writer));
  }

  #[test]
  fn role_rejects_unknown_values() {
    assert!(Role::from_str("composer").is_err());
  }

  #[test]
  fn watermarks_default_to_none() {
    let w = MovieWatermarks::default();
    assert!(w.film_work_ts.is_none());
    assert!(w.genre_ts.is_none());
    assert!(w.person_ts.is_none());
    assert!(w.genre_film_work_ts.is_none());
    assert!(w.person_film_work_ts.is_none());
  }
}
