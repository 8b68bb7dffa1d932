use crate::document::{MovieDocument, NestedRef};
use etl_core::{FilmWorkAssembled, Role};
use std::collections::HashSet;

/// Maps an assembled film work to its movie document. Pure, synchronous,
/// no I/O — persons with a role outside {actor, director, writer} are
/// silently excluded, never an error.
pub fn transform_film_work(film_work: &FilmWorkAssembled) -> MovieDocument {
  let directors: Vec<_> = film_work
    .persons
    .iter()
    .filter(|p| p.role == Some(Role::Director))
    .collect();
  let actors: Vec<_> = film_work.persons.iter().filter(|p| p.role == Some(Role::Actor)).collect();
  let writers: Vec<_> = film_work.persons.iter().filter(|p| p.role == Some(Role::Writer)).collect();

  MovieDocument {
    id: film_work.id,
    imdb_rating: film_work.rating,
    genres: film_work
      .genres
      .iter()
      .map(|g| NestedRef {
        id: g.id,
        name: g.name.clone(),
      })
      .collect(),
    title: film_work.title.clone(),
    description: film_work.description.clone(),
    directors_names: dedup_names(&directors),
    actors_names: dedup_names(&actors),
    writers_names: dedup_names(&writers),
    directors: to_nested(&directors),
    actors: to_nested(&actors),
    writers: to_nested(&writers),
  }
}

fn dedup_names(persons: &[&etl_core::FilmPerson]) -> Vec<String> {
  persons
    .iter()
    .map(|p| p.full_name.clone())
    .collect::<HashSet<_>>()
    .into_iter()
    .collect()
}

fn to_nested(persons: &[&etl_core::FilmPerson]) -> Vec<NestedRef> {
  persons
    .iter()
    .map(|p| NestedRef {
      id: p.id,
      name: p.full_name.clone(),
    })
    .collect()
}
