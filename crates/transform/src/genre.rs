use crate::document::GenreDocument;
use etl_core::Genre;

pub fn transform_genre(genre: &Genre) -> GenreDocument {
  GenreDocument {
    id: genre.id,
    name: genre.name.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn maps_fields_one_to_one() {
    let id = Uuid::new_v4();
    let genre = Genre {
      id,
      name: "Drama".to_string(),
    };
    let doc = transform_genre(&genre);
    assert_eq!(doc.id, id);
    assert_eq!(doc.name, "Drama");
  }
}
