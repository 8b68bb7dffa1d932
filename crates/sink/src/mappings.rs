// Fixed index settings and mappings. These are a contract with the
// query layer — nested fields in particular must not be relaxed, since
// filtering by `genres.id` or `actors.id` depends on each element being
// indexed as its own hidden sub-document.

use serde_json::{Value, json};

fn analyzed_text() -> Value {
  json!({ "type": "text", "analyzer": "ru_en" })
}

fn nested_person() -> Value {
  json!({
    "type": "nested",
    "dynamic": "strict",
    "properties": {
      "id": { "type": "keyword" },
      "name": { "type": "text", "analyzer": "ru_en" }
    }
  })
}

pub fn movies_index_body() -> Value {
  json!({
    "settings": {
      "refresh_interval": "1s",
      "analysis": {
        "filter": {
          "english_stop": { "type": "stop", "stopwords": "_english_" },
          "english_stemmer": { "type": "stemmer", "language": "english" },
          "english_possessive_stemmer": { "type": "stemmer", "language": "possessive_english" },
          "russian_stop": { "type": "stop", "stopwords": "_russian_" },
          "russian_stemmer": { "type": "stemmer", "language": "russian" }
        },
        "analyzer": {
          "ru_en": {
            "tokenizer": "standard",
            "filter": [
              "lowercase",
              "english_stop",
              "english_stemmer",
              "english_possessive_stemmer",
              "russian_stop",
              "russian_stemmer"
            ]
          }
        }
      }
    },
    "mappings": {
      "dynamic": "strict",
      "properties": {
        "id": { "type": "keyword" },
        "imdb_rating": { "type": "float" },
        "genres": {
          "type": "nested",
          "dynamic": "strict",
          "properties": {
            "id": { "type": "keyword" },
            "name": { "type": "text" }
          }
        },
        "title": {
          "type": "text",
          "analyzer": "ru_en",
          "fields": { "raw": { "type": "keyword" } }
        },
        "description": analyzed_text(),
        "directors_names": analyzed_text(),
        "actors_names": analyzed_text(),
        "writers_names": analyzed_text(),
        "directors": nested_person(),
        "actors": nested_person(),
        "writers": nested_person()
      }
    }
  })
}

fn id_and_name_with_raw() -> Value {
  json!({
    "dynamic": "strict",
    "properties": {
      "id": { "type": "keyword" },
      "name": {
        "type": "text",
        "fields": { "raw": { "type": "keyword" } }
      }
    }
  })
}

pub fn genres_index_body() -> Value {
  json!({ "mappings": id_and_name_with_raw() })
}

pub fn persons_index_body() -> Value {
  json!({ "mappings": id_and_name_with_raw() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn movies_mapping_is_dynamic_strict_with_nested_genres() {
    let body = movies_index_body();
    assert_eq!(body["mappings"]["dynamic"], "strict");
    assert_eq!(body["mappings"]["properties"]["genres"]["type"], "nested");
    assert_eq!(body["mappings"]["properties"]["title"]["analyzer"], "ru_en");
    assert_eq!(body["mappings"]["properties"]["title"]["fields"]["raw"]["type"], "keyword");
  }

  #[test]
  fn genres_and_persons_mappings_share_shape() {
    assert_eq!(genres_index_body(), persons_index_body());
    assert_eq!(genres_index_body()["mappings"]["properties"]["id"]["type"], "keyword");
  }
}
