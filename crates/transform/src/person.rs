use crate::document::PersonDocument;
use etl_core::Person;

pub fn transform_person(person: &Person) -> PersonDocument {
  PersonDocument {
    id: person.id,
    name: person.full_name.clone(),
  }
}
