pub mod document;
pub mod film_work;
pub mod genre;
pub mod person;

pub use document::{GenreDocument, MovieDocument, NestedRef, PersonDocument};
pub use film_work::transform_film_work;
pub use genre::transform_genre;
pub use person::transform_person;
