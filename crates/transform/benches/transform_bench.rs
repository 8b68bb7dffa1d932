use criterion::{Criterion, black_box, criterion_group, criterion_main};
use etl_core::{FilmPerson, FilmWorkAssembled, Genre, Role};
use transform::transform_film_work;
use uuid::Uuid;

fn sample_film_work() -> FilmWorkAssembled {
  FilmWorkAssembled {
    id: Uuid::new_v4(),
    title: "A".to_string(),
    rating: Some(8.1),
    description: Some("desc".to_string()),
    updated_at: None,
    genres: (0..5)
      .map(|i| Genre {
        id: Uuid::new_v4(),
        name: format!("Genre {i}"),
      })
      .collect(),
    persons: (0..30)
      .map(|i| FilmPerson {
        id: Uuid::new_v4(),
        full_name: format!("Person {i}"),
        role: Some(match i % 3 {
          0 => Role::Actor,
          1 => Role::Director,
          _ => Role::Writer,
        }),
      })
      .collect(),
  }
}

fn transform_benchmark(c: &mut Criterion) {
  let film_work = sample_film_work();
  c.bench_function("transform_film_work", |b| {
    b.iter(|| black_box(transform_film_work(black_box(&film_work))))
  });
}

criterion_group!(benches, transform_benchmark);
criterion_main!(benches);
