// Per-tick orchestration: genres, then persons, then movies. Each
// pipeline's source and sink calls are independently wrapped by the retry
// policy — wrapping composes, it is not one retry around the whole tick.

use etl_core::{Config, MovieWatermarks};
use retry::RetryPolicy;
use sink::SinkWriter;
use source::SourceReader;
use state::StateStore;
use tracing::info;
use transform::{transform_film_work, transform_genre, transform_person};

use crate::error::Result;

fn max_timestamp(a: Option<chrono::DateTime<chrono::Utc>>, b: Option<chrono::DateTime<chrono::Utc>>) -> Option<chrono::DateTime<chrono::Utc>> {
  match (a, b) {
    (Some(a), Some(b)) => Some(a.max(b)),
    (Some(a), None) => Some(a),
    (None, Some(b)) => Some(b),
    (None, None) => None,
  }
}

pub struct Coordinator {
  config: Config,
  sink: SinkWriter,
  state: StateStore,
  retry_policy: RetryPolicy,
}

impl Coordinator {
  pub fn new(config: Config, sink: SinkWriter, state: StateStore) -> Self {
    Self {
      config,
      sink,
      state,
      retry_policy: RetryPolicy::default(),
    }
  }

  pub fn state(&self) -> &StateStore {
    &self.state
  }

  fn load_watermarks(&self) -> MovieWatermarks {
    MovieWatermarks {
      film_work_ts: self.state.get("film_work_ts"),
      genre_ts: self.state.get("genre_ts"),
      person_ts: self.state.get("person_ts"),
      genre_film_work_ts: self.state.get("genre_film_work_ts"),
      person_film_work_ts: self.state.get("person_film_work_ts"),
    }
  }

  /// Runs one full tick: opens a source connection, runs the three
  /// pipelines in order, and closes the connection before returning.
  pub async fn run_tick(&mut self) -> Result<()> {
    let reader = SourceReader::connect(&self.config.postgres).await?;
    let watermarks = self.load_watermarks();

    self.run_genres_pipeline(&reader, watermarks.genre_ts).await?;
    self.run_persons_pipeline(&reader, watermarks.person_ts).await?;
    self.run_movies_pipeline(&reader, &watermarks).await?;

    reader.close().await;
    Ok(())
  }

  async fn run_genres_pipeline(&mut self, reader: &SourceReader, genre_ts: Option<chrono::DateTime<chrono::Utc>>) -> Result<()> {
    let (genres, new_ts) = retry::retry(&self.retry_policy, source::is_transient, || reader.fetch_changed_genres(genre_ts)).await?;

    if !genres.is_empty() {
      let docs: Vec<_> = genres.iter().map(transform_genre).collect();
      let index = self.config.sink.genres_index.clone();
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.ensure_genres_index(&index)).await?;
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.bulk_load(&docs, &index)).await?;
      info!(count = docs.len(), "genres pipeline indexed documents");
    }

    self.state.set("genre_ts", new_ts)?;
    Ok(())
  }

  async fn run_persons_pipeline(&mut self, reader: &SourceReader, person_ts: Option<chrono::DateTime<chrono::Utc>>) -> Result<()> {
    let (persons, new_ts) = retry::retry(&self.retry_policy, source::is_transient, || reader.fetch_changed_persons(person_ts)).await?;

    if !persons.is_empty() {
      let docs: Vec<_> = persons.iter().map(transform_person).collect();
      let index = self.config.sink.persons_index.clone();
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.ensure_persons_index(&index)).await?;
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.bulk_load(&docs, &index)).await?;
      info!(count = docs.len(), "persons pipeline indexed documents");
    }

    self.state.set("person_ts", new_ts)?;
    Ok(())
  }

  async fn run_movies_pipeline(&mut self, reader: &SourceReader, watermarks: &MovieWatermarks) -> Result<()> {
    let mut affected_ids = std::collections::HashSet::new();

    let (ids, film_work_ts) = retry::retry(&self.retry_policy, source::is_transient, || {
      reader.fetch_changed_film_work_ids(watermarks.film_work_ts)
    })
    .await?;
    affected_ids.extend(ids);

    let (ids, genre_ts) = retry::retry(&self.retry_policy, source::is_transient, || {
      reader.fetch_film_work_ids_by_changed_genres(watermarks.genre_ts)
    })
    .await?;
    affected_ids.extend(ids);

    let (ids, person_ts) = retry::retry(&self.retry_policy, source::is_transient, || {
      reader.fetch_film_work_ids_by_changed_persons(watermarks.person_ts)
    })
    .await?;
    affected_ids.extend(ids);

    let (ids, genre_film_work_ts) = retry::retry(&self.retry_policy, source::is_transient, || {
      reader.fetch_film_work_ids_by_changed_genre_film_work(watermarks.genre_film_work_ts)
    })
    .await?;
    affected_ids.extend(ids);

    let (ids, person_film_work_ts) = retry::retry(&self.retry_policy, source::is_transient, || {
      reader.fetch_film_work_ids_by_changed_person_film_work(watermarks.person_film_work_ts)
    })
    .await?;
    affected_ids.extend(ids);

    if affected_ids.is_empty() {
      info!("no changes detected for movies pipeline");
    } else {
      let assembled = retry::retry(&self.retry_policy, source::is_transient, || reader.assemble_film_works(&affected_ids)).await?;
      let docs: Vec<_> = assembled.iter().map(transform_film_work).collect();
      let index = self.config.sink.movies_index.clone();
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.ensure_movies_index(&index)).await?;
      retry::retry(&self.retry_policy, sink::is_transient, || self.sink.bulk_load(&docs, &index)).await?;
      info!(count = docs.len(), "movies pipeline indexed documents");
    }

    // Watermarks advance even when affected_ids is empty: the five change
    // queries may still have moved their own max(updated_at) forward.
    //
    // genre_ts/person_ts were already committed once by the genres/persons
    // pipelines earlier in this tick, over *all* changed genres/persons.
    // This fan-in only sees the ones joined to a film work, so its own
    // max can be smaller; take the max of both so a genre or person
    // attached to no film work never regresses the watermark already on
    // disk.
    self.state.set("film_work_ts", film_work_ts)?;
    self.state.set("genre_ts", max_timestamp(self.state.get("genre_ts"), genre_ts))?;
    self.state.set("person_ts", max_timestamp(self.state.get("person_ts"), person_ts))?;
    self.state.set("genre_film_work_ts", genre_film_work_ts)?;
    self.state.set("person_film_work_ts", person_film_work_ts)?;
    Ok(())
  }
}
