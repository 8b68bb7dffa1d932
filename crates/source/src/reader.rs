// Postgres-backed source reader.
//
// Every change query binds its watermark parameter once and references it
// twice in SQL text (`$1 IS NULL OR updated_at > $1`) — Postgres resolves
// both occurrences of `$1` from the same bound value, so this only needs a
// single `.bind(ts)` call.

use chrono::{DateTime, Utc};
use etl_core::{FilmPerson, FilmWorkAssembled, Genre, Person, Role};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;

pub struct SourceReader {
  pool: PgPool,
}

impl SourceReader {
  pub async fn connect(postgres: &etl_core::PostgresConfig) -> Result<Self> {
    let url = format!(
      "postgres://{}:{}@{}:{}/{}",
      postgres.user, postgres.password, postgres.host, postgres.port, postgres.db
    );
    let pool = PgPoolOptions::new()
      .max_connections(1)
      .acquire_timeout(std::time::Duration::from_secs(5))
      .connect(&url)
      .await?;
    Ok(Self { pool })
  }

  pub async fn close(self) {
    self.pool.close().await;
  }

  async fn fetch_id_changes(&self, sql: &str, ts: Option<DateTime<Utc>>) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    #[derive(FromRow)]
    struct Row {
      id: Uuid,
      updated_at: DateTime<Utc>,
    }

    let rows: Vec<Row> = sqlx::query_as(sql).bind(ts).fetch_all(&self.pool).await?;
    let mut ids = HashSet::with_capacity(rows.len());
    let mut max_ts = ts;
    for row in &rows {
      ids.insert(row.id);
      if max_ts.is_none_or(|current| row.updated_at > current) {
        max_ts = Some(row.updated_at);
      }
    }
    Ok((ids, max_ts))
  }

  pub async fn fetch_changed_film_work_ids(&self, ts: Option<DateTime<Utc>>) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    let sql = "SELECT fw.id AS id, fw.updated_at AS updated_at \
               FROM content.film_work fw \
               WHERE ($1::timestamptz IS NULL OR fw.updated_at > $1) \
               ORDER BY fw.updated_at ASC";
    let (ids, new_ts) = self.fetch_id_changes(sql, ts).await?;
    info!(count = ids.len(), watermark = ?new_ts, "fetched changed film_work ids");
    Ok((ids, new_ts))
  }

  pub async fn fetch_film_work_ids_by_changed_genres(
    &self,
    ts: Option<DateTime<Utc>>,
  ) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    let sql = "SELECT gfw.film_work_id AS id, g.updated_at AS updated_at \
               FROM content.genre g \
               JOIN content.genre_film_work gfw ON g.id = gfw.genre_id \
               WHERE ($1::timestamptz IS NULL OR g.updated_at > $1) \
               ORDER BY g.updated_at ASC";
    let (ids, new_ts) = self.fetch_id_changes(sql, ts).await?;
    info!(count = ids.len(), watermark = ?new_ts, "fetched film_work ids by changed genres");
    Ok((ids, new_ts))
  }

  pub async fn fetch_film_work_ids_by_changed_persons(
    &self,
    ts: Option<DateTime<Utc>>,
  ) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    let sql = "SELECT pfw.film_work_id AS id, p.updated_at AS updated_at \
               FROM content.person p \
               JOIN content.person_film_work pfw ON p.id = pfw.person_id \
               WHERE ($1::timestamptz IS NULL OR p.updated_at > $1) \
               ORDER BY p.updated_at ASC";
    let (ids, new_ts) = self.fetch_id_changes(sql, ts).await?;
    info!(count = ids.len(), watermark = ?new_ts, "fetched film_work ids by changed persons");
    Ok((ids, new_ts))
  }

  pub async fn fetch_film_work_ids_by_changed_genre_film_work(
    &self,
    ts: Option<DateTime<Utc>>,
  ) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    let sql = "SELECT gfw.film_work_id AS id, gfw.updated_at AS updated_at \
               FROM content.genre_film_work gfw \
               WHERE ($1::timestamptz IS NULL OR gfw.updated_at > $1) \
               ORDER BY gfw.updated_at ASC";
    let (ids, new_ts) = self.fetch_id_changes(sql, ts).await?;
    info!(count = ids.len(), watermark = ?new_ts, "fetched film_work ids by changed genre_film_work");
    Ok((ids, new_ts))
  }

  pub async fn fetch_film_work_ids_by_changed_person_film_work(
    &self,
    ts: Option<DateTime<Utc>>,
  ) -> Result<(HashSet<Uuid>, Option<DateTime<Utc>>)> {
    let sql = "SELECT pfw.film_work_id AS id, pfw.updated_at AS updated_at \
               FROM content.person_film_work pfw \
               WHERE ($1::timestamptz IS NULL OR pfw.updated_at > $1) \
               ORDER BY pfw.updated_at ASC";
    let (ids, new_ts) = self.fetch_id_changes(sql, ts).await?;
    info!(count = ids.len(), watermark = ?new_ts, "fetched film_work ids by changed person_film_work");
    Ok((ids, new_ts))
  }

  pub async fn fetch_changed_genres(&self, ts: Option<DateTime<Utc>>) -> Result<(Vec<Genre>, Option<DateTime<Utc>>)> {
    #[derive(FromRow)]
    struct Row {
      id: Uuid,
      name: String,
      updated_at: DateTime<Utc>,
    }
    let sql = "SELECT g.id, g.name, g.updated_at \
               FROM content.genre g \
               WHERE ($1::timestamptz IS NULL OR g.updated_at > $1) \
               ORDER BY g.updated_at ASC";
    let rows: Vec<Row> = sqlx::query_as(sql).bind(ts).fetch_all(&self.pool).await?;
    let mut max_ts = ts;
    let genres = rows
      .into_iter()
      .map(|row| {
        if max_ts.is_none_or(|current| row.updated_at > current) {
          max_ts = Some(row.updated_at);
        }
        Genre {
          id: row.id,
          name: row.name,
        }
      })
      .collect::<Vec<_>>();
    info!(count = genres.len(), watermark = ?max_ts, "fetched changed genres");
    Ok((genres, max_ts))
  }

  pub async fn fetch_changed_persons(&self, ts: Option<DateTime<Utc>>) -> Result<(Vec<Person>, Option<DateTime<Utc>>)> {
    #[derive(FromRow)]
    struct Row {
      id: Uuid,
      full_name: String,
      updated_at: DateTime<Utc>,
    }
    let sql = "SELECT p.id, p.full_name, p.updated_at \
               FROM content.person p \
               WHERE ($1::timestamptz IS NULL OR p.updated_at > $1) \
               ORDER BY p.updated_at ASC";
    let rows: Vec<Row> = sqlx::query_as(sql).bind(ts).fetch_all(&self.pool).await?;
    let mut max_ts = ts;
    let persons = rows
      .into_iter()
      .map(|row| {
        if max_ts.is_none_or(|current| row.updated_at > current) {
          max_ts = Some(row.updated_at);
        }
        Person {
          id: row.id,
          full_name: row.full_name,
        }
      })
      .collect::<Vec<_>>();
    info!(count = persons.len(), watermark = ?max_ts, "fetched changed persons");
    Ok((persons, max_ts))
  }

  /// One query per call, not N+1: genres and persons are aggregated in SQL
  /// with `jsonb_agg(DISTINCT ...) FILTER (WHERE ... IS NOT NULL)` so a
  /// film work with no genres or no persons still returns a row with an
  /// empty array rather than being dropped by the join.
  pub async fn assemble_film_works(&self, ids: &HashSet<Uuid>) -> Result<Vec<FilmWorkAssembled>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    #[derive(Deserialize)]
    struct GenreJson {
      id: Uuid,
      name: String,
    }

    #[derive(Deserialize)]
    struct PersonJson {
      id: Uuid,
      full_name: String,
      role: Option<String>,
    }

    #[derive(FromRow)]
    struct Row {
      id: Uuid,
      title: String,
      rating: Option<f64>,
      description: Option<String>,
      updated_at: Option<DateTime<Utc>>,
      genres: sqlx::types::Json<Vec<GenreJson>>,
      persons: sqlx::types::Json<Vec<PersonJson>>,
    }

    let sql = "SELECT fw.id, \
                      fw.title, \
                      fw.rating, \
                      fw.description, \
                      fw.updated_at, \
                      COALESCE( \
                        jsonb_agg(DISTINCT jsonb_build_object('id', g.id, 'name', g.name)) \
                          FILTER (WHERE g.name IS NOT NULL), \
                        '[]'::jsonb \
                      ) AS genres, \
                      COALESCE( \
                        jsonb_agg(DISTINCT jsonb_build_object('id', p.id, 'full_name', p.full_name, 'role', pfw.role)) \
                          FILTER (WHERE p.full_name IS NOT NULL), \
                        '[]'::jsonb \
                      ) AS persons \
               FROM content.film_work fw \
               LEFT JOIN content.person_film_work pfw ON pfw.film_work_id = fw.id \
               LEFT JOIN content.genre_film_work gfw ON gfw.film_work_id = fw.id \
               LEFT JOIN content.genre g ON g.id = gfw.genre_id \
               LEFT JOIN content.person p ON p.id = pfw.person_id \
               WHERE fw.id = ANY($1) \
               GROUP BY fw.id";

    let id_list: Vec<Uuid> = ids.iter().copied().collect();
    let rows: Vec<Row> = sqlx::query_as(sql).bind(&id_list[..]).fetch_all(&self.pool).await?;

    let film_works = rows
      .into_iter()
      .map(|row| FilmWorkAssembled {
        id: row.id,
        title: row.title,
        rating: row.rating,
        description: row.description,
        updated_at: row.updated_at,
        genres: row
          .genres
          .0
          .into_iter()
          .map(|g| Genre { id: g.id, name: g.name })
          .collect(),
        persons: row
          .persons
          .0
          .into_iter()
          .map(|p| FilmPerson {
            id: p.id,
            full_name: p.full_name,
            role: p.role.as_deref().and_then(|r| Role::from_str(r).ok()),
          })
          .collect(),
      })
      .collect::<Vec<_>>();

    info!(count = film_works.len(), "fetched film work by ids");
    Ok(film_works)
  }
}
