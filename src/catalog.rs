use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::OnConflict,
};
use tracing::{debug, info, warn};

use crate::{
    entities::{actor_movie, movie},
    error::{AppError, AppResult},
    models::{NewMovie, PosterUpload},
    posters::{self, PosterStore},
};

/// Actor ids from the add-movie form, split into the ones that will be linked
/// and the entries dropped for not being plain non-negative integers.
#[derive(Debug, Default, PartialEq)]
pub struct ActorIds {
    pub accepted: Vec<i32>,
    pub skipped: Vec<String>,
}

impl ActorIds {
    pub fn parse(raw: &str) -> Self {
        let mut ids = ActorIds::default();
        for entry in raw.split(',').map(str::trim) {
            if entry.is_empty() {
                continue;
            }
            let parsed = entry
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| entry.parse::<i32>().ok())
                .flatten();
            match parsed {
                Some(id) if ids.accepted.contains(&id) => {},
                Some(id) => ids.accepted.push(id),
                None => ids.skipped.push(entry.to_string()),
            }
        }
        ids
    }
}

#[derive(Debug, PartialEq)]
pub enum PosterOutcome {
    Stored,
    Missing,
    /// Extension other than png/jpg/jpeg; nothing is written.
    Rejected,
    Failed(String),
}

#[derive(Debug)]
pub struct AddedMovie {
    pub movie: movie::Model,
    pub linked_actors: usize,
    pub poster: PosterOutcome,
}

#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
    posters: PosterStore,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, posters: PosterStore) -> Self {
        Self { db, posters }
    }

    pub fn posters(&self) -> &PosterStore {
        &self.posters
    }

    /// Commits the movie row and its actor links together. The poster is
    /// written afterwards; failing to store it leaves the movie in place.
    pub async fn add_movie(
        &self,
        new: NewMovie,
        poster: Option<PosterUpload>,
    ) -> AppResult<AddedMovie> {
        let actor_ids = ActorIds::parse(&new.actors);
        if !actor_ids.skipped.is_empty() {
            debug!(skipped = ?actor_ids.skipped, "ignoring malformed actor ids");
        }

        let txn = self.db.begin().await?;

        let created = movie::ActiveModel {
            name: Set(new.name),
            release: Set(new.release),
            story: Set(new.story),
            director: Set(new.director),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !actor_ids.accepted.is_empty() {
            let links = actor_ids.accepted.iter().map(|&actor_id| actor_movie::ActiveModel {
                movie_id: Set(created.id),
                actor_id: Set(actor_id),
            });
            actor_movie::Entity::insert_many(links)
                .on_conflict(
                    OnConflict::columns([
                        actor_movie::Column::MovieId,
                        actor_movie::Column::ActorId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        info!(
            movie_id = created.id,
            name = %created.name,
            actors = actor_ids.accepted.len(),
            "movie added"
        );

        let poster = match poster {
            Some(upload) if posters::allowed_file(&upload.filename) => {
                match self.posters.store(created.id, upload.bytes).await {
                    Ok(path) => {
                        debug!(movie_id = created.id, path = %path.display(), "poster stored");
                        PosterOutcome::Stored
                    },
                    Err(err) => {
                        warn!(movie_id = created.id, error = %err, "failed to store poster");
                        PosterOutcome::Failed(err.to_string())
                    },
                }
            },
            Some(upload) => {
                debug!(movie_id = created.id, filename = %upload.filename, "poster type refused");
                PosterOutcome::Rejected
            },
            None => PosterOutcome::Missing,
        };

        Ok(AddedMovie { movie: created, linked_actors: actor_ids.accepted.len(), poster })
    }

    /// Returns whether a movie was deleted. Unknown ids are a no-op.
    pub async fn delete_movie(&self, movie_id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        if movie::Entity::find_by_id(movie_id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        actor_movie::Entity::delete_many()
            .filter(actor_movie::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        movie::Entity::delete_by_id(movie_id).exec(&txn).await?;

        txn.commit().await?;

        let removed = self
            .posters
            .remove(movie_id)
            .await
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        info!(movie_id, poster_removed = removed, "movie deleted");
        Ok(true)
    }
}
