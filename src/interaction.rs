use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};
use tracing::info;

use crate::{
    entities::{comment, vote},
    error::AppResult,
};

#[derive(Clone)]
pub struct InteractionService {
    db: DatabaseConnection,
}

impl InteractionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The movie id is not checked; see [`comment::Model::movie_id`].
    pub async fn add_comment(
        &self,
        user_id: i32,
        movie_id: i32,
        content: Option<String>,
    ) -> AppResult<i32> {
        let created = comment::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            content: Set(content),
            created_at: Set(now_sec()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(comment_id = created.id, user_id, movie_id, "comment added");
        Ok(created.id)
    }

    /// Single-statement upsert on the (user, movie) key, so concurrent votes
    /// from one user cannot produce two rows.
    pub async fn cast_vote(&self, user_id: i32, movie_id: i32, rate: i32) -> AppResult<()> {
        let model = vote::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            rate: Set(rate),
        };

        vote::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([vote::Column::UserId, vote::Column::MovieId])
                    .update_column(vote::Column::Rate)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        info!(user_id, movie_id, rate, "vote recorded");
        Ok(())
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
