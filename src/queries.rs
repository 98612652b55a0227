use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::{
    entities::{actor, actor_movie, comment, movie, user, vote},
    error::{AppError, AppResult},
    models::{AverageRating, CommentView, MovieDetail, MovieSummary, round_one_decimal},
};

#[derive(Clone)]
pub struct QueryService {
    db: DatabaseConnection,
}

impl QueryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?)
    }

    pub async fn movie_detail(&self, movie_id: i32, caller: Option<i32>) -> AppResult<MovieDetail> {
        let movie =
            movie::Entity::find_by_id(movie_id).one(&self.db).await?.ok_or(AppError::NotFound)?;

        let actor_ids: Vec<i32> = actor_movie::Entity::find()
            .filter(actor_movie::Column::MovieId.eq(movie_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.actor_id)
            .collect();
        let actors = if actor_ids.is_empty() {
            Vec::new()
        } else {
            actor::Entity::find()
                .filter(actor::Column::Id.is_in(actor_ids))
                .order_by_asc(actor::Column::Id)
                .all(&self.db)
                .await?
        };

        // Comments whose author no longer resolves are left out, as an inner
        // join would.
        let comments = comment::Entity::find()
            .filter(comment::Column::MovieId.eq(movie_id))
            .find_also_related(user::Entity)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(c, author)| {
                author.map(|u| CommentView {
                    id: c.id,
                    user_id: c.user_id,
                    username: u.username,
                    content: c.content,
                    created_at: c.created_at,
                })
            })
            .collect();

        let mean = vote::Entity::find()
            .select_only()
            .column_as(avg_rate(), "avg_rate")
            .filter(vote::Column::MovieId.eq(movie_id))
            .into_tuple::<Option<f64>>()
            .one(&self.db)
            .await?
            .flatten();

        let own_rating = match caller {
            Some(user_id) => vote::Entity::find_by_id((user_id, movie_id))
                .one(&self.db)
                .await?
                .map(|v| v.rate),
            None => None,
        };

        Ok(MovieDetail {
            movie,
            actors,
            comments,
            average: AverageRating::from_mean(mean),
            own_rating,
        })
    }

    /// Every movie with its mean rating. Unrated movies report 0 here, unlike
    /// the detail view.
    pub async fn catalog_summary(&self) -> AppResult<Vec<MovieSummary>> {
        let means: HashMap<i32, f64> = vote::Entity::find()
            .select_only()
            .column(vote::Column::MovieId)
            .column_as(avg_rate(), "avg_rate")
            .group_by(vote::Column::MovieId)
            .into_tuple::<(i32, Option<f64>)>()
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(id, mean)| mean.map(|m| (id, m)))
            .collect();

        let movies = self.list_movies().await?;
        Ok(movies
            .into_iter()
            .map(|m| MovieSummary {
                avg_rate: means.get(&m.id).copied().map(round_one_decimal).unwrap_or(0.0),
                id: m.id,
                name: m.name,
                release: m.release,
                story: m.story,
            })
            .collect())
    }
}

fn avg_rate() -> SimpleExpr {
    Func::avg(Expr::col(vote::Column::Rate)).into()
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, Set};

    use super::*;
    use crate::{
        models::NewMovie,
        testutil::{new_user, test_state},
    };

    async fn add_movie(state: &crate::AppState, name: &str, actors: &str) -> i32 {
        let new = NewMovie {
            name: name.to_string(),
            release: 1999,
            story: "story".to_string(),
            director: 2,
            actors: actors.to_string(),
        };
        state.catalog.add_movie(new, None).await.unwrap().movie.id
    }

    #[tokio::test]
    async fn average_of_two_and_four_is_three() {
        let (_dir, state) = test_state().await;
        let a = state.auth.register(new_user("alice", "a@example.com")).await.unwrap();
        let b = state.auth.register(new_user("bob", "b@example.com")).await.unwrap();
        let m = add_movie(&state, "Matrix", "").await;

        state.interactions.cast_vote(a.id, m, 2).await.unwrap();
        state.interactions.cast_vote(b.id, m, 4).await.unwrap();

        let detail = state.queries.movie_detail(m, Some(a.id)).await.unwrap();
        assert_eq!(detail.average, AverageRating::Rated(3.0));
        assert_eq!(detail.own_rating, Some(2));
    }

    #[tokio::test]
    async fn average_reflects_only_the_latest_vote() {
        let (_dir, state) = test_state().await;
        let a = state.auth.register(new_user("alice", "a@example.com")).await.unwrap();
        let m = add_movie(&state, "Matrix", "").await;

        state.interactions.cast_vote(a.id, m, 3).await.unwrap();
        state.interactions.cast_vote(a.id, m, 5).await.unwrap();

        let detail = state.queries.movie_detail(m, None).await.unwrap();
        assert_eq!(detail.average, AverageRating::Rated(5.0));
        assert_eq!(detail.own_rating, None);
    }

    #[tokio::test]
    async fn half_way_average_rounds_to_even_in_both_views() {
        let (_dir, state) = test_state().await;
        let m = add_movie(&state, "Matrix", "").await;
        for (name, rate) in [("ann", 2), ("ben", 2), ("cat", 2), ("dan", 3)] {
            let u = state
                .auth
                .register(new_user(name, &format!("{name}@example.com")))
                .await
                .unwrap();
            state.interactions.cast_vote(u.id, m, rate).await.unwrap();
        }

        let detail = state.queries.movie_detail(m, None).await.unwrap();
        assert_eq!(detail.average, AverageRating::Rated(2.2));

        let summary = state.queries.catalog_summary().await.unwrap();
        assert_eq!(summary[0].avg_rate, 2.2);
    }

    #[tokio::test]
    async fn unrated_movie_detail_uses_the_sentinel() {
        let (_dir, state) = test_state().await;
        let m = add_movie(&state, "Matrix", "").await;

        let detail = state.queries.movie_detail(m, None).await.unwrap();
        assert_eq!(detail.average, AverageRating::NoRatings);
    }

    #[tokio::test]
    async fn unrated_movie_summary_reports_zero() {
        let (_dir, state) = test_state().await;
        let a = state.auth.register(new_user("alice", "a@example.com")).await.unwrap();
        let rated = add_movie(&state, "Matrix", "").await;
        let unrated = add_movie(&state, "Alien", "").await;
        state.interactions.cast_vote(a.id, rated, 4).await.unwrap();

        let summary = state.queries.catalog_summary().await.unwrap();

        assert_eq!(summary.len(), 2);
        let by_id: HashMap<i32, &MovieSummary> = summary.iter().map(|s| (s.id, s)).collect();
        assert_eq!(by_id[&rated].avg_rate, 4.0);
        assert_eq!(by_id[&unrated].avg_rate, 0.0);
        assert_eq!(by_id[&unrated].name, "Alien");
    }

    #[tokio::test]
    async fn detail_lists_linked_actors_and_newest_comments_first() {
        let (_dir, state) = test_state().await;
        for (first, last) in [("Keanu", "Reeves"), ("Carrie-Anne", "Moss"), ("Hugo", "Weaving")] {
            actor::ActiveModel {
                firstname: Set(first.to_string()),
                lastname: Set(last.to_string()),
                ..Default::default()
            }
            .insert(&state.db)
            .await
            .unwrap();
        }
        let a = state.auth.register(new_user("alice", "a@example.com")).await.unwrap();
        // 77 has no actor row and is silently absent from the detail.
        let m = add_movie(&state, "Matrix", "1,2,77").await;

        state.interactions.add_comment(a.id, m, Some("first".into())).await.unwrap();
        state.interactions.add_comment(a.id, m, Some("second".into())).await.unwrap();
        state.interactions.add_comment(a.id, m + 1, Some("elsewhere".into())).await.unwrap();

        let detail = state.queries.movie_detail(m, None).await.unwrap();

        let actor_names: Vec<&str> = detail.actors.iter().map(|a| a.lastname.as_str()).collect();
        assert_eq!(actor_names, vec!["Reeves", "Moss"]);
        let contents: Vec<_> = detail.comments.iter().map(|c| c.content.as_deref()).collect();
        assert_eq!(contents, vec![Some("second"), Some("first")]);
        assert!(detail.comments.iter().all(|c| c.username == "alice"));
    }

    #[tokio::test]
    async fn missing_movie_is_not_found() {
        let (_dir, state) = test_state().await;
        assert!(matches!(state.queries.movie_detail(12345, None).await, Err(AppError::NotFound)));
    }
}
