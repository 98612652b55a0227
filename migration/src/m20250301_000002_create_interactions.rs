use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(pk_auto(Comment::Id))
                    .col(integer(Comment::UserId))
                    .col(integer(Comment::MovieId))
                    .col(text_null(Comment::Content))
                    .col(big_integer(Comment::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_movie_id")
                    .table(Comment::Table)
                    .col(Comment::MovieId)
                    .to_owned(),
            )
            .await?;

        // The composite key is what makes a repeat vote an update.
        manager
            .create_table(
                Table::create()
                    .table(UserVotes::Table)
                    .if_not_exists()
                    .col(integer(UserVotes::UserId))
                    .col(integer(UserVotes::MovieId))
                    .col(integer(UserVotes::Rate))
                    .primary_key(Index::create().col(UserVotes::UserId).col(UserVotes::MovieId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_votes_movie_id")
                    .table(UserVotes::Table)
                    .col(UserVotes::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserVotes::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Comment::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    Id,
    UserId,
    MovieId,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserVotes {
    Table,
    UserId,
    MovieId,
    Rate,
}
