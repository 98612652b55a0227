use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 30).unique_key())
                    .col(text(Users::Email).unique_key())
                    .col(string_len_null(Users::Firstname, 30))
                    .col(string_len_null(Users::Lastname, 30))
                    .col(string_len(Users::Password, 255))
                    .col(string_len(Users::Role, 16).default("user"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string_len(Movie::Name, 100))
                    .col(integer(Movie::Release))
                    .col(text(Movie::Story))
                    .col(integer(Movie::Director))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(string_len(Actor::Firstname, 30))
                    .col(string_len(Actor::Lastname, 30))
                    .to_owned(),
            )
            .await?;

        // Soft references: neither column is a foreign key.
        manager
            .create_table(
                Table::create()
                    .table(ActorMovies::Table)
                    .if_not_exists()
                    .col(integer(ActorMovies::MovieId))
                    .col(integer(ActorMovies::ActorId))
                    .primary_key(
                        Index::create().col(ActorMovies::MovieId).col(ActorMovies::ActorId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActorMovies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Firstname,
    Lastname,
    Password,
    Role,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Name,
    Release,
    Story,
    Director,
}

#[derive(DeriveIden)]
enum Actor {
    Table,
    Id,
    Firstname,
    Lastname,
}

#[derive(DeriveIden)]
enum ActorMovies {
    Table,
    MovieId,
    ActorId,
}
