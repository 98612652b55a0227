pub mod actor;
pub mod actor_movie;
pub mod comment;
pub mod movie;
pub mod user;
pub mod vote;
