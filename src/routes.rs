use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Form, Multipart, Path, State, multipart::MultipartError},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use crate::{
    AppState,
    catalog::PosterOutcome,
    entities::user,
    error::{AppError, AppResult},
    models::{MovieSummary, NewMovie, NewUser, PosterUpload},
    session::{self, FlashLevel},
    templates,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/admin/add", post(add_movie))
        .route("/admin/delete/{movie_id}", post(delete_movie))
        .route("/movie/{movie_id}", get(movie_detail))
        .route("/movie/{movie_id}/comment", post(add_comment))
        .route("/movie/{movie_id}/vote", post(vote))
        .route("/api/movies", get(api_movies))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn current_user(state: &AppState, jar: &SignedCookieJar) -> AppResult<Option<user::Model>> {
    state.auth.current_user(session::user_id(jar)).await
}

/// Resolves the admin or builds the denial response. The denial does not
/// depend on the target movie.
async fn require_admin(
    state: &AppState,
    jar: SignedCookieJar,
) -> AppResult<Result<SignedCookieJar, Response>> {
    match current_user(state, &jar).await? {
        Some(u) if u.is_admin() => Ok(Ok(jar)),
        _ => {
            let jar = session::flash(jar, FlashLevel::Error, AppError::AccessDenied.to_string());
            Ok(Err((jar, Redirect::to("/")).into_response()))
        },
    }
}

fn login_required(jar: SignedCookieJar) -> Response {
    let jar = session::flash(jar, FlashLevel::Error, "Login required!");
    (jar, Redirect::to("/login")).into_response()
}

async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let Some(user) = current_user(&state, &jar).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    let (jar, flashes) = session::take_flashes(jar);

    let body = if user.is_admin() {
        let movies = state.queries.list_movies().await?;
        templates::admin_dashboard(&user, &movies, &flashes)
    } else {
        let movies = state.queries.catalog_summary().await?;
        templates::catalog_page(&user, &movies, &flashes)
    };
    Ok((jar, Html(body)).into_response())
}

async fn register_form(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = session::take_flashes(jar);
    (jar, Html(templates::register_page(&flashes)))
}

async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<NewUser>,
) -> AppResult<Response> {
    match state.auth.register(form).await {
        Ok(user) => Ok((session::establish(jar, user.id), Redirect::to("/")).into_response()),
        Err(err @ (AppError::DuplicateUsername | AppError::DuplicateEmail)) => {
            let jar = session::flash(jar, FlashLevel::Error, err.to_string());
            Ok((jar, Redirect::to("/register")).into_response())
        },
        Err(err) => Err(err),
    }
}

async fn login_form(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = session::take_flashes(jar);
    (jar, Html(templates::login_page(&flashes)))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.auth.login(&form.username, &form.password).await {
        Ok(user) => Ok((session::establish(jar, user.id), Redirect::to("/")).into_response()),
        Err(err @ AppError::InvalidCredentials) => {
            let jar = session::flash(jar, FlashLevel::Error, err.to_string());
            Ok((jar, Redirect::to("/login")).into_response())
        },
        Err(err) => Err(err),
    }
}

async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    (session::clear(jar), Redirect::to("/login"))
}

async fn add_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let jar = match require_admin(&state, jar).await? {
        Ok(jar) => jar,
        Err(denied) => return Ok(denied),
    };

    let (new, poster) = match read_movie_form(multipart).await {
        Ok(parsed) => parsed,
        Err(err @ AppError::InvalidForm(_)) => {
            let jar = session::flash(jar, FlashLevel::Error, err.to_string());
            return Ok((jar, Redirect::to("/")).into_response());
        },
        Err(err) => return Err(err),
    };

    let added = state.catalog.add_movie(new, poster).await?;
    let jar = match added.poster {
        PosterOutcome::Stored => jar,
        PosterOutcome::Missing | PosterOutcome::Rejected => {
            session::flash(jar, FlashLevel::Warning, "No poster uploaded or invalid file type")
        },
        PosterOutcome::Failed(reason) => {
            session::flash(jar, FlashLevel::Error, format!("Error saving poster: {reason}"))
        },
    };
    let jar = session::flash(jar, FlashLevel::Success, "Movie added successfully!");
    Ok((jar, Redirect::to("/")).into_response())
}

async fn read_movie_form(mut multipart: Multipart) -> AppResult<(NewMovie, Option<PosterUpload>)> {
    let mut new = NewMovie::default();
    let mut release = String::new();
    let mut director = String::new();
    let mut poster = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "poster" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part when no file was picked.
                if !filename.is_empty() || !bytes.is_empty() {
                    poster = Some(PosterUpload { filename, bytes: bytes.to_vec() });
                }
            },
            "name" => new.name = field.text().await.map_err(bad_multipart)?,
            "story" => new.story = field.text().await.map_err(bad_multipart)?,
            "actors" => new.actors = field.text().await.map_err(bad_multipart)?,
            "release" => release = field.text().await.map_err(bad_multipart)?,
            "director" => director = field.text().await.map_err(bad_multipart)?,
            _ => {},
        }
    }

    new.release = parse_number("release", &release)?;
    new.director = parse_number("director", &director)?;
    Ok((new, poster))
}

fn parse_number(field: &str, raw: &str) -> AppResult<i32> {
    raw.trim().parse().map_err(|_| AppError::InvalidForm(format!("{field} must be a number")))
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::InvalidForm(format!("invalid upload: {}", err.body_text()))
}

async fn delete_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<Response> {
    let jar = match require_admin(&state, jar).await? {
        Ok(jar) => jar,
        Err(denied) => return Ok(denied),
    };

    let jar = if state.catalog.delete_movie(movie_id).await? {
        session::flash(jar, FlashLevel::Success, "Movie deleted successfully!")
    } else {
        jar
    };
    Ok((jar, Redirect::to("/")).into_response())
}

async fn movie_detail(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<Response> {
    let caller = current_user(&state, &jar).await?.map(|u| u.id);

    match state.queries.movie_detail(movie_id, caller).await {
        Ok(detail) => {
            let (jar, flashes) = session::take_flashes(jar);
            let body = templates::movie_page(&detail, caller.is_some(), &flashes);
            Ok((jar, Html(body)).into_response())
        },
        Err(err @ AppError::NotFound) => {
            let jar = session::flash(jar, FlashLevel::Error, err.to_string());
            Ok((jar, Redirect::to("/")).into_response())
        },
        Err(err) => Err(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    content: Option<String>,
}

async fn add_comment(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &jar).await? else {
        return Ok(login_required(jar));
    };

    state.interactions.add_comment(user.id, movie_id, form.content).await?;
    Ok((jar, Redirect::to(&format!("/movie/{movie_id}"))).into_response())
}

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    rate: i32,
}

async fn vote(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
    Form(form): Form<VoteForm>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &jar).await? else {
        return Ok(login_required(jar));
    };

    state.interactions.cast_vote(user.id, movie_id, form.rate).await?;
    Ok((jar, Redirect::to(&format!("/movie/{movie_id}"))).into_response())
}

async fn api_movies(State(state): State<AppState>) -> AppResult<Json<Vec<MovieSummary>>> {
    Ok(Json(state.queries.catalog_summary().await?))
}
