//! Cookie-backed session state. The `session` cookie carries nothing but the
//! user id; `flash` carries one-shot notices for the next rendered page. Both
//! are signed with the process key.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";
const FLASH_COOKIE: &str = "flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

pub fn user_id(jar: &SignedCookieJar) -> Option<i32> {
    jar.get(SESSION_COOKIE).and_then(|c| c.value().parse().ok())
}

pub fn establish(jar: SignedCookieJar, user_id: i32) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(7)),
    )
}

/// Safe to call without a session.
pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn flash(
    jar: SignedCookieJar,
    level: FlashLevel,
    message: impl Into<String>,
) -> SignedCookieJar {
    let mut pending = read_flashes(&jar);
    pending.push(Flash { level, message: message.into() });
    let encoded = match serde_json::to_string(&pending) {
        Ok(json) => urlencoding::encode(&json).into_owned(),
        Err(err) => {
            tracing::warn!(error = %err, "dropping flash message");
            return jar;
        },
    };
    jar.add(
        Cookie::build((FLASH_COOKIE, encoded)).path("/").http_only(true).same_site(SameSite::Lax),
    )
}

/// Returns pending notices and a jar that clears them.
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let flashes = read_flashes(&jar);
    if flashes.is_empty() {
        return (jar, flashes);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes)
}

fn read_flashes(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok().map(|s| s.into_owned()))
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::generate())
    }

    #[test]
    fn session_round_trips_user_id() {
        let jar = establish(jar(), 42);
        assert_eq!(user_id(&jar), Some(42));
        let jar = clear(jar);
        assert_eq!(user_id(&jar), None);
        assert_eq!(user_id(&clear(jar)), None);
    }

    #[test]
    fn flashes_accumulate_and_are_taken_once() {
        let jar = flash(jar(), FlashLevel::Warning, "No poster uploaded or invalid file type");
        let jar = flash(jar, FlashLevel::Success, "Movie added successfully!");

        let (jar, flashes) = take_flashes(jar);
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[1].level, FlashLevel::Success);
        assert_eq!(flashes[0].message, "No poster uploaded or invalid file type");

        let (_, again) = take_flashes(jar);
        assert!(again.is_empty());
    }
}
