use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{movie, user},
    models::{MovieDetail, MovieSummary},
    session::{Flash, FlashLevel},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT: &str = "mt-1 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON: &str = "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn login_page(flashes: &[Flash]) -> String {
    page(
        "Log in",
        flashes,
        html! {
            (card_shell(html! {
                h1 class="text-3xl font-bold text-gray-900" { "Log in" }
                form class="mt-8 space-y-4" method="post" action="/login" {
                    (field("Username", "username", "text", true))
                    (field("Password", "password", "password", true))
                    button class=(format!("w-full {BUTTON}")) type="submit" { "Log in" }
                }
                p class="mt-6 text-sm text-gray-600" {
                    "No account yet? " a class="text-blue-600 hover:text-blue-800" href="/register" { "Register" }
                }
            }))
        },
    )
}

pub fn register_page(flashes: &[Flash]) -> String {
    page(
        "Register",
        flashes,
        html! {
            (card_shell(html! {
                h1 class="text-3xl font-bold text-gray-900" { "Create an account" }
                form class="mt-8 space-y-4" method="post" action="/register" {
                    (field("Username", "username", "text", true))
                    (field("Email", "email", "email", true))
                    (field("First name", "firstname", "text", false))
                    (field("Last name", "lastname", "text", false))
                    (field("Password", "password", "password", true))
                    button class=(format!("w-full {BUTTON}")) type="submit" { "Register" }
                }
                p class="mt-6 text-sm text-gray-600" {
                    "Already registered? " a class="text-blue-600 hover:text-blue-800" href="/login" { "Log in" }
                }
            }))
        },
    )
}

pub fn admin_dashboard(admin: &user::Model, movies: &[movie::Model], flashes: &[Flash]) -> String {
    page(
        "Admin dashboard",
        flashes,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                (header("Admin dashboard", &admin.username))

                div class="mt-8 bg-white shadow rounded-lg p-6" {
                    h2 class="text-xl font-semibold text-gray-900" { "Add movie" }
                    form class="mt-4 grid gap-4 md:grid-cols-2" method="post" action="/admin/add" enctype="multipart/form-data" {
                        (field("Name", "name", "text", true))
                        (field("Release year", "release", "number", true))
                        (field("Director id", "director", "number", true))
                        (field("Actor ids (comma separated)", "actors", "text", false))
                        div class="md:col-span-2" {
                            label class="block text-sm font-medium text-gray-700" for="story" { "Story" }
                            textarea class=(INPUT) name="story" id="story" rows="3" required {}
                        }
                        div class="md:col-span-2" {
                            label class="block text-sm font-medium text-gray-700" for="poster" { "Poster (png, jpg, jpeg)" }
                            input class="mt-1" type="file" name="poster" id="poster" accept=".png,.jpg,.jpeg";
                        }
                        div class="md:col-span-2" {
                            button class=(BUTTON) type="submit" { "Add movie" }
                        }
                    }
                }

                div class="mt-8 bg-white shadow rounded-lg p-6" {
                    h2 class="text-xl font-semibold text-gray-900" { "Movies" }
                    @if movies.is_empty() {
                        p class="mt-4 text-gray-600" { "No movies yet." }
                    } @else {
                        table class="mt-4 w-full text-left text-sm" {
                            thead { tr { th { "Id" } th { "Name" } th { "Release" } th {} } }
                            tbody {
                                @for m in movies {
                                    tr class="border-t" {
                                        td class="py-2" { (m.id) }
                                        td { a class="text-blue-600 hover:text-blue-800" href=(format!("/movie/{}", m.id)) { (m.name) } }
                                        td { (m.release) }
                                        td class="text-right" {
                                            form method="post" action=(format!("/admin/delete/{}", m.id)) {
                                                button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn catalog_page(viewer: &user::Model, movies: &[MovieSummary], flashes: &[Flash]) -> String {
    page(
        "Movies",
        flashes,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                (header("Movies", &viewer.username))
                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies yet." }
                    }
                } @else {
                    div class="mt-10 grid gap-4 md:grid-cols-2" {
                        @for m in movies {
                            a class="block bg-white shadow rounded-lg p-6 hover:shadow-md" href=(format!("/movie/{}", m.id)) {
                                h2 class="text-xl font-semibold text-gray-900" {
                                    (m.name)
                                    span class="ml-2 font-normal text-gray-500" { "(" (m.release) ")" }
                                }
                                p class="mt-2 text-sm text-gray-600" { "Rating: " (format!("{:.1}", m.avg_rate)) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn movie_page(detail: &MovieDetail, logged_in: bool, flashes: &[Flash]) -> String {
    let m = &detail.movie;
    page(
        &m.name,
        flashes,
        html! {
            div class="max-w-3xl mx-auto px-6 py-10" {
                a class="text-sm text-blue-600 hover:text-blue-800" href="/" { "← Back" }
                div class="mt-4 bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" {
                        (m.name) span class="ml-2 font-normal text-gray-500" { "(" (m.release) ")" }
                    }
                    p class="mt-4 text-gray-700" { (m.story) }
                    p class="mt-4 text-sm text-gray-600" { "Average rating: " (detail.average.to_string()) }
                    @if let Some(rate) = detail.own_rating {
                        p class="text-sm text-gray-600" { "Your rating: " (rate) }
                    }

                    h2 class="mt-8 text-lg font-semibold text-gray-900" { "Cast" }
                    @if detail.actors.is_empty() {
                        p class="mt-2 text-sm text-gray-500" { "—" }
                    } @else {
                        ul class="mt-2 space-y-1" {
                            @for a in &detail.actors {
                                li class="text-sm text-gray-700" { (a.firstname) " " (a.lastname) }
                            }
                        }
                    }

                    @if logged_in {
                        form class="mt-8 flex items-end gap-3" method="post" action=(format!("/movie/{}/vote", m.id)) {
                            div {
                                label class="block text-sm font-medium text-gray-700" for="rate" { "Rate" }
                                select class=(INPUT) name="rate" id="rate" {
                                    @for r in 1..=5 {
                                        option value=(r) selected[detail.own_rating == Some(r)] { (r) }
                                    }
                                }
                            }
                            button class=(BUTTON) type="submit" { "Vote" }
                        }
                        form class="mt-6 space-y-2" method="post" action=(format!("/movie/{}/comment", m.id)) {
                            textarea class=(INPUT) name="content" rows="3" placeholder="Leave a comment" {}
                            button class=(BUTTON) type="submit" { "Comment" }
                        }
                    } @else {
                        p class="mt-8 text-sm text-gray-600" {
                            a class="text-blue-600 hover:text-blue-800" href="/login" { "Log in" } " to rate or comment."
                        }
                    }

                    h2 class="mt-8 text-lg font-semibold text-gray-900" { "Comments" }
                    @if detail.comments.is_empty() {
                        p class="mt-2 text-sm text-gray-500" { "No comments yet." }
                    }
                    @for c in &detail.comments {
                        div class="mt-4 border-l-4 border-blue-500 pl-4" {
                            p class="text-sm font-medium text-gray-900" {
                                (c.username)
                                span class="ml-2 font-normal text-gray-500" { (format_timestamp(c.created_at)) }
                            }
                            @if let Some(content) = &c.content {
                                p class="text-sm text-gray-700" { (content) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        &[],
        html! {
            (card_shell(html! {
                h1 class="text-2xl font-bold text-gray-900" { "Error" }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }))
        },
    )
}

fn page(title: &str, flashes: &[Flash], body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                @if !flashes.is_empty() {
                    div class="max-w-4xl mx-auto px-6 pt-6 space-y-2" {
                        @for f in flashes {
                            div class=(format!("rounded-md px-4 py-2 text-sm {}", flash_class(f.level))) { (f.message) }
                        }
                    }
                }
                (body)
            }
        }
    }
    .into_string()
}

fn card_shell(inner: Markup) -> Markup {
    html! {
        div class="flex items-center justify-center py-12" {
            div class="max-w-md w-full px-6" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn header(title: &str, username: &str) -> Markup {
    html! {
        div class="flex items-start justify-between gap-6" {
            h1 class="text-3xl font-bold text-gray-900" { (title) }
            p class="text-sm text-gray-600" {
                (username) " · " a class="text-blue-600 hover:text-blue-800" href="/logout" { "Log out" }
            }
        }
    }
}

fn field(label: &str, name: &str, kind: &str, required: bool) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT) type=(kind) name=(name) id=(name) required[required];
        }
    }
}

fn flash_class(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => "bg-green-100 text-green-800",
        FlashLevel::Warning => "bg-yellow-100 text-yellow-800",
        FlashLevel::Error => "bg-red-100 text-red-800",
    }
}

fn format_timestamp(secs: i64) -> String {
    jiff::Timestamp::from_second(secs)
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
