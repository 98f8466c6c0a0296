//! Page chrome templates.
//!
//! Rendered post fragments get wrapped here with the `<html>/<head>/<body>`
//! shell, header navigation, and inline base CSS. Templates are
//! [maud](https://maud.lambda.xyz/) functions: compile-time checked,
//! auto-escaped Rust code, no template files to ship.
//!
//! The document fragments produced by [`crate::render`] arrive as
//! [`Markup`] and are embedded as-is; everything else interpolated here is
//! escaped by maud.

use crate::config::SiteConfig;
use crate::site::Post;
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Base styles inlined into every page. Site-specific styles belong in the
/// content's `css/site.css`, which is copied through to the output.
const CSS_STATIC: &str = include_str!("../static/style.css");

/// One entry in the header navigation.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// A `<time>` fragment: human-readable text plus machine-readable
/// `datetime` attribute.
pub fn time(date: NaiveDate, class: Option<&str>) -> Markup {
    let human = date.format("%b %-d, %Y").to_string();
    let machine = date.format("%Y-%m-%d").to_string();
    html! {
        time class=[class] datetime=(machine) { (human) }
    }
}

/// The shared document shell around every page's content.
fn base_document(
    config: &SiteConfig,
    nav: &[NavLink],
    title: &str,
    description: &str,
    path: &str,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en-US" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                @if !config.url.is_empty() {
                    link rel="canonical" href={ (config.url) (path) };
                }
                style { (PreEscaped(CSS_STATIC)) }
                link rel="stylesheet" href="/css/site.css";
            }
            body {
                header {
                    nav {
                        a.title href="/" { (config.title) }
                        @for link in nav {
                            a href=(link.href) { (link.label) }
                        }
                    }
                }
                main {
                    (content)
                }
                footer {}
            }
        }
    }
}

/// The index page: every non-empty category as a heading plus a
/// newest-first post list.
pub fn post_list(
    config: &SiteConfig,
    nav: &[NavLink],
    categories: &[(String, Vec<Post>)],
) -> Markup {
    let content = html! {
        @for (name, posts) in categories {
            @if !posts.is_empty() {
                h2 { (name) }
                ul.post-list {
                    @for post in posts {
                        li {
                            a href=(post.path) { (post.title) }
                            " "
                            (time(post.date, Some("meta")))
                        }
                    }
                }
            }
        }
    };
    base_document(config, nav, &config.title, &config.description, "/", content)
}

/// A single post page: the rendered document inside an `<article>`.
pub fn post_page(config: &SiteConfig, nav: &[NavLink], post: &Post) -> Markup {
    let description = post
        .summary
        .as_deref()
        .unwrap_or(config.description.as_str());
    let content = html! {
        article {
            (post.content)
        }
    };
    base_document(config, nav, &post.title, description, &post.path, content)
}

/// A standalone page (about, favourites, ...): rendered document, site title.
pub fn page(config: &SiteConfig, nav: &[NavLink], path: &str, content: Markup) -> Markup {
    base_document(
        config,
        nav,
        &config.title,
        &config.description,
        path,
        content,
    )
}
