//! # smallpress
//!
//! A minimal static site generator for personal blogs. Your filesystem is
//! the data source: subdirectories are post categories, dated markdown files
//! (`2024-03-05-hello-world.md`) are posts, and top-level markdown files are
//! standalone pages.
//!
//! # Architecture: Parse → Render → Assemble
//!
//! Each document moves through three independent layers:
//!
//! ```text
//! 1. markup     text      →  Document      (markdown → AST)
//! 2. render     Document  →  (html, title) (AST → HTML fragment)
//! 3. templates  fragment  →  page          (chrome, nav, index)
//! ```
//!
//! The split exists because the interesting behavior lives in the middle:
//! the renderer owns the site-specific treatment of headings (date stamps,
//! section anchors, title extraction) and media embeds (`{.video}` images
//! become `<video>` elements), while parsing and page assembly stay generic.
//! Each layer is a pure function over its input, so unit tests exercise each
//! without touching the others or the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markup`] | Markdown → document tree: node kinds, attributes, section synthesis |
//! | [`render`] | Document tree → HTML fragment plus extracted title |
//! | [`templates`] | Maud page chrome: base shell, post page, post index, `<time>` stamps |
//! | [`site`] | Build pipeline — collect, render in parallel, write output, copy assets |
//! | [`naming`] | `YYYY-MM-DD-slug.md` post filename convention parser |
//! | [`config`] | Optional `config.toml` loading with defaults |
//! | [`serve`] | Local preview server for the output directory |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! Page chrome is generated with [Maud](https://maud.lambda.xyz/) rather
//! than a runtime template engine: malformed HTML is a compile error,
//! interpolation is escaped by default, and there is no template directory
//! to ship or get out of sync.
//!
//! ## Dates In Filenames, Titles In Documents
//!
//! A post's publication date comes from its filename and its title from its
//! first level-1 heading. There is no front matter to parse and nothing to
//! keep in sync: renaming a file re-dates it, editing the heading re-titles
//! it. The title is extracted as plain text during rendering, so inline
//! markup in a heading styles the page without leaking tags into the index.
//!
//! ## One-Pass Builds
//!
//! Every build re-renders everything. Rendering a document is a pure,
//! sub-millisecond tree walk, so for a personal blog the cache bookkeeping
//! of an incremental build costs more than it saves. A post that fails to
//! render is reported and skipped; one bad document never takes down the
//! build.

pub mod config;
pub mod markup;
pub mod naming;
pub mod render;
pub mod serve;
pub mod site;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
