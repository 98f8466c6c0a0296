//! Site build pipeline.
//!
//! Turns a content directory into a publishable site:
//!
//! ```text
//! content/                         out/
//! ├── config.toml                  ├── index.html        (post index)
//! ├── css/site.css            →    ├── css/site.css      (copied verbatim)
//! ├── about.md                     ├── about.html
//! ├── tech/                        └── tech/2024/03/05/hello-world.html
//! │   └── 2024-03-05-hello-world.md
//! └── ramblings/
//!     └── ...
//! ```
//!
//! Post categories are the content subdirectories (or the explicit
//! `categories` list from `config.toml`); top-level markdown files become
//! standalone pages and header navigation entries. Posts render in parallel
//! and are listed newest-first on the index.
//!
//! A post that fails to render is reported and skipped — one bad document
//! never aborts the rest of the build. `check` runs the same collection
//! without writing and fails when anything was skipped.

use crate::config::{self, SiteConfig};
use crate::markup;
use crate::naming;
use crate::render::{self, RenderContext};
use crate::templates::{self, NavLink};
use chrono::NaiveDate;
use maud::Markup;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Content subdirectories copied through verbatim, never scanned for posts.
const ASSET_DIRS: &[&str] = &["css", "assets"];

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),
    #[error("{0} file(s) failed to render")]
    RenderFailures(usize),
}

/// One rendered post.
#[derive(Debug, Clone)]
pub struct Post {
    pub date: NaiveDate,
    pub slug: String,
    /// Site-absolute output path: `/tech/2024/03/05/hello-world.html`.
    pub path: String,
    /// Title from the document's level-1 heading, else the slug with
    /// dashes converted to spaces.
    pub title: String,
    pub summary: Option<String>,
    pub content: Markup,
}

/// One rendered standalone page.
#[derive(Debug, Clone)]
struct PageEntry {
    slug: String,
    /// Site-absolute output path: `/about.html`.
    path: String,
    label: String,
    content: Markup,
}

/// What a build (or check) processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildSummary {
    pub posts: usize,
    pub pages: usize,
    /// Files that failed to render and were left out.
    pub skipped: usize,
}

struct Collected {
    config: SiteConfig,
    categories: Vec<(String, Vec<Post>)>,
    pages: Vec<PageEntry>,
    skipped: usize,
}

/// Build the site into `output`.
pub fn build(source: &Path, output: &Path) -> Result<BuildSummary, SiteError> {
    let collected = collect(source)?;

    fs::create_dir_all(output)?;
    for dir in ASSET_DIRS {
        let asset_source = source.join(dir);
        if asset_source.is_dir() {
            copy_dir_recursive(&asset_source, &output.join(dir))?;
            println!("Copied {dir}/");
        }
    }

    let nav = nav_links(&collected.pages);

    let mut post_count = 0;
    for (name, posts) in &collected.categories {
        for post in posts {
            let html = templates::post_page(&collected.config, &nav, post);
            write_page(output, &post.path, &html.into_string())?;
            post_count += 1;
        }
        if !posts.is_empty() {
            println!("Generated {} post(s) in {name}/", posts.len());
        }
    }

    let index = templates::post_list(&collected.config, &nav, &collected.categories);
    fs::write(output.join("index.html"), index.into_string())?;
    println!("Generated index.html");

    for page in &collected.pages {
        let html = templates::page(&collected.config, &nav, &page.path, page.content.clone());
        write_page(output, &page.path, &html.into_string())?;
        println!("Generated {}.html", page.slug);
    }

    Ok(BuildSummary {
        posts: post_count,
        pages: collected.pages.len(),
        skipped: collected.skipped,
    })
}

/// Validate the content directory without writing anything. Fails when any
/// file does not render.
pub fn check(source: &Path) -> Result<BuildSummary, SiteError> {
    let collected = collect(source)?;
    let summary = BuildSummary {
        posts: collected.categories.iter().map(|(_, p)| p.len()).sum(),
        pages: collected.pages.len(),
        skipped: collected.skipped,
    };
    if summary.skipped > 0 {
        return Err(SiteError::RenderFailures(summary.skipped));
    }
    Ok(summary)
}

fn collect(source: &Path) -> Result<Collected, SiteError> {
    let config = config::load_config(source)?;
    let category_names = resolve_categories(source, &config)?;

    let mut skipped = 0;
    let mut categories = Vec::new();
    for name in category_names {
        let (posts, posts_skipped) = collect_posts(source, &name)?;
        skipped += posts_skipped;
        categories.push((name, posts));
    }

    let (pages, pages_skipped) = collect_pages(source)?;
    skipped += pages_skipped;

    Ok(Collected {
        config,
        categories,
        pages,
        skipped,
    })
}

/// Category names: the explicit config list, else the content
/// subdirectories (minus asset dirs and dotdirs), sorted by name.
fn resolve_categories(source: &Path, config: &SiteConfig) -> Result<Vec<String>, SiteError> {
    if !config.categories.is_empty() {
        return Ok(config.categories.clone());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || ASSET_DIRS.contains(&name.as_str()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Collect and render every post in one category, newest first. Returns the
/// posts plus the number of files skipped because they failed to render.
fn collect_posts(source: &Path, category: &str) -> Result<(Vec<Post>, usize), SiteError> {
    let dir = source.join(category);
    if !dir.is_dir() {
        return Ok((Vec::new(), 0));
    }

    let mut files: Vec<(PathBuf, naming::ParsedPostName)> = Vec::new();
    for entry in WalkDir::new(&dir) {
        let entry = entry.map_err(|e| SiteError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(parsed) = naming::parse_post_filename(&name) {
            files.push((entry.into_path(), parsed));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    // Each render owns its document and context; fan out freely.
    let results: Vec<Result<Post, (PathBuf, SiteError)>> = files
        .par_iter()
        .map(|(path, parsed)| {
            render_post(path, category, parsed).map_err(|e| (path.clone(), e))
        })
        .collect();

    let mut posts = Vec::new();
    let mut skipped = 0;
    for result in results {
        match result {
            Ok(post) => posts.push(post),
            Err((path, error)) => {
                eprintln!("warning: skipping {}: {error}", path.display());
                skipped += 1;
            }
        }
    }

    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    Ok((posts, skipped))
}

fn render_post(
    path: &Path,
    category: &str,
    parsed: &naming::ParsedPostName,
) -> Result<Post, SiteError> {
    let text = fs::read_to_string(path)?;
    let document = markup::parse(&text);
    let context = RenderContext {
        date: Some(parsed.date),
        summary: None,
    };
    let rendered = render::render(&document, &context)?;

    Ok(Post {
        date: parsed.date,
        slug: parsed.slug.clone(),
        path: format!(
            "/{category}/{}/{}.html",
            parsed.date.format("%Y/%m/%d"),
            parsed.slug
        ),
        title: rendered.title.unwrap_or_else(|| parsed.display_title()),
        summary: context.summary,
        content: rendered.html,
    })
}

/// Render top-level markdown files into standalone pages.
fn collect_pages(source: &Path) -> Result<(Vec<PageEntry>, usize), SiteError> {
    let mut files: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut pages = Vec::new();
    let mut skipped = 0;
    for path in files {
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let text = fs::read_to_string(&path)?;
        let document = markup::parse(&text);
        match render::render(&document, &RenderContext::default()) {
            Ok(rendered) => pages.push(PageEntry {
                path: format!("/{slug}.html"),
                label: nav_label(&slug),
                slug,
                content: rendered.html,
            }),
            Err(error) => {
                eprintln!("warning: skipping {}: {error}", path.display());
                skipped += 1;
            }
        }
    }
    Ok((pages, skipped))
}

fn nav_links(pages: &[PageEntry]) -> Vec<NavLink> {
    pages
        .iter()
        .map(|page| NavLink {
            label: page.label.clone(),
            href: page.path.clone(),
        })
        .collect()
}

/// `about-the-site` → `About the site`.
fn nav_label(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Write a page at its site-absolute path under the output root.
fn write_page(output: &Path, site_path: &str, html: &str) -> Result<(), SiteError> {
    let relative = site_path.trim_start_matches('/');
    let target = output.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, html)?;
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    #[test]
    fn build_writes_index_posts_and_pages() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        let summary = build(content.path(), out.path()).unwrap();

        assert_eq!(summary.skipped, 0);
        assert!(summary.posts >= 3);
        assert_eq!(summary.pages, 1);

        assert!(out.path().join("index.html").exists());
        assert!(out.path().join("about.html").exists());
        assert!(
            out.path()
                .join("tech/2024/03/05/hello-world.html")
                .exists()
        );
    }

    #[test]
    fn build_copies_css_verbatim() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();

        let css = fs::read_to_string(out.path().join("css/site.css")).unwrap();
        let original =
            fs::read_to_string(content.path().join("css/site.css")).unwrap();
        assert_eq!(css, original);
    }

    #[test]
    fn index_lists_posts_newest_first_per_category() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        let tech = index.find("<h2>tech</h2>").unwrap();
        let ramblings = index.find("<h2>ramblings</h2>").unwrap();
        // Config pins tech before ramblings.
        assert!(tech < ramblings);

        let newest = index.find("hello-world.html").unwrap();
        let older = index.find("older-post.html").unwrap();
        assert!(newest < older);
    }

    #[test]
    fn post_page_contains_title_block_and_date_stamp() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();

        let html = fs::read_to_string(
            out.path().join("tech/2024/03/05/hello-world.html"),
        )
        .unwrap();
        assert!(html.contains("<div class=\"title\"><h1>Hello World </h1>"));
        assert!(html.contains("datetime=\"2024-03-05\""));
        assert!(html.contains("<title>Hello World</title>"));
    }

    #[test]
    fn nav_includes_standalone_pages() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains("href=\"/about.html\""));
        assert!(index.contains("About"));
    }

    #[test]
    fn failing_post_is_skipped_and_rest_still_builds() {
        let content = setup_fixtures();
        // A video embed with no destination fails its document.
        fs::write(
            content.path().join("tech/2024-07-01-broken.md"),
            "# Broken\n\n![clip](){.video}\n",
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let summary = build(content.path(), out.path()).unwrap();

        assert_eq!(summary.skipped, 1);
        assert!(!out.path().join("tech/2024/07/01/broken.html").exists());
        assert!(
            out.path()
                .join("tech/2024/03/05/hello-world.html")
                .exists()
        );
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(!index.contains("broken.html"));
    }

    #[test]
    fn nested_post_directories_are_walked() {
        let content = setup_fixtures();
        fs::create_dir_all(content.path().join("tech/deep")).unwrap();
        fs::write(
            content.path().join("tech/deep/2024-06-01-nested.md"),
            "# Nested\n\nFound me.\n",
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();
        assert!(out.path().join("tech/2024/06/01/nested.html").exists());
    }

    #[test]
    fn title_falls_back_to_slug_without_heading() {
        let content = setup_fixtures();
        fs::write(
            content.path().join("tech/2024-08-01-no-heading.md"),
            "Just body text.\n",
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains("no heading"));
    }

    #[test]
    fn categories_auto_discover_without_config() {
        let content = TempDir::new().unwrap();
        fs::create_dir_all(content.path().join("zeta")).unwrap();
        fs::create_dir_all(content.path().join("alpha")).unwrap();
        fs::create_dir_all(content.path().join("css")).unwrap();
        fs::write(
            content.path().join("alpha/2024-01-01-first.md"),
            "# First\n",
        )
        .unwrap();
        fs::write(
            content.path().join("zeta/2024-01-02-second.md"),
            "# Second\n",
        )
        .unwrap();

        let out = TempDir::new().unwrap();
        build(content.path(), out.path()).unwrap();
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        let alpha = index.find("<h2>alpha</h2>").unwrap();
        let zeta = index.find("<h2>zeta</h2>").unwrap();
        assert!(alpha < zeta);
        assert!(!index.contains("<h2>css</h2>"));
    }

    #[test]
    fn check_passes_on_clean_content() {
        let content = setup_fixtures();
        let summary = check(content.path()).unwrap();
        assert_eq!(summary.skipped, 0);
        assert!(summary.posts >= 3);
    }

    #[test]
    fn check_fails_when_a_post_does_not_render() {
        let content = setup_fixtures();
        fs::write(
            content.path().join("tech/2024-07-01-broken.md"),
            "![clip](){.video}\n",
        )
        .unwrap();
        assert!(matches!(
            check(content.path()),
            Err(SiteError::RenderFailures(1))
        ));
    }

    #[test]
    fn nav_label_capitalizes_and_spaces() {
        assert_eq!(nav_label("about"), "About");
        assert_eq!(nav_label("about-the-site"), "About the site");
    }
}
