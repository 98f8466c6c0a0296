//! Post filename parsing for the `YYYY-MM-DD-slug.md` convention.
//!
//! Posts carry their publication date in the filename; there is no front
//! matter. The date orders the index and becomes the `<time>` stamp next to
//! the post title, and the slug becomes the tail of the output path:
//! `2024-03-05-hello-world.md` → `/tech/2024/03/05/hello-world.html`.
//!
//! Files that do not match the convention are not posts and are skipped.

use chrono::NaiveDate;

/// Result of parsing a post filename like `2024-03-05-hello-world.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPostName {
    /// Publication date from the `YYYY-MM-DD` prefix.
    pub date: NaiveDate,
    /// Slug after the date prefix, dashes preserved.
    pub slug: String,
}

impl ParsedPostName {
    /// Display title fallback for posts without a level-1 heading:
    /// dashes converted to spaces.
    pub fn display_title(&self) -> String {
        self.slug.replace('-', " ")
    }
}

/// Parse a post filename. Returns `None` when the name does not follow the
/// convention: wrong extension, missing or invalid date, or empty slug.
pub fn parse_post_filename(filename: &str) -> Option<ParsedPostName> {
    let stem = filename.strip_suffix(".md")?;

    let mut parts = stem.splitn(4, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    let slug = parts.next()?;
    if slug.is_empty() {
        return None;
    }

    // from_ymd_opt rejects impossible dates (month 13, Feb 30, ...).
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(ParsedPostName {
        date,
        slug: slug.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dated_post_with_multi_word_slug() {
        let p = parse_post_filename("2024-03-05-hello-world.md").unwrap();
        assert_eq!(p.date, date(2024, 3, 5));
        assert_eq!(p.slug, "hello-world");
        assert_eq!(p.display_title(), "hello world");
    }

    #[test]
    fn single_word_slug() {
        let p = parse_post_filename("2023-11-20-retrospective.md").unwrap();
        assert_eq!(p.date, date(2023, 11, 20));
        assert_eq!(p.slug, "retrospective");
    }

    #[test]
    fn slug_keeps_further_dashes_intact() {
        let p = parse_post_filename("2024-01-02-a-b-c-d.md").unwrap();
        assert_eq!(p.slug, "a-b-c-d");
    }

    #[test]
    fn undated_file_is_not_a_post() {
        assert_eq!(parse_post_filename("notes.md"), None);
        assert_eq!(parse_post_filename("about-the-site.md"), None);
    }

    #[test]
    fn wrong_extension_is_not_a_post() {
        assert_eq!(parse_post_filename("2024-03-05-hello.txt"), None);
        assert_eq!(parse_post_filename("2024-03-05-hello"), None);
    }

    #[test]
    fn impossible_date_is_rejected() {
        assert_eq!(parse_post_filename("2024-13-05-bad-month.md"), None);
        assert_eq!(parse_post_filename("2024-02-30-bad-day.md"), None);
    }

    #[test]
    fn missing_slug_is_rejected() {
        assert_eq!(parse_post_filename("2024-03-05.md"), None);
        assert_eq!(parse_post_filename("2024-03-05-.md"), None);
    }

    #[test]
    fn unpadded_date_fields_still_parse() {
        let p = parse_post_filename("2024-3-5-quick-note.md").unwrap();
        assert_eq!(p.date, date(2024, 3, 5));
    }
}
