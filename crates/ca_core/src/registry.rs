//! Static configuration: the scraped sites and the known exam deadlines.
//!
//! Both lists ship inside the binary and can be replaced by files at startup.
//! Once loaded the registry is read-only.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use url::Url;

use crate::types::{Category, DeadlineEvent, Source};
use crate::{Error, Result};

const BUNDLED_SOURCES: &str = include_str!("../data/sources.json");
const BUNDLED_DEADLINES: &str = include_str!("../data/deadlines.json");

#[derive(Debug, Clone)]
pub struct Registry {
    sources: Vec<Source>,
    exam_board: Source,
    deadlines: Vec<DeadlineEvent>,
}

impl Registry {
    pub fn new(sources: Vec<Source>, deadlines: Vec<DeadlineEvent>) -> Result<Self> {
        validate_sources(&sources)?;
        Ok(Self {
            sources,
            exam_board: Source::exam_board(),
            deadlines,
        })
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_SOURCES, BUNDLED_DEADLINES)
    }

    pub fn from_json(sources: &str, deadlines: &str) -> Result<Self> {
        Self::new(serde_json::from_str(sources)?, serde_json::from_str(deadlines)?)
    }

    /// Load the registry, replacing either bundled list with a file when given.
    pub fn load(sources_path: Option<&Path>, deadlines_path: Option<&Path>) -> Result<Self> {
        let sources = match sources_path {
            Some(path) => fs::read_to_string(path)?,
            None => BUNDLED_SOURCES.to_string(),
        };
        let deadlines = match deadlines_path {
            Some(path) => fs::read_to_string(path)?,
            None => BUNDLED_DEADLINES.to_string(),
        };
        Self::from_json(&sources, &deadlines)
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn exam_board(&self) -> &Source {
        &self.exam_board
    }

    pub fn deadlines(&self) -> &[DeadlineEvent] {
        &self.deadlines
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(move |s| s.category == category)
    }

    /// Look a source up by slug, the exam board included.
    pub fn find(&self, slug: &str) -> Option<&Source> {
        if self.exam_board.slug.eq_ignore_ascii_case(slug) {
            return Some(&self.exam_board);
        }
        self.sources.iter().find(|s| s.slug.eq_ignore_ascii_case(slug))
    }
}

fn validate_sources(sources: &[Source]) -> Result<()> {
    let mut slugs = HashSet::new();
    for source in sources {
        if !slugs.insert(source.slug.to_ascii_lowercase()) {
            return Err(Error::Config(format!("Duplicate source slug: {}", source.slug)));
        }
        let url = Url::parse(&source.url)
            .map_err(|e| Error::InvalidUrl(format!("{} ({}): {}", source.url, source.slug, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!("{} is not an http(s) URL", source.url)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_registry_loads() {
        let registry = Registry::bundled().unwrap();
        assert!(registry.sources().len() >= 50);
        assert!(registry.by_category(Category::Private).count() > 0);
        assert!(registry.by_category(Category::State).count() > 0);
        assert!(registry.sources().iter().all(|s| s.category != Category::Jamb));
        assert!(!registry.deadlines().is_empty());
    }

    #[test]
    fn find_includes_exam_board() {
        let registry = Registry::bundled().unwrap();
        assert_eq!(registry.find("JAMB").unwrap().url, Source::EXAM_BOARD_URL);
        assert_eq!(registry.find("unilag").unwrap().category, Category::Federal);
        assert!(registry.find("no-such-school").is_none());
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let sources = r#"[
            {"name": "A", "slug": "dup", "category": "Federal", "url": "https://a.edu.ng"},
            {"name": "B", "slug": "DUP", "category": "State", "url": "https://b.edu.ng"}
        ]"#;
        let err = Registry::from_json(sources, "[]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let sources = r#"[{"name": "A", "slug": "a", "category": "Federal", "url": "ftp://a.edu.ng"}]"#;
        assert!(matches!(
            Registry::from_json(sources, "[]").unwrap_err(),
            Error::InvalidUrl(_)
        ));
    }

    #[test]
    fn load_prefers_files_over_bundled_lists() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Test University", "slug": "test", "category": "Private", "url": "https://test.edu.ng"}}]"#
        )
        .unwrap();

        let registry = Registry::load(Some(file.path()), None).unwrap();
        assert_eq!(registry.sources().len(), 1);
        assert_eq!(registry.sources()[0].slug, "test");
        assert!(!registry.deadlines().is_empty());
    }
}
