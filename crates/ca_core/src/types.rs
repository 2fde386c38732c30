use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Federal,
    State,
    Private,
    #[serde(rename = "JAMB")]
    Jamb,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Federal,
        Category::State,
        Category::Private,
        Category::Jamb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Federal => "Federal",
            Category::State => "State",
            Category::Private => "Private",
            Category::Jamb => "JAMB",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("Unknown category: {}", s)))
    }
}

/// A site the pipeline scrapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub slug: String,
    pub category: Category,
    pub url: String,
}

impl Source {
    pub const EXAM_BOARD_URL: &'static str = "https://www.jamb.gov.ng";

    /// The examination board, scraped after the registry with its own rules.
    pub fn exam_board() -> Self {
        Self {
            name: "JAMB".to_string(),
            slug: "jamb".to_string(),
            category: Category::Jamb,
            url: Self::EXAM_BOARD_URL.to_string(),
        }
    }
}

/// A tentative article pulled out of a page, before dedup and summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: String,
    pub link: String,
    pub body: String,
    pub date: Option<String>,
}

/// Everything a caller supplies when persisting an update. The store adds the
/// id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpdate {
    pub title: String,
    pub link: String,
    pub content: String,
    pub summary: String,
    pub source: String,
    pub source_url: String,
    pub source_slug: String,
    pub category: Category,
    pub date: String,
}

impl NewUpdate {
    pub fn from_candidate(
        candidate: RawCandidate,
        summary: String,
        source: &Source,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: candidate.title,
            link: candidate.link,
            content: candidate.body,
            summary,
            source: source.name.clone(),
            source_url: source.url.clone(),
            source_slug: source.slug.clone(),
            category: source.category,
            date: candidate.date.unwrap_or_else(|| fetched_at.to_rfc3339()),
        }
    }

    pub fn into_record(
        self,
        id: String,
        created_at: DateTime<Utc>,
    ) -> UpdateRecord {
        UpdateRecord {
            id,
            title: self.title,
            link: self.link,
            content: self.content,
            summary: self.summary,
            source: self.source,
            source_url: self.source_url,
            source_slug: self.source_slug,
            category: self.category,
            date: self.date,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A persisted update, as read by the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub id: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub summary: String,
    pub source: String,
    pub source_url: String,
    pub source_slug: String,
    pub category: Category,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineEvent {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub category: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_its_wire_name() {
        assert_eq!(serde_json::to_string(&Category::Jamb).unwrap(), "\"JAMB\"");
        let parsed: Category = serde_json::from_str("\"Private\"").unwrap();
        assert_eq!(parsed, Category::Private);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("federal".parse::<Category>().unwrap(), Category::Federal);
        assert_eq!(" jamb ".parse::<Category>().unwrap(), Category::Jamb);
        assert!("polytechnic".parse::<Category>().is_err());
    }

    #[test]
    fn new_update_defaults_date_to_fetch_time() {
        let fetched_at = Utc::now();
        let candidate = RawCandidate {
            title: "Resumption notice".to_string(),
            link: "https://unilag.edu.ng/news/resumption".to_string(),
            body: "Students are to resume on Monday.".to_string(),
            date: None,
        };
        let source = Source {
            name: "University of Lagos".to_string(),
            slug: "unilag".to_string(),
            category: Category::Federal,
            url: "https://unilag.edu.ng".to_string(),
        };

        let update = NewUpdate::from_candidate(candidate, "Resume Monday.".to_string(), &source, fetched_at);
        assert_eq!(update.date, fetched_at.to_rfc3339());
        assert_eq!(update.source_slug, "unilag");
        assert_eq!(update.category, Category::Federal);
    }

    #[test]
    fn update_record_uses_camel_case_fields() {
        let now = Utc::now();
        let record = NewUpdate {
            title: "t".to_string(),
            link: "https://example.edu.ng/a".to_string(),
            content: "c".to_string(),
            summary: "s".to_string(),
            source: "Example".to_string(),
            source_url: "https://example.edu.ng".to_string(),
            source_slug: "example".to_string(),
            category: Category::State,
            date: "2026-10-01".to_string(),
        }
        .into_record("id-1".to_string(), now);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sourceSlug"], "example");
        assert_eq!(json["sourceUrl"], "https://example.edu.ng");
        assert!(json.get("createdAt").is_some());
        assert_eq!(record.created_at, record.updated_at);
    }
}
