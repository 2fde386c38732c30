//! Selector rulesets handed to the extractor.

pub const MIN_BODY_CHARS: usize = 50;
pub const MAX_BODY_CHARS: usize = 5000;

/// Page-wide fallback used when no container yields a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRule {
    pub region: String,
    pub title: String,
    pub default_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    /// Tried in order; the first selector producing an accepted candidate wins.
    pub containers: Vec<String>,
    pub title: String,
    pub link: String,
    pub body: String,
    pub date: String,
    /// A body must be strictly longer than this.
    pub min_body_chars: usize,
    pub max_body_chars: usize,
    pub fallback: Option<FallbackRule>,
}

impl ExtractionRules {
    /// Rules for university news pages.
    pub fn generic() -> Self {
        Self {
            containers: [
                "article",
                ".news-item",
                ".post",
                ".update",
                ".announcement",
                r#"[class*="news"]"#,
                r#"[class*="update"]"#,
                r#"[class*="announcement"]"#,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            title: r#"h1, h2, h3, .title, [class*="title"]"#.to_string(),
            link: "a[href]".to_string(),
            body: r#"p, .content, [class*="content"]"#.to_string(),
            date: r#".date, [class*="date"], time"#.to_string(),
            min_body_chars: MIN_BODY_CHARS,
            max_body_chars: MAX_BODY_CHARS,
            fallback: Some(FallbackRule {
                region: "main, .main-content, #content, .content".to_string(),
                title: "h1, h2".to_string(),
                default_title: "Latest Update".to_string(),
            }),
        }
    }

    /// Rules for the exam board's site: a single combined container pass and no fallback.
    pub fn exam_board() -> Self {
        Self {
            containers: vec![r#"article, .news-item, .update, .announcement, [class*="news"]"#.to_string()],
            title: "h1, h2, h3, .title".to_string(),
            link: "a[href]".to_string(),
            body: "p, .content".to_string(),
            date: ".date, time".to_string(),
            min_body_chars: MIN_BODY_CHARS,
            max_body_chars: MAX_BODY_CHARS,
            fallback: None,
        }
    }
}
