//! Turns fetched markup into article candidates.

use ca_core::text::{collapse_whitespace, truncate_chars};
use ca_core::{Error, RawCandidate, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

pub mod rules;

pub use rules::{ExtractionRules, FallbackRule};

fn selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| Error::Scraping(format!("Invalid selector '{}': {:?}", raw, e)))
}

#[derive(Debug, Clone)]
struct CompiledFallback {
    region: Selector,
    title: Selector,
    default_title: String,
}

/// A compiled ruleset. Each `extract` call parses the markup afresh.
#[derive(Debug, Clone)]
pub struct Extractor {
    containers: Vec<(String, Selector)>,
    title: Selector,
    link: Selector,
    body: Selector,
    date: Selector,
    min_body_chars: usize,
    max_body_chars: usize,
    fallback: Option<CompiledFallback>,
}

impl Extractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self> {
        let containers = rules
            .containers
            .iter()
            .map(|raw| -> Result<(String, Selector)> { Ok((raw.clone(), selector(raw)?)) })
            .collect::<Result<Vec<_>>>()?;
        let fallback = match &rules.fallback {
            Some(f) => Some(CompiledFallback {
                region: selector(&f.region)?,
                title: selector(&f.title)?,
                default_title: f.default_title.clone(),
            }),
            None => None,
        };

        Ok(Self {
            containers,
            title: selector(&rules.title)?,
            link: selector(&rules.link)?,
            body: selector(&rules.body)?,
            date: selector(&rules.date)?,
            min_body_chars: rules.min_body_chars,
            max_body_chars: rules.max_body_chars,
            fallback,
        })
    }

    pub fn extract(&self, markup: &str, page_url: &Url) -> Vec<RawCandidate> {
        let document = Html::parse_document(markup);

        for (raw, container) in &self.containers {
            let candidates: Vec<RawCandidate> = document
                .select(container)
                .filter_map(|element| self.candidate(element, page_url))
                .collect();
            if !candidates.is_empty() {
                debug!(selector = %raw, count = candidates.len(), "container selector matched");
                return candidates;
            }
            trace!(selector = %raw, "no accepted candidates");
        }

        self.fallback_candidate(&document, page_url)
            .into_iter()
            .collect()
    }

    fn candidate(&self, element: ElementRef, page_url: &Url) -> Option<RawCandidate> {
        let title = element.select(&self.title).next().map(text_of).unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        let body = self.body_text(element);
        if body.chars().count() <= self.min_body_chars {
            return None;
        }

        let link = element
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();

        Some(RawCandidate {
            title,
            link: resolve_link(page_url, link),
            body: truncate_chars(&body, self.max_body_chars).to_string(),
            date: self.date_text(element),
        })
    }

    /// Text of every body match, skipping matches nested inside another match.
    fn body_text(&self, container: ElementRef) -> String {
        let parts: Vec<String> = container
            .select(&self.body)
            .filter(|el| !nested_in_match(*el, container, &self.body))
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect();
        parts.join(" ")
    }

    fn date_text(&self, container: ElementRef) -> Option<String> {
        let element = container.select(&self.date).next()?;
        let text = text_of(element);
        if !text.is_empty() {
            return Some(text);
        }
        element
            .value()
            .attr("datetime")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    fn fallback_candidate(&self, document: &Html, page_url: &Url) -> Option<RawCandidate> {
        let fallback = self.fallback.as_ref()?;
        let region = document.select(&fallback.region).next()?;
        let body = text_of(region);
        if body.chars().count() <= self.min_body_chars {
            return None;
        }

        let title = document
            .select(&fallback.title)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback.default_title.clone());

        debug!(url = %page_url, "using main content fallback");
        Some(RawCandidate {
            title,
            link: page_url.to_string(),
            body: truncate_chars(&body, self.max_body_chars).to_string(),
            date: None,
        })
    }
}

fn text_of(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn nested_in_match(element: ElementRef, container: ElementRef, selector: &Selector) -> bool {
    for node in element.ancestors() {
        if node.id() == container.id() {
            return false;
        }
        if ElementRef::wrap(node).is_some_and(|parent| selector.matches(&parent)) {
            return true;
        }
    }
    false
}

/// Absolute http(s) form of `href`; anything else falls back to the page itself.
pub fn resolve_link(page_url: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return page_url.to_string();
    }
    match page_url.join(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => page_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::rules::MAX_BODY_CHARS;
    use super::*;

    const LONG_BODY: &str = "The university senate has approved the academic calendar for the new session, with lectures starting in January.";

    fn page() -> Url {
        Url::parse("https://unilag.edu.ng/news/").unwrap()
    }

    fn generic() -> Extractor {
        Extractor::new(&ExtractionRules::generic()).unwrap()
    }

    #[test]
    fn extracts_articles_with_relative_links() {
        let html = format!(
            r#"<html><body>
                <article>
                    <h2>  Senate approves   calendar </h2>
                    <a href="/news/calendar">Read more</a>
                    <p>{LONG_BODY}</p>
                    <span class="date">12 October 2026</span>
                </article>
                <article>
                    <h2>Too short</h2>
                    <p>Brief note.</p>
                </article>
            </body></html>"#
        );

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.title, "Senate approves calendar");
        assert_eq!(candidate.link, "https://unilag.edu.ng/news/calendar");
        assert_eq!(candidate.body, LONG_BODY);
        assert_eq!(candidate.date.as_deref(), Some("12 October 2026"));
    }

    #[test]
    fn cascade_stops_at_first_selector_with_results() {
        let html = format!(
            r#"<div class="post"><h3>From post</h3><p>{LONG_BODY}</p></div>
               <div class="announcement"><h3>From announcement</h3><p>{LONG_BODY}</p></div>"#
        );

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "From post");
    }

    #[test]
    fn selector_with_only_rejected_candidates_does_not_stop_cascade() {
        let html = format!(
            r#"<article><h2>No body</h2></article>
               <div class="news-item"><h3>Real news</h3><p>{LONG_BODY}</p></div>"#
        );

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Real news");
    }

    #[test]
    fn body_must_exceed_minimum_length() {
        let exactly_fifty = "a".repeat(50);
        let fifty_one = "b".repeat(51);
        let html = format!(
            r#"<article><h2>Fifty</h2><p>{exactly_fifty}</p></article>
               <article><h2>Fifty one</h2><p>{fifty_one}</p></article>"#
        );

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Fifty one");
    }

    #[test]
    fn missing_and_non_http_links_resolve_to_page() {
        let html = format!(
            r#"<article><h2>No link</h2><p>{LONG_BODY}</p></article>
               <article><h2>Mail link</h2><a href="mailto:registrar@unilag.edu.ng">Mail</a><p>{LONG_BODY}</p></article>
               <article><h2>Absolute</h2><a href="https://portal.unilag.edu.ng/x">Go</a><p>{LONG_BODY}</p></article>"#
        );

        let links: Vec<String> = generic().extract(&html, &page()).into_iter().map(|c| c.link).collect();
        assert_eq!(
            links,
            [
                "https://unilag.edu.ng/news/",
                "https://unilag.edu.ng/news/",
                "https://portal.unilag.edu.ng/x",
            ]
        );
    }

    #[test]
    fn nested_body_matches_are_not_repeated() {
        let html = r#"<article><h2>Nested</h2>
            <div class="content"><p>Inner paragraph that is long enough to pass the threshold on its own.</p></div>
        </article>"#;

        let candidates = generic().extract(html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].body,
            "Inner paragraph that is long enough to pass the threshold on its own."
        );
    }

    #[test]
    fn date_falls_back_to_datetime_attribute() {
        let html = format!(r#"<article><h2>Dated</h2><time datetime="2026-10-01"></time><p>{LONG_BODY}</p></article>"#);

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates[0].date.as_deref(), Some("2026-10-01"));
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let html = r#"<article>
            <h2>Post-<b>UTME</b> screening</h2>
            <a href="/news/putme">More</a>
            <p>Candidates should visit the <a href="/portal">portal</a>. Registration closes on Friday for all programmes.</p>
        </article>"#;

        let candidates = generic().extract(html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Post-UTME screening");
        assert_eq!(
            candidates[0].body,
            "Candidates should visit the portal. Registration closes on Friday for all programmes."
        );
    }

    #[test]
    fn body_is_capped() {
        let html = format!("<article><h2>Long</h2><p>{}</p></article>", "z".repeat(6000));

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates[0].body.chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn falls_back_to_main_content() {
        let html = format!(r#"<body><h1>Welcome to UNILAG</h1><main><div>{LONG_BODY}</div></main></body>"#);

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Welcome to UNILAG");
        assert_eq!(candidates[0].link, page().to_string());
        assert_eq!(candidates[0].date, None);
    }

    #[test]
    fn fallback_title_defaults_when_page_has_no_heading() {
        let html = format!(r#"<div id="content">{LONG_BODY}</div>"#);

        let candidates = generic().extract(&html, &page());
        assert_eq!(candidates[0].title, "Latest Update");
    }

    #[test]
    fn empty_markup_yields_nothing() {
        assert!(generic().extract("", &page()).is_empty());
        assert!(generic().extract("<div><span>", &page()).is_empty());
    }

    #[test]
    fn exam_board_rules_ignore_generic_only_selectors_and_have_no_fallback() {
        let exam = Extractor::new(&ExtractionRules::exam_board()).unwrap();
        let jamb = Url::parse("https://www.jamb.gov.ng").unwrap();

        let post_only = format!(r#"<div class="post"><h2>Post</h2><p>{LONG_BODY}</p></div>"#);
        assert!(exam.extract(&post_only, &jamb).is_empty());

        let main_only = format!("<main>{LONG_BODY}</main>");
        assert!(exam.extract(&main_only, &jamb).is_empty());

        let news = format!(
            r#"<div class="news-item"><h3>UTME registration extended</h3><a href="news/utme">More</a><p>{LONG_BODY}</p></div>"#
        );
        let candidates = exam.extract(&news, &jamb);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].link, "https://www.jamb.gov.ng/news/utme");
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let mut rules = ExtractionRules::generic();
        rules.title = "h1[".to_string();
        assert!(matches!(Extractor::new(&rules), Err(Error::Scraping(_))));
    }
}
