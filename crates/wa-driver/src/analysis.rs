use std::sync::Arc;

use tracing::debug;
use wa_core::FindResult;
use wa_parser::{scan_start_tags, StartTag};

use crate::{ContentAnalyzer, DriverError, DriverService, TextGenerator};

const ANALYSIS_SESSION: &str = "analysis";
const COMMENT_CONTEXT_CHARS: usize = 50;
const IGNORED_WORDS: [&str; 8] = ["a", "an", "the", "to", "of", "on", "in", "for"];

/// Answers element queries by loading the page in a dedicated driver session
/// and scoring every start tag against the words of the query.
pub struct MarkupContentAnalyzer {
    driver: Arc<dyn DriverService>,
    session: String,
}

impl MarkupContentAnalyzer {
    pub fn new(driver: Arc<dyn DriverService>) -> Self {
        Self {
            driver,
            session: ANALYSIS_SESSION.to_string(),
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = session.into();
        self
    }
}

fn query_words(query: &str) -> Vec<String> {
    query
        .split(|ch: char| !ch.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty() && !IGNORED_WORDS.contains(&word.as_str()))
        .collect()
}

fn score(tag: &StartTag, words: &[String]) -> u32 {
    let field = |name: &str| {
        tag.attributes
            .get(name)
            .map(|value| value.to_lowercase())
            .unwrap_or_default()
    };
    let weighted = [
        (field("id"), 3),
        (field("name"), 3),
        (field("aria-label"), 2),
        (field("placeholder"), 2),
        (field("title"), 2),
        (tag.text.to_lowercase(), 2),
        (field("class"), 1),
    ];

    let mut total = 0;
    for word in words {
        if tag.name == *word {
            total += 1;
        }
        for (haystack, weight) in &weighted {
            if haystack.contains(word.as_str()) {
                total += weight;
            }
        }
    }
    total
}

fn address(tag: &StartTag) -> Option<FindResult> {
    let attribute = |name: &str| {
        tag.attributes
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };
    if let Some(id) = attribute("id") {
        return Some(FindResult::found("ID", id));
    }
    if let Some(name) = attribute("name") {
        return Some(FindResult::found("NAME", name));
    }
    if tag.name == "a" && !tag.text.is_empty() {
        return Some(FindResult::found("LINK_TEXT", tag.text.clone()));
    }
    attribute("class")
        .and_then(|class| class.split_whitespace().next())
        .map(|class| FindResult::found("CLASS_NAME", class))
}

impl ContentAnalyzer for MarkupContentAnalyzer {
    fn find_element(&self, url: &str, query: &str) -> Result<FindResult, DriverError> {
        let source = self.driver.navigate(&self.session, url)?;
        let words = query_words(query);
        if words.is_empty() {
            return Ok(FindResult::not_found());
        }

        let mut best: Option<(u32, FindResult)> = None;
        for tag in scan_start_tags(&source) {
            let points = score(&tag, &words);
            if points == 0 || best.as_ref().is_some_and(|(top, _)| *top >= points) {
                continue;
            }
            if let Some(found) = address(&tag) {
                best = Some((points, found));
            }
        }

        debug!(url, query, found = best.is_some(), "element query analyzed");
        Ok(best
            .map(|(_, found)| found)
            .unwrap_or_else(FindResult::not_found))
    }
}

/// Placeholder comment text built from the start of the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCommentGenerator;

impl TextGenerator for TemplateCommentGenerator {
    fn generate(&self, context: &str) -> String {
        let head = context.chars().take(COMMENT_CONTEXT_CHARS).collect::<String>();
        format!("This is a generated comment based on: {}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::{DriverFixture, InMemoryDriver, PageFixture};

    const LOGIN_PAGE: &str = r#"<html><body>
        <a href="/help">Help center</a>
        <form>
          <input name="user" placeholder="Email address">
          <input type="password" class="field secret" aria-label="Password">
          <button id="login-btn" class="primary">Sign in</button>
        </form>
        <a href="/forgot">Forgot password</a>
      </body></html>"#;

    fn analyzer() -> (Arc<InMemoryDriver>, MarkupContentAnalyzer) {
        let mut pages = BTreeMap::new();
        pages.insert(
            "https://login.test/".to_string(),
            PageFixture {
                source: LOGIN_PAGE.to_string(),
                elements: Vec::new(),
            },
        );
        let driver = Arc::new(InMemoryDriver::new(DriverFixture {
            pages,
            ..DriverFixture::default()
        }));
        let analyzer = MarkupContentAnalyzer::new(driver.clone());
        (driver, analyzer)
    }

    #[test]
    fn prefers_id_then_name_then_link_text_then_class() {
        let (_, analyzer) = analyzer();
        let url = "https://login.test/";
        assert_eq!(
            analyzer.find_element(url, "the sign in button").expect("query"),
            FindResult::found("ID", "login-btn")
        );
        assert_eq!(
            analyzer.find_element(url, "email field").expect("query"),
            FindResult::found("NAME", "user")
        );
        assert_eq!(
            analyzer.find_element(url, "forgot link").expect("query"),
            FindResult::found("LINK_TEXT", "Forgot password")
        );
        assert_eq!(
            analyzer.find_element(url, "secret").expect("query"),
            FindResult::found("CLASS_NAME", "field")
        );
    }

    #[test]
    fn unmatched_queries_report_not_found() {
        let (driver, analyzer) = analyzer();
        assert_eq!(
            analyzer
                .find_element("https://login.test/", "shopping cart")
                .expect("query"),
            FindResult::not_found()
        );
        assert_eq!(driver.current_url("analysis").as_deref(), Some("https://login.test/"));
    }

    #[test]
    fn navigation_failures_propagate() {
        let driver = Arc::new(InMemoryDriver::new(DriverFixture {
            unreachable: true,
            ..DriverFixture::default()
        }));
        let error = MarkupContentAnalyzer::new(driver)
            .find_element("https://login.test/", "login")
            .expect_err("driver is offline");
        assert!(matches!(error, DriverError::Transport { .. }));
    }

    #[test]
    fn comment_uses_first_fifty_characters() {
        let context = "x".repeat(80);
        let comment = TemplateCommentGenerator.generate(&context);
        assert_eq!(
            comment,
            format!("This is a generated comment based on: {}...", "x".repeat(50))
        );
        assert_eq!(
            TemplateCommentGenerator.generate("short"),
            "This is a generated comment based on: short..."
        );
    }
}
