use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use regex::Regex;
use serde::{Deserialize, Serialize};
use wa_core::{ElementAction, Locator, PressKey, TaggedElement};

use crate::{DriverError, DriverService, ElementHandle, TaggingStore};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const MEMORY_ENDPOINT: &str = "memory://driver";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFixture {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub xpath: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl ElementFixture {
    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Locator::Xpath(xpath) => self.xpath.as_deref() == Some(xpath.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFixture {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

/// Scripted browser used by tests, demos and the `--fixture` CLI mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverFixture {
    #[serde(default)]
    pub pages: BTreeMap<String, PageFixture>,
    #[serde(default)]
    pub tags: Vec<TaggedElement>,
    /// Every call fails with a transport error.
    #[serde(default)]
    pub unreachable: bool,
    #[serde(default)]
    pub failing_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Navigated { uid: String, url: String },
    Read { uid: String, locator: Locator },
    Clicked { uid: String, locator: Locator },
    Filled { uid: String, locator: Locator, text: Vec<String> },
    KeyPressed { uid: String, locator: Locator, key: PressKey },
    Screenshot { uid: String },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn non_content_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<!--.*?-->")
            .expect("non-content regex must compile")
    })
}

#[derive(Debug, Default)]
pub struct InMemoryDriver {
    fixture: DriverFixture,
    sessions: Mutex<BTreeMap<String, String>>,
    journal: Mutex<Vec<DriverEvent>>,
}

impl InMemoryDriver {
    pub fn new(fixture: DriverFixture) -> Self {
        Self {
            fixture,
            sessions: Mutex::new(BTreeMap::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn fixture(&self) -> &DriverFixture {
        &self.fixture
    }

    pub fn journal(&self) -> Vec<DriverEvent> {
        lock(&self.journal).clone()
    }

    pub fn current_url(&self, uid: &str) -> Option<String> {
        lock(&self.sessions).get(uid).cloned()
    }

    fn record(&self, event: DriverEvent) {
        lock(&self.journal).push(event);
    }

    fn ensure_reachable(&self) -> Result<(), DriverError> {
        if self.fixture.unreachable {
            return Err(DriverError::Transport {
                endpoint: MEMORY_ENDPOINT.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn page(&self, uid: &str) -> Result<PageFixture, DriverError> {
        self.ensure_reachable()?;
        let url = self.current_url(uid).ok_or_else(|| DriverError::Status {
            status: 500,
            body: format!("no browser session for uid {}", uid),
        })?;
        Ok(self.fixture.pages.get(&url).cloned().unwrap_or_default())
    }

    fn element(&self, uid: &str, locator: &Locator) -> Result<ElementFixture, DriverError> {
        self.page(uid)?
            .elements
            .into_iter()
            .find(|element| element.matches(locator))
            .ok_or_else(|| DriverError::ElementNotFound {
                locator: locator.clone(),
            })
    }
}

impl DriverService for InMemoryDriver {
    fn navigate(&self, uid: &str, url: &str) -> Result<String, DriverError> {
        self.ensure_reachable()?;
        if self.fixture.failing_urls.iter().any(|failing| failing == url) {
            return Err(DriverError::Status {
                status: 500,
                body: format!("unknown error: net::ERR_NAME_NOT_RESOLVED ({})", url),
            });
        }
        lock(&self.sessions).insert(uid.to_string(), url.to_string());
        self.record(DriverEvent::Navigated {
            uid: uid.to_string(),
            url: url.to_string(),
        });
        Ok(self
            .fixture
            .pages
            .get(url)
            .map(|page| page.source.clone())
            .unwrap_or_default())
    }

    fn find_element(&self, uid: &str, locator: &Locator) -> Result<ElementHandle, DriverError> {
        self.element(uid, locator)?;
        Ok(ElementHandle {
            uid: uid.to_string(),
            locator: locator.clone(),
        })
    }

    fn act(
        &self,
        element: &ElementHandle,
        action: &ElementAction,
    ) -> Result<Option<String>, DriverError> {
        let found = self.element(&element.uid, &element.locator)?;
        let uid = element.uid.clone();
        let locator = element.locator.clone();
        match action {
            ElementAction::Read => {
                self.record(DriverEvent::Read { uid, locator });
                Ok(Some(found.text))
            }
            ElementAction::Click => {
                self.record(DriverEvent::Clicked { uid, locator });
                Ok(None)
            }
            ElementAction::Fill(text) => {
                self.record(DriverEvent::Filled {
                    uid,
                    locator,
                    text: text.clone(),
                });
                Ok(None)
            }
        }
    }

    fn press_key(&self, element: &ElementHandle, key: PressKey) -> Result<(), DriverError> {
        self.element(&element.uid, &element.locator)?;
        self.record(DriverEvent::KeyPressed {
            uid: element.uid.clone(),
            locator: element.locator.clone(),
            key,
        });
        Ok(())
    }

    fn screenshot(&self, uid: &str) -> Result<Vec<u8>, DriverError> {
        self.page(uid)?;
        let url = self.current_url(uid).unwrap_or_default();
        self.record(DriverEvent::Screenshot {
            uid: uid.to_string(),
        });
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(url.as_bytes());
        Ok(bytes)
    }

    fn page_source(&self, uid: &str) -> Result<String, DriverError> {
        Ok(self.page(uid)?.source)
    }

    fn readable_text(&self, uid: &str) -> Result<String, DriverError> {
        let source = self.page(uid)?.source;
        Ok(non_content_regex().replace_all(&source, "").into_owned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaggingStore {
    records: Mutex<Vec<TaggedElement>>,
}

impl InMemoryTaggingStore {
    pub fn new(records: Vec<TaggedElement>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl TaggingStore for InMemoryTaggingStore {
    fn append(&self, tag_name: &str, markup: &str) -> Result<(), DriverError> {
        lock(&self.records).push(TaggedElement::new(tag_name, markup));
        Ok(())
    }

    fn list(&self) -> Result<Vec<TaggedElement>, DriverError> {
        Ok(lock(&self.records).clone())
    }

    fn clear(&self) -> Result<(), DriverError> {
        lock(&self.records).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DriverFixture {
        serde_json::from_str(
            r#"{
                "pages": {
                    "https://shop.test/": {
                        "source": "<html><script>track()</script><h1 id=\"title\">Shop</h1><!-- promo --></html>",
                        "elements": [
                            {"id": "title", "xpath": "//h1", "text": "Shop"},
                            {"id": "search", "text": ""}
                        ]
                    }
                },
                "failingUrls": ["https://down.test/"]
            }"#,
        )
        .expect("fixture should parse")
    }

    #[test]
    fn navigate_opens_a_session_and_actions_use_it() {
        let driver = InMemoryDriver::new(fixture());
        let source = driver
            .navigate("s1", "https://shop.test/")
            .expect("navigate should succeed");
        assert!(source.contains("<h1"));

        let heading = driver
            .find_element("s1", &Locator::Xpath("//h1".to_string()))
            .expect("heading should exist");
        assert_eq!(
            driver.act(&heading, &ElementAction::Read).expect("read"),
            Some("Shop".to_string())
        );

        let search = driver
            .find_element("s1", &Locator::Id("search".to_string()))
            .expect("search should exist");
        driver
            .act(&search, &ElementAction::Fill(vec!["shoes".to_string()]))
            .expect("fill");
        driver.press_key(&search, PressKey::Enter).expect("press");

        let journal = driver.journal();
        assert_eq!(journal.len(), 4);
        assert!(matches!(
            &journal[2],
            DriverEvent::Filled { text, .. } if text == &vec!["shoes".to_string()]
        ));
    }

    #[test]
    fn missing_elements_and_sessions_are_reported() {
        let driver = InMemoryDriver::new(fixture());
        let error = driver
            .find_element("s1", &Locator::Id("title".to_string()))
            .expect_err("no session yet");
        assert_eq!(error.to_string(), "500 - no browser session for uid s1");

        driver
            .navigate("s1", "https://shop.test/")
            .expect("navigate should succeed");
        let error = driver
            .find_element("s1", &Locator::Id("cart".to_string()))
            .expect_err("cart is absent");
        assert!(error.is_not_found());
    }

    #[test]
    fn failing_and_unreachable_fixtures_surface_driver_errors() {
        let driver = InMemoryDriver::new(fixture());
        let error = driver
            .navigate("s1", "https://down.test/")
            .expect_err("url is scripted to fail");
        assert!(error.to_string().starts_with("500 - "));
        assert_eq!(driver.current_url("s1"), None);

        let offline = InMemoryDriver::new(DriverFixture {
            unreachable: true,
            ..DriverFixture::default()
        });
        let error = offline
            .navigate("s1", "https://shop.test/")
            .expect_err("driver is offline");
        assert!(matches!(error, DriverError::Transport { .. }));
    }

    #[test]
    fn readable_text_drops_scripts_and_comments() {
        let driver = InMemoryDriver::new(fixture());
        driver
            .navigate("s1", "https://shop.test/")
            .expect("navigate should succeed");
        let text = driver.readable_text("s1").expect("text should load");
        assert_eq!(text, "<html><h1 id=\"title\">Shop</h1></html>");
    }

    #[test]
    fn unknown_urls_load_a_blank_page() {
        let driver = InMemoryDriver::new(DriverFixture::default());
        assert_eq!(
            driver
                .navigate("s1", "https://nowhere.test/")
                .expect("navigate should succeed"),
            ""
        );
        let png = driver.screenshot("s1").expect("screenshot should succeed");
        assert!(png.starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn tagging_store_appends_and_clears() {
        let store = InMemoryTaggingStore::default();
        store
            .append("login", r#"<button id="login">Go</button>"#)
            .expect("append");
        store.append("login", r#"<a id="later">x</a>"#).expect("append");
        assert_eq!(store.list().expect("list").len(), 2);
        assert_eq!(
            store
                .find_by_name("'login'")
                .expect("lookup")
                .map(|record| record.markup),
            Some(r#"<button id="login">Go</button>"#.to_string())
        );
        store.clear().expect("clear");
        assert!(store.list().expect("list").is_empty());
    }
}
