use std::sync::Arc;

use tracing::debug;
use wa_core::{Locator, TaggedElement};
use wa_driver::{DriverError, DriverService, ElementHandle, TaggingStore};
use wa_parser::{extract_element_id, normalize_tag_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ElementHandle),
    NotFound { tag: String },
}

/// Turns a human-given tag name into a live element by way of the markup
/// recorded for that tag.
#[derive(Clone)]
pub struct TaggedResolver {
    store: Arc<dyn TaggingStore>,
    driver: Arc<dyn DriverService>,
}

impl TaggedResolver {
    pub fn new(store: Arc<dyn TaggingStore>, driver: Arc<dyn DriverService>) -> Self {
        Self { store, driver }
    }

    pub fn resolve(&self, tag_query: &str, uid: &str) -> Result<Resolution, DriverError> {
        let tag = normalize_tag_name(tag_query);
        match self.find_record(&tag)? {
            Some(record) => self.locate(&record, uid),
            None => Ok(Resolution::NotFound { tag }),
        }
    }

    pub fn find_record(&self, tag_query: &str) -> Result<Option<TaggedElement>, DriverError> {
        self.store.find_by_name(tag_query)
    }

    /// Asks the driver for the element whose id the record's markup carries.
    pub fn locate(&self, record: &TaggedElement, uid: &str) -> Result<Resolution, DriverError> {
        let tag = normalize_tag_name(&record.tag_name);
        let Some(id) = extract_element_id(&record.markup) else {
            debug!(tag = %tag, "tagged markup carries no id");
            return Ok(Resolution::NotFound { tag });
        };

        match self.driver.find_element(uid, &Locator::Id(id)) {
            Ok(element) => Ok(Resolution::Found(element)),
            Err(error) if error.is_not_found() => {
                debug!(tag = %tag, %error, "tagged element is not on the page");
                Ok(Resolution::NotFound { tag })
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use wa_driver::{DriverFixture, ElementFixture, InMemoryDriver, InMemoryTaggingStore, PageFixture};

    const PAGE: &str = "https://app.test/";

    fn driver(with_session: bool) -> Arc<InMemoryDriver> {
        let mut pages = BTreeMap::new();
        pages.insert(
            PAGE.to_string(),
            PageFixture {
                source: String::new(),
                elements: vec![ElementFixture {
                    id: Some("login".to_string()),
                    xpath: None,
                    text: "Sign in".to_string(),
                }],
            },
        );
        let driver = Arc::new(InMemoryDriver::new(DriverFixture {
            pages,
            ..DriverFixture::default()
        }));
        if with_session {
            driver.navigate("s1", PAGE).expect("navigate should succeed");
        }
        driver
    }

    fn resolver(driver: Arc<InMemoryDriver>, records: Vec<TaggedElement>) -> TaggedResolver {
        TaggedResolver::new(Arc::new(InMemoryTaggingStore::new(records)), driver)
    }

    #[test]
    fn resolves_quoted_queries_to_the_same_live_element() {
        let resolver = resolver(
            driver(true),
            vec![TaggedElement::new(
                "login-button",
                r#"<button id="login" class="btn">Sign in</button>"#,
            )],
        );
        for query in [r#""login-button""#, "'login-button'", " login-button "] {
            let resolution = resolver.resolve(query, "s1").expect("resolve should succeed");
            let Resolution::Found(element) = resolution else {
                panic!("expected a live element for {query:?}");
            };
            assert_eq!(element.locator, Locator::Id("login".to_string()));
            assert_eq!(element.uid, "s1");
        }
    }

    #[test]
    fn missing_record_id_or_live_element_is_not_found() {
        let resolver = resolver(
            driver(true),
            vec![
                TaggedElement::new("no-id", "<button>Go</button>"),
                TaggedElement::new("gone", r#"<a id="vanished">x</a>"#),
            ],
        );
        for tag in ["unknown", "no-id", "gone"] {
            assert_eq!(
                resolver.resolve(tag, "s1").expect("resolve should succeed"),
                Resolution::NotFound {
                    tag: tag.to_string()
                }
            );
        }
    }

    #[test]
    fn driver_faults_are_not_mistaken_for_missing_elements() {
        let resolver = resolver(
            driver(false),
            vec![TaggedElement::new("login", r#"<button id="login">Go</button>"#)],
        );
        let error = resolver
            .resolve("login", "s1")
            .expect_err("there is no session to search");
        assert!(!error.is_not_found());
    }
}
