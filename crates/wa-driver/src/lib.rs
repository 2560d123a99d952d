mod analysis;
mod error;
mod http;
mod memory;

pub use analysis::{MarkupContentAnalyzer, TemplateCommentGenerator};
pub use error::DriverError;
pub use http::{HttpDriverClient, DEFAULT_DRIVER_URL};
pub use memory::{
    DriverEvent, DriverFixture, ElementFixture, InMemoryDriver, InMemoryTaggingStore, PageFixture,
};

use wa_core::{ElementAction, FindResult, Locator, PressKey, TaggedElement};
use wa_parser::normalize_tag_name;

/// A live element address inside one browser session. The service locates
/// the element again on every action, so a handle stays usable across page
/// reloads as long as the locator still matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub uid: String,
    pub locator: Locator,
}

/// Remote browser sessions keyed by an opaque uid. Sessions are opened on
/// first navigation; a session whose browser died is recreated by the
/// service on its next use.
pub trait DriverService: Send + Sync {
    fn navigate(&self, uid: &str, url: &str) -> Result<String, DriverError>;

    fn find_element(&self, uid: &str, locator: &Locator) -> Result<ElementHandle, DriverError>;

    /// Returns the element text for [`ElementAction::Read`] when the service
    /// reports one.
    fn act(
        &self,
        element: &ElementHandle,
        action: &ElementAction,
    ) -> Result<Option<String>, DriverError>;

    fn press_key(&self, element: &ElementHandle, key: PressKey) -> Result<(), DriverError>;

    fn screenshot(&self, uid: &str) -> Result<Vec<u8>, DriverError>;

    fn page_source(&self, uid: &str) -> Result<String, DriverError>;

    /// Page markup with script, style and comment nodes removed.
    fn readable_text(&self, uid: &str) -> Result<String, DriverError>;
}

/// Registry of elements a human selected and named. Records keep insertion
/// order, oldest first.
pub trait TaggingStore: Send + Sync {
    fn append(&self, tag_name: &str, markup: &str) -> Result<(), DriverError>;

    fn list(&self) -> Result<Vec<TaggedElement>, DriverError>;

    fn clear(&self) -> Result<(), DriverError>;

    fn find_by_name(&self, name: &str) -> Result<Option<TaggedElement>, DriverError> {
        let wanted = normalize_tag_name(name);
        Ok(self
            .list()?
            .into_iter()
            .find(|record| normalize_tag_name(&record.tag_name) == wanted))
    }
}

/// Locates an element on a page from a free-form description.
pub trait ContentAnalyzer: Send + Sync {
    fn find_element(&self, url: &str, query: &str) -> Result<FindResult, DriverError>;
}

pub trait TextGenerator: Send + Sync {
    fn generate(&self, context: &str) -> String;
}
