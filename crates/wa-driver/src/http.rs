use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wa_core::{ElementAction, Locator, PressKey, TaggedElement};

use crate::{DriverError, DriverService, ElementHandle, TaggingStore};

pub const DEFAULT_DRIVER_URL: &str = "http://localhost:8676";
const API_PREFIX: &str = "/v1/connectors/browser";
const PRESS_KEY_ACTION: &str = "press_key";

#[derive(Debug, Serialize)]
struct NavigateRequest<'a> {
    url: &'a str,
    uid: &'a str,
}

#[derive(Debug, Deserialize)]
struct SourceResponse {
    #[serde(default)]
    source: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FindDoRequest<'a> {
    search: &'a str,
    by: &'a str,
    action: &'a str,
    text: &'a [String],
    #[serde(rename = "uid")]
    uid: &'a str,
}

#[derive(Debug, Serialize)]
struct SelectedElementRequest<'a> {
    element_html: &'a str,
    element_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct SelectedElementRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    html: String,
}

#[derive(Debug, Deserialize)]
struct SelectedElementsResponse {
    #[serde(default)]
    elements: Vec<SelectedElementRecord>,
}

/// Blocking client for the browser driver service. Implements both the
/// driver operations and the tagging store, which live on the same service.
#[derive(Debug, Clone)]
pub struct HttpDriverClient {
    base_url: String,
    client: Client,
}

impl HttpDriverClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DriverError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| DriverError::Transport {
                endpoint: base_url.to_string(),
                message: error.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, DriverError> {
        debug!(endpoint, "driver request");
        request.send().map_err(|error| DriverError::Transport {
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        })
    }

    fn expect_success(
        &self,
        endpoint: &str,
        response: Response,
        locator: Option<&Locator>,
    ) -> Result<Response, DriverError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        warn!(endpoint, status = status.as_u16(), "driver request failed");
        if let Some(locator) = locator {
            if status == StatusCode::NOT_FOUND || mentions_missing_element(&body) {
                return Err(DriverError::ElementNotFound {
                    locator: locator.clone(),
                });
            }
        }
        Err(DriverError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn get_source(&self, path: &str) -> Result<String, DriverError> {
        let endpoint = self.endpoint(path);
        let response = self.send(&endpoint, self.client.get(&endpoint))?;
        let response = self.expect_success(&endpoint, response, None)?;
        let parsed: SourceResponse = response.json().map_err(|error| DriverError::Decode {
            endpoint: endpoint.clone(),
            message: error.to_string(),
        })?;
        Ok(parsed.source)
    }

    fn find_do(
        &self,
        uid: &str,
        locator: &Locator,
        action: &str,
        text: &[String],
    ) -> Result<Option<String>, DriverError> {
        let endpoint = self.endpoint("/FindDo/");
        let request = self.client.post(&endpoint).json(&FindDoRequest {
            search: locator.value(),
            by: locator.kind(),
            action,
            text,
            uid,
        });
        let response = self.send(&endpoint, request)?;
        let response = self.expect_success(&endpoint, response, Some(locator))?;

        let body = response.text().map_err(|error| DriverError::Decode {
            endpoint: endpoint.clone(),
            message: error.to_string(),
        })?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|error| DriverError::Decode {
                endpoint,
                message: error.to_string(),
            })?;
        Ok(value
            .get("text")
            .and_then(|text| text.as_str())
            .map(str::to_string))
    }
}

fn mentions_missing_element(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("unable to locate element")
        || lowered.contains("nosuchelement")
        || lowered.contains("no such element")
}

impl DriverService for HttpDriverClient {
    fn navigate(&self, uid: &str, url: &str) -> Result<String, DriverError> {
        let endpoint = self.endpoint("/navigate/");
        let request = self
            .client
            .post(&endpoint)
            .json(&NavigateRequest { url, uid });
        let response = self.send(&endpoint, request)?;
        let response = self.expect_success(&endpoint, response, None)?;
        let parsed: SourceResponse = response.json().map_err(|error| DriverError::Decode {
            endpoint: endpoint.clone(),
            message: error.to_string(),
        })?;
        Ok(parsed.source)
    }

    fn find_element(&self, uid: &str, locator: &Locator) -> Result<ElementHandle, DriverError> {
        self.find_do(uid, locator, ElementAction::Read.wire_name(), &[])?;
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
        let text = match action {
            ElementAction::Fill(lines) => lines.as_slice(),
            ElementAction::Read | ElementAction::Click => &[],
        };
        self.find_do(&element.uid, &element.locator, action.wire_name(), text)
    }

    fn press_key(&self, element: &ElementHandle, key: PressKey) -> Result<(), DriverError> {
        self.find_do(
            &element.uid,
            &element.locator,
            PRESS_KEY_ACTION,
            &[key.name().to_string()],
        )?;
        Ok(())
    }

    fn screenshot(&self, uid: &str) -> Result<Vec<u8>, DriverError> {
        let endpoint = self.endpoint(&format!("/screenshot/{}", uid));
        let response = self.send(&endpoint, self.client.get(&endpoint))?;
        let response = self.expect_success(&endpoint, response, None)?;
        let bytes = response.bytes().map_err(|error| DriverError::Decode {
            endpoint: endpoint.clone(),
            message: error.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    fn page_source(&self, uid: &str) -> Result<String, DriverError> {
        self.get_source(&format!("/source/{}", uid))
    }

    fn readable_text(&self, uid: &str) -> Result<String, DriverError> {
        self.get_source(&format!("/human_source/{}", uid))
    }
}

impl TaggingStore for HttpDriverClient {
    fn append(&self, tag_name: &str, markup: &str) -> Result<(), DriverError> {
        let endpoint = self.endpoint("/update_selected_element/");
        let request = self.client.post(&endpoint).json(&SelectedElementRequest {
            element_html: markup,
            element_name: tag_name,
        });
        let response = self.send(&endpoint, request)?;
        self.expect_success(&endpoint, response, None)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<TaggedElement>, DriverError> {
        let endpoint = self.endpoint("/get_all_selected_elements/");
        let response = self.send(&endpoint, self.client.get(&endpoint))?;
        // The service answers 404 while nothing has been selected yet.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = self.expect_success(&endpoint, response, None)?;
        let parsed: SelectedElementsResponse =
            response.json().map_err(|error| DriverError::Decode {
                endpoint: endpoint.clone(),
                message: error.to_string(),
            })?;
        Ok(parsed
            .elements
            .into_iter()
            .map(|record| TaggedElement::new(record.name.unwrap_or_default(), record.html))
            .collect())
    }

    fn clear(&self) -> Result<(), DriverError> {
        let endpoint = self.endpoint("/clear_selected_elements/");
        let response = self.send(&endpoint, self.client.get(&endpoint))?;
        self.expect_success(&endpoint, response, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn blocking<T: Send + 'static>(task: impl FnOnce() -> T + Send + 'static) -> T {
        tokio::task::spawn_blocking(task)
            .await
            .expect("blocking task should finish")
    }

    fn client(uri: &str) -> HttpDriverClient {
        HttpDriverClient::new(uri, Duration::from_secs(5)).expect("client should build")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn navigate_posts_url_and_uid_and_returns_source() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/navigate/"))
            .and(body_json(json!({"url": "https://example.com", "uid": "default"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"source": "<html/>"})))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let source = blocking(move || client(&uri).navigate("default", "https://example.com"))
            .await
            .expect("navigate should succeed");
        assert_eq!(source, "<html/>");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn act_sends_find_do_payload_and_reads_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/FindDo/"))
            .and(body_json(json!({
                "Search": "//input[@id='q']",
                "By": "xpath",
                "Action": "fill",
                "Text": ["hello"],
                "uid": "default"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/FindDo/"))
            .and(body_json(json!({
                "Search": "//h1",
                "By": "xpath",
                "Action": "",
                "Text": [],
                "uid": "default"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Welcome"})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let (filled, read) = blocking(move || {
            let client = client(&uri);
            let input = ElementHandle {
                uid: "default".to_string(),
                locator: Locator::Xpath("//input[@id='q']".to_string()),
            };
            let heading = ElementHandle {
                uid: "default".to_string(),
                locator: Locator::Xpath("//h1".to_string()),
            };
            (
                client.act(&input, &ElementAction::Fill(vec!["hello".to_string()])),
                client.act(&heading, &ElementAction::Read),
            )
        })
        .await;
        assert_eq!(filled.expect("fill should succeed"), None);
        assert_eq!(read.expect("read should succeed"), Some("Welcome".to_string()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_element_maps_missing_element_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/FindDo/"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string("Message: Unable to locate element: [id=\"login\"]"),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let error = blocking(move || {
            client(&uri).find_element("default", &Locator::Id("login".to_string()))
        })
        .await
        .expect_err("lookup should fail");
        assert!(error.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn other_failures_keep_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/navigate/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("invalid session id"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let error = blocking(move || client(&uri).navigate("default", "https://x.test"))
            .await
            .expect_err("navigate should fail");
        assert_eq!(error.to_string(), "500 - invalid session id");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn press_key_uses_press_key_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/connectors/browser/FindDo/"))
            .and(body_json(json!({
                "Search": "search",
                "By": "id",
                "Action": "press_key",
                "Text": ["enter"],
                "uid": "s1"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        blocking(move || {
            let element = ElementHandle {
                uid: "s1".to_string(),
                locator: Locator::Id("search".to_string()),
            };
            client(&uri).press_key(&element, PressKey::Enter)
        })
        .await
        .expect("press should succeed");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tagging_store_lists_records_and_treats_404_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connectors/browser/get_all_selected_elements/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"name": "login-button", "html": "<button id=\"login\">Go</button>"},
                    {"name": null, "html": "<p>x</p>"}
                ]
            })))
            .mount(&server)
            .await;

        let empty = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connectors/browser/get_all_selected_elements/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&empty)
            .await;

        let uri = server.uri();
        let empty_uri = empty.uri();
        let (records, none) = blocking(move || (client(&uri).list(), client(&empty_uri).list())).await;
        let records = records.expect("list should succeed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tag_name, "login-button");
        assert_eq!(records[1].tag_name, "");
        assert!(none.expect("404 should be empty").is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn screenshot_and_readable_text_use_uid_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/connectors/browser/screenshot/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/connectors/browser/human_source/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"source": "<p>hi</p>"})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let (png, text) = blocking(move || {
            let client = client(&uri);
            (client.screenshot("s1"), client.readable_text("s1"))
        })
        .await;
        assert_eq!(png.expect("screenshot should succeed"), vec![0x89, b'P', b'N', b'G']);
        assert_eq!(text.expect("text should succeed"), "<p>hi</p>");
    }

    #[test]
    fn transport_errors_name_the_endpoint() {
        let client = client("http://127.0.0.1:9/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        let error = client
            .navigate("default", "https://x.test")
            .expect_err("closed port should fail");
        assert!(matches!(error, DriverError::Transport { .. }));
        assert!(error
            .to_string()
            .contains("http://127.0.0.1:9/v1/connectors/browser/navigate/"));
    }
}
