//! Request builder, response parser and blocking fetch for the content API.
//!
//! # Design
//! `MicroCmsClient` holds an immutable `ClientConfig` and a `Transport`. A
//! fetch is split into `build_get`, which produces an `HttpRequest`, and
//! `parse_response`, which consumes an `HttpResponse`. `get` chains the two
//! around one `Transport::execute` call. Both halves are public so callers
//! can drive the round trip themselves.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::GetParams;

pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const GLOBAL_DRAFT_KEY_HEADER: &str = "X-GLOBAL-DRAFT-KEY";

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Synchronous client for the microCMS content API.
///
/// Configuration is read-only after construction, so a client can be shared
/// across threads whenever its transport can.
#[derive(Debug, Clone)]
pub struct MicroCmsClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl MicroCmsClient<UreqTransport> {
    /// Validate `config` and create a client backed by ureq.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> MicroCmsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build `{base}/{endpoint}[/{content_id}]` with the credential headers.
    ///
    /// Endpoint and content id are each percent-encoded as one path segment.
    /// No I/O happens here. Fails when the endpoint is empty or a configured
    /// key cannot be sent as a header value.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        content_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        let endpoint = endpoint.trim_matches('/');
        if endpoint.is_empty() {
            return Err(ApiError::invalid_request("endpoint cannot be empty"));
        }

        let mut url = format!(
            "{}/{}",
            self.config.api_base_url(),
            utf8_percent_encode(endpoint, PATH_SEGMENT)
        );
        if !content_id.is_empty() {
            url.push('/');
            url.extend(utf8_percent_encode(content_id, PATH_SEGMENT));
        }

        let mut headers = vec![(
            API_KEY_HEADER.to_string(),
            header_value(API_KEY_HEADER, &self.config.api_key)?,
        )];
        let has_draft_key = !self.config.global_draft_key.is_empty();
        if has_draft_key {
            headers.push((
                GLOBAL_DRAFT_KEY_HEADER.to_string(),
                header_value(GLOBAL_DRAFT_KEY_HEADER, &self.config.global_draft_key)?,
            ));
        }

        debug!(method = method.as_str(), %url, draft = has_draft_key, "built request");
        Ok(HttpRequest {
            method,
            url,
            headers,
            body: None,
        })
    }

    pub fn build_get(&self, endpoint: &str, params: &GetParams) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Get, endpoint, &params.content_id)
    }

    /// Check the status and decode the body into `D`.
    pub fn parse_response<D: DeserializeOwned>(&self, response: HttpResponse) -> Result<D, ApiError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Fetch `endpoint` (or one item of it) and decode the body into `D`.
    pub fn get<D: DeserializeOwned>(&self, endpoint: &str, params: &GetParams) -> Result<D, ApiError> {
        let request = self.build_get(endpoint, params)?;
        let response = self.transport.execute(&request)?;
        self.parse_response(response)
    }

    /// `get` into an untyped JSON document.
    pub fn get_value(&self, endpoint: &str, params: &GetParams) -> Result<Value, ApiError> {
        self.get(endpoint, params)
    }
}

fn header_value(name: &str, value: &str) -> Result<String, ApiError> {
    if value.chars().any(|c| (c.is_control() && c != '\t') || !c.is_ascii()) {
        return Err(ApiError::invalid_request(format!(
            "{name} contains characters not allowed in a header value"
        )));
    }
    Ok(value.to_string())
}

/// Map non-2xx status codes to the matching `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "content API returned an error status");
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// The service reports failures as `{"message": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
