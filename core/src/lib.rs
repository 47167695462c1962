//! Synchronous client core for the microCMS content API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values for
//! `https://{service}.microcms.io/api/v1/{endpoint}[/{id}]`, executes them
//! through a blocking `Transport`, and decodes the JSON body into
//! `serde_json::Value` or any caller type.
//!
//! # Design
//! - `ClientConfig` is built once and never mutated by the client.
//! - Request building and response parsing are pure; the round trip is the
//!   only I/O and lives behind `Transport` (`UreqTransport` by default).
//! - Non-2xx responses become typed `ApiError`s instead of decoded values.
//!
//! ```no_run
//! use microcms_core::{ClientConfig, GetParams, MicroCmsClient};
//!
//! let config = ClientConfig::new("foo", "key123").with_global_draft_key("draft1");
//! let client = MicroCmsClient::new(config)?;
//! let article = client.get_value("articles", &GetParams::new().content_id("abc"))?;
//! println!("{}", article["title"]);
//! # Ok::<(), microcms_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{MicroCmsClient, API_KEY_HEADER, GLOBAL_DRAFT_KEY_HEADER};
pub use config::{ClientConfig, API_VERSION, BASE_DOMAIN};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{ContentList, GetParams};
