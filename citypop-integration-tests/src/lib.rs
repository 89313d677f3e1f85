#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are
// marked as used. But docs don't generate for the below if they are
// `#[cfg(test)]`. This is a compromise.
#![allow(dead_code)]

//! Tests for Citypop that work by reading from the external API only.
//!
//! Since the URL endpoints Citypop exposes to the world are its public API,
//! and other systems depend on them, the paths and body shapes used in tests
//! here are important details, and used to keep compatibility.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `citypop/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`citypop_test`], which starts a mock
//! server standing in for Elasticsearch, sets up the application for
//! testing, and provides helpers to drive the app. It then calls the test
//! function that is passed to it, providing the above tools as an argument.
//!
//! ```
//! use citypop_integration_tests::{citypop_test, TestingTools};
//!
//! #[actix_rt::test]
//! async fn health_works() {
//!     citypop_test(
//!         |settings| settings.debug = true,
//!         |TestingTools { test_client, es_mock, .. }| async move {
//!             es_mock.mock(|when, then| {
//!                 when.method(httpmock::Method::HEAD).path("/");
//!                 then.status(200);
//!             });
//!
//!             let response = test_client
//!                 .get("/health")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), reqwest::StatusCode::OK);
//!         },
//!     )
//!     .await
//! }
//! ```

mod cities;
mod health;
mod utils;

pub use crate::utils::test_tools::{citypop_test, TestReqwestClient, TestingTools};
