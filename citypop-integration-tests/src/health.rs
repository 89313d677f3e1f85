#![cfg(test)]
//! Tests for the health endpoint.

use crate::{citypop_test, TestingTools};
use anyhow::Result;
use httpmock::Method::HEAD;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn health_reports_ok_when_the_store_answers() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let ping = es_mock.mock(|when, then| {
                when.method(HEAD).path("/");
                then.status(200);
            });

            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );
            assert_eq!(response.json::<Value>().await?, json!({"status": "OK"}));
            ping.assert();

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_reports_unavailable_when_the_store_errors() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            es_mock.mock(|when, then| {
                when.method(HEAD).path("/");
                then.status(500);
            });

            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"status": "Elasticsearch not reachable"})
            );

            Ok(())
        },
    )
    .await
}
