#![cfg(test)]
//! Tests for the city upsert and fetch endpoints.

use crate::{citypop_test, TestingTools};
use anyhow::Result;
use httpmock::Method::{GET, PUT};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn upsert_then_fetch_round_trips() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let write = es_mock.mock(|when, then| {
                when.method(PUT)
                    .path("/cities/_doc/Paris")
                    .json_body(json!({"city": "Paris", "population": 2_148_000}));
                then.status(201)
                    .header("content-type", "application/json")
                    .json_body(json!({"_index": "cities", "_id": "Paris", "result": "created"}));
            });
            let read = es_mock.mock(|when, then| {
                when.method(GET).path("/cities/_doc/Paris");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "_index": "cities",
                        "_id": "Paris",
                        "found": true,
                        "_source": {"city": "Paris", "population": 2_148_000},
                    }));
            });

            let response = test_client
                .post("/city")
                .json(&json!({"_source": {"city": "Paris", "population": 2_148_000}}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );
            assert_eq!(
                response.json::<Value>().await?,
                json!({"message": "Paris added/updated successfully"})
            );
            write.assert();

            let response = test_client.get("/city/Paris").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"_source": {"city": "Paris", "population": 2_148_000}})
            );
            read.assert();

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn upsert_overwrites_with_the_latest_population() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            // Both writes land on the same document ID; the body tells the
            // two mocks apart.
            let first_write = es_mock.mock(|when, then| {
                when.method(PUT)
                    .path("/cities/_doc/Lagos")
                    .json_body(json!({"city": "Lagos", "population": 100}));
                then.status(201)
                    .json_body(json!({"result": "created"}));
            });
            let second_write = es_mock.mock(|when, then| {
                when.method(PUT)
                    .path("/cities/_doc/Lagos")
                    .json_body(json!({"city": "Lagos", "population": 200}));
                then.status(200)
                    .json_body(json!({"result": "updated"}));
            });
            let read = es_mock.mock(|when, then| {
                when.method(GET).path("/cities/_doc/Lagos");
                then.status(200).json_body(json!({
                    "found": true,
                    "_source": {"city": "Lagos", "population": 200},
                }));
            });

            let response = test_client
                .post("/city")
                .json(&json!({"_source": {"city": "Lagos", "population": 100}}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            let response = test_client
                .put("/city")
                .json(&json!({"_source": {"city": "Lagos", "population": 200}}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            first_write.assert();
            second_write.assert();

            let response = test_client.get("/city/Lagos").send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"_source": {"city": "Lagos", "population": 200}})
            );
            read.assert();

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn upsert_rejects_malformed_payloads() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let write = es_mock.mock(|when, then| {
                when.path_contains("/cities/");
                then.status(201);
            });

            let response = test_client
                .post("/city")
                .header("content-type", "application/json")
                .body("{not json")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"error": "Invalid request payload"})
            );

            // Structurally valid JSON with a mistyped field is also
            // malformed.
            let response = test_client
                .post("/city")
                .json(&json!({"_source": {"city": "Lyon", "population": "lots"}}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"error": "Invalid request payload"})
            );

            write.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn upsert_rejects_incomplete_records() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let write = es_mock.mock(|when, then| {
                when.path_contains("/cities/");
                then.status(201);
            });

            for body in [
                json!({"_source": {"city": "", "population": 1000}}),
                json!({"_source": {"city": "Nice", "population": 0}}),
                json!({"_source": {"city": "Nice"}}),
                json!({}),
            ] {
                let response = test_client.post("/city").json(&body).send().await?;
                assert_eq!(response.status(), StatusCode::BAD_REQUEST);
                assert_eq!(
                    response.json::<Value>().await?,
                    json!({"error": "City and population must be provided"})
                );
            }

            write.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn upsert_reports_write_failures() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            es_mock.mock(|when, then| {
                when.method(PUT).path("/cities/_doc/Osaka");
                then.status(500)
                    .json_body(json!({"error": {"reason": "index is read only"}}));
            });

            let response = test_client
                .post("/city")
                .json(&json!({"_source": {"city": "Osaka", "population": 2_691_000}}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"error": "Failed to add/update city"})
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn fetch_of_an_unknown_city_is_not_found() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            es_mock.mock(|when, then| {
                when.method(GET).path("/cities/_doc/Atlantis");
                then.status(404)
                    .json_body(json!({"_index": "cities", "_id": "Atlantis", "found": false}));
            });

            let response = test_client.get("/city/Atlantis").send().await?;

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"error": "City not found"})
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn fetch_conflates_store_failures_to_not_found() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            // An error response from the store...
            es_mock.mock(|when, then| {
                when.method(GET).path("/cities/_doc/Sparta");
                then.status(500)
                    .json_body(json!({"error": {"reason": "shard failure"}}));
            });
            // ...and a document that cannot be decoded...
            es_mock.mock(|when, then| {
                when.method(GET).path("/cities/_doc/Thebes");
                then.status(200).body("not a document");
            });

            // ...both look like a missing city from the outside.
            for name in ["Sparta", "Thebes"] {
                let response = test_client.get(&format!("/city/{name}")).send().await?;
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
                assert_eq!(
                    response.json::<Value>().await?,
                    json!({"error": "City not found"})
                );
            }

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn fetch_with_an_empty_name_is_rejected() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let read = es_mock.mock(|when, then| {
                when.path_contains("/cities/");
                then.status(200);
            });

            let response = test_client.get("/city/").send().await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"error": "City name must be provided"})
            );
            read.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn names_with_quotes_round_trip() -> Result<()> {
    citypop_test(
        |_| (),
        |TestingTools {
             test_client,
             es_mock,
             ..
         }| async move {
            let name = r#"Citi"nator"#;

            let write = es_mock.mock(|when, then| {
                when.method(PUT)
                    .path_contains("/cities/_doc/Citi")
                    .json_body(json!({"city": name, "population": 1234}));
                then.status(201).json_body(json!({"result": "created"}));
            });
            let read = es_mock.mock(|when, then| {
                when.method(GET).path_contains("/cities/_doc/Citi");
                then.status(200).json_body(json!({
                    "found": true,
                    "_source": {"city": name, "population": 1234},
                }));
            });

            let response = test_client
                .post("/city")
                .json(&json!({"_source": {"city": name, "population": 1234}}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"message": format!("{name} added/updated successfully")})
            );
            write.assert();

            // The quote has to be escaped in the request path.
            let response = test_client.get("/city/Citi%22nator").send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.json::<Value>().await?,
                json!({"_source": {"city": name, "population": 1234}})
            );
            read.assert();

            Ok(())
        },
    )
    .await
}
