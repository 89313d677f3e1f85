//! A thin client for the Elasticsearch index that holds city documents.
//! Customized specifically for our use case: one index, documents keyed by
//! city name.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use elasticsearch::{
    http::transport::{CloudConnectionPool, SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch, GetParts, IndexParts,
};

use citypop_settings::{ElasticsearchConnection, ElasticsearchSettings};

use crate::{CityEnvelope, CityRecord};

/// A handle on the Elasticsearch index that stores city documents.
///
/// Cloning is cheap and every clone talks to the same server, so a single
/// store can be shared between concurrent request handlers.
#[derive(Clone)]
pub struct CityStore {
    /// The ES client this store uses.
    client: Elasticsearch,
    /// The search index this store targets.
    index_name: String,
}

impl CityStore {
    /// Create a new CityStore that connects to the server and targets the
    /// index specified in `es_settings`.
    ///
    /// # Errors
    /// If the settings to connect to Elasticsearch are not valid, the
    /// creation process may fail.
    pub fn new(es_settings: &ElasticsearchSettings) -> Result<Self> {
        let mut transport_builder = match &es_settings.connection {
            ElasticsearchConnection::Single { url } => {
                TransportBuilder::new(SingleNodeConnectionPool::new(
                    elasticsearch::http::Url::parse(url)
                        .context("Could not parse Elasticsearch URL")?,
                ))
            }
            ElasticsearchConnection::Cloud { cloud_id } => TransportBuilder::new(
                CloudConnectionPool::new(cloud_id)
                    .context("Could not create Elasticsearch cloud connection")?,
            ),
        };

        if let Some(secs) = es_settings.request_timeout_secs {
            transport_builder = transport_builder.timeout(Duration::from_secs(secs));
        }

        let transport = transport_builder
            .build()
            .context("misconfigured elasticsearch")?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            index_name: es_settings.index.clone(),
        })
    }

    /// Check that the server is reachable and answering.
    ///
    /// # Errors
    /// If the server cannot be reached, or answers with a non-success
    /// status.
    pub async fn ping(&self) -> Result<()> {
        let res = self
            .client
            .ping()
            .send()
            .await
            .context("elasticsearch ping request")?;

        let status = res.status_code();
        if status.is_success() {
            Ok(())
        } else {
            bail!(
                "Unexpected status code {} from elasticsearch ping",
                status.as_u16()
            )
        }
    }

    /// Fetch the document for the named city.
    ///
    /// # Errors
    /// If there is an HTTP error communicating with ES, if ES answers with a
    /// non-success status (including 404 for a missing document), or if the
    /// response body cannot be decoded. Each case carries its own context so
    /// callers that conflate them can still log the difference.
    pub async fn city_get(&self, name: &str) -> Result<CityEnvelope> {
        let res = self
            .client
            .get(GetParts::IndexId(&self.index_name, name))
            .send()
            .await
            .context(format!("city_get({name}) request"))?;

        let status = res.status_code();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .context("Fetching text of get response")?;
            bail!(
                "Unexpected status code {} from city_get({name}). Error: {body}",
                status.as_u16()
            );
        }

        res.json::<CityEnvelope>()
            .await
            .context(format!("Decoding city_get({name}) response"))
    }

    /// Add or replace the document for a city, keyed by its name. A second
    /// write with the same name fully replaces the first.
    ///
    /// # Errors
    /// If there is an HTTP error communicating with ES, or if ES answers
    /// with a non-success status.
    pub async fn city_put(&self, record: &CityRecord) -> Result<()> {
        let res = self
            .client
            .index(IndexParts::IndexId(&self.index_name, &record.name))
            .body(record)
            .send()
            .await
            .context(format!("city_put({}) request", record.name))?;

        let status = res.status_code();
        if status.is_success() {
            Ok(())
        } else {
            let body = res
                .text()
                .await
                .context("Fetching text of index response")?;
            bail!(
                "Unexpected status code {} from city_put({}). Error: {body}",
                status.as_u16(),
                record.name
            )
        }
    }
}
