//! # Citypop Settings
//!
//! Configuration is specified in several ways, with later methods overriding
//! earlier ones.
//!
//! 1. A base configuration checked into the repository, in
//!    `config/base.yaml`. This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `CITYPOP_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use
//!    for local configuration and secrets if desired.
//! 4. Environment variables that begin with `CITYPOP_` and use `__` as a
//!    level separator. For example, `Settings::http::listen` can be
//!    controlled from the environment variable `CITYPOP_HTTP__LISTEN`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if
//! it exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format
//! supported by the [config] crate can be used, including JSON and TOML. To
//! choose another format, simply use a different extension for your file,
//! like `config/local.toml`.

mod logging;

pub use logging::{LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top level settings object for Citypop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Citypop is running in. Should only be set with the
    /// `CITYPOP_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not
    /// be set to true in production environments.
    pub debug: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for the Elasticsearch backend that stores city documents.
    pub elasticsearch: ElasticsearchSettings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or
    /// "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the Elasticsearch backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElasticsearchSettings {
    /// How to reach the Elasticsearch server.
    pub connection: ElasticsearchConnection,

    /// The index that holds city documents.
    pub index: String,

    /// An upper bound, in seconds, on each request made to Elasticsearch.
    /// If no value is provided, the client's default applies.
    pub request_timeout_secs: Option<u64>,
}

/// A way to connect to an Elasticsearch server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElasticsearchConnection {
    /// A single node, reachable by URL.
    Single {
        /// The URL of the node, including scheme and port.
        url: String,
    },
    /// An Elastic Cloud deployment.
    Cloud {
        /// The cloud ID provided by the Elastic Cloud console.
        cloud_id: String,
    },
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("./config/base"))?;

        // Merge in an environment specific config.
        let citypop_env =
            std::env::var("CITYPOP_ENV").unwrap_or_else(|_| "development".to_string());
        s.set("env", citypop_env)?;
        s.merge(File::with_name(&format!("config/{}", s.get::<String>("env")?)).required(false))?;

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("config/local").required(false))?;

        // Add environment variables that start with "CITYPOP_" and have "__"
        // to separate levels. For example, `CITYPOP_HTTP__LISTEN` maps to
        // `Settings::http::listen`.
        s.merge(Environment::default().prefix("CITYPOP").separator("__"))?;

        s.try_into()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` can adjust the loaded settings before they are returned.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("../config/base"))
            .expect("Could not load base settings");

        // Merge in test specific config.
        s.set("env", "test").expect("Could not set env for tests");
        s.merge(File::with_name("../config/test"))
            .expect("Could not load test settings");

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("../config/local_test").required(false))
            .expect("Could not load local settings for tests");

        let mut settings: Self = s.try_into().expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}
