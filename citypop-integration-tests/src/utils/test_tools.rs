//! Tools for running tests

use citypop_settings::{ElasticsearchConnection, Settings};
use citypop_store::CityStore;
use httpmock::MockServer;
use reqwest::{redirect, Client, ClientBuilder, RequestBuilder};
use std::{future::Future, net::TcpListener};

/// Run a test with a fully configured Citypop server.
///
/// The server will listen on a port assigned arbitrarily by the OS, and talk
/// to an HTTP mock server standing in for Elasticsearch. No mock responses
/// are registered; each test adds the ones it needs.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to
/// use the test server, and the Elasticsearch mock server handle.
///
/// # Example
///
/// ```
/// # use citypop_integration_tests::{citypop_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     citypop_test(
///         |settings| settings.debug = false,
///         |TestingTools { test_client, es_mock, .. }| async move {
///             assert!(true) // Test goes here
///         },
///     )
///     .await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn citypop_test<FSettings, FTest, Fut>(settings_changer: FSettings, test: FTest) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: Fn(TestingTools) -> Fut,
    Fut: Future,
{
    // Load settings
    let mut settings = Settings::load_for_tests(|_| ());

    // Set up a mock server to stand in for Elasticsearch
    let es_mock = MockServer::start();
    settings.elasticsearch.connection = ElasticsearchConnection::Single {
        url: es_mock.base_url(),
    };

    settings_changer(&mut settings);

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener.local_addr().unwrap().to_string();
    let store =
        CityStore::new(&settings.elasticsearch).expect("Failed to configure the city store");
    let server = citypop_web::run(listener, store, settings).expect("Failed to start server");
    let server_handle = tokio::spawn(server);
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        es_mock,
    };
    // Run the test
    let rv = test(tools).await;
    server_handle.abort();
    rv
}

/// A set of tools for tests, including the mock store server and a test
/// client.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry,
/// even if all present items are named. This makes adding tools in the
/// future easier, since old tests won't need to be rewritten to account for
/// the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::Client` that automatically uses the
    /// Citypop server under test.
    pub test_client: TestReqwestClient,

    /// A [`httpmock::MockServer`] that the server's Elasticsearch client has
    /// been configured to use. Does not contain mock responses, any needed
    /// must be added.
    pub es_mock: MockServer,
}

/// A wrapper around a [`reqwest::Client`] that automatically sends requests
/// to the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request
    /// given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Start building a GET request to the test server with the path
    /// specified.
    ///
    /// The path should start with `/`, such as `/health`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    /// Start building a POST request to the test server with the path
    /// specified.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Start building a PUT request to the test server with the path
    /// specified.
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    /// Expand a path into a full URL on the test server.
    fn url(&self, path: &str) -> String {
        assert!(path.starts_with('/'));
        format!("http://{}{}", &self.address, path)
    }
}
