#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for Citypop's public API.

mod cities;
mod errors;
mod health;

pub use errors::HandlerError;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use citypop_settings::Settings;
use citypop_store::CityStore;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Run the web server.
///
/// The returned server is a `Future` that must either be `.await`ed, or run
/// as a background task using `tokio::spawn`.
///
/// The store handle is cloned into every worker; handlers share no other
/// state. Most of the details from `settings` will be respected, except for
/// those that go into building the listener (the host and port). If you want
/// to respect the settings specified in that object, you must include them
/// in the construction of `listener`.
///
/// # Errors
///
/// Returns an error if the server cannot be started on the provided
/// listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an
/// error that causes the server to shut down.
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let settings = citypop_settings::Settings::load()
///     .expect("Failed to load settings");
/// let store = citypop_store::CityStore::new(&settings.elasticsearch)
///     .expect("Failed to configure the city store");
/// let listener = std::net::TcpListener::bind(settings.http.listen)
///     .expect("Failed to bind port");
/// citypop_web::run(listener, store, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    store: CityStore,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let num_workers = settings.http.workers;
    let store = Data::new(store);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            // The core functionality of Citypop
            .service(web::scope("/city").configure(cities::configure))
            // Liveness reporting for the store connection
            .service(web::scope("/health").configure(health::configure))
    })
    .listen(listener)?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    let server = server.run();
    Ok(server)
}
