use std::time::Duration;

use crate::{
    source::{GOOGLE_BOOKS_URL, OPENBD_URL},
    Error, ErrorKind,
};

/// Default limit for a single request to a metadata source.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings injected into the metadata lookup at start up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Endpoint of the Google Books volumes API.
    pub google_books_url: String,
    /// Endpoint of the OpenBD API.
    pub openbd_url: String,
    /// Limit applied to each request, a lookup may take up to twice as long.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_books_url: GOOGLE_BOOKS_URL.to_owned(),
            openbd_url: OPENBD_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Builds the HTTP client shared by the sources.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::IO`] error when the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::blocking::Client, Error> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::wrap(ErrorKind::IO, e))
    }
}

#[test]
fn default_config_uses_public_endpoints() {
    let config = Config::default();

    assert_eq!("https://www.googleapis.com/books/v1/volumes", config.google_books_url);
    assert_eq!("https://api.openbd.jp/v1/get", config.openbd_url);
    assert_eq!(Duration::from_secs(10), config.timeout);
}
