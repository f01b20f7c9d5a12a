use serde::de::DeserializeOwned;

use crate::{Error, ErrorKind};

/// The HTTP capability used by the metadata sources.
///
/// Implemented for [`reqwest::blocking::Client`], tests substitute a mock client.
pub trait Client {
    /// Performs a GET request on `url` and deserializes the JSON body.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::IO`] error when the request fails or the response status is not a success.
    /// An [`ErrorKind::Deserialize`] error when the body is not the expected JSON.
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned;
}

impl Client for reqwest::blocking::Client {
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        self.get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::wrap(ErrorKind::IO, e))
            .and_then(|r| r.json().map_err(|e| Error::wrap(ErrorKind::Deserialize, e)))
    }
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, requested_urls, MockClient, NetworkErrorProducer, Producer,
};
