//! HTTP transport for remote list resources.

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::FetchError;

/// Thin GET-only client. One attempt per call: no retries, no auth headers,
/// no configured timeout.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Default)]
pub struct HttpClient {
  client: Client,
}

impl HttpClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fetch `locator` and decode its JSON body as a list of records.
  ///
  /// A non-success status and a transport failure both map to
  /// [`FetchError::Network`]; an unparseable body maps to
  /// [`FetchError::Decode`]. Callers fall back identically for all three.
  pub async fn fetch_list<T: DeserializeOwned>(&self, locator: &str) -> Result<Vec<T>, FetchError> {
    let url = Url::parse(locator)
      .map_err(|e| FetchError::Network(format!("invalid url {}: {}", locator, e)))?;

    let response = self.client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Network(format!(
        "request to {} failed with status {}",
        locator, status
      )));
    }

    let body = response.text().await?;
    let data = serde_json::from_str(&body)?;

    Ok(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_invalid_url_is_a_network_error() {
    let client = HttpClient::new();

    let result = client.fetch_list::<serde_json::Value>("not a url").await;

    assert!(matches!(result, Err(FetchError::Network(_))));
  }
}
