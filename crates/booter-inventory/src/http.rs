//! Shared HTTP plumbing for the inventory clients

use booter_bootparams::InventoryError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{ConfigError, Result};

/// User agent sent to both services
pub const USER_AGENT: &str = concat!("booter/", env!("CARGO_PKG_VERSION"));

/// Authenticated JSON client for one inventory service
#[derive(Clone)]
pub(crate) struct ApiClient {
    service: &'static str,
    base_url: String,
    username: String,
    password: String,
    http: Client,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub(crate) fn new(
        service: &'static str,
        config: &ServiceConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| ConfigError::Client {
                api: service,
                source,
            })?;

        Ok(Self {
            service,
            base_url: config.url.as_str().trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            http,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path starting with '/'
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.post(self.url(path)))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request, mapping connection failures
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<Response, InventoryError> {
        let response = request.send().await.map_err(|e| InventoryError::Transport {
            service: self.service,
            message: e.to_string(),
        })?;
        debug!(
            service = self.service,
            url = %response.url(),
            status = %response.status(),
            "Inventory response"
        );
        Ok(response)
    }

    /// Decode a JSON body, or turn a non-success status into an error
    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> std::result::Result<T, InventoryError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| InventoryError::Transport {
            service: self.service,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(api_error(self.service, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| InventoryError::Decode {
            service: self.service,
            message: e.to_string(),
        })
    }
}

/// Percent-encode a value as exactly one URL path segment
///
/// Empty and dot segments are refused; URL parsing would collapse them
/// even when encoded.
pub(crate) fn path_segment(
    service: &'static str,
    value: &str,
) -> std::result::Result<String, InventoryError> {
    if matches!(value, "" | "." | "..") {
        return Err(InventoryError::InvalidSegment {
            service,
            value: value.to_string(),
        });
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Error for a non-success response
///
/// Uses the `message` field of a JSON error body when there is one.
pub(crate) fn api_error(service: &'static str, status: StatusCode, body: &str) -> InventoryError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };

    InventoryError::Api {
        service,
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ServiceConfig {
        ServiceConfig::new("napi", url, "admin", "secret").unwrap()
    }

    #[test]
    fn test_url_building() {
        let client =
            ApiClient::new("napi", &config("http://10.99.99.10/"), Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://10.99.99.10");
        assert_eq!(client.url("/nics/001a2b3c4d5e"), "http://10.99.99.10/nics/001a2b3c4d5e");

        let client = ApiClient::new(
            "napi",
            &config("http://napi.local:8080/api"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.url("/nics"), "http://napi.local:8080/api/nics");
    }

    #[test]
    fn test_debug_hides_password() {
        let client =
            ApiClient::new("napi", &config("http://10.99.99.10"), Duration::from_secs(1)).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("10.99.99.10"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("napi", "001a2b3c4d5e").unwrap(), "001a2b3c4d5e");
        assert_eq!(
            path_segment("napi", "../../admin/secrets?x=1").unwrap(),
            "..%2F..%2Fadmin%2Fsecrets%3Fx%3D1"
        );
        assert_eq!(path_segment("cnapi", "a b#c").unwrap(), "a%20b%23c");

        for value in ["", ".", ".."] {
            let err = path_segment("cnapi", value).unwrap_err();
            assert!(matches!(err, InventoryError::InvalidSegment { service: "cnapi", .. }));
        }
    }

    #[test]
    fn test_api_error_with_json_message() {
        let err = api_error(
            "napi",
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":"InvalidParameters","message":"Invalid parameters"}"#,
        );
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "napi returned 422: Invalid parameters");
    }

    #[test]
    fn test_api_error_with_plain_body() {
        let err = api_error("cnapi", StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.to_string(), "cnapi returned 502: upstream down");
    }

    #[test]
    fn test_api_error_with_empty_body() {
        let err = api_error("cnapi", StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.to_string(), "cnapi returned 503: Service Unavailable");
    }
}
