// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taller_app::{FetchError, QueryParams, RecordSource, ViewKind};
use tracing::{debug, error, warn};
use url::Url;

/// Blocking client for the shop's REST backend.
///
/// Every response is wrapped in `{ "success": bool, "data": ..., "message": ... }`.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?} -- fix the URL and retry",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Confirms the backend answers a listing request.
    pub fn ping(&self) -> Result<()> {
        let resource = ViewKind::PurchaseOrders.resource();
        self.fetch::<serde_json::Value>(resource, &QueryParams::new())
            .with_context(|| format!("check backend at {}", self.base_url))?;
        Ok(())
    }

    fn endpoint(&self, resource: &str, query: &QueryParams) -> Result<Url, FetchError> {
        let joined = format!("{}/{}", self.base_url, resource.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|error| FetchError::Connection(format!("invalid URL {joined:?}: {error}")))?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn mutate(&self, request: RequestBuilder) -> Result<(), FetchError> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|error| FetchError::Decode(format!("read response body: {error}")))?;
        if !status.is_success() {
            let failure = clean_error_response(status, &body);
            error!(%failure, "mutation failed");
            return Err(failure);
        }

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|error| FetchError::Decode(format!("decode response envelope: {error}")))?;
        if !envelope.success {
            let failure = rejected(envelope.message);
            error!(%failure, "mutation rejected");
            return Err(failure);
        }
        Ok(())
    }
}

impl RecordSource for Client {
    fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &QueryParams,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.endpoint(resource, query)?;
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| FetchError::Decode(format!("read response body: {error}")))?;
        if !status.is_success() {
            let failure = clean_error_response(status, &body);
            warn!(resource, %failure, "list request failed");
            return Err(failure);
        }

        let envelope: Envelope<Vec<T>> = serde_json::from_str(&body)
            .map_err(|error| FetchError::Decode(format!("decode {resource} response: {error}")))?;
        if !envelope.success {
            return Err(rejected(envelope.message));
        }
        let records = envelope.data.unwrap_or_default();
        debug!(resource, count = records.len(), "list request finished");
        Ok(records)
    }

    fn create<B: Serialize>(&self, resource: &str, body: &B) -> Result<(), FetchError> {
        let url = self.endpoint(resource, &QueryParams::new())?;
        debug!(%url, "POST");
        self.mutate(self.http.post(url).json(body))
    }

    fn update<B: Serialize>(&self, resource: &str, id: i64, body: &B) -> Result<(), FetchError> {
        let url = self.endpoint(&format!("{resource}/{id}"), &QueryParams::new())?;
        debug!(%url, "PUT");
        self.mutate(self.http.put(url).json(body))
    }

    fn delete(&self, resource: &str, id: i64) -> Result<(), FetchError> {
        let url = self.endpoint(&format!("{resource}/{id}"), &QueryParams::new())?;
        debug!(%url, "DELETE");
        self.mutate(self.http.delete(url))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> FetchError {
    let hint = if error.is_timeout() {
        "request timed out -- raise api.timeout or check the server"
    } else {
        "is the backend running?"
    };
    FetchError::Connection(format!("{base_url} -- {hint} ({error})"))
}

fn clean_error_response(status: StatusCode, body: &str) -> FetchError {
    let from_envelope = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.trim().is_empty());
    let message = match from_envelope {
        Some(message) => message,
        None if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() => {
            body.trim().to_owned()
        }
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned(),
    };
    FetchError::Status {
        status: status.as_u16(),
        message,
    }
}

fn rejected(message: Option<String>) -> FetchError {
    FetchError::Rejected(
        message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "request was not accepted".to_owned()),
    )
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response};
    use reqwest::StatusCode;
    use std::time::Duration;
    use taller_app::{FetchError, QueryParams};

    #[test]
    fn new_rejects_unusable_base_urls() {
        assert!(Client::new("", Duration::from_secs(1)).is_err());
        assert!(Client::new("localhost:3000", Duration::from_secs(1)).is_err());
        let error = Client::new("ftp://taller", Duration::from_secs(1))
            .expect_err("ftp is not supported");
        assert!(error.to_string().contains("http or https"));
    }

    #[test]
    fn endpoint_appends_only_non_empty_params() {
        let client =
            Client::new("http://localhost:3000/", Duration::from_secs(1)).expect("valid client");
        let query = QueryParams::new()
            .with("estado", "pendiente")
            .with("busqueda", "");
        let url = client
            .endpoint("/api/compras/ordenes", &query)
            .expect("valid endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/compras/ordenes?estado=pendiente"
        );

        let bare = client
            .endpoint("/api/equipos", &QueryParams::new())
            .expect("valid endpoint");
        assert_eq!(bare.as_str(), "http://localhost:3000/api/equipos");
    }

    #[test]
    fn error_messages_prefer_the_envelope() {
        assert_eq!(
            clean_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"success":false,"message":"error interno"}"#
            ),
            FetchError::Status {
                status: 500,
                message: "error interno".to_owned(),
            }
        );
        assert_eq!(
            clean_error_response(StatusCode::BAD_GATEWAY, "upstream down"),
            FetchError::Status {
                status: 502,
                message: "upstream down".to_owned(),
            }
        );
        assert_eq!(
            clean_error_response(StatusCode::NOT_FOUND, r#"{"weird":true}"#),
            FetchError::Status {
                status: 404,
                message: "Not Found".to_owned(),
            }
        );
    }
}
