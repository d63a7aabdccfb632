use anyhow::{Context, Error};
use bytes::Bytes;
use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Response;
use reqwest_tracing::TracingMiddleware;
use std::collections::HashMap;
use thiserror::Error as ThisError;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

lazy_static! {
    static ref CLIENT: ClientWithMiddleware = {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        ClientBuilder::new(reqwest::Client::new())
            // Retry failed requests.
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(TracingMiddleware::default())
            .build()
    };
}

pub struct HttpClient;

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    #[error(transparent)]
    ResponseError(#[from] Error),
    #[error("httpBuilderError {0}")]
    HTTPBuilderError(String),
    /// The remote answered with a non-success status. `message` is the text the
    /// service reported, kept as-is so callers can show it to the user.
    #[error("{message}")]
    StatusError { status: u16, message: String },
}

impl HttpClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpClientError::StatusError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

struct HeadersMapGenerator(HeaderMap);

impl HeadersMapGenerator {
    fn into_inner(self) -> HeaderMap {
        self.0
    }
}

impl TryFrom<HashMap<&'static str, String>> for HeadersMapGenerator {
    type Error = HttpClientError;

    fn try_from(value: HashMap<&'static str, String>) -> Result<Self, Self::Error> {
        let mut header_map = HeaderMap::new();

        for (key, value) in value.into_iter() {
            let value = HeaderValue::from_str(&value)
                .map_err(|err| HttpClientError::HTTPBuilderError(format!("{err} {key}")))?;
            header_map.insert(key, value);
        }
        Ok(Self(header_map))
    }
}

/// Pulls the human readable part out of an error body. Backends in use answer
/// with `{"message": ..}`, `{"msg": ..}` or `{"error": ..}`; anything else is
/// returned trimmed.
fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        msg: Option<String>,
        error: Option<Value>,
    }

    let parsed = serde_json::from_str::<ErrorBody>(body).ok().and_then(|body| {
        body.message.or(body.msg).or_else(|| match body.error {
            Some(Value::String(error)) => Some(error),
            _ => None,
        })
    });

    parsed.or_else(|| {
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Query strings carry access tokens, so messages only show the rest.
fn redacted(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url
}

fn transport_error(err: reqwest_middleware::Error) -> Error {
    match err {
        reqwest_middleware::Error::Reqwest(err) => Error::from(err.without_url()),
        reqwest_middleware::Error::Middleware(err) => err,
    }
}

impl HttpClient {
    async fn send(request: RequestBuilder) -> Result<Response, HttpClientError> {
        let response = request
            .send()
            .await
            .map_err(transport_error)
            .context("Failed to send request")
            .map_err(HttpClientError::ResponseError)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(HttpClientError::StatusError {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {status}")),
        })
    }

    fn with_headers(
        request: RequestBuilder,
        headers: HashMap<&'static str, String>,
    ) -> Result<RequestBuilder, HttpClientError> {
        let generator = HeadersMapGenerator::try_from(headers)?;
        Ok(request.headers(generator.into_inner()))
    }

    async fn parse_json<DTO: DeserializeOwned>(response: Response) -> Result<DTO, HttpClientError> {
        response
            .json::<DTO>()
            .await
            .context("Failed to deserialize response")
            .map_err(HttpClientError::ResponseError)
    }

    pub async fn get_json<DTO: DeserializeOwned>(url: Url) -> anyhow::Result<DTO> {
        let shown = redacted(&url);
        let response = Self::send(CLIENT.get(url))
            .await
            .with_context(|| format!("Failed to fetch request from {shown}"))?;
        let response = response.json::<DTO>().await.map_err(|err| err.without_url());
        response.with_context(|| format!("Failed to deserialize response from {shown}"))
    }

    pub async fn get_with_headers<DTO: DeserializeOwned>(
        url: Url,
        headers: HashMap<&'static str, String>,
    ) -> Result<DTO, HttpClientError> {
        let request = Self::with_headers(CLIENT.get(url), headers)?;
        let response = Self::send(request).await?;
        Self::parse_json(response).await
    }

    pub async fn post_json<DTO: DeserializeOwned>(
        url: Url,
        headers: HashMap<&'static str, String>,
        body: Value,
    ) -> Result<DTO, HttpClientError> {
        let body = serde_json::to_vec(&body)
            .context("Failed to serialize request body")
            .map_err(HttpClientError::ResponseError)?;
        let request = Self::with_headers(CLIENT.post(url), headers)?
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = Self::send(request).await?;
        Self::parse_json(response).await
    }

    pub async fn patch_json(
        url: Url,
        headers: HashMap<&'static str, String>,
        body: Value,
    ) -> Result<(), HttpClientError> {
        let body = serde_json::to_vec(&body)
            .context("Failed to serialize request body")
            .map_err(HttpClientError::ResponseError)?;
        let request = Self::with_headers(CLIENT.patch(url), headers)?
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        Self::send(request).await.map(|_| ())
    }

    pub async fn delete(
        url: Url,
        headers: HashMap<&'static str, String>,
    ) -> Result<(), HttpClientError> {
        let request = Self::with_headers(CLIENT.delete(url), headers)?;
        Self::send(request).await.map(|_| ())
    }

    pub async fn post_bytes(
        url: Url,
        headers: HashMap<&'static str, String>,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), HttpClientError> {
        let request = Self::with_headers(CLIENT.post(url), headers)?
            .header(CONTENT_TYPE, content_type.to_owned())
            .body(body);
        Self::send(request).await.map(|_| ())
    }
}
