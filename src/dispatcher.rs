use super::draft::{Method, RequestDraft};
use super::errors::ProbeError;
use super::helpers::{header_text_to_map, HeaderMap};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{self, HeaderName, HeaderValue};
use serde_json::Value;
#[cfg(test)]
use mockall::automock;

/// One fully built request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: header::HeaderMap,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    /// `access-control-*` response headers, in response order.
    pub cors: Vec<(String, String)>,
    pub body: Value,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport {
    async fn execute(&self, request: OutboundRequest) -> Result<Reply, ProbeError>;
}

/// Builds the request for `draft` without touching the network.
///
/// Headers come from the draft's header text on top of a default
/// `Content-Type: application/json`. GET never carries a body; every other
/// method sends the body text re-serialized from JSON, `null` when the text is
/// empty. Whitespace alone is not JSON and is rejected.
pub fn build_request(draft: &RequestDraft) -> Result<OutboundRequest, ProbeError> {
    let headers = wire_headers(&header_text_to_map(&draft.headers_text))?;
    let body = if draft.method.carries_body() {
        Some(json_body(&draft.body_text)?)
    } else {
        None
    };

    Ok(OutboundRequest {
        method: draft.method,
        url: draft.url.trim().to_string(),
        headers,
        body,
    })
}

fn wire_headers(fields: &HeaderMap) -> Result<header::HeaderMap, ProbeError> {
    debug!("{} header(s) from the form", fields.len());
    let mut headers = header::HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in fields.iter() {
        let wire_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ProbeError::HeaderParse(format!("`{}`: {}", name, e)))?;
        let wire_value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| ProbeError::HeaderParse(format!("`{}`: {}", name, e)))?;
        // insert, not append: the caller's value replaces the default
        headers.insert(wire_name, wire_value);
    }
    Ok(headers)
}

fn json_body(text: &str) -> Result<String, ProbeError> {
    if text.is_empty() {
        return Ok(Value::Null.to_string());
    }
    let value: Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string(&value)?)
}

fn cors_headers(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("access-control-"))
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<non-ascii>");
            (name.as_str().to_string(), value.to_string())
        })
        .collect()
}

pub struct Dispatcher {
    pub client: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        let client = reqwest::Client::new();
        Dispatcher { client }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for Dispatcher {
    async fn execute(&self, request: OutboundRequest) -> Result<Reply, ProbeError> {
        info!("Sending {} {}", request.method, request.url);
        debug!("Request headers: {:?}", request.headers);

        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            debug!("Request body: {}", body);
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let cors = cors_headers(resp.headers());
        let body = resp.json::<Value>().await?;

        Ok(Reply { status, cors, body })
    }
}
