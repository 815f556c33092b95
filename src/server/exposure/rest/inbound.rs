//! Inbound request snapshot
//!
//! The body is read fully once and kept as `Bytes`, so every transport (and
//! any later stage) can read it again without touching the connection.

use crate::core::error::{GatewayResult, RequestError};
use axum::RequestPartsExt;
use axum::body::{Body, Bytes};
use axum::extract::{MatchedPath, RawPathParams, Request};
use axum::http::{HeaderMap, Method, header};
use chrono::{DateTime, Utc};
use mediatype::MediaTypeList;
use mediatype::names::{APPLICATION, JSON};

/// Everything the transports need from one HTTP request
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,

    /// Route pattern that matched (e.g. `/todos/{id}`), or the raw path
    pub route_pattern: String,

    /// Percent-decoded path variables
    pub path_params: Vec<(String, String)>,

    /// Decoded query-string pairs, repeated keys kept
    pub query_pairs: Vec<(String, String)>,

    pub headers: HeaderMap,

    pub body: Bytes,

    pub received_at: DateTime<Utc>,
}

impl InboundRequest {
    /// Snapshot an axum request, reading at most `body_limit` bytes of body
    pub async fn from_request(request: Request, body_limit: usize) -> GatewayResult<Self> {
        let received_at = Utc::now();
        let (mut parts, body) = request.into_parts();

        let route_pattern = parts
            .extensions
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let path_params = match parts.extract::<RawPathParams>().await {
            Ok(params) => params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };

        let query_pairs = parse_query_pairs(parts.uri.query().unwrap_or_default())?;

        let body = read_body(body, body_limit).await?;

        Ok(Self {
            method: parts.method,
            route_pattern,
            path_params,
            query_pairs,
            headers: parts.headers,
            body,
            received_at,
        })
    }

    /// True for connection upgrade requests (websockets), which no transport serves
    pub fn is_upgrade(&self) -> bool {
        self.headers.contains_key(header::UPGRADE)
    }

    /// True when `Content-Type` is `application/json` (parameters allowed)
    pub fn is_json(&self) -> bool {
        self.headers.get_all(header::CONTENT_TYPE).iter().any(|value| {
            value
                .to_str()
                .map(|content_type| {
                    MediaTypeList::new(content_type).any(|mime| {
                        mime.map(|mime| mime.ty == APPLICATION && mime.subty == JSON)
                            .unwrap_or(false)
                    })
                })
                .unwrap_or(false)
        })
    }

    /// First value of a query-string key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode a raw query string into pairs
pub fn parse_query_pairs(query: &str) -> Result<Vec<(String, String)>, RequestError> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(|e| {
        RequestError::InvalidQueryString {
            message: e.to_string(),
        }
    })
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, RequestError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| RequestError::InvalidBody {
            message: e.to_string(),
        })
}
