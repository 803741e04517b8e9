//! The HTTP call primitive the client is built on.
//!
//! [`TornadoClient`](super::TornadoClient) only ever describes requests as
//! [`ApiRequest`] values; a [`Transport`] turns them into JSON responses.
//! Base URL, authentication and connection handling belong to the transport.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use super::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// One outbound API call, relative to the service base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes API calls
///
/// Implementations return the decoded JSON body of a 2xx response (`Value::Null`
/// for an empty body) and map everything else to
/// [`ClientError::Remote`](super::ClientError::Remote) or
/// [`ClientError::Transport`](super::ClientError::Transport). They must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        (**self).call(request).await
    }
}
