//! Request parameter bag for the v2 quote API
//!
//! v2 handlers read named parameters without caring where they came from:
//! query string, urlencoded form, or a JSON object body. Later sources
//! override earlier ones (query, then body).

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::header,
    Form,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Default)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), Value::String(value.into()));
    }

    /// Scalar parameter as text; numbers and booleans are stringified
    pub fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn required_text(&self, name: &str) -> ApiResult<String> {
        self.text(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing parameter: {}", name)))
    }

    pub fn required_int(&self, name: &str) -> ApiResult<i64> {
        super::parse_int(&self.required_text(name)?, name)
    }

    pub fn resolver(&self) -> ApiResult<String> {
        self.required_text("resolver")
    }

    fn extend(&mut self, other: Map<String, Value>) {
        self.0.extend(other);
    }
}

#[async_trait]
impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = Params::default();

        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        for (name, value) in query {
            params.insert(&name, value);
        }

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            for (name, value) in form {
                params.insert(&name, value);
            }
            return Ok(params);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(params);
        }

        let object: Map<String, Value> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Body must be a JSON object: {}", e)))?;
        params.extend(object);
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    async fn extract(req: Request) -> ApiResult<Params> {
        Params::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_query_and_json_merge() {
        let req = Request::builder()
            .method("POST")
            .uri("/edit?resolver=uadaf&id=1")
            .header("content-type", "application/json")
            .body(Body::from(json!({"id": 7, "new_content": "x"}).to_string()))
            .unwrap();

        let params = extract(req).await.unwrap();
        assert_eq!(params.resolver().unwrap(), "uadaf");
        assert_eq!(params.required_int("id").unwrap(), 7);
        assert_eq!(params.text("new_content").as_deref(), Some("x"));
        assert!(params.text("missing").is_none());
    }

    #[tokio::test]
    async fn test_form_body() {
        let req = Request::builder()
            .method("PUT")
            .uri("/repo")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=archive"))
            .unwrap();

        let params = extract(req).await.unwrap();
        assert_eq!(params.required_text("name").unwrap(), "archive");
    }

    #[tokio::test]
    async fn test_empty_body_is_fine() {
        let req = Request::builder()
            .method("POST")
            .uri("/fix_ids?resolver=uadaf")
            .body(Body::empty())
            .unwrap();

        let params = extract(req).await.unwrap();
        assert_eq!(params.resolver().unwrap(), "uadaf");
    }

    #[tokio::test]
    async fn test_non_object_body_rejected() {
        let req = Request::builder()
            .method("PUT")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("[1, 2]"))
            .unwrap();

        assert!(matches!(extract(req).await, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_required_int_rejects_text() {
        let mut params = Params::default();
        params.insert("id", "abc");
        assert!(matches!(params.required_int("id"), Err(ApiError::BadRequest(_))));
        assert!(matches!(params.resolver(), Err(ApiError::BadRequest(_))));
    }
}
