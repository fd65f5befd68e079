//! Blocking REST client for the platform's admin API.
//!
//! All calls return `ApiFailure` on error so the caller can hand it straight
//! to the classifier. Requests run on worker threads (see `async_task`), never
//! on the UI thread.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::classify::ApiFailure;
use crate::config::AppConfig;
use crate::entity::Entity;
use crate::export::{stringify_value, Record};

/// Cookie holding the CSRF token issued by the API.
pub const CSRF_COOKIE: &str = "csrf_token";
/// Header echoing the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";
/// Per-request id, logged on both sides for correlation.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// `meta` block of a paginated list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub limit: usize,
    /// Filter parameters, already reduced to non-empty pairs.
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    fn filter(&self, key: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One page of rows plus its pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub meta: ListMeta,
}

impl ListPage {
    /// Interprets a list response body.
    ///
    /// Paginated endpoints answer `{ data: { <plural>: [..], meta: {..} } }`.
    /// Some answer with a bare array (`{ data: [..] }` or `[..]`); those are
    /// filtered and paginated here.
    pub fn from_response(entity: Entity, body: &Value, query: &ListQuery) -> Result<Self, ApiFailure> {
        let data = body.get("data").unwrap_or(body);

        if let Some(rows) = data.get(entity.plural_key()).and_then(Value::as_array) {
            let meta = match data.get("meta") {
                Some(meta) => ListMeta::deserialize(meta)
                    .map_err(|e| ApiFailure::parsing(format!("invalid meta: {}", e)))?,
                None => ListMeta {
                    page: query.page,
                    limit: query.limit,
                    total: rows.len(),
                    total_pages: 1,
                },
            };
            return Ok(Self {
                records: objects(rows)?,
                meta,
            });
        }

        if let Some(rows) = data.as_array() {
            return Ok(Self::paginate_locally(objects(rows)?, query));
        }

        Err(ApiFailure::parsing(format!(
            "response has no '{}' list",
            entity.plural_key()
        )))
    }

    fn paginate_locally(records: Vec<Record>, query: &ListQuery) -> Self {
        let search = query.filter("search").map(str::to_lowercase);
        let status = query.filter("status");
        let matching: Vec<Record> = records
            .into_iter()
            .filter(|r| match status {
                Some(status) => r.get("status").and_then(Value::as_str) == Some(status),
                None => true,
            })
            .filter(|r| match &search {
                Some(needle) => r
                    .values()
                    .any(|v| stringify_value(v).to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .collect();

        let limit = query.limit.max(1);
        let total = matching.len();
        let start = query.page.saturating_sub(1) * limit;
        Self {
            records: matching.into_iter().skip(start).take(limit).collect(),
            meta: ListMeta {
                page: query.page,
                limit,
                total,
                total_pages: total.div_ceil(limit).max(1),
            },
        }
    }
}

fn objects(rows: &[Value]) -> Result<Vec<Record>, ApiFailure> {
    rows.iter()
        .map(|row| {
            row.as_object()
                .cloned()
                .ok_or_else(|| ApiFailure::parsing("list entry is not an object"))
        })
        .collect()
}

/// HTTP client bound to one API base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    jar: Arc<Jar>,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> color_eyre::Result<Self> {
        let mut base = config.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_provider(jar.clone())
            .user_agent(concat!("vendadmin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            jar,
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// CSRF token from the cookie jar, if the API has issued one.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_string())
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiFailure> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiFailure::fetch(format!("invalid url {}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiFailure> {
        let is_get = method == Method::GET;
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, %method, path, "api request");
        let mut req = self
            .http
            .request(method, self.url(path)?)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if !is_get {
            if let Some(csrf) = self.csrf_token() {
                req = req.header(CSRF_HEADER, csrf);
            }
        }
        Ok(req)
    }

    fn send(&self, req: RequestBuilder) -> Result<Value, ApiFailure> {
        let resp = req.send().map_err(|e| ApiFailure::fetch(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| ApiFailure::fetch(e.to_string()))?;

        if !status.is_success() {
            let data = serde_json::from_str::<Value>(&body).ok();
            return Err(ApiFailure::http(status.as_u16(), data));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiFailure::parsing(e.to_string()))
    }

    /// Fetches one page of an entity list.
    pub fn list(&self, entity: Entity, query: &ListQuery) -> Result<ListPage, ApiFailure> {
        let mut req = self.request(Method::GET, entity.path())?;
        if !entity.client_paginated() {
            req = req.query(&[("page", query.page), ("limit", query.limit)]);
            req = req.query(&query.filters);
        }
        tracing::debug!(entity = %entity, page = query.page, limit = query.limit, "list request");
        let body = self.send(req)?;
        ListPage::from_response(entity, &body, query)
    }

    pub fn delete(&self, entity: Entity, id: &str) -> Result<(), ApiFailure> {
        let req = self.request(Method::DELETE, &format!("{}/{}", entity.path(), id))?;
        self.send(req).map(|_| ())
    }

    /// Deletes several rows in one request.
    pub fn bulk_delete(&self, entity: Entity, ids: &[String]) -> Result<(), ApiFailure> {
        let req = self
            .request(Method::POST, &format!("{}/bulk-delete", entity.path()))?
            .json(&json!({ "ids": ids }));
        self.send(req).map(|_| ())
    }

    /// Flushes the server-side cache.
    pub fn clear_cache(&self) -> Result<(), ApiFailure> {
        let req = self.request(Method::POST, "cache/clear")?;
        self.send(req).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ApiStatus;

    fn query(page: usize, limit: usize) -> ListQuery {
        ListQuery {
            page,
            limit,
            filters: Vec::new(),
        }
    }

    #[test]
    fn test_paginated_response() {
        let body = json!({
            "data": {
                "users": [{"id": "u1"}, {"id": "u2"}],
                "meta": {"page": 2, "limit": 2, "total": 7, "totalPages": 4}
            }
        });
        let page = ListPage::from_response(Entity::Users, &body, &query(2, 2)).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(
            page.meta,
            ListMeta {
                page: 2,
                limit: 2,
                total: 7,
                total_pages: 4
            }
        );
    }

    #[test]
    fn test_plural_key_for_activity_logs() {
        let body = json!({"data": {"activityLogs": [{"id": 1}], "meta": {"total": 1}}});
        let page = ListPage::from_response(Entity::ActivityLogs, &body, &query(1, 10)).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.meta.total, 1);
    }

    #[test]
    fn test_flat_array_paginated_locally() {
        let rows: Vec<Value> = (1..=25).map(|i| json!({"id": i, "name": format!("cat {}", i)})).collect();
        let body = json!({ "data": rows });
        let page = ListPage::from_response(Entity::Categories, &body, &query(3, 10)).unwrap();
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.records[0]["id"], json!(21));
    }

    #[test]
    fn test_flat_array_filters_search_and_status() {
        let body = json!([
            {"id": "s1", "userEmail": "ann@example.com", "status": "active"},
            {"id": "s2", "userEmail": "bob@example.com", "status": "revoked"},
            {"id": "s3", "userEmail": "ANNA@example.com", "status": "active"}
        ]);
        let q = ListQuery {
            page: 1,
            limit: 10,
            filters: vec![
                ("search".into(), "ann".into()),
                ("status".into(), "active".into()),
            ],
        };
        let page = ListPage::from_response(Entity::Sessions, &body, &q).unwrap();
        let ids: Vec<_> = page.records.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("s1"), json!("s3")]);
    }

    #[test]
    fn test_unexpected_shape_is_parsing_error() {
        let body = json!({"data": {"something": []}});
        let err = ListPage::from_response(Entity::Users, &body, &query(1, 10)).unwrap_err();
        assert_eq!(err.status, ApiStatus::ParsingError);
    }

    #[test]
    fn test_csrf_token_from_jar() {
        let config = AppConfig {
            api_base_url: "https://admin.example.com/api".into(),
            ..AppConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.csrf_token(), None);
        let url = client.base_url().clone();
        client.jar.add_cookie_str("csrf_token=abc123; Path=/", &url);
        client.jar.add_cookie_str("theme=dark; Path=/", &url);
        assert_eq!(client.csrf_token().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_base_url_keeps_path() {
        let config = AppConfig {
            api_base_url: "https://admin.example.com/api/v1".into(),
            ..AppConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url("users").unwrap().as_str(),
            "https://admin.example.com/api/v1/users"
        );
    }

    #[test]
    fn test_requests_carry_auth_and_ids() {
        let config = AppConfig {
            api_token: Some("secret".into()),
            ..AppConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let first = client.request(Method::GET, "users").unwrap().build().unwrap();
        let second = client.request(Method::GET, "users").unwrap().build().unwrap();

        assert_eq!(
            first.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer secret"
        );
        let id = first.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_ne!(first.headers().get(REQUEST_ID_HEADER), second.headers().get(REQUEST_ID_HEADER));
    }
}
