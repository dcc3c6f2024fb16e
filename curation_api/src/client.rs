//! HTTP client for the curation backend REST API.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    query::{ListQuery, Query},
    types::{Envelope, IdSet, Page, Resource},
    Error,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A file plus sibling scalar fields, sent as `multipart/form-data`.
#[derive(Clone, Debug)]
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type of the file part. `None` lets the transport default it.
    pub mime: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            bytes,
            mime: None,
            fields: Vec::new(),
        }
    }

    pub fn with_mime(mut self, mime: &str) -> Self {
        self.mime = Some(mime.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    fn into_form(self) -> Result<reqwest::multipart::Form, Error> {
        let mut part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(mime) = self.mime {
            part = part
                .mime_str(&mime)
                .map_err(|e| Error::InvalidRequest(format!("bad MIME type '{}': {}", mime, e)))?;
        }
        let mut form = reqwest::multipart::Form::new().part("file", part);
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

/// Request payload.
#[derive(Debug)]
pub enum RequestBody {
    None,
    Json(serde_json::Value),
    /// The transport writes the content-type header, boundary included.
    Multipart(UploadForm),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, Error> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| Error::InvalidRequest(format!("unserializable body: {}", e)))
    }
}

/// HTTP client for the curation backend.
///
/// Every response is an [`Envelope`]. An envelope with a non-success `code`
/// is returned as `Ok`; only transport-level problems become [`Error`].
/// Nothing is retried.
pub struct Client {
    http: reqwest::Client,
    /// API base including any prefix, e.g. `http://localhost:8000/api/v1`.
    base_api_url: String,
}

impl Client {
    /// Creates a client for the given API base with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::InvalidRequest(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str, query: Option<&(dyn Query + Sync)>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidRequest(format!("{}{}: {}", self.base_api_url, path, e))
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Issues one request and decodes the envelope.
    ///
    /// Undefined query values never reach the URL (see [`crate::Filters`]).
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&(dyn Query + Sync)>,
        body: RequestBody,
    ) -> Result<Envelope<T>, Error>
    where
        T: DeserializeOwned,
    {
        let url = self.get_url(path, query)?;
        tracing::debug!("{} {}", method, url);

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header("accept", "application/json, text/plain, */*");
        match body {
            RequestBody::None => {}
            RequestBody::Json(value) => req = req.json(&value),
            RequestBody::Multipart(form) => req = req.multipart(form.into_form()?),
        }

        let resp = req.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, url, e);
            Error::RequestFailed {
                fallback: transport_fallback(&e),
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed {
                fallback: transport_fallback(&e),
            }
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("{} {} returned {}: {}", method, url, status, snippet);
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .map(|env| env.message)
                .filter(|m| !m.is_empty());
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                message,
                body: snippet,
            });
        }

        decode_envelope(&body)
    }

    /// Fetches one page of `R`.
    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Envelope<Page<R>>, Error> {
        let query: &(dyn Query + Sync) = query;
        self.request(Method::GET, R::PATH, Some(query), RequestBody::None)
            .await
    }

    /// Fetches the full record, including fields the list projection omits.
    pub async fn detail<R: Resource>(&self, id: &R::Id) -> Result<Envelope<R>, Error> {
        self.request(Method::GET, &item_path::<R>(id), None, RequestBody::None)
            .await
    }

    pub async fn create<R, B>(&self, body: &B) -> Result<Envelope<R>, Error>
    where
        R: Resource,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, R::PATH, None, RequestBody::json(body)?)
            .await
    }

    pub async fn update<R, B>(&self, id: &R::Id, body: &B) -> Result<Envelope<R>, Error>
    where
        R: Resource,
        B: Serialize + ?Sized,
    {
        self.request(
            Method::PUT,
            &item_path::<R>(id),
            None,
            RequestBody::json(body)?,
        )
        .await
    }

    pub async fn delete<R: Resource>(
        &self,
        id: &R::Id,
    ) -> Result<Envelope<serde_json::Value>, Error> {
        self.request(Method::DELETE, &item_path::<R>(id), None, RequestBody::None)
            .await
    }

    /// Deletes every id in one request. The envelope describes the whole batch.
    pub async fn bulk_delete<R: Resource>(
        &self,
        ids: &[R::Id],
    ) -> Result<Envelope<serde_json::Value>, Error> {
        let body = IdSet { ids: ids.to_vec() };
        self.request(
            Method::DELETE,
            &format!("{}/batch", R::PATH),
            None,
            RequestBody::json(&body)?,
        )
        .await
    }

    /// Restores soft-deleted records in one request.
    pub async fn bulk_restore<R: Resource>(
        &self,
        ids: &[R::Id],
    ) -> Result<Envelope<serde_json::Value>, Error> {
        let body = IdSet { ids: ids.to_vec() };
        self.request(
            Method::POST,
            &format!("{}/batch-restore", R::PATH),
            None,
            RequestBody::json(&body)?,
        )
        .await
    }

    /// Triggers a long-running action. The envelope only acknowledges acceptance.
    pub async fn action<R: Resource>(
        &self,
        id: &R::Id,
        action: &str,
    ) -> Result<Envelope<serde_json::Value>, Error> {
        self.request(
            Method::POST,
            &format!("{}/{}", item_path::<R>(id), action),
            None,
            RequestBody::None,
        )
        .await
    }

    /// Posts a file as `multipart/form-data` to `path`.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: UploadForm,
    ) -> Result<Envelope<T>, Error> {
        self.request(Method::POST, path, None, RequestBody::Multipart(form))
            .await
    }

    /// URL of the binary content for a record (images are never inlined in JSON).
    pub fn content_url<R: Resource>(&self, id: &R::Id) -> String {
        format!("{}{}/content", self.base_api_url, item_path::<R>(id))
    }

    pub fn thumbnail_url<R: Resource>(&self, id: &R::Id) -> String {
        format!("{}{}/thumbnail", self.base_api_url, item_path::<R>(id))
    }
}

fn item_path<R: Resource>(id: &R::Id) -> String {
    format!("{}/{}", R::PATH, id)
}

/// Decodes an envelope. The payload is only decoded into `T` on success,
/// so a rejection's `message` survives even when its `data` has another shape.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, Error> {
    let raw = serde_json::from_str::<Envelope<serde_json::Value>>(body).map_err(|e| {
        let snippet = truncate_body(body);
        tracing::error!("Failed to parse envelope: {} | body: {}", e, snippet);
        Error::Decode {
            reason: e.to_string(),
            body: snippet,
        }
    })?;

    if !raw.is_success() {
        return Ok(Envelope {
            code: raw.code,
            message: raw.message,
            data: None,
        });
    }

    let data = match raw.data {
        Some(value) => Some(serde_json::from_value::<T>(value).map_err(|e| {
            let snippet = truncate_body(body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Decode {
                reason: e.to_string(),
                body: snippet,
            }
        })?),
        None => None,
    };

    Ok(Envelope {
        code: raw.code,
        message: raw.message,
        data,
    })
}

fn transport_fallback(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        "Could not connect to server".to_string()
    } else {
        "Network error, please try again".to_string()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_keeps_message_despite_foreign_data() {
        let env: Envelope<Page<i64>> =
            decode_envelope(r#"{"code": 409, "message": "name exists", "data": {"field": "name"}}"#)
                .unwrap();
        assert_eq!(env.code, 409);
        assert_eq!(env.message, "name exists");
        assert!(env.data.is_none());
    }

    #[test]
    fn shape_mismatch_fails_loudly() {
        let result: Result<Envelope<Page<i64>>, Error> =
            decode_envelope(r#"{"code": 200, "message": "ok", "data": {"list": []}}"#);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
    }
}
