use std::time::Duration;

use futures_util::StreamExt;
use parallels_logging::{parallels_debug, parallels_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    DocumentRecord, FailureKind, IngestBody, IngestResponse, RemoteError, ResultsQuery,
    ResultsResponse, SearchRequest, StatusResponse, SubmitResponse,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the REST API; endpoint paths are appended to it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

/// The remote search service.
#[async_trait::async_trait]
pub trait RemoteSearchClient: Send + Sync {
    /// Starts a search and returns its id.
    async fn submit(&self, request: &SearchRequest) -> Result<String, RemoteError>;

    async fn poll_status(&self, search_id: &str) -> Result<StatusResponse, RemoteError>;

    async fn fetch_results(
        &self,
        search_id: &str,
        query: &ResultsQuery,
    ) -> Result<ResultsResponse, RemoteError>;

    async fn fetch_corpus(&self, language: &str) -> Result<Vec<DocumentRecord>, RemoteError>;

    /// Uploads a text and returns the id the service assigned to it.
    async fn ingest(&self, body: &IngestBody) -> Result<String, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSearchClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestSearchClient {
    pub fn new(settings: ClientSettings) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RemoteError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// `base/seg1/seg2/` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, RemoteError> {
        parallels_debug!("{} {}", method, url);
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let result = self.send(request).await.and_then(|bytes| decode(&bytes));
        if let Err(err) = &result {
            parallels_warn!("{} {} failed: {}", method, url, err);
        }
        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(RemoteError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(RemoteError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl RemoteSearchClient for ReqwestSearchClient {
    async fn submit(&self, request: &SearchRequest) -> Result<String, RemoteError> {
        let url = self.endpoint(&["search"])?;
        let body = encode(request)?;
        let response: SubmitResponse = self.call(Method::POST, url, Some(body)).await?;
        Ok(response.search_id)
    }

    async fn poll_status(&self, search_id: &str) -> Result<StatusResponse, RemoteError> {
        let url = self.endpoint(&["search", search_id, "status"])?;
        self.call(Method::GET, url, None).await
    }

    async fn fetch_results(
        &self,
        search_id: &str,
        query: &ResultsQuery,
    ) -> Result<ResultsResponse, RemoteError> {
        let mut url = self.endpoint(&["search", search_id, "results"])?;
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("per_page", &query.per_page.to_string())
            .append_pair("sort_by", &query.sort_by)
            .append_pair("sort_order", &query.sort_order);
        self.call(Method::GET, url, None).await
    }

    async fn fetch_corpus(&self, language: &str) -> Result<Vec<DocumentRecord>, RemoteError> {
        let mut url = self.endpoint(&["texts"])?;
        url.query_pairs_mut().append_pair("language", language);
        self.call(Method::GET, url, None).await
    }

    async fn ingest(&self, body: &IngestBody) -> Result<String, RemoteError> {
        let url = self.endpoint(&["texts"])?;
        let body = encode(body)?;
        let response: IngestResponse = self.call(Method::POST, url, Some(body)).await?;
        Ok(response.document_id)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RemoteError> {
    serde_json::to_vec(value).map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(bytes)
        .map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RemoteError::new(FailureKind::Decode, err.to_string());
    }
    RemoteError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ReqwestSearchClient {
        ReqwestSearchClient::new(ClientSettings::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn endpoint_appends_segments_with_trailing_slash() {
        let client = client("http://localhost:5000/api/");
        let url = client.endpoint(&["search", "abc", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/search/abc/status/");
    }

    #[test]
    fn endpoint_keeps_base_path_without_trailing_slash() {
        let client = client("http://localhost:5000/api");
        let url = client.endpoint(&["texts"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/texts/");
    }

    #[test]
    fn endpoint_escapes_ids() {
        let client = client("http://localhost:5000/");
        let url = client.endpoint(&["search", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/search/a%2Fb%20c/");
    }
}
