pub mod google;

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::ServiceError;
use google::SearchResponseDto;

const SERVICE: &str = "Google Custom Search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
    pub title: String,
    pub link: String,
    pub display_link: String,
    pub snippet: String,
    pub images: Vec<SearchImage>,
    pub thumbnails: Vec<SearchImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchImage {
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl SearchItem {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnails.first().map(|t| t.src.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub count: Option<u32>,
    /// Two letter country code boosting results from that country (`gl`).
    pub country: Option<String>,
    /// Language restriction such as `lang_en` (`lr`).
    pub language: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

pub struct SearchService {
    client: Client,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(client: Client, config: SearchConfig) -> Self {
        Self { client, config }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, ServiceError> {
        let query = self.query_parameters(request);
        debug!("Searching for {:?}", request.query);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;

        let status = response.status();
        let body = response.text().await.map_err(ServiceError::http(SERVICE))?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let dto: SearchResponseDto =
            serde_json::from_str(&body).map_err(ServiceError::decode(SERVICE))?;

        Ok(dto.into_results())
    }

    fn query_parameters(&self, request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", request.query.clone()),
            ("key", self.config.api_key.clone()),
            ("cx", self.config.search_engine_id.clone()),
            ("num", self.result_count(request.count).to_string()),
            ("fields", google::FIELDS.to_string()),
            ("filter", "1".to_string()),
        ];

        if let Some(country) = request.country.as_deref().filter(|c| !c.trim().is_empty()) {
            query.push(("gl", country.to_string()));
        }
        if let Some(language) = request.language.as_deref().filter(|l| !l.trim().is_empty()) {
            query.push(("lr", language.to_string()));
        }

        query
    }

    fn result_count(&self, requested: Option<u32>) -> u32 {
        let max = self.config.max_result_count.max(1);
        requested
            .unwrap_or(self.config.default_result_count)
            .clamp(1, max)
    }
}
