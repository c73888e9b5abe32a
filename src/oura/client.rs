use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::oura::models::{SleepDocument, SleepResponse};

/// Upper bound on followed `next_token` cursors, in case the API keeps returning one.
const MAX_PAGES: usize = 100;

pub struct OuraClient {
    http_client: Client,
    base_url: String,
    token: String,
}

impl OuraClient {
    /// Build a client from the injected configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.oura_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.oura_base_url.clone(),
            token: config.oura_token.clone(),
        })
    }

    /// Fetch every sleep period between `start_date` and `end_date`, following pagination.
    ///
    /// # Errors
    ///
    /// Returns `AppError::OuraApi` if any page request fails or returns an error status.
    pub async fn get_sleep(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<SleepDocument>> {
        let mut documents = Vec::new();
        let mut next_token: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let response = self
                .get_sleep_page(start_date, end_date, next_token.as_deref())
                .await?;

            tracing::debug!(
                page,
                count = response.data.len(),
                has_more = response.next_token.is_some(),
                "Fetched sleep page"
            );

            documents.extend(response.data);

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(documents),
            }
        }

        tracing::warn!(
            max_pages = MAX_PAGES,
            fetched = documents.len(),
            "Stopped following sleep pagination"
        );
        Ok(documents)
    }

    async fn get_sleep_page(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        next_token: Option<&str>,
    ) -> AppResult<SleepResponse> {
        let url = format!("{}/v2/usercollection/sleep", self.base_url);

        let mut params = vec![
            ("start_date", start_date.format("%Y-%m-%d").to_string()),
            ("end_date", end_date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(token) = next_token {
            params.push(("next_token", token.to_string()));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::OuraApi(format!("Request failed: {e}")))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AppError::OuraApi("Rate limited (429)".to_string()));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(AppError::OuraApi(
                    "Unauthorized (401): check OURA_TOKEN".to_string(),
                ));
            }
            status if !status.is_success() => {
                return Err(AppError::OuraApi(format!(
                    "HTTP {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                )));
            }
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::OuraApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse sleep response"
            );
            AppError::OuraApi(format!("Failed to parse response: {e}"))
        })
    }
}
