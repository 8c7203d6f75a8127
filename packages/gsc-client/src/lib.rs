//! Pure Google Search Console REST API client.
//!
//! A minimal client for the Search Console API v3. Supports listing the
//! authenticated principal's properties and running bounded search
//! analytics queries; it implements the extraction engine's
//! `ReportingClient` seam so the engine can drive it page by page.
//!
//! # Example
//!
//! ```rust,ignore
//! use gsc_client::SearchConsoleClient;
//!
//! let client = SearchConsoleClient::from_env().await?;
//!
//! for site in client.list_sites().await? {
//!     println!("{} ({})", site.site_url, site.permission_level);
//! }
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AccessToken, OauthCredentials};
pub use error::{GscError, Result};
pub use types::{
    SearchAnalyticsQuery, SearchAnalyticsResponse, SearchAnalyticsRow, SiteEntry, SiteList,
};

use async_trait::async_trait;
use tracing::debug;

use gsc_extract::{PageQuery, ReportError, ReportResult, ReportRow, ReportingClient};
use types::ApiErrorBody;

const BASE_URL: &str = "https://www.googleapis.com/webmasters/v3";

/// Marker the API embeds in 403 bodies for unshared properties.
const PERMISSION_MARKER: &str = "User does not have sufficient permission for site";

/// Search Console API client.
///
/// Stateless request/response: one instance is safely shared across
/// sequential or concurrent extraction sessions.
pub struct SearchConsoleClient {
    http: reqwest::Client,
    token: AccessToken,
    base_url: String,
}

impl SearchConsoleClient {
    pub fn new(token: AccessToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Build a client from the environment: `GSC_ACCESS_TOKEN` when
    /// set, otherwise a refresh-token exchange using `GSC_CLIENT_ID`,
    /// `GSC_CLIENT_SECRET`, and `GSC_REFRESH_TOKEN`.
    pub async fn from_env() -> Result<Self> {
        if let Ok(token) = AccessToken::from_env() {
            return Ok(Self::new(token));
        }
        let credentials = OauthCredentials::from_env()?;
        let http = reqwest::Client::new();
        let token = credentials.refresh(&http).await?;
        Ok(Self {
            http,
            token,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Set a custom base URL (for tests and proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// List the properties the authenticated principal may query.
    pub async fn list_sites(&self) -> Result<Vec<SiteEntry>> {
        let url = format!("{}/sites", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GscError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let list: SiteList = resp.json().await?;
        let sites = list.site_entry.unwrap_or_default();
        debug!(count = sites.len(), "listed properties");
        Ok(sites)
    }

    /// Run one bounded search-analytics query against a property.
    ///
    /// The site URL is percent-encoded into the path; `sc-domain:` and
    /// URL-prefix properties both work unchanged.
    pub async fn query_search_analytics(
        &self,
        site: &str,
        query: &SearchAnalyticsQuery,
    ) -> Result<SearchAnalyticsResponse> {
        let url = format!(
            "{}/sites/{}/searchAnalytics/query",
            self.base_url,
            urlencoding::encode(site)
        );
        debug!(
            site,
            start_row = query.start_row,
            row_limit = query.row_limit,
            "search analytics query"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .json(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), &body, site));
        }

        Ok(resp.json().await?)
    }
}

/// Pull the human-readable message out of an API error body, falling
/// back to the raw body when it isn't the documented JSON shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Map a non-2xx response to a typed error, detecting the permission
/// denial the API reports for unshared properties.
fn classify_api_error(status: u16, body: &str, site: &str) -> GscError {
    if status == 403 && body.contains(PERMISSION_MARKER) {
        return GscError::PermissionDenied {
            site: site.to_string(),
        };
    }
    GscError::Api {
        status,
        message: error_message(body),
    }
}

#[async_trait]
impl ReportingClient for SearchConsoleClient {
    async fn query(&self, site: &str, query: &PageQuery) -> ReportResult<Vec<ReportRow>> {
        let body = SearchAnalyticsQuery {
            start_date: query.start_date,
            end_date: query.end_date,
            dimensions: query
                .dimensions
                .api_names()
                .into_iter()
                .map(String::from)
                .collect(),
            row_limit: query.row_limit,
            start_row: query.start_row,
        };

        let response = self
            .query_search_analytics(site, &body)
            .await
            .map_err(into_report_error)?;

        Ok(response
            .rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| ReportRow {
                keys: row.keys,
                clicks: row.clicks,
                impressions: row.impressions,
                ctr: row.ctr,
                position: row.position,
            })
            .collect())
    }
}

fn into_report_error(err: GscError) -> ReportError {
    match err {
        GscError::PermissionDenied { site } => ReportError::PermissionDenied { site },
        other => ReportError::Request(Box::new(other)),
    }
}
