//! Wire types for the Search Console API v3.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body for `searchAnalytics/query`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchAnalyticsQuery {
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub dimensions: Vec<String>,
    #[serde(rename = "rowLimit")]
    pub row_limit: u32,
    #[serde(rename = "startRow")]
    pub start_row: u32,
}

/// Response for `searchAnalytics/query`.
///
/// `rows` is absent entirely, not an empty list, once the requested
/// window is exhausted.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchAnalyticsResponse {
    pub rows: Option<Vec<SearchAnalyticsRow>>,
    #[serde(rename = "responseAggregationType")]
    pub response_aggregation_type: Option<String>,
}

/// One analytics row: ordered dimension keys plus the four metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchAnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

/// Response for the site list endpoint. `siteEntry` is absent for an
/// account with no properties.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteList {
    #[serde(rename = "siteEntry")]
    pub site_entry: Option<Vec<SiteEntry>>,
}

/// One property visible to the authenticated principal.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    #[serde(rename = "siteUrl")]
    pub site_url: String,
    #[serde(rename = "permissionLevel")]
    pub permission_level: String,
}

/// Error payload the API wraps failures in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}
