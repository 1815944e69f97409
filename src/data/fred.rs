//! FRED observation API client.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::{FRED_KEY_VAR, Settings};
use crate::domain::Frequency;
use crate::error::FetchError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Series and start date used by the connectivity probe.
pub const PROBE_SERIES: &str = "UNRATE";
const PROBE_START: (i32, u32, u32) = (2015, 1, 1);

/// Parameters of one observations request.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRequest<'a> {
    pub series_id: &'a str,
    pub frequency: Frequency,
    pub start: NaiveDate,
}

/// Network seam for the series fetcher.
///
/// The HTTP client implements this; tests substitute a stub.
pub trait ObservationSource: Send + Sync {
    fn observations(&self, request: &ObservationRequest<'_>) -> Result<ObservationsResponse, FetchError>;
}

/// Decoded observations body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub realtime_start: Option<String>,
    #[serde(default)]
    pub realtime_end: Option<String>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// One raw record. FRED sends values as strings (`"."` marks a missing value).
///
/// Both fields are kept loose so a single malformed record is dropped during
/// normalization instead of failing the whole body.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub date: serde_json::Value,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Observation {
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: serde_json::Value::String(date.into()),
            value: serde_json::Value::String(value.into()),
        }
    }

    /// Parsed date, or `None` when missing or not `YYYY-MM-DD`.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(self.date.as_str()?)
    }

    /// Parsed value; see `parse_value`.
    pub fn value(&self) -> Option<f64> {
        parse_value(&self.value)
    }
}

pub struct FredClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: Option<String>, settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(settings.fred_api_key.clone(), settings)
    }

    /// Fetch a small known series, bypassing any cache.
    pub fn probe(&self) -> Result<ObservationsResponse, FetchError> {
        let (y, m, d) = PROBE_START;
        let start = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
        self.observations(&ObservationRequest {
            series_id: PROBE_SERIES,
            frequency: Frequency::Monthly,
            start,
        })
    }
}

impl ObservationSource for FredClient {
    fn observations(&self, request: &ObservationRequest<'_>) -> Result<ObservationsResponse, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingConfiguration(FRED_KEY_VAR))?;

        let start = request.start.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", request.series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("frequency", request.frequency.code()),
                ("observation_start", start.as_str()),
            ])
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::Transport(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(FetchError::remote(status.as_u16(), &body));
        }

        decode_observations(&body)
    }
}

/// Decode an observations body.
pub fn decode_observations(body: &str) -> Result<ObservationsResponse, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Parse a FRED value. `"."`, blanks, and non-finite numbers are `None`.
pub fn parse_value(raw: &serde_json::Value) -> Option<f64> {
    let v = match raw {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed == "." || trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_value_handles_fred_placeholders() {
        assert_eq!(parse_value(&json!("3.9")), Some(3.9));
        assert_eq!(parse_value(&json!(" 4 ")), Some(4.0));
        assert_eq!(parse_value(&json!(".")), None);
        assert_eq!(parse_value(&json!("")), None);
        assert_eq!(parse_value(&json!("NaN")), None);
        assert_eq!(parse_value(&json!("abc")), None);
        assert_eq!(parse_value(&json!(2.5)), Some(2.5));
        assert_eq!(parse_value(&json!(null)), None);
    }

    #[test]
    fn decode_reads_metadata_and_records() {
        let body = r#"{
            "realtime_start": "2025-01-15",
            "realtime_end": "2025-01-15",
            "observations": [
                {"realtime_start": "2025-01-15", "realtime_end": "2025-01-15", "date": "2024-11-01", "value": "4.2"},
                {"realtime_start": "2025-01-15", "realtime_end": "2025-01-15", "date": "2024-12-01", "value": "."}
            ]
        }"#;
        let resp = decode_observations(body).unwrap();
        assert_eq!(resp.realtime_end.as_deref(), Some("2025-01-15"));
        assert_eq!(resp.observations.len(), 2);
        assert_eq!(resp.observations[0].date(), NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn decode_tolerates_incomplete_records() {
        let body = r#"{"observations": [
            {"date": "2024-01-01", "value": "1.0"},
            {"date": "2024-02-01"},
            {"value": "3.0"},
            {"date": 20240401, "value": "4.0"}
        ]}"#;
        let resp = decode_observations(body).unwrap();
        assert_eq!(resp.observations.len(), 4);

        let obs = &resp.observations;
        assert_eq!(obs[0].date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(obs[0].value(), Some(1.0));
        assert_eq!(obs[1].value(), None);
        assert_eq!(obs[2].date(), None);
        assert_eq!(obs[3].date(), None);
    }

    #[test]
    fn decode_rejects_malformed_body() {
        let err = decode_observations("<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn missing_key_is_reported_without_network() {
        let client = FredClient::new(None, &Settings::default()).unwrap();
        let err = client.probe().unwrap_err();
        assert_eq!(err, FetchError::MissingConfiguration(FRED_KEY_VAR));
    }
}
