//! Client for `GET {base}/player/{id}/market-value-history`.

use std::time::Duration;

use reqwest::{
  Client,
  header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;
use serde_json::Value;
use winning_core::{acquire::ValuationSource, record::ValuationRecord};

use crate::{Error, Result, retry::RetryPolicy};

/// Club name used when a valuation has no club.
pub const UNKNOWN_CLUB: &str = "Sin Club / Desconocido";

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
  #[serde(default)]
  pub success: bool,
  pub data:    Option<HistoryData>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryData {
  #[serde(default)]
  pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  /// Number or string upstream; may be absent.
  #[serde(default)]
  pub club_id:      Value,
  #[serde(default)]
  pub age:          Value,
  pub market_value: MarketValue,
}

#[derive(Debug, Deserialize)]
pub struct MarketValue {
  #[serde(default)]
  pub value:      Value,
  #[serde(default)]
  pub determined: String,
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// A JSON scalar as a trimmed string; `None` for null, empty or `N/A`.
fn scalar(v: &Value) -> Option<String> {
  let s = match v {
    Value::String(s) => s.trim().to_string(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  (!s.is_empty() && s != "N/A" && s != "None").then_some(s)
}

fn whole_number(v: &Value) -> Option<u64> {
  let n = match v {
    Value::Number(n) => n.as_f64()?,
    Value::String(s) => s.trim().parse().ok()?,
    _ => return None,
  };
  (n.is_finite() && n >= 0.0).then(|| n.round() as u64)
}

/// Display name for a club id. Names are not looked up: a known id is shown
/// as `Club {id}`.
pub fn club_display_name(club_id: Option<&str>) -> String {
  match club_id {
    None | Some("0") => UNKNOWN_CLUB.to_string(),
    Some(id) => format!("Club {id}"),
  }
}

/// Flatten an API response into valuation rows for one player. Dates keep
/// their `YYYY-MM-DD` part only.
pub fn history_to_records(
  player_id: &str,
  player_name: &str,
  response: &HistoryResponse,
) -> Vec<ValuationRecord> {
  let Some(data) = response.data.as_ref().filter(|_| response.success) else {
    return Vec::new();
  };
  data
    .history
    .iter()
    .map(|entry| {
      let club_id = scalar(&entry.club_id);
      let date = entry.market_value.determined.trim();
      ValuationRecord {
        player_id:        player_id.to_string(),
        player_name:      player_name.to_string(),
        valuation_amount: whole_number(&entry.market_value.value).unwrap_or(0),
        valuation_date:   date.split('T').next().unwrap_or(date).to_string(),
        age_at_valuation: whole_number(&entry.age).and_then(|a| u32::try_from(a).ok()),
        club_name:        club_display_name(club_id.as_deref()),
        club_id,
      }
    })
    .collect()
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SourceConfig {
  /// API root, e.g. `https://tmapi-alpha.transfermarkt.technology`.
  pub base_url: String,
  /// Pause after each player's request.
  pub pacing:   Duration,
  pub timeout:  Duration,
  pub retry:    RetryPolicy,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      base_url: "https://tmapi-alpha.transfermarkt.technology".into(),
      pacing:   Duration::from_millis(300),
      timeout:  Duration::from_secs(10),
      retry:    RetryPolicy::default(),
    }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct MarketValueClient {
  client: Client,
  config: SourceConfig,
}

impl MarketValueClient {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-ES,es;q=0.9"));
    let client = Client::builder()
      .default_headers(headers)
      .timeout(config.timeout)
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, player_id: &str) -> String {
    format!(
      "{}/player/{player_id}/market-value-history",
      self.config.base_url.trim_end_matches('/')
    )
  }

  /// Fetch one player's history.
  pub async fn fetch_history(&self, player_id: &str, player_name: &str) -> Result<Vec<ValuationRecord>> {
    let url = self.url(player_id);
    let resp = self
      .config
      .retry
      .send(&url, || self.client.get(&url))
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { url, status: status.as_u16() });
    }
    let body: HistoryResponse = resp.json().await?;
    if !body.success || body.data.is_none() {
      return Err(Error::NoHistory(player_id.to_string()));
    }
    Ok(history_to_records(player_id, player_name, &body))
  }
}

impl ValuationSource for MarketValueClient {
  type Error = Error;

  async fn valuation_history(&self, player_id: &str, player_name: &str) -> Result<Vec<ValuationRecord>> {
    let result = self.fetch_history(player_id, player_name).await;
    tokio::time::sleep(self.config.pacing).await;
    result
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, extract::Path, routing::get};
  use serde_json::json;
  use tokio::net::TcpListener;

  use super::*;

  fn sample() -> HistoryResponse {
    serde_json::from_value(json!({
      "success": true,
      "data": { "history": [
        { "clubId": 189, "age": 22,
          "marketValue": { "value": 1500000, "determined": "2023-01-01" } },
        { "clubId": "0", "age": null,
          "marketValue": { "value": 2000000.4, "determined": "2024-06-01T00:00:00+00:00" } },
        { "marketValue": { "value": null, "determined": "2024-12-20" } }
      ]}
    }))
    .unwrap()
  }

  #[test]
  fn maps_history_entries() {
    let records = history_to_records("42", "Juan Pérez", &sample());
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].club_id.as_deref(), Some("189"));
    assert_eq!(records[0].club_name, "Club 189");
    assert_eq!(records[0].age_at_valuation, Some(22));
    assert_eq!(records[0].valuation_amount, 1_500_000);
    assert_eq!(records[0].player_name, "Juan Pérez");

    assert_eq!(records[1].club_name, UNKNOWN_CLUB);
    assert_eq!(records[1].valuation_date, "2024-06-01");
    assert_eq!(records[1].valuation_amount, 2_000_000);
    assert_eq!(records[1].age_at_valuation, None);

    assert_eq!(records[2].club_id, None);
    assert_eq!(records[2].club_name, UNKNOWN_CLUB);
    assert_eq!(records[2].valuation_amount, 0);
  }

  #[test]
  fn unsuccessful_response_has_no_records() {
    let resp: HistoryResponse = serde_json::from_value(json!({ "success": false })).unwrap();
    assert!(history_to_records("1", "x", &resp).is_empty());
  }

  #[test]
  fn club_names() {
    assert_eq!(club_display_name(None), UNKNOWN_CLUB);
    assert_eq!(club_display_name(Some("0")), UNKNOWN_CLUB);
    assert_eq!(club_display_name(Some("5")), "Club 5");
  }

  async fn fake_api() -> String {
    let app = Router::new().route(
      "/player/{id}/market-value-history",
      get(|Path(id): Path<String>| async move {
        if id == "42" {
          Json(json!({
            "success": true,
            "data": { "history": [
              { "clubId": 5, "age": 20, "marketValue": { "value": 100, "determined": "2024-01-01" } }
            ]}
          }))
        } else {
          Json(json!({ "success": false }))
        }
      }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn client(base_url: String) -> MarketValueClient {
    MarketValueClient::new(SourceConfig {
      base_url,
      pacing: Duration::ZERO,
      ..SourceConfig::default()
    })
    .unwrap()
  }

  #[tokio::test]
  async fn fetches_history_over_http() {
    let c = client(fake_api().await);
    let records = c.valuation_history("42", "Juan").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].club_name, "Club 5");
    assert_eq!(records[0].valuation_date, "2024-01-01");
  }

  #[tokio::test]
  async fn missing_history_is_an_error() {
    let c = client(fake_api().await);
    let err = c.valuation_history("7", "Nadie").await.unwrap_err();
    assert!(matches!(err, Error::NoHistory(id) if id == "7"));
  }
}
