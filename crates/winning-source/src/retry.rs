//! Retry with exponential backoff for upstream GET requests.
//!
//! A request is retried when the connection fails or the status is one of
//! [`RetryPolicy::statuses`]. The wait before retry `n` (1-based) is
//! `backoff * 2^(n-1)`: 2 s, 4 s, 8 s with the defaults.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Retries after the first attempt.
  pub max_retries: u32,
  pub backoff:     Duration,
  /// Statuses worth retrying.
  pub statuses:    Vec<u16>,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 3,
      backoff:     Duration::from_secs(2),
      statuses:    vec![429, 500, 502, 503, 504],
    }
  }
}

impl RetryPolicy {
  /// Wait before retry `retry` (1-based).
  pub fn delay(&self, retry: u32) -> Duration {
    self.backoff * 2u32.saturating_pow(retry.saturating_sub(1))
  }

  pub fn is_retryable(&self, status: u16) -> bool { self.statuses.contains(&status) }

  /// Send the request built by `build`, retrying per policy. The last
  /// response is returned whatever its status; only a connection failure on
  /// the final attempt is an error.
  pub async fn send<F>(&self, url: &str, build: F) -> Result<Response>
  where
    F: Fn() -> RequestBuilder,
  {
    let mut retry = 0;
    loop {
      let outcome = build().send().await;
      let retryable = match &outcome {
        Ok(resp) => self.is_retryable(resp.status().as_u16()),
        Err(e) => e.is_connect() || e.is_timeout(),
      };
      if !retryable || retry >= self.max_retries {
        return Ok(outcome?);
      }

      retry += 1;
      let wait = self.delay(retry);
      match &outcome {
        Ok(resp) => tracing::warn!(url, status = resp.status().as_u16(), retry, ?wait, "retrying"),
        Err(e) => tracing::warn!(url, error = %e, retry, ?wait, "retrying"),
      }
      tokio::time::sleep(wait).await;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{Router, http::StatusCode, routing::get};
  use tokio::net::TcpListener;

  use super::*;

  #[test]
  fn default_backoff_doubles() {
    let p = RetryPolicy::default();
    assert_eq!(p.delay(1), Duration::from_secs(2));
    assert_eq!(p.delay(2), Duration::from_secs(4));
    assert_eq!(p.delay(3), Duration::from_secs(8));
  }

  #[test]
  fn retryable_statuses() {
    let p = RetryPolicy::default();
    assert!(p.is_retryable(429));
    assert!(p.is_retryable(503));
    assert!(!p.is_retryable(404));
    assert!(!p.is_retryable(200));
  }

  /// Serves `status` for the first `failures` requests, then 200.
  async fn flaky(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
      "/",
      get(move || {
        let counter = counter.clone();
        async move {
          if counter.fetch_add(1, Ordering::SeqCst) < failures {
            (status, "busy")
          } else {
            (StatusCode::OK, "ok")
          }
        }
      }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/"), hits)
  }

  fn fast() -> RetryPolicy {
    RetryPolicy { backoff: Duration::from_millis(1), ..RetryPolicy::default() }
  }

  #[tokio::test]
  async fn retries_until_success() {
    let (url, hits) = flaky(2, StatusCode::SERVICE_UNAVAILABLE).await;
    let client = reqwest::Client::new();
    let resp = fast().send(&url, || client.get(&url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn gives_up_after_max_retries() {
    let (url, hits) = flaky(10, StatusCode::TOO_MANY_REQUESTS).await;
    let client = reqwest::Client::new();
    let resp = fast().send(&url, || client.get(&url)).await.unwrap();
    assert_eq!(resp.status(), 429);
    assert_eq!(hits.load(Ordering::SeqCst), 4);
  }

  #[tokio::test]
  async fn other_statuses_are_not_retried() {
    let (url, hits) = flaky(10, StatusCode::NOT_FOUND).await;
    let client = reqwest::Client::new();
    let resp = fast().send(&url, || client.get(&url)).await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }
}
