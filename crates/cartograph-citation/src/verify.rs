//! Single-URL reachability checks.

use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response, StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credibility::{domain_credibility, is_listed, is_valid_url};

/// Outcome of checking one URL. Failures are recorded, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVerification {
  pub url:                String,
  /// `200 <= status < 400` after following redirects.
  pub is_accessible:      bool,
  pub status_code:        Option<u16>,
  pub last_checked:       DateTime<Utc>,
  /// Final URL when the request was redirected.
  pub redirect_url:       Option<String>,
  pub domain_credibility: Option<f64>,
  pub ssl_valid:          bool,
  pub error_message:      Option<String>,
}

impl SourceVerification {
  pub(crate) fn unchecked(url: &str) -> Self {
    Self {
      url:                url.to_owned(),
      is_accessible:      false,
      status_code:        None,
      last_checked:       Utc::now(),
      redirect_url:       None,
      domain_credibility: None,
      ssl_valid:          false,
      error_message:      None,
    }
  }
}

fn describe(error: &reqwest::Error) -> String {
  if error.is_timeout() {
    "Request timeout - server may be slow or unresponsive".to_owned()
  } else {
    format!("Client error: {error}")
  }
}

fn record_response(verification: &mut SourceVerification, response: &Response) {
  let status = response.status();
  verification.status_code = Some(status.as_u16());
  verification.is_accessible = (200..400).contains(&status.as_u16());

  let requested = Url::parse(&verification.url).ok();
  let final_url = response.url().as_str();
  if requested.as_ref() != Some(response.url()) {
    verification.redirect_url = Some(final_url.to_owned());
    if !is_valid_url(final_url) {
      verification.error_message = Some("Redirected to invalid URL".to_owned());
      verification.is_accessible = false;
    }
  }

  if verification.is_accessible {
    let content_type = response
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_lowercase();
    if !["text/html", "text/plain", "application/xhtml"]
      .iter()
      .any(|ct| content_type.contains(ct))
    {
      debug!(url = %verification.url, content_type = %content_type, "unusual content type");
    }
  }
}

/// Check `url` with a HEAD request, retrying as GET when the server rejects
/// the method. Uncached.
pub(crate) async fn check(client: &Client, url: &str) -> SourceVerification {
  let mut verification = SourceVerification::unchecked(url);

  if !is_valid_url(url) {
    verification.error_message = Some("Invalid URL format".to_owned());
    return verification;
  }

  verification.domain_credibility = Some(domain_credibility(url));
  verification.ssl_valid = Url::parse(url).is_ok_and(|u| u.scheme() == "https");
  if !verification.ssl_valid && is_listed(url) {
    warn!(url, "high-credibility domain not using https");
  }

  let started = Instant::now();
  let mut result = client.request(Method::HEAD, url).send().await;
  if let Ok(resp) = &result {
    if matches!(
      resp.status(),
      StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    ) {
      debug!(url, "HEAD rejected, retrying with GET");
      result = client.get(url).send().await;
    }
  }

  match result {
    Ok(resp) => record_response(&mut verification, &resp),
    Err(e) => {
      warn!(url, error = %e, "source verification failed");
      verification.error_message = Some(describe(&e));
    }
  }

  let elapsed = started.elapsed();
  if elapsed.as_secs_f64() > 5.0 {
    info!(url, elapsed_secs = elapsed.as_secs_f64(), "slow source response");
  }
  verification
}
