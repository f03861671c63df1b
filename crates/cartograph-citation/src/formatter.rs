//! [`CitationFormatter`]: rendering, verification and deduplication.

use std::{
  collections::{BTreeMap, HashSet},
  sync::Arc,
  time::Duration,
};

use cartograph_core::retrieve::SearchHit;
use chrono::NaiveDate;
use futures_util::future::join_all;
use moka::future::Cache;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{error, info};

use crate::{
  CitationStyle, Result, SourceVerification, style::render, verify::check,
};

const USER_AGENT: &str = "Cartograph-Citation-Validator/1.0 (Academic Research)";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const CACHE_CAPACITY: u64 = 10_000;
/// Characters of rendered text used to identify a citation without a URL.
const SIGNATURE_CHARS: usize = 50;

// ─── Config ──────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 { 15 }
fn default_connect_timeout_secs() -> u64 { 5 }
fn default_max_concurrent() -> usize { 10 }

/// `[citations]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct CitationConfig {
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:         u64,
  #[serde(default = "default_connect_timeout_secs")]
  pub connect_timeout_secs: u64,
  /// Simultaneous checks during bulk verification.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent:       usize,
  /// Style for citations synthesized from raw hits. Unset keeps the plain
  /// `"excerpt" from title by author, source` form.
  #[serde(default)]
  pub style:                Option<CitationStyle>,
}

impl Default for CitationConfig {
  fn default() -> Self {
    Self {
      timeout_secs:         default_timeout_secs(),
      connect_timeout_secs: default_connect_timeout_secs(),
      max_concurrent:       default_max_concurrent(),
      style:                None,
    }
  }
}

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// Bibliographic fields of one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationSource {
  pub author:                   Option<String>,
  pub title:                    Option<String>,
  pub source:                   Option<String>,
  pub url:                      Option<String>,
  pub published_date:           Option<NaiveDate>,
  pub entities:                 Vec<String>,
  /// `[0, 1]` completeness assigned by the enrichment job; 0 when unknown.
  pub attribution_completeness: f64,
  pub relevance_score:          f64,
}

impl CitationSource {
  pub fn from_hit(hit: &SearchHit) -> Self {
    let rel = &hit.relationship;
    let src = &rel.source_attribution;
    Self {
      author:                   src.author().map(str::to_owned),
      title:                    rel.display_title(),
      source:                   rel.source_name().map(str::to_owned),
      url:                      src.url().map(str::to_owned),
      published_date:           src.published_date,
      entities:                 rel.entities().into_iter().map(str::to_owned).collect(),
      attribution_completeness: rel.metadata.attribution_completeness.unwrap_or(0.0),
      relevance_score:          hit.relevance_score,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedCitation {
  pub citation:        String,
  pub style:           CitationStyle,
  pub entities:        Vec<String>,
  pub confidence:      f64,
  pub source_verified: bool,
  pub verification:    Option<SourceVerification>,
}

impl FormattedCitation {
  /// Identity used for deduplication: the verified URL, else the start of
  /// the rendered text.
  fn signature(&self) -> String {
    match &self.verification {
      Some(v) if !v.url.is_empty() => v.url.clone(),
      _ => {
        let head: String = self.citation.chars().take(SIGNATURE_CHARS).collect();
        format!("{head}...")
      }
    }
  }
}

/// `0.4 * completeness + 0.3 * field coverage + 0.15 * reachable
/// + 0.05 * https + 0.1 * domain credibility`, clamped to `[0, 1]`.
pub fn citation_confidence(
  source: &CitationSource,
  verification: Option<&SourceVerification>,
) -> f64 {
  let mut confidence = source.attribution_completeness * 0.4;

  let present = [
    source.author.is_some(),
    source.title.is_some(),
    source.published_date.is_some(),
    source.url.is_some(),
  ]
  .into_iter()
  .filter(|p| *p)
  .count();
  confidence += present as f64 * 0.25 * 0.3;

  if let Some(v) = verification {
    if v.is_accessible {
      confidence += 0.15;
    }
    if v.ssl_valid {
      confidence += 0.05;
    }
    if let Some(credibility) = v.domain_credibility {
      confidence += credibility * 0.1;
    }
  }
  confidence.clamp(0.0, 1.0)
}

/// Highest confidence first; later citations sharing a signature are dropped.
fn deduplicate(mut citations: Vec<FormattedCitation>) -> Vec<FormattedCitation> {
  citations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
  let mut seen = HashSet::new();
  citations.retain(|c| seen.insert(c.signature()));
  citations
}

// ─── Formatter ───────────────────────────────────────────────────────────────

/// Cheap to clone; the HTTP client and the verification cache are shared.
#[derive(Clone)]
pub struct CitationFormatter {
  client:         Client,
  cache:          Cache<String, SourceVerification>,
  max_concurrent: usize,
  style:          Option<CitationStyle>,
}

impl CitationFormatter {
  pub fn new(config: &CitationConfig) -> Result<Self> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
      .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
      .build()?;
    let cache = Cache::builder()
      .max_capacity(CACHE_CAPACITY)
      .time_to_live(CACHE_TTL)
      .build();
    Ok(Self {
      client,
      cache,
      max_concurrent: config.max_concurrent.max(1),
      style: config.style,
    })
  }

  /// Style configured for synthesized citations, if any.
  pub fn style(&self) -> Option<CitationStyle> { self.style }

  /// Verify `url`, reusing any result from the last hour. Concurrent calls
  /// for the same URL share one request.
  pub async fn verify(&self, url: &str) -> SourceVerification {
    let client = self.client.clone();
    let target = url.to_owned();
    self
      .cache
      .get_with(url.to_owned(), async move { check(&client, &target).await })
      .await
  }

  /// Verify many URLs concurrently, at most `max_concurrent` at a time.
  /// A check that panics is logged and left out of the map.
  pub async fn bulk_verify(&self, urls: &[String]) -> BTreeMap<String, SourceVerification> {
    info!(urls = urls.len(), limit = self.max_concurrent, "bulk verification started");
    let permits = Arc::new(Semaphore::new(self.max_concurrent));
    let mut tasks = JoinSet::new();

    let unique: HashSet<&String> = urls.iter().collect();
    for url in unique {
      let this = self.clone();
      let permits = Arc::clone(&permits);
      let url = url.clone();
      tasks.spawn(async move {
        let _permit = permits.acquire_owned().await;
        let verification = this.verify(&url).await;
        (url, verification)
      });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((url, verification)) => {
          results.insert(url, verification);
        }
        Err(e) => error!(error = %e, "verification task failed"),
      }
    }
    info!(verified = results.len(), "bulk verification finished");
    results
  }

  /// Render one citation, optionally verifying its URL first.
  pub async fn format(
    &self,
    source: &CitationSource,
    style: CitationStyle,
    verify: bool,
  ) -> FormattedCitation {
    let verification = match (&source.url, verify) {
      (Some(url), true) => Some(self.verify(url).await),
      _ => None,
    };
    FormattedCitation {
      citation: render(source, style),
      style,
      entities: source.entities.clone(),
      confidence: citation_confidence(source, verification.as_ref()),
      source_verified: verification.as_ref().is_some_and(|v| v.is_accessible),
      verification,
    }
  }

  /// Format and verify every source whose completeness reaches
  /// `min_completeness`, then deduplicate.
  pub async fn format_many(
    &self,
    sources: &[CitationSource],
    style: CitationStyle,
    min_completeness: f64,
  ) -> Vec<FormattedCitation> {
    let eligible = sources
      .iter()
      .filter(|s| min_completeness <= 0.0 || s.attribution_completeness >= min_completeness);
    let formatted = join_all(eligible.map(|s| self.format(s, style, true))).await;
    let citations = deduplicate(formatted);
    info!(requested = sources.len(), formatted = citations.len(), "citations formatted");
    citations
  }
}

#[cfg(test)]
mod tests {
  use std::{
    net::SocketAddr,
    sync::atomic::{AtomicUsize, Ordering},
  };

  use axum::{Router, http::StatusCode, routing::get};

  use super::*;

  async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
  }

  /// Accepts connections and never answers.
  async fn black_hole() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((socket, _)) = listener.accept().await {
        held.push(socket);
      }
    });
    addr
  }

  fn formatter(timeout_secs: u64) -> CitationFormatter {
    CitationFormatter::new(&CitationConfig {
      timeout_secs,
      connect_timeout_secs: 1,
      ..Default::default()
    })
    .unwrap()
  }

  fn verification(url: &str, accessible: bool) -> SourceVerification {
    SourceVerification {
      is_accessible: accessible,
      ssl_valid: url.starts_with("https"),
      domain_credibility: Some(0.98),
      ..SourceVerification::unchecked(url)
    }
  }

  fn citation(text: &str, confidence: f64, url: Option<&str>) -> FormattedCitation {
    FormattedCitation {
      citation: text.into(),
      style: CitationStyle::Apa,
      entities: Vec::new(),
      confidence,
      source_verified: false,
      verification: url.map(|u| verification(u, true)),
    }
  }

  #[test]
  fn confidence_weights() {
    let bare = CitationSource::default();
    assert_eq!(citation_confidence(&bare, None), 0.0);

    let full = CitationSource {
      author: Some("a".into()),
      title: Some("t".into()),
      url: Some("https://npr.org/x".into()),
      published_date: NaiveDate::from_ymd_opt(2020, 1, 1),
      attribution_completeness: 1.0,
      ..Default::default()
    };
    let v = verification("https://npr.org/x", true);
    let expected = 0.4 + 0.3 + 0.15 + 0.05 + 0.098;
    assert!((citation_confidence(&full, Some(&v)) - expected).abs() < 1e-9);

    let half = CitationSource { author: Some("a".into()), title: Some("t".into()), ..bare };
    assert!((citation_confidence(&half, None) - 0.15).abs() < 1e-9);
  }

  #[test]
  fn dedup_keeps_most_confident_per_url() {
    let kept = deduplicate(vec![
      citation("low", 0.2, Some("https://npr.org/x")),
      citation("high", 0.9, Some("https://npr.org/x")),
      citation("other", 0.5, Some("https://bbc.com/y")),
    ]);
    let texts: Vec<&str> = kept.iter().map(|c| c.citation.as_str()).collect();
    assert_eq!(texts, vec!["high", "other"]);
  }

  #[test]
  fn dedup_without_url_uses_text_prefix() {
    let prefix = "x".repeat(50);
    let kept = deduplicate(vec![
      citation(&format!("{prefix}AAA"), 0.4, None),
      citation(&format!("{prefix}BBB"), 0.6, None),
      citation("short", 0.1, None),
    ]);
    assert_eq!(kept.len(), 2);
    assert!(kept[0].citation.ends_with("BBB"));
  }

  #[tokio::test]
  async fn invalid_url_is_recorded_not_raised() {
    let v = formatter(1).verify("notaurl").await;
    assert!(!v.is_accessible);
    assert_eq!(v.error_message.as_deref(), Some("Invalid URL format"));
    assert_eq!(v.status_code, None);
  }

  #[tokio::test]
  async fn head_rejection_falls_back_to_get() {
    let router = Router::new().route(
      "/article",
      get(|| async { "ok" }).head(|| async { StatusCode::METHOD_NOT_ALLOWED }),
    );
    let addr = serve(router).await;
    let v = formatter(5).verify(&format!("http://{addr}/article")).await;
    assert!(v.is_accessible);
    assert_eq!(v.status_code, Some(200));
    assert!(!v.ssl_valid);
    assert_eq!(v.domain_credibility, Some(0.5));
  }

  #[tokio::test]
  async fn not_found_is_inaccessible() {
    let addr = serve(Router::new()).await;
    let v = formatter(5).verify(&format!("http://{addr}/missing")).await;
    assert!(!v.is_accessible);
    assert_eq!(v.status_code, Some(404));
  }

  #[tokio::test]
  async fn results_are_cached() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().route(
      "/a",
      get(move || {
        let counter = Arc::clone(&counter);
        async move {
          counter.fetch_add(1, Ordering::SeqCst);
          "ok"
        }
      }),
    );
    let addr = serve(router).await;
    let f = formatter(5);
    let url = format!("http://{addr}/a");
    let first = f.verify(&url).await;
    let second = f.verify(&url).await;
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn bulk_verify_isolates_timeouts() {
    let ok = serve(Router::new().route("/a", get(|| async { "a" })).route("/b", get(|| async { "b" }))).await;
    let hole = black_hole().await;
    let urls = vec![
      format!("http://{ok}/a"),
      format!("http://{hole}/slow"),
      format!("http://{ok}/b"),
    ];

    let results = formatter(1).bulk_verify(&urls).await;

    assert_eq!(results.len(), 3);
    for url in &urls {
      assert!(results.contains_key(url));
    }
    let slow = &results[&urls[1]];
    assert!(!slow.is_accessible);
    assert!(slow.error_message.is_some());
    assert!(results[&urls[0]].is_accessible);
    assert!(results[&urls[2]].is_accessible);
  }

  #[tokio::test]
  async fn format_many_filters_and_dedupes() {
    let f = formatter(1);
    let sources = vec![
      CitationSource {
        title: Some("A".into()),
        url: Some("notaurl".into()),
        attribution_completeness: 0.9,
        ..Default::default()
      },
      CitationSource {
        title: Some("A again".into()),
        url: Some("notaurl".into()),
        attribution_completeness: 0.8,
        ..Default::default()
      },
      CitationSource {
        title: Some("Thin".into()),
        attribution_completeness: 0.1,
        ..Default::default()
      },
    ];

    let all = f.format_many(&sources, CitationStyle::Basic, 0.0).await;
    assert_eq!(all.len(), 2);
    assert!(all[0].citation.starts_with("\"A\""));

    let strict = f.format_many(&sources, CitationStyle::Basic, 0.5).await;
    assert_eq!(strict.len(), 1);
  }
}
