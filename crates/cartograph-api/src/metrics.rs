//! Process-wide query counters reported by `/stats` and `/health`.

use std::sync::{
  Mutex, PoisonError,
  atomic::{AtomicU64, Ordering},
};

use cartograph_core::response::{QueryResponse, ResponseMode};
use serde::Serialize;

/// Shape of the most recent answered query.
#[derive(Debug, Clone, Serialize)]
pub struct LastQuery {
  pub mode:                 ResponseMode,
  pub query_time_ms:        u64,
  pub search_results_count: usize,
  pub sources_count:        usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
  pub total_queries:            u64,
  /// Answered with a synthesized narrative (`full` or `enhanced`).
  pub successful_queries:       u64,
  pub fallback_queries:         u64,
  pub empty_queries:            u64,
  /// Rejected or unanswerable requests.
  pub failed_queries:           u64,
  pub average_response_time_ms: f64,
  pub last_query:               Option<LastQuery>,
}

#[derive(Debug, Default)]
pub struct QueryMetrics {
  total:      AtomicU64,
  successful: AtomicU64,
  fallback:   AtomicU64,
  empty:      AtomicU64,
  failed:     AtomicU64,
  /// Summed over answered queries only.
  elapsed_ms: AtomicU64,
  last:       Mutex<Option<LastQuery>>,
}

impl QueryMetrics {
  pub fn record(&self, response: &QueryResponse) {
    self.total.fetch_add(1, Ordering::Relaxed);
    self.elapsed_ms.fetch_add(response.query_time_ms, Ordering::Relaxed);
    let counter = match response.mode() {
      ResponseMode::Full | ResponseMode::Enhanced => &self.successful,
      ResponseMode::Fallback => &self.fallback,
      ResponseMode::Empty => &self.empty,
    };
    counter.fetch_add(1, Ordering::Relaxed);

    let last = LastQuery {
      mode:                 response.mode(),
      query_time_ms:        response.query_time_ms,
      search_results_count: response.stats.search_results_count,
      sources_count:        response.stats.sources_count,
    };
    *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(last);
  }

  pub fn record_failure(&self) {
    self.total.fetch_add(1, Ordering::Relaxed);
    self.failed.fetch_add(1, Ordering::Relaxed);
  }

  pub fn snapshot(&self) -> MetricsSnapshot {
    let total = self.total.load(Ordering::Relaxed);
    let failed = self.failed.load(Ordering::Relaxed);
    let answered = total.saturating_sub(failed);
    let elapsed = self.elapsed_ms.load(Ordering::Relaxed);
    MetricsSnapshot {
      total_queries:            total,
      successful_queries:       self.successful.load(Ordering::Relaxed),
      fallback_queries:         self.fallback.load(Ordering::Relaxed),
      empty_queries:            self.empty.load(Ordering::Relaxed),
      failed_queries:           failed,
      average_response_time_ms: if answered == 0 { 0.0 } else { elapsed as f64 / answered as f64 },
      last_query:               self.last.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    }
  }
}
