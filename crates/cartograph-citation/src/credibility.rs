//! Publisher credibility and URL sanity checks.

use reqwest::Url;

/// Score for any domain missing from [`CREDIBLE_DOMAINS`].
pub const DEFAULT_CREDIBILITY: f64 = 0.50;

const CREDIBLE_DOMAINS: &[(&str, f64)] = &[
  ("npr.org", 0.98),
  ("bbc.com", 0.96),
  ("pitchfork.com", 0.95),
  ("nytimes.com", 0.95),
  ("reuters.com", 0.94),
  ("washingtonpost.com", 0.93),
  ("theguardian.com", 0.92),
  ("rollingstone.com", 0.90),
  ("billboard.com", 0.88),
  ("allmusic.com", 0.85),
  ("discogs.com", 0.80),
  ("wikipedia.org", 0.75),
  ("genius.com", 0.70),
  ("last.fm", 0.65),
];

fn host_of(url: &str) -> Option<String> {
  let parsed = Url::parse(url).ok()?;
  let host = parsed.host_str()?.to_lowercase();
  Some(host.strip_prefix("www.").map(str::to_owned).unwrap_or(host))
}

/// Whether the host of `url` appears in the credibility table.
pub(crate) fn is_listed(url: &str) -> bool {
  host_of(url).is_some_and(|host| CREDIBLE_DOMAINS.iter().any(|(d, _)| *d == host))
}

/// Credibility in `[0.5, 0.98]` for the host of `url`. A leading `www.` is
/// ignored; unparseable URLs get the default.
pub fn domain_credibility(url: &str) -> f64 {
  host_of(url)
    .and_then(|host| {
      CREDIBLE_DOMAINS
        .iter()
        .find(|(domain, _)| *domain == host)
        .map(|(_, score)| *score)
    })
    .unwrap_or(DEFAULT_CREDIBILITY)
}

/// `http`/`https`, a dotted host, and no quote or angle-bracket characters.
pub fn is_valid_url(url: &str) -> bool {
  if url.contains(['<', '>', '"', '\'']) {
    return false;
  }
  let Ok(parsed) = Url::parse(url) else {
    return false;
  };
  matches!(parsed.scheme(), "http" | "https")
    && parsed.host_str().is_some_and(|host| host.contains('.'))
}
