//! Bibliographic citations for cartograph sources.
//!
//! Renders a source in one of six styles, checks that its URL is reachable,
//! scores publisher credibility from a fixed table and combines those into a
//! per-citation confidence. Verification results are cached for an hour.
//!
//! Verification never fails outward: every network or parse problem ends up
//! in [`SourceVerification::error_message`].

mod credibility;
mod formatter;
mod style;
mod verify;

pub mod error;

pub use credibility::{DEFAULT_CREDIBILITY, domain_credibility, is_valid_url};
pub use error::{Error, Result};
pub use formatter::{
  CitationConfig, CitationFormatter, CitationSource, FormattedCitation,
  citation_confidence,
};
pub use style::{CitationStyle, render, render_at};
pub use verify::SourceVerification;
