//! Citation styles and their string templates.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::formatter::CitationSource;

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString,
  AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CitationStyle {
  #[default]
  Apa,
  Mla,
  Chicago,
  Ieee,
  Harvard,
  Basic,
}

/// Render `source` in `style`, stamping web access with today's date.
pub fn render(source: &CitationSource, style: CitationStyle) -> String {
  render_at(source, style, Local::now().date_naive())
}

/// Render `source` in `style` with an explicit access date. Missing fields
/// read "Unknown Author", "Untitled" and "Unknown Source".
pub fn render_at(
  source: &CitationSource,
  style: CitationStyle,
  accessed: NaiveDate,
) -> String {
  let author = source.author.as_deref().unwrap_or("Unknown Author");
  let title = source.title.as_deref().unwrap_or("Untitled");
  let publisher = source.source.as_deref().unwrap_or("Unknown Source");
  let url = source.url.as_deref();
  let date = source.published_date;
  let year = date
    .map(|d| format!("({})", d.year()))
    .unwrap_or_else(|| "(n.d.)".to_owned());

  let mut citation = match style {
    CitationStyle::Apa => {
      let mut c = format!("{author} {year}. {title}. {publisher}.");
      if let Some(url) = url {
        c.push_str(&format!(" Retrieved from {url}"));
      }
      c
    }
    CitationStyle::Mla => {
      let mut c = format!("{author}. \"{title}.\" {publisher}");
      if let Some(d) = date {
        c.push_str(&format!(", {}", d.format("%d %b %Y")));
      }
      c.push('.');
      if url.is_some() {
        c.push_str(&format!(" Web. {}.", accessed.format("%d %b %Y")));
      }
      c
    }
    CitationStyle::Chicago => {
      let mut c = format!("{author}. \"{title}.\" {publisher}");
      if let Some(d) = date {
        c.push_str(&format!(", {}", d.format("%B %d, %Y")));
      }
      c.push('.');
      if let Some(url) = url {
        c.push_str(&format!(" {url}."));
      }
      c
    }
    CitationStyle::Ieee => {
      let mut c = format!("{author}, \"{title},\" {publisher}");
      if let Some(d) = date {
        c.push_str(&format!(", {}", d.year()));
      }
      c.push('.');
      if let Some(url) = url {
        c.push_str(&format!(" [Online]. Available: {url}"));
      }
      c
    }
    CitationStyle::Harvard => {
      let mut c = format!("{author} {year} '{title}', {publisher}");
      if let Some(url) = url {
        c.push_str(&format!(", viewed {}, <{url}>", accessed.format("%d %B %Y")));
      }
      c.push('.');
      c
    }
    CitationStyle::Basic => {
      let mut c = format!("\"{title}\" by {author}, {publisher}");
      if let Some(url) = url {
        c.push_str(&format!(" - {url}"));
      }
      c
    }
  };

  if !source.entities.is_empty() {
    let mentions: Vec<&str> = source.entities.iter().take(3).map(String::as_str).collect();
    citation.push_str(&format!(" [Mentions: {}]", mentions.join(", ")));
  }
  citation
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full() -> CitationSource {
    CitationSource {
      author: Some("Ann Powers".into()),
      title: Some("The Folk Revival".into()),
      source: Some("NPR".into()),
      url: Some("https://npr.org/x".into()),
      published_date: NaiveDate::from_ymd_opt(2021, 3, 4),
      entities: vec!["Bob Dylan".into(), "Woody Guthrie".into()],
      ..Default::default()
    }
  }

  fn accessed() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 5, 6).unwrap() }

  #[test]
  fn apa() {
    assert_eq!(
      render_at(&full(), CitationStyle::Apa, accessed()),
      "Ann Powers (2021). The Folk Revival. NPR. Retrieved from https://npr.org/x \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn mla() {
    assert_eq!(
      render_at(&full(), CitationStyle::Mla, accessed()),
      "Ann Powers. \"The Folk Revival.\" NPR, 04 Mar 2021. Web. 06 May 2024. \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn chicago() {
    assert_eq!(
      render_at(&full(), CitationStyle::Chicago, accessed()),
      "Ann Powers. \"The Folk Revival.\" NPR, March 04, 2021. https://npr.org/x. \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn ieee() {
    assert_eq!(
      render_at(&full(), CitationStyle::Ieee, accessed()),
      "Ann Powers, \"The Folk Revival,\" NPR, 2021. [Online]. Available: https://npr.org/x \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn harvard() {
    assert_eq!(
      render_at(&full(), CitationStyle::Harvard, accessed()),
      "Ann Powers (2021) 'The Folk Revival', NPR, viewed 06 May 2024, <https://npr.org/x>. \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn basic() {
    assert_eq!(
      render_at(&full(), CitationStyle::Basic, accessed()),
      "\"The Folk Revival\" by Ann Powers, NPR - https://npr.org/x \
       [Mentions: Bob Dylan, Woody Guthrie]"
    );
  }

  #[test]
  fn missing_fields_use_placeholders() {
    let empty = CitationSource::default();
    assert_eq!(
      render_at(&empty, CitationStyle::Apa, accessed()),
      "Unknown Author (n.d.). Untitled. Unknown Source."
    );
    assert_eq!(
      render_at(&empty, CitationStyle::Basic, accessed()),
      "\"Untitled\" by Unknown Author, Unknown Source"
    );
  }

  #[test]
  fn mentions_cap_at_three() {
    let source = CitationSource {
      entities: vec!["A".into(), "B".into(), "C".into(), "D".into()],
      ..Default::default()
    };
    assert!(render_at(&source, CitationStyle::Basic, accessed()).ends_with("[Mentions: A, B, C]"));
  }

  #[test]
  fn style_parses_case_insensitively() {
    assert_eq!("APA".parse::<CitationStyle>().unwrap(), CitationStyle::Apa);
    assert_eq!("harvard".parse::<CitationStyle>().unwrap(), CitationStyle::Harvard);
    assert_eq!(CitationStyle::Ieee.to_string(), "ieee");
  }
}
