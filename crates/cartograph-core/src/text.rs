//! Small text helpers shared by the narrative renderers.

/// Cut `text` to at most `max` characters, appending `...` when anything was
/// removed. Counts characters, not bytes.
pub fn excerpt(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((idx, _)) => format!("{}...", &text[..idx]),
    None => text.to_owned(),
  }
}

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: usize) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn excerpt_counts_characters() {
    assert_eq!(excerpt("abcdef", 3), "abc...");
    assert_eq!(excerpt("abc", 3), "abc");
    assert_eq!(excerpt("Björk Björk", 5), "Björk...");
  }

  #[test]
  fn thousands_groups_digits() {
    assert_eq!(thousands(0), "0");
    assert_eq!(thousands(999), "999");
    assert_eq!(thousands(1000), "1,000");
    assert_eq!(thousands(1234567), "1,234,567");
  }
}
