//! Mention and hashtag scanning over free-form post text.
//!
//! Pure text processing: finite, re-runnable, no side effects. Hashtags
//! feed the competition-lookup collaborator; only mentions enter the
//! notification pipeline.

use std::collections::HashSet;

use crate::identity::normalize_handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Mention,
  Hashtag,
}

/// A candidate token extracted from content. Transient: consumed by the
/// notification pipeline and discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  /// The token text after the sigil, up to the next whitespace.
  pub body: String,
  /// Byte offset of the sigil within the scanned text.
  pub offset: usize,
}

/// Scan `text` for `@`-mentions and `#`-hashtags.
///
/// A token starts at a sigil that is either the first character of the
/// text or immediately preceded by whitespace, so e-mail-like strings do
/// not match. The body runs from just after the sigil to the next
/// whitespace character or the end of the text; empty bodies (a bare
/// trailing sigil) are discarded.
pub fn scan(text: &str) -> Vec<Token> {
  let mut tokens = Vec::new();
  let mut at_word_start = true;
  let mut current: Option<(TokenKind, usize, String)> = None;

  for (i, c) in text.char_indices() {
    if c.is_whitespace() {
      flush(&mut current, &mut tokens);
      at_word_start = true;
      continue;
    }
    if at_word_start {
      at_word_start = false;
      match c {
        '@' => current = Some((TokenKind::Mention, i, String::new())),
        '#' => current = Some((TokenKind::Hashtag, i, String::new())),
        _ => {}
      }
      continue;
    }
    if let Some((_, _, body)) = current.as_mut() {
      body.push(c);
    }
  }
  flush(&mut current, &mut tokens);
  tokens
}

fn flush(current: &mut Option<(TokenKind, usize, String)>, tokens: &mut Vec<Token>) {
  if let Some((kind, offset, body)) = current.take()
    && !body.is_empty()
  {
    tokens.push(Token { kind, body, offset });
  }
}

/// Distinct mention handles in `text`, case-insensitively deduplicated,
/// in order of first appearance. Returns the first-seen spelling; handle
/// resolution is case-insensitive anyway.
pub fn mention_handles(text: &str) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut handles = Vec::new();
  for token in scan(text) {
    if token.kind != TokenKind::Mention {
      continue;
    }
    if seen.insert(normalize_handle(&token.body)) {
      handles.push(token.body);
    }
  }
  handles
}

// ─── Tests ───────────────────────────────────────────────────────────────────
