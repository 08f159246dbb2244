//! Tokenizer pipeline turning a typed extension list into an [`ExtensionSpec`].
//!
//! split -> strip wildcard prefix -> canonicalize -> charset check -> dedupe.
//! Each stage is a small function so it can be tested on its own.

use serde::{Deserialize, Serialize};

use crate::filetypes::token::{ExtensionSource, ExtensionSpec, ExtensionToken};

/// Characters allowed inside an extension token (after the leading dot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenCharset {
    /// Anything that is not a separator or a wildcard meta character.
    #[default]
    Any,
    /// ASCII alphanumerics, `.`, and the listed extra characters.
    Restricted {
        #[serde(default)]
        extra: Vec<char>,
    },
}

impl TokenCharset {
    /// Checks a canonical body (no leading dot).
    pub fn accepts(&self, body: &str) -> bool {
        if body.contains(is_wildcard) {
            return false;
        }
        match self {
            TokenCharset::Any => true,
            TokenCharset::Restricted { extra } => body
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || extra.contains(&c)),
        }
    }
}

pub(crate) fn is_separator(c: char) -> bool {
    matches!(c, ',' | ';' | ':' | '"' | '\'') || c.is_whitespace()
}

fn is_wildcard(c: char) -> bool {
    matches!(c, '*' | '?')
}

/// Splits free-form input into raw tokens, dropping empty pieces.
pub(crate) fn split_tokens(input: &str) -> impl Iterator<Item = &str> {
    input.split(is_separator).filter(|t| !t.is_empty())
}

/// Strips one leading `*.` or `*`.
pub(crate) fn strip_wildcard_prefix(token: &str) -> &str {
    token
        .strip_prefix("*.")
        .or_else(|| token.strip_prefix('*'))
        .unwrap_or(token)
}

/// Lower-cases and drops all leading dots, returning the body.
/// `None` when nothing but dots remains.
pub(crate) fn canonical_body(token: &str) -> Option<String> {
    let lower = token.to_lowercase();
    let body = lower.trim_start_matches('.');
    (!body.is_empty()).then(|| body.to_string())
}

/// Runs the full pipeline over every fragment of `source`.
pub fn normalize_with<T>(source: &T, charset: &TokenCharset) -> ExtensionSpec
where
    T: ExtensionSource + ?Sized,
{
    let tokens = source
        .fragments()
        .into_iter()
        .flat_map(split_tokens)
        .map(strip_wildcard_prefix)
        .filter_map(canonical_body)
        .filter(|body| charset.accepts(body))
        .map(|body| ExtensionToken::from_body(&body));

    ExtensionSpec::from_tokens(tokens)
}

/// Canonical bodies of `source` that `charset` turns away, in input order.
pub(crate) fn rejected_bodies<T>(source: &T, charset: &TokenCharset) -> Vec<String>
where
    T: ExtensionSource + ?Sized,
{
    source
        .fragments()
        .into_iter()
        .flat_map(split_tokens)
        .map(strip_wildcard_prefix)
        .filter_map(canonical_body)
        .filter(|body| !charset.accepts(body))
        .collect()
}
