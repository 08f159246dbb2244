//! Canonical extension tokens and ordered extension sets.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// A lower-case extension beginning with a single dot, e.g. `.pdf` or the
/// composite `.tar.gz`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ExtensionToken(String);

impl ExtensionToken {
    /// Wraps an already canonical body (no leading dot, lower case, non-empty).
    pub(crate) fn from_body(body: &str) -> Self {
        Self(format!(".{body}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token without its leading dot, as shown to users.
    pub fn without_dot(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for ExtensionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtensionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An ordered, duplicate-free set of [`ExtensionToken`]s.
///
/// `Display` renders the clean form: dots stripped, joined by `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtensionSpec {
    tokens: Vec<ExtensionToken>,
}

impl ExtensionSpec {
    /// Keeps the first occurrence of each token.
    pub(crate) fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = ExtensionToken>,
    {
        let mut seen = HashSet::new();
        let tokens = tokens
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Self { tokens }
    }

    /// Exact membership test. `token` must include its leading dot.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t.as_str() == token)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionToken> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_vec(self) -> Vec<ExtensionToken> {
        self.tokens
    }
}

impl fmt::Display for ExtensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(token.without_dot())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ExtensionSpec {
    type Item = &'a ExtensionToken;
    type IntoIter = std::slice::Iter<'a, ExtensionToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Anything an extension list can be typed as: one free-form string or a
/// list of them.
pub trait ExtensionSource {
    fn fragments(&self) -> Vec<&str>;
}

impl ExtensionSource for str {
    fn fragments(&self) -> Vec<&str> {
        vec![self]
    }
}

impl ExtensionSource for String {
    fn fragments(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<S: AsRef<str>> ExtensionSource for [S] {
    fn fragments(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<S: AsRef<str>, const N: usize> ExtensionSource for [S; N] {
    fn fragments(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<S: AsRef<str>> ExtensionSource for Vec<S> {
    fn fragments(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl ExtensionSource for ExtensionSpec {
    fn fragments(&self) -> Vec<&str> {
        self.tokens.iter().map(ExtensionToken::as_str).collect()
    }
}
