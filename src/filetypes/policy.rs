use tracing::{debug, warn};

use crate::filetypes::normalize::{TokenCharset, normalize_with, rejected_bodies};
use crate::filetypes::token::{ExtensionSource, ExtensionSpec, ExtensionToken};

/// An instructor-defined file-type policy, parameterized by the token charset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionPolicy {
    charset: TokenCharset,
}

impl ExtensionPolicy {
    pub fn new(charset: TokenCharset) -> Self {
        Self { charset }
    }

    /// Parses a free-form extension list into its canonical set.
    pub fn normalize<T>(&self, spec: &T) -> ExtensionSpec
    where
        T: ExtensionSource + ?Sized,
    {
        normalize_with(spec, &self.charset)
    }

    /// Tokens of `spec` that the charset drops during normalization.
    pub fn rejected<T>(&self, spec: &T) -> Vec<String>
    where
        T: ExtensionSource + ?Sized,
    {
        rejected_bodies(spec, &self.charset)
    }

    /// Canonical echo of a typed list, e.g. `"doc, jpg, tar.gz"`.
    pub fn clean<T>(&self, spec: &T) -> String
    where
        T: ExtensionSource + ?Sized,
    {
        self.normalize(spec).to_string()
    }

    /// Tokens of `subject` that `allowed` does not contain, in `subject` order.
    ///
    /// An `allowed` list that normalizes to nothing accepts nothing.
    pub fn invalid<S, A>(&self, subject: &S, allowed: &A) -> Vec<ExtensionToken>
    where
        S: ExtensionSource + ?Sized,
        A: ExtensionSource + ?Sized,
    {
        let allowed = self.normalize(allowed);
        self.normalize(subject)
            .into_vec()
            .into_iter()
            .filter(|t| !allowed.contains(t.as_str()))
            .collect()
    }

    /// Whether `filename` ends in one of the `allowed` extensions.
    ///
    /// An `allowed` list that normalizes to nothing imposes no restriction.
    /// When the charset is what emptied it, a warning is logged.
    ///
    /// Every dot-delimited suffix is a candidate, so `a.tar.gz` matches either
    /// `gz` or `tar.gz`. Suffixes are compared exactly after case folding:
    /// `x.odt~` does not match `odt`.
    pub fn is_allowed<A>(&self, filename: &str, allowed: &A) -> bool
    where
        A: ExtensionSource + ?Sized,
    {
        let spec = self.normalize(allowed);
        if spec.is_empty() {
            let rejected = self.rejected(allowed);
            if !rejected.is_empty() {
                warn!(
                    filename,
                    rejected = ?rejected,
                    "No allowed extension passed the charset, file types are unrestricted"
                );
            }
            return true;
        }

        let name = filename.to_lowercase();
        let matched = suffix_candidates(&name).find(|candidate| spec.contains(candidate));
        debug!(filename, allowed = %spec, matched = ?matched, "File type checked");
        matched.is_some()
    }
}

/// Dot-delimited suffixes from the rightmost dot leftward:
/// `a.tar.gz` gives `.gz`, then `.tar.gz`.
pub fn suffix_candidates(filename: &str) -> impl Iterator<Item = &str> {
    filename.rmatch_indices('.').map(move |(i, _)| &filename[i..])
}

/// [`ExtensionPolicy::normalize`] with the default charset.
pub fn normalize_extensions<T>(spec: &T) -> ExtensionSpec
where
    T: ExtensionSource + ?Sized,
{
    ExtensionPolicy::default().normalize(spec)
}

/// [`ExtensionPolicy::clean`] with the default charset.
pub fn clean_extensions<T>(spec: &T) -> String
where
    T: ExtensionSource + ?Sized,
{
    ExtensionPolicy::default().clean(spec)
}

/// [`ExtensionPolicy::invalid`] with the default charset.
pub fn invalid_extensions<S, A>(subject: &S, allowed: &A) -> Vec<ExtensionToken>
where
    S: ExtensionSource + ?Sized,
    A: ExtensionSource + ?Sized,
{
    ExtensionPolicy::default().invalid(subject, allowed)
}

/// [`ExtensionPolicy::is_allowed`] with the default charset.
pub fn is_allowed_file_type<A>(filename: &str, allowed: &A) -> bool
where
    A: ExtensionSource + ?Sized,
{
    ExtensionPolicy::default().is_allowed(filename, allowed)
}
