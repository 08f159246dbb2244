//! File-type policy for uploaded artifacts.
//!
//! Teachers type the allowed extensions free-form ("doc, *.PDF; tar.gz").
//! [`ExtensionPolicy`] canonicalizes such lists and matches filenames against
//! them, keeping composite extensions like `.tar.gz` whole. An empty list
//! means "no restriction".

pub mod normalize;
pub mod policy;
pub mod token;

pub use normalize::TokenCharset;
pub use policy::{
    ExtensionPolicy, clean_extensions, invalid_extensions, is_allowed_file_type,
    normalize_extensions, suffix_candidates,
};
pub use token::{ExtensionSource, ExtensionSpec, ExtensionToken};
