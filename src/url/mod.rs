//! URL handling module for Sumi-Scribe
//!
//! This module provides seed parsing, link resolution and the same-host check
//! that scopes a crawl to a single site.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_host};
pub use normalize::{canonicalize_link, parse_seed};
