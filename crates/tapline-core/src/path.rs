//! # Source identifiers
//!
//! The front end names files with native paths (`C:\app\src\a.cfm`) or URIs,
//! while the remote debuggee names them with `/`-separated identifiers
//! without an extension (`C:/app/src/a`). [`normalize`] maps the former onto
//! the latter; it is applied to breakpoint paths and source lookups alike.
//!
//! The remote debuggee stays authoritative: when it answers with its own
//! identifier for a file, that identifier wins over the normalized one.

use once_cell::sync::Lazy;
use regex::Regex;

static EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\w+$").expect("extension pattern is valid"));

/// Canonicalize a path or URI into the remote debuggee's identifier scheme.
///
/// Every `\` becomes `/`, then one trailing extension (`.` followed by word
/// characters at the very end) is removed.
///
/// ```rust
/// use tapline_core::path::normalize;
///
/// assert_eq!(normalize("src\\a.cf"), "src/a");
/// assert_eq!(normalize("file:///srv/app/index.cfm"), "file:///srv/app/index");
/// ```
#[must_use]
pub fn normalize(path: &str) -> String
{
    let unified = path.replace('\\', "/");
    EXTENSION.replace(&unified, "").into_owned()
}
