//! URL and path helpers.

use std::borrow::Cow;

use url::Url;

use crate::error::DavResult;

/// Joins `parent` and `child` with exactly one `/` between them.
pub fn glue(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    format!("{}/{}", parent, child)
}

/// Resolves an href from a multistatus against `base`.
///
/// Handles full URLs, server-absolute paths and collection-relative paths.
/// `base` names a collection, so relative hrefs resolve beneath it whether or
/// not its path ends in `/`.
pub fn resolve_href(base: &Url, href: &str) -> DavResult<Url> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(Url::parse(href)?);
    }
    if base.path().ends_with('/') {
        return Ok(base.join(href)?);
    }

    let mut collection = base.clone();
    collection.set_path(&format!("{}/", base.path()));
    Ok(collection.join(href)?)
}

/// Compares two paths ignoring percent-encoding and a trailing slash.
pub fn same_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(path: &str) -> Cow<'_, str> {
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    match decoded {
        Cow::Borrowed(p) => Cow::Borrowed(p.trim_end_matches('/')),
        Cow::Owned(p) => Cow::Owned(p.trim_end_matches('/').to_string()),
    }
}
