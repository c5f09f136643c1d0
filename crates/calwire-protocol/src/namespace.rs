//! Qualified names and the namespace prefix table.
//!
//! A [`QualifiedName`] is the join key between what a request asks for and
//! what a multistatus response returns. Its string form is Clark notation,
//! `{DAV:}resourcetype`, so resource-type values read out of a response can
//! be compared against a name directly.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DavError, DavResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";
/// CalendarServer namespace (for Apple servers)
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// A namespace URI plus local name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    namespace: String,
    local: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// A name with no namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl PartialEq<str> for QualifiedName {
    fn eq(&self, other: &str) -> bool {
        // Compare against Clark notation without allocating.
        match other.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
            Some((ns, local)) => self.namespace == ns && self.local == local,
            None => self.namespace.is_empty() && self.local == other,
        }
    }
}

/// Prefix to namespace URI table.
///
/// Passed explicitly to the request builders so they stay independent of
/// any process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::empty()
            .with_prefix("C", CALDAV_NS)
            .with_prefix("CS", CS_NS)
            .with_prefix("D", DAV_NS)
    }
}

impl Namespaces {
    /// A table with no bindings.
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// Binds `prefix` to `uri`, replacing any previous binding.
    pub fn with_prefix(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), uri.into());
        self
    }

    /// Resolves `prefix:local` into a [`QualifiedName`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the prefix is not bound.
    pub fn qualify(&self, prefix: &str, local: &str) -> DavResult<QualifiedName> {
        self.prefixes
            .get(prefix)
            .map(|uri| QualifiedName::new(uri.as_str(), local))
            .ok_or_else(|| {
                DavError::configuration(format!("unknown namespace prefix: {}", prefix))
            })
    }

    /// Parses a `prefix:local` string, as typed on a command line.
    pub fn parse(&self, name: &str) -> DavResult<QualifiedName> {
        match name.split_once(':') {
            Some((prefix, local)) if !local.is_empty() => self.qualify(prefix, local),
            _ => Err(DavError::configuration(format!(
                "expected prefix:name, got {:?}",
                name
            ))),
        }
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Returns the first prefix bound to `uri`.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Iterates `(prefix, uri)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }
}

/// Well-known names in the DAV: namespace.
pub mod dav {
    use super::{DAV_NS, QualifiedName};

    pub fn collection() -> QualifiedName {
        QualifiedName::new(DAV_NS, "collection")
    }

    pub fn displayname() -> QualifiedName {
        QualifiedName::new(DAV_NS, "displayname")
    }

    pub fn href() -> QualifiedName {
        QualifiedName::new(DAV_NS, "href")
    }

    pub fn mkcol() -> QualifiedName {
        QualifiedName::new(DAV_NS, "mkcol")
    }

    pub fn prop() -> QualifiedName {
        QualifiedName::new(DAV_NS, "prop")
    }

    pub fn propfind() -> QualifiedName {
        QualifiedName::new(DAV_NS, "propfind")
    }

    pub fn resourcetype() -> QualifiedName {
        QualifiedName::new(DAV_NS, "resourcetype")
    }

    pub fn response() -> QualifiedName {
        QualifiedName::new(DAV_NS, "response")
    }

    pub fn set() -> QualifiedName {
        QualifiedName::new(DAV_NS, "set")
    }
}

/// Well-known names in the CalDAV namespace.
pub mod caldav {
    use super::{CALDAV_NS, QualifiedName};

    pub fn calendar_collection() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "calendar-collection")
    }

    pub fn calendar_data() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "calendar-data")
    }

    pub fn calendar_query() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "calendar-query")
    }

    pub fn comp_filter() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "comp-filter")
    }

    pub fn expand() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "expand")
    }

    pub fn filter() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "filter")
    }

    pub fn time_range() -> QualifiedName {
        QualifiedName::new(CALDAV_NS, "time-range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clark_notation() {
        assert_eq!(dav::resourcetype().to_string(), "{DAV:}resourcetype");
        assert_eq!(QualifiedName::unqualified("foo").to_string(), "foo");
    }

    #[test]
    fn compare_with_string_key() {
        let name = dav::collection();
        assert!(name == *"{DAV:}collection");
        assert!(name != *"{DAV:}calendar");
        assert!(name != *"collection");
        assert!(QualifiedName::unqualified("collection") == *"collection");
    }

    #[test]
    fn qualify_known_prefix() {
        let ns = Namespaces::default();
        assert_eq!(ns.qualify("D", "resourcetype").unwrap(), dav::resourcetype());
        assert_eq!(
            ns.qualify("C", "calendar-data").unwrap(),
            caldav::calendar_data()
        );
    }

    #[test]
    fn qualify_unknown_prefix_fails() {
        let ns = Namespaces::default();
        let err = ns.qualify("X", "thing").unwrap_err();
        assert_eq!(err.code(), crate::DavErrorCode::Configuration);
    }

    #[test]
    fn parse_prefixed_name() {
        let ns = Namespaces::default();
        assert_eq!(ns.parse("D:displayname").unwrap(), dav::displayname());
        assert!(ns.parse("displayname").is_err());
        assert!(ns.parse("D:").is_err());
    }

    #[test]
    fn custom_prefix_and_reverse_lookup() {
        let ns = Namespaces::default().with_prefix("A", "http://apple.com/ns/ical/");
        assert_eq!(ns.prefix_for("http://apple.com/ns/ical/"), Some("A"));
        assert_eq!(ns.prefix_for(DAV_NS), Some("D"));
        assert_eq!(ns.prefix_for("urn:nothing"), None);
        assert_eq!(ns.uri("CS"), Some(CS_NS));
    }

    #[test]
    fn iteration_is_prefix_ordered() {
        let ns = Namespaces::default();
        let prefixes: Vec<_> = ns.iter().map(|(p, _)| p).collect();
        assert_eq!(prefixes, vec!["C", "CS", "D"]);
    }
}
