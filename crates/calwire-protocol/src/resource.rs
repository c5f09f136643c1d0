//! Domain objects and the resource translator.
//!
//! The objects here are plain values. The caller owns them; this crate only
//! constructs them from what a server returned.

use url::Url;

use crate::error::DavResult;
use crate::namespace::dav;
use crate::url_path::{resolve_href, same_path};

/// A resource that can contain other resources.
pub trait Collection {
    fn url(&self) -> &Url;

    /// Resolves an href returned by the server relative to this collection.
    fn geturl(&self, href: &str) -> DavResult<Url> {
        resolve_href(self.url(), href)
    }
}

/// The entry point of a user's calendar tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    url: Url,
}

impl Principal {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

impl Collection for Principal {
    fn url(&self) -> &Url {
        &self.url
    }
}

/// A calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    url: Url,
    parent: Option<Url>,
}

impl Calendar {
    pub fn new(url: Url, parent: Option<Url>) -> Self {
        Self { url, parent }
    }

    pub fn parent(&self) -> Option<&Url> {
        self.parent.as_ref()
    }
}

impl Collection for Calendar {
    fn url(&self) -> &Url {
        &self.url
    }
}

/// A calendar object resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    url: Url,
    parent: Option<Url>,
    data: Option<String>,
}

impl Event {
    pub fn new(url: Url, parent: Option<Url>, data: Option<String>) -> Self {
        Self { url, parent, data }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn parent(&self) -> Option<&Url> {
        self.parent.as_ref()
    }

    /// Raw iCalendar payload, present after a time-range search.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

/// A child discovered by listing a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Calendar(Calendar),
    Event(Event),
}

impl Resource {
    pub fn url(&self) -> &Url {
        match self {
            Self::Calendar(calendar) => calendar.url(),
            Self::Event(event) => event.url(),
        }
    }

    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::Calendar(_))
    }
}

/// Turns one multistatus entry into a [`Resource`].
///
/// Returns `Ok(None)` when `href` names the parent itself. A resource type
/// equal to `{DAV:}collection` yields a calendar; anything else, including
/// no resource type, yields an event.
pub fn classify_and_build<P: Collection + ?Sized>(
    parent: &P,
    href: &str,
    resource_type: Option<&str>,
) -> DavResult<Option<Resource>> {
    let url = parent.geturl(href)?;
    if same_path(url.path(), parent.url().path()) {
        return Ok(None);
    }

    let parent_url = Some(parent.url().clone());
    let resource = match resource_type {
        Some(kind) if dav::collection() == *kind => {
            Resource::Calendar(Calendar::new(url, parent_url))
        }
        _ => Resource::Event(Event::new(url, parent_url, None)),
    };
    Ok(Some(resource))
}
