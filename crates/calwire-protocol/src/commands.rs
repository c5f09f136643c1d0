//! Top-level CalDAV operations.
//!
//! Each operation builds one request body, makes one transport call and
//! translates the reply. Nothing is cached between calls.

use tracing::{debug, info, trace, warn};
use url::Url;
use uuid::Uuid;

use crate::error::DavResult;
use crate::namespace::{Namespaces, QualifiedName, dav};
use crate::request::{TimeRange, build_calendar_query, build_mkcol, build_propfind};
use crate::resource::{Calendar, Collection, Event, Resource, classify_and_build};
use crate::response::{PropertyMap, parse_calendar_data, parse_multistatus};
use crate::transport::{Depth, STATUS_CREATED, Transport};
use crate::url_path::glue;

/// CalDAV operations over an injected [`Transport`].
pub struct CalDav<T> {
    transport: T,
    namespaces: Namespaces,
}

impl<T: Transport> CalDav<T> {
    /// Uses the default `D`/`C`/`CS` prefix table.
    pub fn new(transport: T) -> Self {
        Self::with_namespaces(transport, Namespaces::default())
    }

    pub fn with_namespaces(transport: T, namespaces: Namespaces) -> Self {
        Self {
            transport,
            namespaces,
        }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lists the children of `parent` with a depth-1 PROPFIND on resourcetype.
    ///
    /// With `type_filter`, only resources whose resource type equals the
    /// filter are kept.
    pub async fn list_children<P: Collection + ?Sized>(
        &self,
        parent: &P,
        type_filter: Option<&QualifiedName>,
    ) -> DavResult<Vec<Resource>> {
        let resourcetype = dav::resourcetype();
        let response = self
            .fetch_properties(parent, std::slice::from_ref(&resourcetype), Depth::One)
            .await?;

        let mut children = Vec::new();
        for (href, properties) in &response {
            let kind = properties.get(&resourcetype).and_then(Option::as_deref);
            let keep = match (type_filter, kind) {
                (None, _) => true,
                (Some(filter), Some(kind)) => *filter == *kind,
                (Some(_), None) => false,
            };
            if !keep {
                continue;
            }
            if let Some(resource) = classify_and_build(parent, href, kind)? {
                children.push(resource);
            }
        }

        info!(parent = %parent.url(), count = children.len(), "Listed children");
        Ok(children)
    }

    /// Fetches `properties` of `target` and its descendants down to `depth`.
    pub async fn fetch_properties<P: Collection + ?Sized>(
        &self,
        target: &P,
        properties: &[QualifiedName],
        depth: Depth,
    ) -> DavResult<PropertyMap> {
        let body = build_propfind(&self.namespaces, properties)?;
        let path = target.url().path();

        debug!(path = %path, depth = %depth, count = properties.len(), "PROPFIND");
        trace!(body = %String::from_utf8_lossy(&body), "PROPFIND body");

        let response = self.transport.propfind(path, &body, depth).await?;
        Ok(parse_multistatus(&response.tree, properties))
    }

    /// Finds events in `calendar` overlapping `start..end`.
    ///
    /// Returns one event per response, carrying its raw calendar-data.
    pub async fn time_range_search(
        &self,
        calendar: &Calendar,
        range: TimeRange,
    ) -> DavResult<Vec<Event>> {
        let body = build_calendar_query(&self.namespaces, &range)?;
        let path = calendar.url().path();

        debug!(path = %path, start = %range.start, end = ?range.end, "REPORT calendar-query");
        trace!(body = %String::from_utf8_lossy(&body), "REPORT body");

        let response = self.transport.report(path, &body, Depth::One).await?;

        let mut events = Vec::new();
        for (href, data) in parse_calendar_data(&response.tree) {
            let url = calendar.geturl(&href)?;
            events.push(Event::new(url, Some(calendar.url().clone()), data));
        }

        info!(calendar = %calendar.url(), count = events.len(), "Time-range search finished");
        Ok(events)
    }

    /// Creates a calendar named `name` under `parent`.
    ///
    /// Returns the new calendar's URL on 201 Created and `None` for any
    /// other status. Transport errors propagate.
    pub async fn create_calendar<P: Collection + ?Sized>(
        &self,
        parent: &P,
        name: &str,
        id: Option<&str>,
    ) -> DavResult<Option<Url>> {
        let id = id.map_or_else(generate_id, str::to_string);
        let body = build_mkcol(&self.namespaces, name)?;
        let path = glue(parent.url().path(), &id);

        debug!(path = %path, name = %name, "MKCOL");

        let status = self.transport.mkcol(&path, &body).await?;
        if status != STATUS_CREATED {
            warn!(path = %path, status, "Calendar was not created");
            return Ok(None);
        }
        parent.geturl(&path).map(Some)
    }

    /// Stores `data` as a new event in `calendar`.
    ///
    /// The resource is written to `<calendar>/<id>.ics`. Same status rule
    /// as [`create_calendar`](Self::create_calendar).
    pub async fn create_event(
        &self,
        calendar: &Calendar,
        data: &str,
        id: Option<&str>,
    ) -> DavResult<Option<Url>> {
        let id = id.map_or_else(generate_id, str::to_string);
        let path = glue(calendar.url().path(), &format!("{}.ics", id));

        debug!(path = %path, bytes = data.len(), "PUT");

        let status = self.transport.put(&path, data.as_bytes()).await?;
        if status != STATUS_CREATED {
            warn!(path = %path, status, "Event was not created");
            return Ok(None);
        }
        calendar.geturl(&path).map(Some)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
