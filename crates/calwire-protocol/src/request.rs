//! Request body builders for PROPFIND, REPORT and MKCOL.
//!
//! Bodies are UTF-8 with an XML declaration. Element and attribute order is
//! fixed per body kind.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{DavError, DavResult};
use crate::namespace::{Namespaces, QualifiedName, caldav, dav};

/// The window of a calendar-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A range with no upper bound.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self::new(start, None)
    }

    /// The `start`/`end` attributes shared by `<expand>` and `<time-range>`.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("start", format_icalendar_datetime(self.start))];
        if let Some(end) = self.end {
            attrs.push(("end", format_icalendar_datetime(end)));
        }
        attrs
    }
}

/// Builds a PROPFIND body requesting `properties` in order.
///
/// An empty property list yields an empty body; the caller sends the
/// request without one.
pub fn build_propfind(ns: &Namespaces, properties: &[QualifiedName]) -> DavResult<Vec<u8>> {
    if properties.is_empty() {
        return Ok(Vec::new());
    }

    let mut body = BodyWriter::new(ns)?;
    body.start_root(&dav::propfind())?;
    body.start(&dav::prop(), &[])?;
    for property in properties {
        body.empty(property, &[])?;
    }
    body.end(&dav::prop())?;
    body.end(&dav::propfind())?;
    Ok(body.finish())
}

/// Builds a calendar-query REPORT body for VEVENTs within `range`.
///
/// The same range is written to the `<expand>` and `<time-range>` elements.
pub fn build_calendar_query(ns: &Namespaces, range: &TimeRange) -> DavResult<Vec<u8>> {
    let dates = range.attributes();
    let mut body = BodyWriter::new(ns)?;

    body.start_root(&caldav::calendar_query())?;
    body.start(&dav::prop(), &[])?;
    body.start(&caldav::calendar_data(), &[])?;
    body.empty(&caldav::expand(), &dates)?;
    body.end(&caldav::calendar_data())?;
    body.end(&dav::prop())?;

    body.start(&caldav::filter(), &[])?;
    body.start(&caldav::comp_filter(), &[("name", "VCALENDAR".to_string())])?;
    body.start(&caldav::comp_filter(), &[("name", "VEVENT".to_string())])?;
    body.empty(&caldav::time_range(), &dates)?;
    body.end(&caldav::comp_filter())?;
    body.end(&caldav::comp_filter())?;
    body.end(&caldav::filter())?;

    body.end(&caldav::calendar_query())?;
    Ok(body.finish())
}

/// Builds an extended MKCOL body creating a calendar named `display_name`.
pub fn build_mkcol(ns: &Namespaces, display_name: &str) -> DavResult<Vec<u8>> {
    let mut body = BodyWriter::new(ns)?;

    body.start_root(&dav::mkcol())?;
    body.start(&dav::set(), &[])?;
    body.start(&dav::prop(), &[])?;

    body.start(&dav::resourcetype(), &[])?;
    body.start(&dav::collection(), &[])?;
    body.empty(&caldav::calendar_collection(), &[])?;
    body.end(&dav::collection())?;
    body.end(&dav::resourcetype())?;

    body.start(&dav::displayname(), &[])?;
    body.text(display_name)?;
    body.end(&dav::displayname())?;

    body.end(&dav::prop())?;
    body.end(&dav::set())?;
    body.end(&dav::mkcol())?;
    Ok(body.finish())
}

/// Formats a datetime for iCalendar time-range filters (UTC format).
pub fn format_icalendar_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Writes prefixed elements using the injected namespace table.
struct BodyWriter<'n> {
    writer: Writer<Cursor<Vec<u8>>>,
    ns: &'n Namespaces,
}

impl<'n> BodyWriter<'n> {
    fn new(ns: &'n Namespaces) -> DavResult<Self> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_error)?;
        Ok(Self { writer, ns })
    }

    /// Opens the root element and declares every bound prefix on it.
    fn start_root(&mut self, name: &QualifiedName) -> DavResult<()> {
        let mut start = self.element(name, &[]);
        for (prefix, uri) in self.ns.iter() {
            start.push_attribute((format!("xmlns:{}", prefix).as_str(), uri));
        }
        self.write(Event::Start(start))
    }

    fn start(&mut self, name: &QualifiedName, attrs: &[(&str, String)]) -> DavResult<()> {
        let start = self.element(name, attrs);
        self.write(Event::Start(start))
    }

    fn empty(&mut self, name: &QualifiedName, attrs: &[(&str, String)]) -> DavResult<()> {
        let start = self.element(name, attrs);
        self.write(Event::Empty(start))
    }

    fn text(&mut self, text: &str) -> DavResult<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    fn end(&mut self, name: &QualifiedName) -> DavResult<()> {
        let tag = self.tag(name);
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    /// `prefix:local` for bound namespaces, bare `local` otherwise.
    fn tag(&self, name: &QualifiedName) -> String {
        match self.ns.prefix_for(name.namespace()) {
            Some(prefix) => format!("{}:{}", prefix, name.local()),
            None => name.local().to_string(),
        }
    }

    fn element(&self, name: &QualifiedName, attrs: &[(&str, String)]) -> BytesStart<'static> {
        let mut start = BytesStart::new(self.tag(name));
        // Unbound namespaces get an inline default declaration.
        if self.ns.prefix_for(name.namespace()).is_none() && !name.namespace().is_empty() {
            start.push_attribute(("xmlns", name.namespace()));
        }
        for (key, value) in attrs {
            start.push_attribute((*key, value.as_str()));
        }
        start
    }

    fn write(&mut self, event: Event<'_>) -> DavResult<()> {
        self.writer.write_event(event).map_err(write_error)
    }
}

fn write_error<E: std::fmt::Display>(err: E) -> DavError {
    DavError::internal(format!("failed to write XML body: {}", err))
}
