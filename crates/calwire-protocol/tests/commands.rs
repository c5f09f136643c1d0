//! Operation tests against an in-memory transport.

use std::sync::Mutex;

use calwire_protocol::{
    BoxFuture, CalDav, Calendar, Collection, DavError, DavErrorCode, DavResponse, DavResult, Depth,
    Principal, Resource, TimeRange, Transport, XmlTree, caldav, dav,
};
use chrono::{TimeZone, Utc};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
struct Call {
    verb: &'static str,
    path: String,
    body: Vec<u8>,
    depth: Option<Depth>,
}

/// Replays one canned reply and records every request.
struct MockTransport {
    xml: String,
    status: u16,
    fail: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    fn multistatus(xml: &str) -> Self {
        Self {
            xml: xml.to_string(),
            status: 207,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            xml: String::new(),
            status,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::status(0)
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, verb: &'static str, path: &str, body: &[u8], depth: Option<Depth>) {
        self.calls.lock().unwrap().push(Call {
            verb,
            path: path.to_string(),
            body: body.to_vec(),
            depth,
        });
    }

    fn reply(&self) -> DavResult<DavResponse> {
        if self.fail {
            return Err(DavError::network("connection refused"));
        }
        Ok(DavResponse {
            status: self.status,
            tree: XmlTree::parse(self.xml.as_bytes())?,
        })
    }

    fn reply_status(&self) -> DavResult<u16> {
        if self.fail {
            return Err(DavError::network("connection refused"));
        }
        Ok(self.status)
    }
}

impl Transport for MockTransport {
    fn propfind<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        self.record("PROPFIND", path, body, Some(depth));
        Box::pin(async move { self.reply() })
    }

    fn report<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        self.record("REPORT", path, body, Some(depth));
        Box::pin(async move { self.reply() })
    }

    fn mkcol<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        self.record("MKCOL", path, body, None);
        Box::pin(async move { self.reply_status() })
    }

    fn put<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        self.record("PUT", path, body, None);
        Box::pin(async move { self.reply_status() })
    }
}

const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/cal/</D:href>
    <D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>/cal/home/</D:href>
    <D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat>
  </D:response>
  <D:response>
    <D:href>/cal/note.ics</D:href>
    <D:propstat><D:prop><D:resourcetype/></D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;

const REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <response>
    <href>/cal/home/a.ics</href>
    <propstat><prop><C:calendar-data>BEGIN:VCALENDAR
SUMMARY:Standup
END:VCALENDAR
</C:calendar-data></prop></propstat>
  </response>
  <response>
    <href>b.ics</href>
    <propstat><prop><C:calendar-data><![CDATA[BEGIN:VCALENDAR
END:VCALENDAR]]></C:calendar-data></prop></propstat>
  </response>
  <response>
    <href>/cal/home/c.ics</href>
    <propstat><prop/></propstat>
  </response>
</multistatus>"#;

fn principal() -> Principal {
    Principal::new(Url::parse("https://dav.example.com/cal/").unwrap())
}

fn calendar() -> Calendar {
    Calendar::new(
        Url::parse("https://dav.example.com/cal/home/").unwrap(),
        Some(Url::parse("https://dav.example.com/cal/").unwrap()),
    )
}

#[tokio::test]
async fn list_children_excludes_parent_and_classifies() {
    let transport = MockTransport::multistatus(LISTING);
    let caldav = CalDav::new(&transport);

    let children = caldav.list_children(&principal(), None).await.unwrap();

    assert_eq!(children.len(), 2);
    let urls: Vec<_> = children.iter().map(|c| c.url().as_str()).collect();
    assert!(urls.contains(&"https://dav.example.com/cal/home/"));
    assert!(urls.contains(&"https://dav.example.com/cal/note.ics"));
    for child in &children {
        match child {
            Resource::Calendar(c) => assert!(c.url().path().ends_with("/home/")),
            Resource::Event(e) => assert!(e.url().path().ends_with("note.ics")),
        }
    }

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].verb, "PROPFIND");
    assert_eq!(calls[0].path, "/cal/");
    assert_eq!(calls[0].depth, Some(Depth::One));
    let body = String::from_utf8(calls[0].body.clone()).unwrap();
    assert!(body.contains("<D:resourcetype/>"));
}

#[tokio::test]
async fn list_children_with_collection_filter() {
    let transport = MockTransport::multistatus(LISTING);
    let caldav = CalDav::new(&transport);

    let children = caldav
        .list_children(&principal(), Some(&dav::collection()))
        .await
        .unwrap();

    assert_eq!(children.len(), 1);
    assert!(children[0].is_calendar());
    assert_eq!(children[0].url().as_str(), "https://dav.example.com/cal/home/");
}

#[tokio::test]
async fn fetch_properties_returns_every_requested_key() {
    let transport = MockTransport::multistatus(LISTING);
    let caldav = CalDav::new(&transport);
    let props = [dav::resourcetype(), dav::displayname()];

    let map = caldav
        .fetch_properties(&principal(), &props, Depth::Zero)
        .await
        .unwrap();

    assert_eq!(map.len(), 3);
    for properties in map.values() {
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[&dav::displayname()], None);
    }
    assert_eq!(
        map["/cal/home/"][&dav::resourcetype()].as_deref(),
        Some("{DAV:}collection")
    );
    assert_eq!(transport.calls()[0].depth, Some(Depth::Zero));
}

#[tokio::test]
async fn fetch_properties_without_names_sends_empty_body() {
    let transport = MockTransport::multistatus(LISTING);
    let caldav = CalDav::new(&transport);

    let map = caldav
        .fetch_properties(&principal(), &[], Depth::One)
        .await
        .unwrap();

    assert!(transport.calls()[0].body.is_empty());
    assert!(map.values().all(|p| p.is_empty()));
}

#[tokio::test]
async fn time_range_search_returns_one_event_per_response() {
    let transport = MockTransport::multistatus(REPORT);
    let caldav = CalDav::new(&transport);
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

    let events = caldav
        .time_range_search(&calendar(), TimeRange::starting_at(start))
        .await
        .unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].url().as_str(), "https://dav.example.com/cal/home/a.ics");
    assert_eq!(
        events[0].data(),
        Some("BEGIN:VCALENDAR\nSUMMARY:Standup\nEND:VCALENDAR\n")
    );
    assert_eq!(events[1].url().as_str(), "https://dav.example.com/cal/home/b.ics");
    assert_eq!(events[1].data(), Some("BEGIN:VCALENDAR\nEND:VCALENDAR"));
    assert_eq!(events[2].data(), None);
    assert!(events.iter().all(|e| e.parent() == Some(calendar().url())));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].verb, "REPORT");
    assert_eq!(calls[0].path, "/cal/home/");
    assert_eq!(calls[0].depth, Some(Depth::One));

    let body = XmlTree::parse(&calls[0].body).unwrap();
    let time_range = body.find(&caldav::time_range()).unwrap();
    assert_eq!(time_range.attribute("start"), Some("20250301T000000Z"));
    assert_eq!(time_range.attribute("end"), None);
}

#[tokio::test]
async fn relative_hrefs_resolve_under_slashless_collection() {
    let transport = MockTransport::multistatus(
        r#"<D:multistatus xmlns:D="DAV:">
  <D:response><D:href>/cal/</D:href><D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat></D:response>
  <D:response><D:href>home/</D:href><D:propstat><D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop></D:propstat></D:response>
</D:multistatus>"#,
    );
    let caldav = CalDav::new(&transport);
    let principal = Principal::new(Url::parse("https://dav.example.com/cal").unwrap());

    let children = caldav.list_children(&principal, None).await.unwrap();

    let urls: Vec<_> = children.iter().map(|c| c.url().as_str()).collect();
    assert_eq!(urls, vec!["https://dav.example.com/cal/home/"]);

    let transport = MockTransport::multistatus(
        r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>a.ics</D:href></D:response></D:multistatus>"#,
    );
    let caldav = CalDav::new(&transport);
    let calendar = Calendar::new(Url::parse("https://dav.example.com/cal/home").unwrap(), None);
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

    let events = caldav
        .time_range_search(&calendar, TimeRange::starting_at(start))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].url().as_str(), "https://dav.example.com/cal/home/a.ics");
}

#[tokio::test]
async fn create_calendar_with_id() {
    let transport = MockTransport::status(201);
    let caldav = CalDav::new(&transport);

    let url = caldav
        .create_calendar(&principal(), "Work", Some("work"))
        .await
        .unwrap();

    assert_eq!(url.unwrap().as_str(), "https://dav.example.com/cal/work");
    let calls = transport.calls();
    assert_eq!(calls[0].verb, "MKCOL");
    assert_eq!(calls[0].path, "/cal/work");
    let body = String::from_utf8(calls[0].body.clone()).unwrap();
    assert!(body.contains("<D:displayname>Work</D:displayname>"));
}

#[tokio::test]
async fn create_calendar_generates_id() {
    let transport = MockTransport::status(201);
    let caldav = CalDav::new(&transport);

    let url = caldav
        .create_calendar(&principal(), "Work", None)
        .await
        .unwrap()
        .unwrap();

    let id = url.path().strip_prefix("/cal/").unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(transport.calls()[0].path, format!("/cal/{}", id));
}

#[tokio::test]
async fn create_calendar_non_created_status_is_absent() {
    for status in [200, 204, 403, 405, 409, 500] {
        let transport = MockTransport::status(status);
        let caldav = CalDav::new(&transport);
        let url = caldav
            .create_calendar(&principal(), "Work", Some("work"))
            .await
            .unwrap();
        assert!(url.is_none(), "status {} should not yield a URL", status);
    }
}

#[tokio::test]
async fn create_event_puts_ics() {
    let transport = MockTransport::status(201);
    let caldav = CalDav::new(&transport);
    let data = "BEGIN:VCALENDAR\nEND:VCALENDAR\n";

    let url = caldav
        .create_event(&calendar(), data, Some("meeting"))
        .await
        .unwrap();

    assert_eq!(
        url.unwrap().as_str(),
        "https://dav.example.com/cal/home/meeting.ics"
    );
    let calls = transport.calls();
    assert_eq!(calls[0].verb, "PUT");
    assert_eq!(calls[0].path, "/cal/home/meeting.ics");
    assert_eq!(calls[0].body, data.as_bytes());
}

#[tokio::test]
async fn create_event_non_created_status_is_absent() {
    let transport = MockTransport::status(412);
    let caldav = CalDav::new(&transport);

    let url = caldav.create_event(&calendar(), "x", None).await.unwrap();

    assert!(url.is_none());
    assert!(transport.calls()[0].path.ends_with(".ics"));
}

#[tokio::test]
async fn transport_errors_propagate() {
    let transport = MockTransport::failing();
    let caldav = CalDav::new(&transport);

    let err = caldav.list_children(&principal(), None).await.unwrap_err();
    assert_eq!(err.code(), DavErrorCode::Network);

    let err = caldav
        .create_event(&calendar(), "x", Some("a"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), DavErrorCode::Network);
}
