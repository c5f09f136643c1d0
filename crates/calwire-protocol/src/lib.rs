//! CalDAV request/response translation.
//!
//! This crate turns calendar operations into WebDAV requests and turns
//! multistatus replies back into typed values:
//!
//! - [`request`] - PROPFIND, calendar-query REPORT and MKCOL bodies
//! - [`response`] - multistatus parsing into property maps and calendar-data
//! - [`resource`] - calendars, events and href resolution
//! - [`CalDav`] - the top-level operations over an injected [`Transport`]
//!
//! # Architecture
//!
//! ```text
//!  CalDav::list_children / fetch_properties / time_range_search / create_*
//!          │
//!          ▼
//!  ┌────────────────┐   body    ┌─────────────┐
//!  │ request (XML)  │ ────────▶ │  Transport  │ ◀── HttpTransport (reqwest)
//!  └────────────────┘           └──────┬──────┘
//!                                      │ XmlTree
//!                                      ▼
//!                          ┌─────────────────────┐
//!                          │ response → resource │
//!                          └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calwire_protocol::{CalDav, DavConfig, HttpTransport, Principal};
//!
//! let config = DavConfig::new("https://caldav.example.com/calendars/user/")?;
//! let caldav = CalDav::new(HttpTransport::new(config.clone())?);
//! let home = Principal::new(config.url);
//! let calendars = caldav.list_children(&home, Some(&dav::collection())).await?;
//! ```

pub mod commands;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod namespace;
pub mod request;
pub mod resource;
pub mod response;
pub mod transport;
pub mod tree;
pub mod url_path;

pub use commands::CalDav;
pub use config::DavConfig;
pub use error::{DavError, DavErrorCode, DavResult};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use namespace::{CALDAV_NS, CS_NS, DAV_NS, Namespaces, QualifiedName, caldav, dav};
pub use request::TimeRange;
pub use resource::{Calendar, Collection, Event, Principal, Resource};
pub use response::{Properties, PropertyMap};
pub use transport::{BoxFuture, DavResponse, Depth, STATUS_CREATED, Transport};
pub use tree::{Element, XmlTree};
