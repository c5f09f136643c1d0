//! The transport seam.
//!
//! Operations issue exactly one call on a [`Transport`] and never retry.
//! Timeouts and cancellation belong to the implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::DavResult;
use crate::tree::XmlTree;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP 201 Created.
pub const STATUS_CREATED: u16 = 201;

/// The `Depth` header of PROPFIND and REPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed multistatus reply.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: u16,
    pub tree: XmlTree,
}

/// Issues WebDAV verbs against a server.
///
/// `path` is the server path of the target resource. An empty `body` means
/// the request carries no body.
pub trait Transport: Send + Sync {
    fn propfind<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>>;

    fn report<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>>;

    /// Returns the response status.
    fn mkcol<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>>;

    /// Returns the response status.
    fn put<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn propfind<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        (**self).propfind(path, body, depth)
    }

    fn report<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        (**self).report(path, body, depth)
    }

    fn mkcol<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        (**self).mkcol(path, body)
    }

    fn put<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        (**self).put(path, body)
    }
}
