//! Response descriptors built by the handlers and turned into hyper
//! responses at the service boundary.

use crate::errors::ApiError;
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use http::{Response, StatusCode};
use http_body_util::combinators::BoxBody;
use shared::http::full_body;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Ordered body fragments. The final fragment is whichever one sits at the
/// end; appending moves that position forward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyChain {
    fragments: Vec<Bytes>,
}

impl BodyChain {
    pub fn push(&mut self, fragment: impl Into<Bytes>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[Bytes] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.fragments.len()
    }

    pub fn content_length(&self) -> usize {
        self.fragments.iter().map(Bytes::len).sum()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    pub fn to_bytes(&self) -> Bytes {
        match self.fragments.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            fragments => {
                let mut buf = BytesMut::with_capacity(self.content_length());
                for fragment in fragments {
                    buf.extend_from_slice(fragment);
                }
                buf.freeze()
            }
        }
    }
}

/// Status, headers and body of a response, independent of the transport.
#[derive(Debug)]
pub struct ResponseDescriptor {
    status: StatusCode,
    content_type: &'static str,
    headers: HeaderMap,
    body: BodyChain,
}

impl Default for ResponseDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDescriptor {
    pub fn new() -> Self {
        ResponseDescriptor {
            status: StatusCode::OK,
            content_type: TEXT_PLAIN,
            headers: HeaderMap::new(),
            body: BodyChain::default(),
        }
    }

    /// Plain text response whose body is the reason phrase of `status`.
    pub fn error(status: StatusCode) -> Self {
        let mut response = Self::new();
        response.status = status;
        response
            .body
            .push(status.canonical_reason().unwrap_or_default());
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &BodyChain {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BodyChain {
        &mut self.body
    }

    /// Appends a header, keeping any existing values with the same name.
    pub fn append_header(&mut self, name: HeaderName, value: &str) -> Result<(), ApiError> {
        let value = HeaderValue::from_str(value)?;
        self.headers.append(name, value);
        Ok(())
    }

    pub fn set_json_headers(&mut self, status: StatusCode) {
        self.status = status;
        self.content_type = APPLICATION_JSON;
    }

    pub fn set_redirect_headers(&mut self, location: &str) -> Result<(), ApiError> {
        let location = HeaderValue::from_str(location)?;
        self.status = StatusCode::FOUND;
        self.content_type = TEXT_PLAIN;
        self.headers.insert(LOCATION, location);
        Ok(())
    }

    /// 204 with an empty body. Headers already added (cookies) are kept.
    pub fn set_no_content_headers(&mut self) {
        self.status = StatusCode::NO_CONTENT;
        self.content_type = TEXT_PLAIN;
        self.body.clear();
    }

    pub fn set_batch_headers(&mut self, html: bool) {
        self.status = StatusCode::OK;
        self.content_type = if html { TEXT_HTML } else { TEXT_PLAIN };
    }

    pub fn into_response<E>(self) -> Response<BoxBody<Bytes, E>> {
        let ResponseDescriptor {
            status,
            content_type,
            mut headers,
            body,
        } = self;

        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.content_length()));

        let mut response = Response::new(full_body(body.to_bytes()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
