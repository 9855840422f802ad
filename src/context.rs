//! Per-request context shared between the timeline and the downstream handler.

use http::Method;

/// What the timeline knows about one request.
///
/// The downstream operation may rewrite the URL and sets the status; the
/// original URL and the method are fixed when the request enters.
#[derive(Clone, Debug)]
pub struct Context {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) original_url: String,
    pub(crate) status: Option<u16>,
}

impl Context {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        Self { method, original_url: url.clone(), url, status: None }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn url(&self) -> &str { &self.url }
    pub fn original_url(&self) -> &str { &self.original_url }
    pub fn status(&self) -> Option<u16> { self.status }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Accepts a bare `u16` or an [`http::StatusCode`].
    pub fn set_status(&mut self, status: impl Into<u16>) {
        self.status = Some(status.into());
    }
}

/// Builds a context from an `http` request as handed out by hyper, axum, etc.
impl<B> From<&http::Request<B>> for Context {
    fn from(req: &http::Request<B>) -> Self {
        let url = req.uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());
        Self::new(req.method().clone(), url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_rewrite_keeps_original() {
        let mut ctx = Context::new(Method::GET, "/old");
        ctx.set_url("/new");
        assert_eq!(ctx.url(), "/new");
        assert_eq!(ctx.original_url(), "/old");
    }

    #[test]
    fn status_from_status_code() {
        let mut ctx = Context::new(Method::POST, "/");
        assert_eq!(ctx.status(), None);
        ctx.set_status(http::StatusCode::CREATED);
        assert_eq!(ctx.status(), Some(201));
        ctx.set_status(404u16);
        assert_eq!(ctx.status(), Some(404));
    }

    #[test]
    fn from_http_request() {
        let req = http::Request::builder()
            .method(Method::DELETE)
            .uri("http://example.com/users/42?force=1")
            .body(())
            .unwrap();
        let ctx = Context::from(&req);
        assert_eq!(ctx.method(), &Method::DELETE);
        assert_eq!(ctx.url(), "/users/42?force=1");
    }
}
