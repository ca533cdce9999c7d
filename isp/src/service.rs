use crate::errors::IspError;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use crate::router::Router;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response};
use shared::{gauge, histogram};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Public listener. Request bodies are never read; every endpoint works off
/// the request line and headers.
#[derive(Clone)]
pub struct IspService {
    router: Arc<Router>,
}

impl IspService {
    pub fn new(router: Router) -> Self {
        IspService {
            router: Arc::new(router),
        }
    }
}

impl<B> Service<Request<B>> for IspService
where
    B: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, IspError>>;
    type Error = IspError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let start = Instant::now();
        gauge!(REQUESTS_INFLIGHT).increment(1.0);

        let (parts, _body) = req.into_parts();
        let outcome = self.router.route(&parts, SystemTime::now());
        let status = outcome.response.status();

        histogram!(
            REQUEST_DURATION,
            "handler" => outcome.handler,
            "status" => status.as_str().to_string()
        )
        .record(start.elapsed().as_secs_f64());
        gauge!(REQUESTS_INFLIGHT).decrement(1.0);

        let response = outcome.response.into_response();
        Box::pin(async move { Ok(response) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ab_cookie::AbCookieController;
    use crate::api::ApiContext;
    use crate::testutils::test_mastermind;
    use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, SET_COOKIE};
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_service() -> IspService {
        let mastermind = Arc::new(test_mastermind());
        IspService::new(Router::new(ApiContext::new(
            mastermind.clone(),
            mastermind,
            AbCookieController::new(".neon-images.com"),
        )))
    }

    async fn get(
        service: &IspService,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> (http::response::Parts, Bytes) {
        let mut builder = Request::builder().method("GET").uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = service.call(builder.body(()).unwrap()).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (parts, bytes)
    }

    #[tokio::test]
    async fn test_client_redirect_end_to_end() {
        let service = test_service();
        let (response, body) = get(&service, "/v1/client/p1/neonvid_abc.jpg", &[]).await;

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers[LOCATION], "http://img/abc_200.jpg");
        assert_eq!(response.headers[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers[CONTENT_LENGTH], "17");
        assert_eq!(response.headers.get_all(SET_COOKIE).iter().count(), 1);
        assert_eq!(body.as_ref(), b"redirect to image");
    }

    #[tokio::test]
    async fn test_server_json_end_to_end() {
        let service = test_service();
        let (response, body) = get(&service, "/v1/server/p1/abc", &[]).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers[CONTENT_TYPE], "application/json");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"], "http://img/abc_200.jpg");
        assert_eq!(json["error"], "");
    }

    #[tokio::test]
    async fn test_batch_end_to_end() {
        let service = test_service();
        let (response, body) = get(
            &service,
            "/v1/getthumbnailid/p1?params=a,b,c",
            &[("x-forwarded-for", "10.0.0.1")],
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers[CONTENT_LENGTH], "14");
        assert_eq!(body.as_ref(), b"tidA,null,tidC");
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let service = test_service();
        let (response, body) = get(&service, "/v1/client/p1/abc", &[]).await;

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.headers[CONTENT_LENGTH], "0");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let service = test_service();
        let (response, body) = get(&service, "/favicon.ico", &[]).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(body.as_ref(), b"Not Found");
    }
}
