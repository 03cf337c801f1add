use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, error, warn};

use crate::engine::Engine;

/// 요청 본문 최대 크기 기본값 (4 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// 수신한 요청 본문을 모아 `Engine` 에 전달하는 핸들러입니다.
pub struct RequestHandler {
    engine: Arc<Engine>,
    max_body_bytes: usize,
}

impl RequestHandler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self::with_body_limit(engine, DEFAULT_MAX_BODY_BYTES)
    }

    /// 요청 본문이 `max_body_bytes` 를 넘으면 413 으로 응답하는 핸들러를 생성합니다.
    pub fn with_body_limit(engine: Arc<Engine>, max_body_bytes: usize) -> Self {
        Self { engine, max_body_bytes }
    }

    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
    ) -> Result<Response<Full<Bytes>>, Infallible>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, self.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(uri = %parts.uri, limit = self.max_body_bytes, "요청 본문 크기 초과");
                return Ok(error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
            }
            Err(e) => {
                error!(error = %e, "요청 본문 수신 실패");
                return Ok(error_response(StatusCode::BAD_REQUEST, "Bad Request"));
            }
        };
        let req = Request::from_parts(parts, body);
        debug!(method = %req.method(), uri = %req.uri(), "요청 처리 시작");

        // 핸들러 체인은 동기 코드이므로 블로킹 스레드에서 실행한다
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || engine.handle(req)).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(error = %e, "핸들러 체인 실행 실패");
                Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
            }
        }
    }

    pub async fn handle_connection<I>(&self, io: I) -> std::result::Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(req)))
            .await
    }
}

fn error_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::handler;

    #[tokio::test]
    async fn test_handle_request_collects_body() {
        let mut engine = Engine::new();
        engine.post("/echo", handler(|c| {
            let body = c.request().body().clone();
            c.data(StatusCode::OK, &body);
        }));
        let handler = RequestHandler::new(Arc::new(engine));

        let req = Request::post("/echo")
            .body(Full::new(Bytes::from("ping")))
            .unwrap();
        let res = handler.handle_request(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from("ping"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut engine = Engine::new();
        engine.post("/echo", handler(|c| c.string(StatusCode::OK, "ok")));
        let handler = RequestHandler::with_body_limit(Arc::new(engine), 4);

        let req = Request::post("/echo")
            .body(Full::new(Bytes::from("too long")))
            .unwrap();
        let res = handler.handle_request(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = Request::post("/echo")
            .body(Full::new(Bytes::from("tiny")))
            .unwrap();
        let res = handler.handle_request(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unrecovered_panic_becomes_500() {
        let mut engine = Engine::new();
        engine.get("/boom", handler(|_| panic!("boom")));
        let handler = RequestHandler::new(Arc::new(engine));

        let req = Request::get("/boom").body(Full::new(Bytes::new())).unwrap();
        let res = handler.handle_request(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
