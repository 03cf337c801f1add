use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use hyper::StatusCode;
use tracing::error;

use crate::context::{handler, HandlerFn};

/// 하위 체인에서 발생한 panic 을 잡아 500 응답으로 바꾸는 미들웨어입니다.
pub fn recovery() -> HandlerFn {
    handler(|c| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| c.next()));
        if let Err(payload) = result {
            error!(
                method = %c.method(),
                path = %c.path(),
                panic = %panic_message(payload.as_ref()),
                "핸들러 panic 복구"
            );
            c.reset_response();
            c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "알 수 없는 panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use bytes::Bytes;
    use hyper::Request;

    #[test]
    fn test_recovery_turns_panic_into_500() {
        let req = Request::builder().uri("/panic").body(Bytes::new()).unwrap();
        let mut c = Context::new(req);
        c.set_handlers(vec![
            recovery(),
            handler(|_| panic!("index out of range")),
        ]);
        c.next();

        assert_eq!(c.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(c.response_body(), br#"{"message":"Internal Server Error"}"#);
        assert!(c.is_aborted());
    }

    #[test]
    fn test_partial_response_is_discarded_on_panic() {
        let req = Request::builder().uri("/panic").body(Bytes::new()).unwrap();
        let mut c = Context::new(req);
        c.set_handlers(vec![
            recovery(),
            handler(|c| {
                c.set_header("X-Partial", "1");
                c.string(StatusCode::OK, "partial");
                panic!("after write");
            }),
        ]);
        c.next();

        assert_eq!(c.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(c.response_body(), br#"{"message":"Internal Server Error"}"#);
        assert!(!c.response_headers().contains_key("x-partial"));
    }

    #[test]
    fn test_recovery_passes_through() {
        let req = Request::builder().uri("/").body(Bytes::new()).unwrap();
        let mut c = Context::new(req);
        c.set_handlers(vec![
            recovery(),
            handler(|c| c.string(StatusCode::OK, "ok")),
        ]);
        c.next();
        assert_eq!(c.status_code(), StatusCode::OK);
        assert!(!c.is_aborted());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
