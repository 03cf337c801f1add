use std::time::Instant;

use uuid::Uuid;

use crate::context::{handler, HandlerFn};
use crate::logging::{log_request, RequestLog};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 요청마다 ID 를 부여하고, 하위 체인이 끝난 뒤 처리 결과를 기록하는 미들웨어입니다.
pub fn logger() -> HandlerFn {
    handler(|c| {
        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();
        c.set_header(REQUEST_ID_HEADER, &request_id);

        let mut log = RequestLog::new(request_id);
        log.with_request(c);

        c.next();

        log.with_response(c.status_code());
        log.duration_ms = start.elapsed().as_millis() as u64;
        if c.is_aborted() && c.status_code().is_server_error() {
            log.with_error("요청 처리 중단");
        }
        log_request(&log);
    })
}
