use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use http_body_util::Full;
use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::{error, warn};
use url::form_urlencoded;

use crate::middleware::REQUEST_ID_HEADER;

/// 요청 하나를 처리하는 미들웨어 및 라우트 핸들러 타입입니다.
pub type HandlerFn = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// 클로저를 `HandlerFn` 으로 감쌉니다.
pub fn handler<F>(f: F) -> HandlerFn
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 요청 하나의 실행 컨텍스트입니다.
///
/// 요청/응답 정보, 경로 파라미터, 그리고 이번 요청에서 실행할 핸들러 체인과
/// 다음 실행 위치(커서)를 가집니다. 요청마다 새로 만들며 공유하지 않습니다.
pub struct Context {
    request: Request<Bytes>,
    path: String,
    method: Method,
    params: HashMap<String, String>,

    status: StatusCode,
    status_written: bool,
    headers: HeaderMap,
    body: BytesMut,

    handlers: Vec<HandlerFn>,
    index: isize,
    aborted: bool,
}

impl Context {
    pub fn new(request: Request<Bytes>) -> Self {
        let path = decode_path(request.uri().path());
        let method = request.method().clone();
        Self {
            request,
            path,
            method,
            params: HashMap::new(),
            status: StatusCode::OK,
            status_written: false,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            handlers: Vec::new(),
            index: -1,
            aborted: false,
        }
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// 경로 파라미터 값을 반환합니다. 없으면 빈 문자열입니다.
    pub fn param(&self, key: &str) -> &str {
        self.params.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// URL 쿼리 문자열에서 첫 번째 값을 반환합니다. 없으면 빈 문자열입니다.
    pub fn query(&self, key: &str) -> String {
        self.request
            .uri()
            .query()
            .and_then(|query| find_form_value(query.as_bytes(), key))
            .unwrap_or_default()
    }

    /// 폼 인코딩된 본문에서 값을 찾고, 없으면 URL 쿼리에서 찾습니다.
    pub fn post_form(&self, key: &str) -> String {
        let is_form = self
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

        if is_form {
            if let Some(value) = find_form_value(self.request.body(), key) {
                return value;
            }
        }
        self.query(key)
    }

    /// 요청 헤더 값을 반환합니다.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request
            .headers()
            .get(key)
            .and_then(|value| value.to_str().ok())
    }

    // --- 핸들러 체인 ---

    pub fn set_handlers(&mut self, handlers: Vec<HandlerFn>) {
        self.handlers = handlers;
    }

    pub fn push_handler(&mut self, handler: HandlerFn) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// 커서를 한 칸 옮기고 그 위치의 핸들러를 실행합니다.
    ///
    /// 핸들러 안에서 `next()` 를 호출하면 나머지 체인이 그 호출 안에서 실행되고,
    /// 호출 뒤의 코드는 하위 체인이 끝난 다음에 실행됩니다. `next()` 를 호출하지 않는
    /// 핸들러에서 체인은 끝납니다. 커서는 중첩 호출 사이에 공유되며 `[-1, len]` 범위에서
    /// 줄어들지 않으므로 어떤 핸들러도 두 번 실행되지 않습니다.
    pub fn next(&mut self) {
        let len = self.handlers.len() as isize;
        self.index = (self.index + 1).min(len);
        if self.index < len {
            let handler = Arc::clone(&self.handlers[self.index as usize]);
            handler(self);
        }
    }

    /// 남은 체인을 실행하지 않도록 커서를 끝으로 옮깁니다.
    pub fn abort(&mut self) {
        self.index = self.handlers.len() as isize;
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    // --- 응답 작성 ---

    /// 상태 코드를 기록합니다. 한 번만 기록되며 이후 호출은 무시됩니다.
    pub fn status(&mut self, code: StatusCode) {
        if self.status_written {
            if self.status != code {
                warn!(
                    path = %self.path,
                    current = %self.status,
                    ignored = %code,
                    "상태 코드가 이미 기록되어 무시함"
                );
            }
            return;
        }
        self.status = code;
        self.status_written = true;
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                warn!(header = %key, error = %e, "유효하지 않은 헤더 이름");
                return;
            }
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(e) => warn!(header = %key, error = %e, "유효하지 않은 헤더 값"),
        }
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 응답 본문에 바이트를 덧붙입니다.
    pub fn write(&mut self, data: &[u8]) {
        self.status_written = true;
        self.body.extend_from_slice(data);
    }

    pub fn response_body(&self) -> &[u8] {
        &self.body
    }

    pub fn string(&mut self, code: StatusCode, text: impl AsRef<str>) {
        self.set_content_type("text/plain");
        self.status(code);
        self.write(text.as_ref().as_bytes());
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.set_content_type("application/json");
                self.status(code);
                self.write(&body);
            }
            Err(e) => {
                error!(path = %self.path, error = %e, "JSON 직렬화 실패");
                self.status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    pub fn html(&mut self, code: StatusCode, html: impl AsRef<str>) {
        self.set_content_type("text/html");
        self.status(code);
        self.write(html.as_ref().as_bytes());
    }

    pub fn data(&mut self, code: StatusCode, data: &[u8]) {
        self.status(code);
        self.write(data);
    }

    /// 체인을 중단하고 `{"message": ...}` JSON 에러 응답을 작성합니다.
    pub fn fail(&mut self, code: StatusCode, message: &str) {
        self.abort();
        self.json(code, &serde_json::json!({ "message": message }));
    }

    /// 버퍼에 쌓인 응답을 비웁니다. 상태 코드도 다시 기록할 수 있게 되며,
    /// 요청 ID 헤더만 남깁니다.
    pub fn reset_response(&mut self) {
        let request_id = self.headers.remove(REQUEST_ID_HEADER);
        self.headers.clear();
        if let Some(id) = request_id {
            self.headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), id);
        }
        self.body.clear();
        self.status = StatusCode::OK;
        self.status_written = false;
    }

    /// 버퍼에 쌓인 응답을 hyper 응답으로 변환합니다.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    fn set_content_type(&mut self, value: &'static str) {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("status", &self.status)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .finish()
    }
}

/// 퍼센트 인코딩된 요청 경로를 디코딩합니다. UTF-8 이 아니면 원래 경로를 유지합니다.
fn decode_path(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(e) => {
            warn!(path = %raw, error = %e, "경로 디코딩 실패, 원본 경로 사용");
            raw.to_string()
        }
    }
}

fn find_form_value(input: &[u8], key: &str) -> Option<String> {
    form_urlencoded::parse(input)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
