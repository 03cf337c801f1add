//! Trellis는 메서드별 트라이 라우터와 미들웨어 체인 실행기를 제공하는 임베디드 HTTP 라우팅 엔진입니다.
//! 
//! # 주요 기능
//! 
//! - 정적 세그먼트, `:name` 파라미터, `*name` 와일드카드를 지원하는 경로 매칭
//! - 접두사 그룹 단위 미들웨어와 `next()` 기반 체인 실행
//! - 로깅/복구 미들웨어, 정적 파일 제공, hyper 기반 서버
//! 
//! # 예제
//! 
//! ```
//! use trellis::{handler, Engine};
//! use hyper::{Method, StatusCode};
//! 
//! let mut engine = Engine::new();
//! engine.get("/hello/:name", handler(|c| {
//!     let body = format!("hello {}", c.param("name"));
//!     c.string(StatusCode::OK, body);
//! }));
//! 
//! let found = engine.router().resolve(&Method::GET, "/hello/trellis").unwrap();
//! assert_eq!(found.pattern, "/hello/:name");
//! assert_eq!(found.params["name"], "trellis");
//! ```
//! 
//! # 미들웨어 그룹
//! 
//! ```
//! use trellis::{handler, Engine};
//! use hyper::{Request, StatusCode};
//! use bytes::Bytes;
//! 
//! let mut engine = Engine::new();
//! {
//!     let mut v2 = engine.group("/v2");
//!     // 하위 체인 전후에 헤더를 기록하는 미들웨어
//!     v2.use_middleware(handler(|c| {
//!         c.set_header("X-Before", "1");
//!         c.next();
//!         c.set_header("X-After", "1");
//!     }));
//!     v2.get("/ping", handler(|c| c.string(StatusCode::OK, "pong")));
//! }
//! 
//! let req = Request::get("/v2/ping").body(Bytes::new()).unwrap();
//! let res = engine.handle(req);
//! assert_eq!(res.status(), StatusCode::OK);
//! assert!(res.headers().contains_key("x-after"));
//! ```

pub mod context;
pub mod engine;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod settings;
pub mod static_files;

pub use context::{handler, Context, HandlerFn};
pub use engine::{Engine, RouterGroup};
pub use routing::{RouteMatch, Router};
