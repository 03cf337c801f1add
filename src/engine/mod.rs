//! 경로 접두사별 미들웨어 그룹과 라우트 등록, 요청 처리 진입점을 제공하는 모듈입니다.

mod group;

pub use group::RouterGroup;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use tracing::error;

use crate::context::{Context, HandlerFn};
use crate::middleware::{logger, recovery};
use crate::routing::Router;
use crate::settings::RouterSettings;

/// 접두사 그룹 하나의 등록 정보
struct GroupEntry {
    prefix: String,
    middlewares: Vec<HandlerFn>,
}

/// 라우터와 그룹 목록을 소유하는 최상위 엔진입니다.
///
/// 시작 시점에 라우트와 미들웨어를 모두 등록한 뒤 `Arc<Engine>` 으로 공유합니다.
/// 등록이 끝난 엔진은 읽기 전용이므로 요청 간 잠금이 필요 없습니다.
pub struct Engine {
    router: Router,
    groups: Vec<GroupEntry>,
    strict_routes: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// 접두사가 빈 루트 그룹만 가진 엔진을 생성합니다.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupEntry {
                prefix: String::new(),
                middlewares: Vec::new(),
            }],
            strict_routes: false,
        }
    }

    /// `logger()` 와 `recovery()` 가 루트 그룹에 설치된 엔진을 생성합니다.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(logger()).use_middleware(recovery());
        engine
    }

    pub fn from_settings(settings: &RouterSettings) -> Self {
        let mut engine = Self::with_defaults();
        engine.set_strict_routes(settings.strict_routes);
        engine
    }

    /// 충돌하는 라우트 등록을 거부할지 설정합니다.
    pub fn set_strict_routes(&mut self, strict: bool) {
        self.strict_routes = strict;
    }

    pub fn set_not_found(&mut self, handler: HandlerFn) {
        self.router.set_not_found(handler);
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// 루트 그룹 핸들을 반환합니다.
    pub fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup::new(self, 0)
    }

    /// 루트 그룹 아래에 새 그룹을 만듭니다.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.push_group(0, prefix);
        RouterGroup::new(self, index)
    }

    pub fn use_middleware(&mut self, middleware: HandlerFn) -> &mut Self {
        self.root().use_middleware(middleware);
        self
    }

    pub fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.root().add_route(method, pattern, handler);
        self
    }

    pub fn get(&mut self, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.add_route(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.add_route(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.add_route(Method::PUT, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.add_route(Method::DELETE, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: HandlerFn) -> &mut Self {
        self.add_route(Method::PATCH, pattern, handler)
    }

    pub fn static_files(&mut self, relative_path: &str, root: impl Into<std::path::PathBuf>) -> &mut Self {
        self.root().static_files(relative_path, root);
        self
    }

    /// 요청 하나를 처리하고 버퍼링된 응답을 반환합니다.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Full<Bytes>> {
        let mut c = Context::new(request);
        self.handle_context(&mut c);
        c.into_response()
    }

    /// 경로 접두사가 일치하는 그룹의 미들웨어를 모아 체인을 구성하고 실행합니다.
    pub fn handle_context(&self, c: &mut Context) {
        let middlewares = self.middlewares_for(c.path());
        c.set_handlers(middlewares);
        self.router.handle(c);
    }

    /// 그룹 생성 순서대로, 접두사가 `path` 의 문자열 접두사인 그룹의 미들웨어를 모읍니다.
    pub fn middlewares_for(&self, path: &str) -> Vec<HandlerFn> {
        self.groups
            .iter()
            .filter(|group| path.starts_with(&group.prefix))
            .flat_map(|group| group.middlewares.iter().cloned())
            .collect()
    }

    fn push_group(&mut self, parent: usize, prefix: &str) -> usize {
        let prefix = format!("{}{}", self.groups[parent].prefix, prefix);
        self.groups.push(GroupEntry {
            prefix,
            middlewares: Vec::new(),
        });
        self.groups.len() - 1
    }

    fn register(&mut self, method: Method, pattern: &str, handler: HandlerFn) {
        if !self.strict_routes {
            self.router.add_route(method, pattern, handler);
            return;
        }

        if let Err(e) = self.router.try_add_route(method.clone(), pattern, handler) {
            error!(method = %method, pattern = %pattern, error = %e, "라우트 등록 거부");
        }
    }
}
