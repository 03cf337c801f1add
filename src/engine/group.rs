use std::path::PathBuf;

use hyper::Method;

use crate::context::HandlerFn;
use crate::static_files::serve_dir;
use super::Engine;

/// 경로 접두사를 공유하는 라우트와 미들웨어 묶음에 대한 핸들입니다.
///
/// 그룹 자체는 엔진이 소유하고, 이 핸들은 등록 중에만 엔진을 빌립니다.
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    index: usize,
}

impl<'e> RouterGroup<'e> {
    pub(super) fn new(engine: &'e mut Engine, index: usize) -> Self {
        Self { engine, index }
    }

    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// 현재 그룹 접두사 뒤에 `prefix` 를 붙인 하위 그룹을 만듭니다.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.engine.push_group(self.index, prefix);
        RouterGroup::new(self.engine, index)
    }

    /// 그룹에 미들웨어를 추가합니다. 등록 순서대로 실행됩니다.
    pub fn use_middleware(&mut self, middleware: HandlerFn) -> &mut Self {
        self.engine.groups[self.index].middlewares.push(middleware);
        self
    }

    pub fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFn) -> &mut Self {
        let pattern = format!("{}{}", self.prefix(), pattern);
        self.engine.register(method, &pattern, handler);
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

    /// `root` 디렉토리의 파일을 `<relative_path>/*filepath` 로 제공합니다.
    pub fn static_files(&mut self, relative_path: &str, root: impl Into<PathBuf>) -> &mut Self {
        let pattern = format!("{}/*filepath", relative_path.trim_end_matches('/'));
        self.get(&pattern, serve_dir(root.into()))
    }
}
