use std::collections::HashMap;
use std::sync::Arc;

use hyper::{Method, StatusCode};
use tracing::{debug, info, warn};

use crate::context::{Context, HandlerFn};
use super::{parse_pattern, Node, Result, RouteError};

/// 라우트 조회 결과입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// 매칭된 등록 패턴 (요청 경로가 아님)
    pub pattern: String,
    /// 파라미터 이름별 바인딩 값
    pub params: HashMap<String, String>,
}

/// HTTP 메서드별 트라이와 (메서드, 패턴) 핸들러 테이블입니다.
///
/// 서버 시작 전에 등록을 마치고, 이후에는 읽기 전용으로 공유합니다.
pub struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<String, HandlerFn>,
    not_found: HandlerFn,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn route_key(method: &Method, pattern: &str) -> String {
    format!("{}-{}", method, pattern)
}

fn default_not_found() -> HandlerFn {
    Arc::new(|c: &mut Context| {
        let body = format!("404 NOT FOUND: {}\n", c.path());
        c.string(StatusCode::NOT_FOUND, body);
    })
}

impl Router {
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
            handlers: HashMap::new(),
            not_found: default_not_found(),
        }
    }

    /// 라우트를 등록합니다.
    ///
    /// 충돌이 있으면 경고만 남기고 마지막 등록을 우선합니다.
    /// 공유되는 파라미터 슬롯의 이름은 처음 등록된 이름이 유지됩니다.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFn) {
        if let Err(e) = self.check_conflict(&method, pattern) {
            warn!(method = %method, pattern = %pattern, error = %e, "라우트 충돌, 마지막 등록을 우선함");
        }
        self.insert(method, pattern, handler);
    }

    /// 충돌이 없을 때만 라우트를 등록합니다. 충돌 시 테이블은 변경되지 않습니다.
    pub fn try_add_route(&mut self, method: Method, pattern: &str, handler: HandlerFn) -> Result<()> {
        self.check_conflict(&method, pattern)?;
        self.insert(method, pattern, handler);
        Ok(())
    }

    fn check_conflict(&self, method: &Method, pattern: &str) -> Result<()> {
        if self.handlers.contains_key(&route_key(method, pattern)) {
            return Err(RouteError::DuplicateRoute {
                method: method.to_string(),
                pattern: pattern.to_string(),
            });
        }

        match self.roots.get(method) {
            Some(root) => match root.conflict(pattern, &parse_pattern(pattern), 0) {
                Some(e) => Err(e),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn insert(&mut self, method: Method, pattern: &str, handler: HandlerFn) {
        info!("라우트 등록 {:>6} - {}", method.as_str(), pattern);

        let key = route_key(&method, pattern);
        let parts = parse_pattern(pattern);
        let root = self.roots.entry(method).or_insert_with(Node::root);
        if let Some(previous) = root.insert(pattern, &parts, 0) {
            debug!(previous = %previous, pattern = %pattern, "종단 노드의 패턴 교체");
        }
        self.handlers.insert(key, handler);
    }

    /// 기본 404 핸들러를 교체합니다.
    pub fn set_not_found(&mut self, handler: HandlerFn) {
        self.not_found = handler;
    }

    /// 요청 경로를 등록된 패턴과 매칭하고 파라미터를 추출합니다.
    ///
    /// 매칭되지 않으면 `None` 을 반환합니다.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let search_parts = parse_pattern(path);
        let node = self.roots.get(method)?.search(&search_parts, 0)?;
        let pattern = node.pattern()?;

        let mut params = HashMap::new();
        for (index, part) in parse_pattern(pattern).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    continue;
                }
                if let Some(value) = search_parts.get(index) {
                    params.insert(name.to_string(), value.to_string());
                }
            } else if let Some(name) = part.strip_prefix('*') {
                if !name.is_empty() {
                    if let Some(rest) = search_parts.get(index..) {
                        params.insert(name.to_string(), rest.join("/"));
                    }
                }
                break;
            }
        }

        Some(RouteMatch {
            pattern: pattern.to_string(),
            params,
        })
    }

    /// 라우트를 찾아 핸들러(없으면 404 핸들러)를 체인 끝에 붙이고 체인을 실행합니다.
    pub fn handle(&self, c: &mut Context) {
        let handler = match self.resolve(c.method(), c.path()) {
            Some(RouteMatch { pattern, params }) => {
                c.set_params(params);
                self.handlers
                    .get(&route_key(c.method(), &pattern))
                    .cloned()
                    .unwrap_or_else(|| self.not_found.clone())
            }
            None => {
                debug!(method = %c.method(), path = %c.path(), "매칭되는 라우트 없음");
                self.not_found.clone()
            }
        };

        c.push_handler(handler);
        c.next();
    }

    /// 메서드별로 등록된 패턴 목록을 반환합니다.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes = Vec::new();
        for (method, root) in &self.roots {
            let mut patterns = Vec::new();
            root.collect_patterns(&mut patterns);
            routes.extend(patterns.into_iter().map(|p| (method.clone(), p)));
        }
        routes.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        routes
    }
}
