use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Method, Request, StatusCode};
use std::sync::{Arc, Mutex};
use trellis::{handler, Context, Engine, HandlerFn};

type Log = Arc<Mutex<Vec<String>>>;

fn tag(log: &Log, name: &'static str) -> HandlerFn {
    let log = log.clone();
    handler(move |c| {
        log.lock().unwrap().push(name.to_string());
        c.next();
    })
}

fn request(method: Method, uri: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

async fn body_string(res: hyper::Response<http_body_util::Full<Bytes>>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_groups(log: &Log) -> Engine {
        let mut engine = Engine::new();
        engine.use_middleware(tag(log, "root"));
        {
            let mut v1 = engine.group("/v1");
            v1.use_middleware(tag(log, "v1"));
            v1.get("/hello", handler(|c| c.string(StatusCode::OK, "v1 hello")));

            let mut admin = v1.group("/admin");
            admin.use_middleware(tag(log, "admin-1"))
                .use_middleware(tag(log, "admin-2"));
            admin.get("/users/:id", handler(|c| {
                let body = format!("user {}", c.param("id"));
                c.string(StatusCode::OK, body);
            }));
        }
        engine
    }

    #[tokio::test]
    async fn test_prefix_middlewares_in_registration_order() {
        let log: Log = Arc::default();
        let engine = engine_with_groups(&log);

        let res = engine.handle(request(Method::GET, "/v1/admin/users/7"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "user 7");
        assert_eq!(*log.lock().unwrap(), vec!["root", "v1", "admin-1", "admin-2"]);
    }

    #[test]
    fn test_only_matching_groups_apply() {
        let log: Log = Arc::default();
        let engine = engine_with_groups(&log);

        engine.handle(request(Method::GET, "/v1/hello"));
        assert_eq!(*log.lock().unwrap(), vec!["root", "v1"]);
    }

    #[tokio::test]
    async fn test_not_found_still_runs_middlewares() {
        let log: Log = Arc::default();
        let engine = engine_with_groups(&log);

        let res = engine.handle(request(Method::GET, "/v1/missing"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(res).await, "404 NOT FOUND: /v1/missing\n");
        assert_eq!(*log.lock().unwrap(), vec!["root", "v1"]);
    }

    #[test]
    fn test_prefix_is_plain_string_prefix() {
        let log: Log = Arc::default();
        let engine = engine_with_groups(&log);

        // "/v1" 그룹은 "/v1x" 경로에도 접두사로 일치한다
        let middlewares = engine.middlewares_for("/v1x/anything");
        assert_eq!(middlewares.len(), 2);
    }

    #[test]
    fn test_handle_context_exposes_params() {
        let log: Log = Arc::default();
        let engine = engine_with_groups(&log);

        let mut c = Context::new(request(Method::GET, "/v1/admin/users/42"));
        engine.handle_context(&mut c);
        assert_eq!(c.param("id"), "42");
        assert_eq!(c.handler_count(), 5);
    }

    #[test]
    fn test_middleware_can_short_circuit() {
        let mut engine = Engine::new();
        {
            let mut api = engine.group("/api");
            api.use_middleware(handler(|c| {
                if c.header("authorization").is_none() {
                    c.fail(StatusCode::UNAUTHORIZED, "unauthorized");
                    return;
                }
                c.next();
            }));
            api.get("/secret", handler(|c| c.string(StatusCode::OK, "secret")));
        }

        let res = engine.handle(request(Method::GET, "/api/secret"));
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = Request::get("/api/secret")
            .header("Authorization", "Bearer t")
            .body(Bytes::new())
            .unwrap();
        let res = engine.handle(req);
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_strict_routes_rejects_conflicts() {
        let mut engine = Engine::new();
        engine.set_strict_routes(true);
        engine.get("/user/:id", handler(|c| c.string(StatusCode::OK, "id")));
        engine.get("/user/:name", handler(|c| c.string(StatusCode::OK, "name")));
        engine.get("/user/:id", handler(|c| c.string(StatusCode::OK, "again")));

        let found = engine.router().resolve(&Method::GET, "/user/1").unwrap();
        assert_eq!(found.pattern, "/user/:id");
        assert_eq!(engine.router().routes().len(), 1);
    }

    #[tokio::test]
    async fn test_permissive_routes_last_wins() {
        let mut engine = Engine::new();
        engine.get("/user/:id", handler(|c| c.string(StatusCode::OK, "first")));
        engine.get("/user/:id", handler(|c| c.string(StatusCode::OK, "second")));

        let res = engine.handle(request(Method::GET, "/user/1"));
        assert_eq!(body_string(res).await, "second");
    }

    #[tokio::test]
    async fn test_custom_not_found() {
        let mut engine = Engine::new();
        engine.set_not_found(handler(|c| {
            let body = serde_json::json!({ "path": c.path() });
            c.json(StatusCode::NOT_FOUND, &body);
        }));

        let res = engine.handle(request(Method::DELETE, "/gone"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(res).await, r#"{"path":"/gone"}"#);
    }

    #[tokio::test]
    async fn test_with_defaults_recovers_panics() {
        let mut engine = Engine::with_defaults();
        engine.get("/panic", handler(|_| panic!("handler panic")));

        let res = engine.handle(request(Method::GET, "/panic"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.headers().contains_key(trellis::middleware::REQUEST_ID_HEADER));
        assert_eq!(body_string(res).await, r#"{"message":"Internal Server Error"}"#);
    }

    #[test]
    fn test_http_method_helpers() {
        let mut engine = Engine::new();
        let noop = || handler(|c| c.string(StatusCode::OK, ""));
        engine
            .get("/r", noop())
            .post("/r", noop())
            .put("/r", noop())
            .delete("/r", noop())
            .patch("/r", noop())
            .add_route(Method::OPTIONS, "/r", noop());

        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
            assert!(engine.router().resolve(&method, "/r").is_some(), "{} 라우트가 없음", method);
        }
        assert!(engine.router().resolve(&Method::HEAD, "/r").is_none());
    }
}
