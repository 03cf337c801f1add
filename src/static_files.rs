use std::fs;
use std::path::{Component, Path, PathBuf};

use hyper::StatusCode;
use tracing::debug;

use crate::context::{handler, HandlerFn};

/// `root` 아래의 파일을 `filepath` 파라미터 경로로 제공하는 핸들러를 만듭니다.
///
/// 파일이 없거나 읽을 수 없거나, 경로가 `root` 밖을 가리키면 404 로 응답합니다.
pub fn serve_dir(root: PathBuf) -> HandlerFn {
    handler(move |c| {
        let Some(path) = resolve_file(&root, c.param("filepath")) else {
            c.status(StatusCode::NOT_FOUND);
            return;
        };

        match fs::read(&path) {
            Ok(contents) => {
                let mime = mime_guess::from_path(&path).first_or_octet_stream();
                c.set_header("Content-Type", mime.as_ref());
                c.data(StatusCode::OK, &contents);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "정적 파일 읽기 실패");
                c.status(StatusCode::NOT_FOUND);
            }
        }
    })
}

fn resolve_file(root: &Path, file: &str) -> Option<PathBuf> {
    let relative = Path::new(file);
    let escapes = relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if file.is_empty() || escapes {
        return None;
    }

    let path = root.join(relative);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::engine::Engine;
    use bytes::Bytes;
    use hyper::Request;
    use std::collections::HashMap;

    fn serve(root: &Path, filepath: &str) -> Context {
        let req = Request::builder().uri("/assets").body(Bytes::new()).unwrap();
        let mut c = Context::new(req);
        c.set_params(HashMap::from([("filepath".to_string(), filepath.to_string())]));
        c.set_handlers(vec![serve_dir(root.to_path_buf())]);
        c.next();
        c
    }

    #[test]
    fn test_serves_file_with_mime() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body {}").unwrap();

        let c = serve(dir.path(), "css/site.css");
        assert_eq!(c.status_code(), StatusCode::OK);
        assert_eq!(c.response_body(), b"body {}");
        assert_eq!(c.response_headers()["content-type"], "text/css");
    }

    #[test]
    fn test_missing_and_escaping_paths_are_404() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        assert_eq!(serve(dir.path(), "nope.txt").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(serve(dir.path(), "../a.txt").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(serve(dir.path(), "").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(serve(dir.path(), ".").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(serve(dir.path(), "a.txt").status_code(), StatusCode::OK);
    }

    #[test]
    fn test_encoded_file_names_are_served() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my file.txt"), "spaced").unwrap();
        fs::write(dir.path().join("ü.txt"), "umlaut").unwrap();

        let mut engine = Engine::new();
        engine.static_files("/assets", dir.path());

        let get = |uri: &str| Request::get(uri).body(Bytes::new()).unwrap();

        let res = engine.handle(get("/assets/my%20file.txt"));
        assert_eq!(res.status(), StatusCode::OK);

        let res = engine.handle(get("/assets/%C3%BC.txt"));
        assert_eq!(res.status(), StatusCode::OK);

        let res = engine.handle(get("/assets/%2E%2E/secret"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
