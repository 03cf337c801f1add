use std::sync::Arc;

use hyper::StatusCode;
use serde::Serialize;
use tracing::{error, info};
use trellis::{
    handler,
    logging::init_logging,
    server::Server,
    settings::Settings,
    Engine, HandlerFn,
};

#[derive(Serialize)]
struct Student {
    name: &'static str,
    age: u8,
}

fn first_for_v2() -> HandlerFn {
    handler(|c| {
        info!(status = %c.status_code(), path = %c.path(), "v2 그룹 첫 번째");
        c.next();
        info!(status = %c.status_code(), path = %c.path(), "v2 그룹 네 번째");
    })
}

fn second_for_v2() -> HandlerFn {
    handler(|c| {
        info!(status = %c.status_code(), path = %c.path(), "v2 그룹 두 번째");
        c.next();
        info!(status = %c.status_code(), path = %c.path(), "v2 그룹 세 번째");
    })
}

fn build_engine(settings: &Settings) -> Engine {
    let mut engine = Engine::from_settings(&settings.router);
    engine.static_files("/assets", "./static");

    engine.get("/", handler(|c| c.html(StatusCode::OK, "<h1>Hello Trellis</h1>")));
    engine.get("/panic", handler(|c| {
        let names = ["trellis"];
        let index = c.query("index").parse::<usize>().unwrap_or(100);
        c.string(StatusCode::OK, names[index]);
    }));

    {
        let mut v1 = engine.group("/v1");
        v1.get("/students", handler(|c| {
            let students = [
                Student { name: "CC", age: 20 },
                Student { name: "Jack", age: 22 },
            ];
            c.json(StatusCode::OK, &students);
        }));
        v1.get("/hello", handler(|c| {
            // /hello?name=trellis
            let body = format!("hello {}, you're at {}\n", c.query("name"), c.path());
            c.string(StatusCode::OK, body);
        }));
    }

    {
        let mut v2 = engine.group("/v2");
        v2.use_middleware(first_for_v2())
            .use_middleware(second_for_v2());
        v2.get("/hello/:name", handler(|c| {
            let body = format!("hello {}, you're at {}\n", c.param("name"), c.path());
            c.string(StatusCode::OK, body);
        }));
        v2.get("/file/*filepath", handler(|c| {
            let body = format!("visit {}, you're at {}\n", c.param("filepath"), c.path());
            c.string(StatusCode::OK, body);
        }));
        v2.post("/login", handler(|c| {
            let body = serde_json::json!({
                "username": c.post_form("username"),
                "password": c.post_form("password"),
            });
            c.json(StatusCode::OK, &body);
        }));
    }

    engine
}

#[tokio::main]
async fn main() {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = init_logging(&settings.logging);

    let engine = Arc::new(build_engine(&settings));
    let server = match Server::bind_with_body_limit(
        settings.server.addr(),
        engine,
        settings.server.max_body_bytes,
    )
    .await
    {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "서버 시작 실패");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "종료 신호 대기 실패");
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = server.run_with_shutdown(shutdown).await {
        error!(error = %e, "서버 실행 실패");
    }
}
