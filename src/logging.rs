use std::fs;
use std::path::Path;

use tracing::{error, info, span, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::context::Context;
use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 로그 설정에 따라 전역 tracing 구독자를 초기화합니다.
///
/// 파일 출력인 경우 논블로킹 writer 의 guard 를 반환하며, 프로세스가 끝날 때까지
/// 유지해야 남은 로그가 기록됩니다.
pub fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => (None, None),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "trellis.log".into());
            if let Err(e) = fs::create_dir_all(dir) {
                eprintln!("로그 디렉토리 생성 실패 {}: {}", dir.display(), e);
            }
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
    };

    let result = match (&settings.format, writer) {
        (LogFormat::Json, Some(writer)) => builder.json().with_writer(writer).try_init(),
        (LogFormat::Json, None) => builder.json().try_init(),
        (LogFormat::Text, Some(writer)) => builder.with_ansi(false).with_writer(writer).try_init(),
        (LogFormat::Text, None) => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("로깅 초기화 실패: {}", e);
    }
    guard
}

/// 요청 하나의 처리 결과를 모아 로그로 남기는 구조체입니다.
#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            status_code: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn with_request(&mut self, c: &Context) {
        self.method = c.method().to_string();
        self.path = c
            .request()
            .uri()
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| c.path().to_string());
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }
}

pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path,
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(
            status = log.status_code,
            duration_ms = log.duration_ms,
            error = ?log.error,
            "Request failed"
        ),
        Level::WARN => warn!(
            status = log.status_code,
            duration_ms = log.duration_ms,
            "Request completed with warning"
        ),
        _ => info!(
            status = log.status_code,
            duration_ms = log.duration_ms,
            "Request completed successfully"
        ),
    }
}
