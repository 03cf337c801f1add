use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::engine::Engine;
use super::error::ServerError;
use super::handler::{RequestHandler, DEFAULT_MAX_BODY_BYTES};
use super::Result;

/// TCP 연결을 받아 연결마다 태스크를 띄워 처리하는 서버입니다.
pub struct Server {
    listener: TcpListener,
    handler: Arc<RequestHandler>,
}

impl Server {
    pub async fn bind(addr: SocketAddr, engine: Arc<Engine>) -> Result<Self> {
        Self::bind_with_body_limit(addr, engine, DEFAULT_MAX_BODY_BYTES).await
    }

    /// 요청 본문 최대 크기를 지정해 바인딩합니다.
    pub async fn bind_with_body_limit(
        addr: SocketAddr,
        engine: Arc<Engine>,
        max_body_bytes: usize,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!(error = %e, addr = %addr, "HTTP 포트 바인딩 실패");
            ServerError::Bind { addr, source: e }
        })?;

        info!(addr = %listener.local_addr()?, "HTTP 리스너 시작");

        Ok(Self {
            listener,
            handler: Arc::new(RequestHandler::with_body_limit(engine, max_body_bytes)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 연결 수락을 무한히 반복합니다.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// `shutdown` 이 완료될 때까지 연결을 수락합니다.
    ///
    /// 이미 처리 중인 연결 태스크는 기다리지 않습니다.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let handler = self.handler.clone();
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                if let Err(err) = handler.handle_connection(io).await {
                                    error!(error = %err, "HTTP 연결 처리 실패");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "HTTP 연결 수락 실패");
                        }
                    }
                }

                _ = &mut shutdown => {
                    info!("종료 신호 수신, 리스너 중지");
                    return Ok(());
                }
            }
        }
    }
}
