//! `Engine` 을 hyper HTTP/1 연결에 연결하는 전송 계층입니다.

pub mod handler;
pub mod listener;
pub mod error;

pub type Result<T> = std::result::Result<T, ServerError>;

pub use error::ServerError;
pub use handler::RequestHandler;
pub use listener::Server;
