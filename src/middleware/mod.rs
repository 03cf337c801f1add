//! 체인에 그대로 끼워 넣는 기본 제공 미들웨어입니다.

mod logger;
mod recovery;

pub use logger::{logger, REQUEST_ID_HEADER};
pub use recovery::recovery;
