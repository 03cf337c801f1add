//! 메서드별 트라이 기반 경로 매칭과 핸들러 조회를 담당하는 모듈입니다.

mod error;
mod node;
mod pattern;
mod router;

pub use error::RouteError;
pub use node::Node;
pub use pattern::parse_pattern;
pub use router::{RouteMatch, Router};

pub type Result<T> = std::result::Result<T, RouteError>;
