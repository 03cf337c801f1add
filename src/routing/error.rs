/// 라우트 등록 시 발생하는 충돌을 표현하는 열거형입니다.
///
/// 엄격 모드(`Router::try_add_route`)에서만 에러로 반환되고,
/// 기본 등록 경로에서는 경고 로그로만 남습니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// 동일한 (메서드, 패턴) 조합이 이미 등록됨
    #[error("이미 등록된 라우트: {method} {pattern}")]
    DuplicateRoute {
        method: String,
        pattern: String,
    },

    /// 다른 패턴이 같은 트라이 종단 노드를 차지하고 있음
    #[error("패턴 충돌: {pattern} 이(가) 기존 패턴 {existing} 과(와) 같은 경로로 해석됨")]
    PatternConflict {
        existing: String,
        pattern: String,
    },

    /// 같은 위치의 파라미터/와일드카드 슬롯에 다른 이름이 이미 존재함
    #[error("파라미터 이름 충돌: {pattern} 의 {segment} 위치에 이미 {existing} 이(가) 등록됨")]
    ParamConflict {
        existing: String,
        segment: String,
        pattern: String,
    },
}
