/// 라우트 패턴(또는 요청 경로)을 `/` 기준 세그먼트로 분리합니다.
///
/// 빈 세그먼트는 버리므로 앞뒤 슬래시나 중복 슬래시는 무시됩니다.
/// `*` 로 시작하는 세그먼트를 만나면 그 뒤는 처리하지 않습니다.
///
/// # 예제
///
/// ```
/// use trellis::routing::parse_pattern;
///
/// assert_eq!(parse_pattern("/a//b/"), vec!["a", "b"]);
/// assert_eq!(parse_pattern("/a/*rest/ignored"), vec!["a", "*rest"]);
/// ```
pub fn parse_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for item in pattern.split('/').filter(|item| !item.is_empty()) {
        parts.push(item);
        if item.starts_with('*') {
            break;
        }
    }
    parts
}
