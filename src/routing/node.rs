use std::collections::HashMap;

use super::RouteError;

/// 라우트 트라이의 한 세그먼트 레벨을 표현하는 노드입니다.
///
/// 정적 자식은 세그먼트 텍스트로 구분하고, 파라미터(`:`)와 와일드카드(`*`) 자식은
/// 이름과 무관하게 각각 하나의 슬롯만 가집니다.
#[derive(Debug, Default, Clone)]
pub struct Node {
    /// 삽입된 세그먼트 텍스트 (루트는 빈 문자열)
    part: String,
    /// 종단 노드일 때 등록된 전체 패턴
    pattern: Option<String>,
    children: HashMap<String, Node>,
    param_child: Option<Box<Node>>,
    wildcard_child: Option<Box<Node>>,
}

impl Node {
    /// 트라이 루트 노드를 생성합니다.
    pub fn root() -> Self {
        Self::default()
    }

    fn new(part: &str) -> Self {
        Self {
            part: part.to_string(),
            ..Self::default()
        }
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    /// 종단 노드라면 저장된 전체 패턴을 반환합니다.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.part.starts_with('*')
    }

    /// `parts[depth..]` 를 따라 내려가며 노드를 만들고 종단에 `pattern` 을 기록합니다.
    ///
    /// 종단에 다른 패턴이 이미 있었다면 덮어쓰고 이전 패턴을 반환합니다.
    pub fn insert(&mut self, pattern: &str, parts: &[&str], depth: usize) -> Option<String> {
        if depth == parts.len() {
            let previous = self.pattern.replace(pattern.to_string());
            return previous.filter(|existing| existing != pattern);
        }

        self.child_mut(parts[depth]).insert(pattern, parts, depth + 1)
    }

    /// 요청 세그먼트와 일치하는 종단 노드를 찾습니다.
    ///
    /// 같은 깊이에서 정적 자식, 파라미터 자식, 와일드카드 자식 순으로 시도하고
    /// 가장 먼저 성공한 결과를 반환합니다. 형제 간 최적 매칭은 찾지 않습니다.
    pub fn search(&self, parts: &[&str], depth: usize) -> Option<&Node> {
        if depth == parts.len() || self.is_wildcard() {
            return self.pattern.as_ref().map(|_| self);
        }

        let part = parts[depth];
        let candidates = [
            self.children.get(part),
            self.param_child.as_deref(),
            self.wildcard_child.as_deref(),
        ];

        candidates
            .into_iter()
            .flatten()
            .find_map(|child| child.search(parts, depth + 1))
    }

    /// 삽입 전에 기존 트리와의 충돌 여부를 검사합니다. 트리는 변경하지 않습니다.
    pub fn conflict(&self, pattern: &str, parts: &[&str], depth: usize) -> Option<RouteError> {
        if depth == parts.len() {
            return match &self.pattern {
                Some(existing) if existing != pattern => Some(RouteError::PatternConflict {
                    existing: existing.clone(),
                    pattern: pattern.to_string(),
                }),
                _ => None,
            };
        }

        let part = parts[depth];
        let child = match part.chars().next() {
            Some(':') => self.param_child.as_deref(),
            Some('*') => self.wildcard_child.as_deref(),
            _ => self.children.get(part),
        }?;

        if child.part != part {
            return Some(RouteError::ParamConflict {
                existing: child.part.clone(),
                segment: part.to_string(),
                pattern: pattern.to_string(),
            });
        }

        child.conflict(pattern, parts, depth + 1)
    }

    /// 이 노드 아래의 모든 등록 패턴을 수집합니다.
    pub fn collect_patterns(&self, out: &mut Vec<String>) {
        if let Some(pattern) = &self.pattern {
            out.push(pattern.clone());
        }
        for child in self.children.values() {
            child.collect_patterns(out);
        }
        if let Some(child) = &self.param_child {
            child.collect_patterns(out);
        }
        if let Some(child) = &self.wildcard_child {
            child.collect_patterns(out);
        }
    }

    fn child_mut(&mut self, part: &str) -> &mut Node {
        match part.chars().next() {
            Some(':') => self.param_child.get_or_insert_with(|| Box::new(Node::new(part))),
            Some('*') => self.wildcard_child.get_or_insert_with(|| Box::new(Node::new(part))),
            _ => self
                .children
                .entry(part.to_string())
                .or_insert_with(|| Node::new(part)),
        }
    }
}
