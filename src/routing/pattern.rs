use std::hash::Hash;
use std::str::FromStr;
use regex_lite as regex;
use crate::routing::error::RoutingError;

/// 와일드카드 문자
pub const WILDCARD: char = '*';

/// 글롭 형태의 호스트 패턴을 컴파일한 매처입니다.
///
/// 리터럴 문자는 그대로 일치해야 하고, `*`는 한 글자 이상의 임의 문자열과
/// 일치합니다. 허용 문자는 `[A-Za-z0-9*[].:_-]` 뿐입니다.
///
/// # 예제
///
/// ```
/// use vhost_router::routing::Pattern;
///
/// let pattern = Pattern::compile("*.example.com").unwrap();
/// assert!(pattern.matches("api.example.com"));
/// assert!(!pattern.matches(".example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: regex::Regex,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self, RoutingError> {
        if source.is_empty() {
            return Err(RoutingError::InvalidPattern {
                pattern: source.to_string(),
                reason: "빈 패턴".to_string(),
            });
        }

        if let Some(c) = source.chars().find(|c| !is_pattern_char(*c)) {
            return Err(RoutingError::InvalidPattern {
                pattern: source.to_string(),
                reason: format!("허용되지 않는 문자 {:?}", c),
            });
        }

        // 리터럴 구간을 이스케이프한 뒤 '*'를 ".+"로 치환
        let body = source
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".+");

        let regex = regex::Regex::new(&format!("^{}$", body))
            .map_err(|e| RoutingError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_wildcard(&self) -> bool {
        self.source.contains(WILDCARD)
    }
}

fn is_pattern_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '*' | '[' | ']' | '.' | ':' | '_' | '-')
}

impl FromStr for Pattern {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::compile(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

/// 후보 문자열과 일치하는 패턴 중 가장 긴 패턴 문자열을 반환합니다.
///
/// 길이가 같은 패턴이 여럿이면 먼저 나온 패턴이 이깁니다.
/// 일치하는 패턴이 없으면 빈 문자열을 반환하고, 컴파일할 수 없는 패턴은
/// 어떤 후보와도 일치하지 않는 것으로 취급합니다.
///
/// ```
/// use vhost_router::routing::best_match;
///
/// assert_eq!(best_match(["a*", "ab*"], "abcdef"), "ab*");
/// assert_eq!(best_match(["a*"], "zzz"), "");
/// ```
pub fn best_match<'a, I>(patterns: I, candidate: &str) -> &'a str
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best = "";
    for source in patterns {
        let matched = Pattern::compile(source)
            .map(|p| p.matches(candidate))
            .unwrap_or(false);
        if matched && source.len() > best.len() {
            best = source;
        }
    }
    best
}

/// 이미 컴파일된 패턴 목록에서 [`best_match`]와 같은 규칙으로 가장 잘 맞는 항목을 찾습니다.
///
/// 패턴을 품은 항목(`AsRef<Pattern>`)을 그대로 돌려주므로 같은 패턴 문자열이 여러 번
/// 있어도 선택된 위치의 항목이 반환됩니다.
pub fn best_compiled<'a, T, I>(items: I, candidate: &str) -> Option<&'a T>
where
    T: AsRef<Pattern> + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<&'a T> = None;
    for item in items {
        let pattern = item.as_ref();
        if !pattern.matches(candidate) {
            continue;
        }
        let longer = best.map_or(true, |b| pattern.source.len() > b.as_ref().source.len());
        if longer {
            best = Some(item);
        }
    }
    best
}

impl AsRef<Pattern> for Pattern {
    fn as_ref(&self) -> &Pattern {
        self
    }
}
