use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response};

use crate::routing::error::RoutingError;
use crate::routing::App;

/// 인터셉트 경로에서 요청을 직접 처리하는 함수입니다.
pub type HandlerFn = Arc<dyn Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync>;

/// `intercept`에 넘기는 핸들러 인자입니다.
///
/// 단일 함수는 경로의 기본 핸들러가 되고, 메서드 맵은 기존 메서드 맵에 병합됩니다.
#[derive(Clone)]
pub enum Handler {
    Single(HandlerFn),
    Methods(HashMap<Method, HandlerFn>),
}

impl Handler {
    pub fn single<F>(f: F) -> Self
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        Handler::Single(Arc::new(f))
    }

    pub fn for_method<F>(method: Method, f: F) -> Self
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        Handler::Methods(HashMap::from([(method, Arc::new(f) as HandlerFn)]))
    }

    /// 메서드 핸들러를 추가합니다. 단일 핸들러였다면 메서드 맵으로 바뀝니다.
    pub fn with<F>(self, method: Method, f: F) -> Self
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        let mut methods = match self {
            Handler::Methods(methods) => methods,
            Handler::Single(_) => HashMap::new(),
        };
        methods.insert(method, Arc::new(f));
        Handler::Methods(methods)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Single(_) => write!(f, "Handler::Single"),
            Handler::Methods(methods) => f
                .debug_tuple("Handler::Methods")
                .field(&methods.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// 한 경로에 등록된 메서드별 핸들러와 기본 핸들러입니다.
#[derive(Clone, Default)]
pub struct InterceptHandlers {
    pub per_method: HashMap<Method, HandlerFn>,
    pub default: Option<HandlerFn>,
}

impl InterceptHandlers {
    pub fn merge(&mut self, handler: Handler) {
        match handler {
            Handler::Single(f) => self.default = Some(f),
            Handler::Methods(methods) => self.per_method.extend(methods),
        }
    }

    /// 메서드 핸들러를 먼저 찾고, 없으면 기본 핸들러를 반환합니다.
    pub fn handler_for(&self, method: &Method) -> Option<HandlerFn> {
        self.per_method
            .get(method)
            .or(self.default.as_ref())
            .cloned()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.per_method.keys().cloned().collect()
    }
}

impl fmt::Debug for InterceptHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptHandlers")
            .field("per_method", &self.per_method.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// 마운트 테이블의 항목입니다.
#[derive(Clone, Debug)]
pub enum MountEntry {
    SubApp(App),
    Intercept(InterceptHandlers),
}

/// 정규화된 절대 경로를 하위 앱 또는 인터셉트 핸들러에 매핑합니다.
///
/// 서로 접두사 관계인 두 키는 공존할 수 없습니다. 단, 완전히 같은 경로의
/// 인터셉트는 하나의 항목으로 합쳐집니다.
#[derive(Clone, Debug, Default)]
pub struct MountTable {
    entries: HashMap<String, MountEntry>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, directory: &str) -> Option<&MountEntry> {
        self.entries.get(directory)
    }

    pub fn directories(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn apps(&self) -> impl Iterator<Item = &App> {
        self.entries.values().filter_map(|entry| match entry {
            MountEntry::SubApp(app) => Some(app),
            MountEntry::Intercept(_) => None,
        })
    }

    /// `directory`와 접두사 관계인 기존 키를 찾습니다.
    fn find_overlap(&self, directory: &str, allow_identical: bool) -> Option<&str> {
        self.entries
            .keys()
            .find(|existing| {
                if allow_identical && existing.as_str() == directory {
                    return false;
                }
                existing.starts_with(directory) || directory.starts_with(existing.as_str())
            })
            .map(String::as_str)
    }

    /// 하위 앱을 등록합니다. `directory`는 이미 정규화되어 있어야 합니다.
    pub fn insert_app(&mut self, directory: &str, app: App) -> Result<(), RoutingError> {
        if let Some(existing) = self.find_overlap(directory, false) {
            return Err(RoutingError::MountOverlap {
                directory: directory.to_string(),
                existing: existing.to_string(),
            });
        }
        self.entries.insert(directory.to_string(), MountEntry::SubApp(app));
        Ok(())
    }

    /// 인터셉트 핸들러를 등록하거나 같은 경로의 기존 인터셉트에 병합합니다.
    pub fn insert_intercept(&mut self, directory: &str, handler: Handler) -> Result<(), RoutingError> {
        if let Some(existing) = self.find_overlap(directory, true) {
            return Err(RoutingError::MountOverlap {
                directory: directory.to_string(),
                existing: existing.to_string(),
            });
        }

        match self.entries.get_mut(directory) {
            Some(MountEntry::Intercept(handlers)) => handlers.merge(handler),
            Some(MountEntry::SubApp(_)) => {
                return Err(RoutingError::MountOverlap {
                    directory: directory.to_string(),
                    existing: directory.to_string(),
                });
            }
            None => {
                let mut handlers = InterceptHandlers::default();
                handlers.merge(handler);
                self.entries.insert(directory.to_string(), MountEntry::Intercept(handlers));
            }
        }
        Ok(())
    }

    /// 경로 세그먼트 경계를 지키며 `path`를 포함하는 가장 긴 마운트 키를 찾습니다.
    pub fn longest_prefix(&self, path: &str) -> Option<&str> {
        self.entries
            .keys()
            .filter(|key| is_path_prefix(key, path))
            .max_by_key(|key| key.len())
            .map(String::as_str)
    }
}

fn is_path_prefix(key: &str, path: &str) -> bool {
    match path.strip_prefix(key) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// 마운트 경로를 정규화합니다: `\`는 `/`로, 끝의 `/`는 모두 제거.
///
/// `/`로 끝나는 키는 세그먼트 경계 비교에서 어떤 경로와도 맞지 않으므로 하나만
/// 지우지 않고 전부 지웁니다.
pub fn normalize_directory(directory: &str) -> String {
    directory.replace('\\', "/").trim_end_matches('/').to_string()
}

/// 마운트 경로를 검증하고 정규화된 형태를 반환합니다.
pub fn validate_directory(directory: &str) -> Result<String, RoutingError> {
    let normalized = normalize_directory(directory);

    // POSIX 기준 절대 경로만 허용: `\api`는 상대 경로
    if !directory.starts_with('/') {
        return Err(RoutingError::InvalidDirectory {
            directory: directory.to_string(),
            reason: "절대 경로여야 합니다".to_string(),
        });
    }

    if normalized.len() < 2 {
        return Err(RoutingError::InvalidDirectory {
            directory: directory.to_string(),
            reason: "루트는 하위 디렉터리가 아닙니다".to_string(),
        });
    }

    Ok(normalized)
}

/// 요청 경로를 정리합니다.
///
/// `\`를 `/`로 바꾸고 중복 슬래시와 `.` 세그먼트를 제거하며, `..`는 루트를
/// 넘지 않는 선에서 상위 세그먼트로 이동합니다. 끝의 슬래시는 남기지 않습니다.
///
/// ```
/// use vhost_router::routing::clean_path;
///
/// assert_eq!(clean_path("//api/./v1/../users/"), "/api/users");
/// assert_eq!(clean_path("/../.."), "/");
/// ```
pub fn clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_path_prefix() {
        assert!(is_path_prefix("/api", "/api"));
        assert!(is_path_prefix("/api", "/api/"));
        assert!(is_path_prefix("/api", "/api/users"));
        assert!(!is_path_prefix("/api", "/apis"));
        assert!(!is_path_prefix("/api", "/ap"));
    }

    #[test]
    fn test_longest_prefix_respects_segments() {
        let mut table = MountTable::new();
        table.insert_intercept("/api", Handler::single(|_| Response::new(Full::new(Bytes::new())))).unwrap();
        table.insert_intercept("/apis", Handler::single(|_| Response::new(Full::new(Bytes::new())))).unwrap_err();
        table.insert_intercept("/web", Handler::single(|_| Response::new(Full::new(Bytes::new())))).unwrap();

        assert_eq!(table.longest_prefix("/api/users"), Some("/api"));
        assert_eq!(table.longest_prefix("/web"), Some("/web"));
        assert_eq!(table.longest_prefix("/website"), None);
        assert_eq!(table.longest_prefix("/"), None);
    }
}
