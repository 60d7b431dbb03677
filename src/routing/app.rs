use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use bytes::Bytes;
use dashmap::DashMap;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use parking_lot::{const_mutex, Mutex, RwLock};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::routing::{
    clean_path,
    validate_directory,
    Binding,
    Handler,
    HandlerFn,
    MountEntry,
    MountTable,
    ReadyEvent,
    ReadyNotice,
    RoutingError,
};

/// 경로 캐시에 담을 최대 항목 수
const MAX_PATH_CACHE: usize = 4096;

// 순환 검사와 하위 앱 등록 사이에 다른 마운트가 끼어들지 못하게 함
static MOUNT_LOCK: Mutex<()> = const_mutex(());

/// 준비 이벤트 브로드캐스트 버퍼 크기
const READY_CHANNEL_CAPACITY: usize = 16;

/// 앱 생성 옵션입니다.
///
/// 설정하지 않은 항목은 부모 앱(마운트한 앱)의 값을, 체인 전체에 값이 없으면
/// 기본값을 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    #[serde(alias = "urlCleaning")]
    pub url_cleaning: Option<bool>,
    pub headers: Option<HashMap<String, String>>,
    pub indexes: Option<HashMap<String, String>>,
    pub extensions: Option<Vec<String>>,
    #[serde(alias = "mimeTypes")]
    pub mime_types: Option<HashMap<String, String>>,
    #[serde(alias = "errorPages")]
    pub error_pages: Option<HashMap<String, String>>,
}

/// 옵션 체인을 모두 따라가 확정한 설정입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub url_cleaning: bool,
    pub headers: HashMap<String, String>,
    pub indexes: HashMap<String, String>,
    pub extensions: Vec<String>,
    pub mime_types: HashMap<String, String>,
    pub error_pages: HashMap<String, String>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            url_cleaning: true,
            headers: HashMap::from([("X-Powered-By".to_string(), "Weave".to_string())]),
            indexes: HashMap::new(),
            extensions: Vec::new(),
            mime_types: HashMap::new(),
            error_pages: HashMap::new(),
        }
    }
}

/// 경로 디스패치 결과입니다.
#[derive(Clone)]
pub enum Dispatch {
    /// 인터셉트 핸들러가 요청을 처리
    Intercept {
        app: App,
        mount: String,
        handler: HandlerFn,
    },
    /// 인터셉트 경로는 있지만 해당 메서드 핸들러도 기본 핸들러도 없음
    Unhandled {
        app: App,
        mount: String,
        method: Method,
    },
    /// 경로를 가져가는 마운트가 없어 앱이 직접 처리
    App {
        app: App,
        path: String,
    },
}

impl Dispatch {
    /// 최종적으로 요청을 맡은 앱
    pub fn app(&self) -> &App {
        match self {
            Dispatch::Intercept { app, .. }
            | Dispatch::Unhandled { app, .. }
            | Dispatch::App { app, .. } => app,
        }
    }

    /// 인터셉트 핸들러가 있으면 요청을 넘겨 응답을 받습니다.
    pub fn handle(&self, req: Request<Bytes>) -> Option<Response<Full<Bytes>>> {
        match self {
            Dispatch::Intercept { handler, .. } => Some(handler(req)),
            _ => None,
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Intercept { app, mount, .. } => f
                .debug_struct("Intercept")
                .field("app", app)
                .field("mount", mount)
                .finish_non_exhaustive(),
            Dispatch::Unhandled { app, mount, method } => f
                .debug_struct("Unhandled")
                .field("app", app)
                .field("mount", mount)
                .field("method", method)
                .finish(),
            Dispatch::App { app, path } => f
                .debug_struct("App")
                .field("app", app)
                .field("path", path)
                .finish(),
        }
    }
}

struct AppInner {
    options: AppOptions,
    parent: RwLock<Weak<AppInner>>,
    mounts: RwLock<MountTable>,
    // 요청 경로 -> 일치한 마운트 키
    path_cache: DashMap<String, Option<String>>,
    ready_tx: broadcast::Sender<ReadyEvent>,
}

/// 라우팅의 단위가 되는 앱입니다.
///
/// 복제는 같은 앱을 가리키는 핸들을 만들 뿐이며, 여러 바인딩에 연결되거나
/// 다른 앱에 마운트될 수 있습니다.
///
/// # 예제
///
/// ```
/// use vhost_router::routing::{App, Dispatch};
/// use hyper::{Method, Response};
/// use http_body_util::Full;
/// use bytes::Bytes;
///
/// let root = App::default();
/// let api = App::default();
/// root.mount("/api", &api).unwrap();
/// api.get("/users", |_| Response::new(Full::new(Bytes::from("users")))).unwrap();
///
/// match root.dispatch(&Method::GET, "/api/users/") {
///     Dispatch::Intercept { mount, .. } => assert_eq!(mount, "/users"),
///     other => panic!("unexpected dispatch: {:?}", other),
/// }
/// ```
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl Default for App {
    fn default() -> Self {
        App::new(AppOptions::default())
    }
}

impl App {
    pub fn new(options: AppOptions) -> Self {
        let (ready_tx, _) = broadcast::channel(READY_CHANNEL_CAPACITY);
        App {
            inner: Arc::new(AppInner {
                options,
                parent: RwLock::new(Weak::new()),
                mounts: RwLock::new(MountTable::new()),
                path_cache: DashMap::new(),
                ready_tx,
            }),
        }
    }

    pub fn options(&self) -> &AppOptions {
        &self.inner.options
    }

    /// 이 앱을 마운트한 부모 앱
    pub fn parent(&self) -> Option<App> {
        self.inner.parent.read().upgrade().map(|inner| App { inner })
    }

    pub fn ptr_eq(&self, other: &App) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 자기 자신부터 부모 방향으로 옵션 값을 찾습니다.
    fn lookup<T>(&self, get: impl Fn(&AppOptions) -> Option<&T>) -> Option<T>
    where
        T: Clone,
    {
        let mut current = Some(self.clone());
        while let Some(app) = current {
            if let Some(value) = get(&app.inner.options) {
                return Some(value.clone());
            }
            current = app.parent();
        }
        None
    }

    pub fn url_cleaning(&self) -> bool {
        self.lookup(|o| o.url_cleaning.as_ref()).unwrap_or(true)
    }

    pub fn resolved_options(&self) -> ResolvedOptions {
        let defaults = ResolvedOptions::default();
        ResolvedOptions {
            url_cleaning: self.url_cleaning(),
            headers: self.lookup(|o| o.headers.as_ref()).unwrap_or(defaults.headers),
            indexes: self.lookup(|o| o.indexes.as_ref()).unwrap_or(defaults.indexes),
            extensions: self.lookup(|o| o.extensions.as_ref()).unwrap_or(defaults.extensions),
            mime_types: self.lookup(|o| o.mime_types.as_ref()).unwrap_or(defaults.mime_types),
            error_pages: self.lookup(|o| o.error_pages.as_ref()).unwrap_or(defaults.error_pages),
        }
    }

    /// 바인딩에 호스트 패턴으로 이 앱을 연결합니다.
    pub fn link(&self, binding: &Binding, hostname: &str) -> Result<ReadyNotice, RoutingError> {
        binding.attach(hostname, self)
    }

    /// 바인딩의 모든 호스트를 이 앱이 처리하도록 연결합니다.
    pub fn link_all(&self, binding: &Binding) -> Result<ReadyNotice, RoutingError> {
        binding.attach("*", self)
    }

    pub fn subscribe_ready(&self) -> broadcast::Receiver<ReadyEvent> {
        self.inner.ready_tx.subscribe()
    }

    pub(crate) fn emit_ready(&self, event: ReadyEvent) {
        // 구독자가 없으면 보낼 곳이 없을 뿐
        let _ = self.inner.ready_tx.send(event);
    }

    /// `target`이 이 앱 또는 하위 트리에 있는지 확인합니다.
    fn contains(&self, target: &App) -> bool {
        if self.ptr_eq(target) {
            return true;
        }
        let children: Vec<App> = self.inner.mounts.read().apps().cloned().collect();
        children.iter().any(|child| child.contains(target))
    }

    /// 하위 앱을 `directory`에 마운트합니다.
    ///
    /// 마운트는 프로세스 전체에서 하나씩 처리되므로 동시에 서로를 마운트해도
    /// 순환이 생기지 않습니다.
    pub fn mount(&self, directory: &str, app: &App) -> Result<&Self, RoutingError> {
        let normalized = validate_directory(directory).map_err(|e| {
            warn!(directory = %directory, error = %e, "마운트 경로 검증 실패");
            e
        })?;

        let _serial = MOUNT_LOCK.lock();

        if app.contains(self) {
            let err = RoutingError::InvalidDirectory {
                directory: normalized,
                reason: "앱을 자기 자신이나 하위 트리에 마운트할 수 없습니다".to_string(),
            };
            warn!(error = %err, "마운트 거부");
            return Err(err);
        }

        let mut mounts = self.inner.mounts.write();
        mounts.insert_app(&normalized, app.clone()).map_err(|e| {
            warn!(error = %e, "마운트 경로 충돌");
            e
        })?;
        self.inner.path_cache.clear();
        *app.inner.parent.write() = Arc::downgrade(&self.inner);
        drop(mounts);

        info!(directory = %normalized, "하위 앱 마운트");
        Ok(self)
    }

    /// `directory`에 인터셉트 핸들러를 등록합니다.
    ///
    /// 같은 경로에 다시 등록하면 메서드 핸들러가 합쳐지고, 단일 핸들러는 기본
    /// 핸들러를 교체합니다. 다른 마운트와 접두사 관계면 `MountOverlap`을 반환합니다.
    pub fn intercept(&self, directory: &str, handler: Handler) -> Result<&Self, RoutingError> {
        let normalized = validate_directory(directory).map_err(|e| {
            warn!(directory = %directory, error = %e, "인터셉트 경로 검증 실패");
            e
        })?;

        debug!(directory = %normalized, handler = ?handler, "인터셉트 등록");

        let mut mounts = self.inner.mounts.write();
        mounts.insert_intercept(&normalized, handler).map_err(|e| {
            warn!(error = %e, "인터셉트 경로 충돌");
            e
        })?;
        self.inner.path_cache.clear();
        drop(mounts);

        info!(directory = %normalized, "인터셉트 등록 완료");
        Ok(self)
    }

    fn intercept_method<F>(&self, method: Method, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept(directory, Handler::for_method(method, f))
    }

    pub fn get<F>(&self, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept_method(Method::GET, directory, f)
    }

    pub fn post<F>(&self, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept_method(Method::POST, directory, f)
    }

    pub fn head<F>(&self, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept_method(Method::HEAD, directory, f)
    }

    pub fn put<F>(&self, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept_method(Method::PUT, directory, f)
    }

    pub fn delete<F>(&self, directory: &str, f: F) -> Result<&Self, RoutingError>
    where
        F: Fn(Request<Bytes>) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.intercept_method(Method::DELETE, directory, f)
    }

    /// 마운트된 경로 목록
    pub fn directories(&self) -> Vec<String> {
        self.inner.mounts.read().directories()
    }

    pub fn mount_entry(&self, directory: &str) -> Option<MountEntry> {
        self.inner.mounts.read().get(directory).cloned()
    }

    /// 요청 경로를 처리할 앱과 핸들러를 찾습니다.
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch {
        let path = if self.url_cleaning() {
            clean_path(path)
        } else {
            path.to_string()
        };

        let matched = {
            let mounts = self.inner.mounts.read();
            let key = match self.inner.path_cache.get(&path) {
                Some(hit) => hit.value().clone(),
                None => {
                    let key = mounts.longest_prefix(&path).map(str::to_string);
                    // 가득 차면 비우고 다시 채움
                    if self.inner.path_cache.len() >= MAX_PATH_CACHE {
                        self.inner.path_cache.clear();
                    }
                    self.inner.path_cache.insert(path.clone(), key.clone());
                    key
                }
            };
            key.and_then(|key| mounts.get(&key).cloned().map(|entry| (key, entry)))
        };

        match matched {
            Some((mount, MountEntry::SubApp(child))) => {
                let rest = &path[mount.len()..];
                let rest = if rest.is_empty() { "/" } else { rest };
                debug!(mount = %mount, path = %rest, "하위 앱으로 디스패치");
                child.dispatch(method, rest)
            }
            Some((mount, MountEntry::Intercept(handlers))) => match handlers.handler_for(method) {
                Some(handler) => Dispatch::Intercept {
                    app: self.clone(),
                    mount,
                    handler,
                },
                None => {
                    debug!(mount = %mount, method = %method, "메서드 핸들러 없음");
                    Dispatch::Unhandled {
                        app: self.clone(),
                        mount,
                        method: method.clone(),
                    }
                }
            },
            None => Dispatch::App {
                app: self.clone(),
                path,
            },
        }
    }
}

impl PartialEq for App {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for App {}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("mounts", &self.directories())
            .finish()
    }
}
