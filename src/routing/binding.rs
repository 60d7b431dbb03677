use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::routing::pattern::best_compiled;
use crate::routing::ready::PendingReady;
use crate::routing::{
    App,
    CacheEntry,
    Dispatch,
    HostCache,
    HostInfo,
    Pattern,
    ReadyEvent,
    ReadyNotice,
    RoutingError,
};

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

/// 프로세스 안에서 바인딩을 구분하는 식별자입니다.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

struct Attachment {
    pattern: Pattern,
    app: App,
}

impl AsRef<Pattern> for Attachment {
    fn as_ref(&self) -> &Pattern {
        &self.pattern
    }
}

#[derive(Default)]
struct BindingState {
    // 등록 순서 유지: 같은 길이의 패턴은 먼저 등록된 쪽이 이김
    attachments: Vec<Attachment>,
    cache: HostCache,
    pending: Vec<PendingReady>,
    active: bool,
}

/// 포트 하나에 해당하는 리스너 측 라우팅 상태입니다.
///
/// 호스트 패턴을 앱에 연결하고, 요청 시점의 호스트 이름을 앱으로 해석한 결과를
/// 캐시합니다. 모든 상태는 하나의 읽기/쓰기 락 뒤에 있어서 무효화가 항상 일관된
/// 연결 목록을 봅니다.
///
/// # 예제
///
/// ```
/// use vhost_router::routing::{App, Binding};
///
/// let binding = Binding::new(8080);
/// let site = App::default();
/// let api = App::default();
///
/// binding.attach("*.example.com", &site).unwrap();
/// binding.attach("api.example.com", &api).unwrap();
///
/// assert_eq!(binding.resolve("api.example.com"), Some(api));
/// assert_eq!(binding.resolve("www.example.com"), Some(site));
/// assert_eq!(binding.resolve("example.org"), None);
/// ```
pub struct Binding {
    id: BindingId,
    port: u16,
    state: RwLock<BindingState>,
}

impl Binding {
    pub fn new(port: u16) -> Self {
        Self {
            id: BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed)),
            port,
            state: RwLock::new(BindingState::default()),
        }
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    /// 등록된 호스트 패턴 (등록 순서)
    pub fn attachments(&self) -> Vec<String> {
        self.state
            .read()
            .attachments
            .iter()
            .map(|a| a.pattern.as_str().to_string())
            .collect()
    }

    /// 호스트 패턴에 앱을 연결합니다.
    ///
    /// 반환된 [`ReadyNotice`]는 바인딩이 활성 상태면 즉시, 아니면 [`Binding::activate`]
    /// 시점에 한 번 완료됩니다.
    pub fn attach(&self, hostname: &str, app: &App) -> Result<ReadyNotice, RoutingError> {
        let pattern = Pattern::compile(hostname).map_err(|e| {
            warn!(port = self.port, error = %e, "호스트 패턴 검증 실패");
            e
        })?;

        let mut state = self.state.write();

        if state.attachments.iter().any(|a| a.pattern.as_str() == hostname) {
            warn!(port = self.port, hostname = %hostname, "이미 사용 중인 호스트");
            return Err(RoutingError::HostInUse {
                hostname: hostname.to_string(),
                port: self.port,
            });
        }

        // 새 패턴이 더 나은 매치가 될 수 있는 캐시 항목을 무효화
        if pattern.is_wildcard() {
            state.cache.invalidate_matching(&pattern);
        } else {
            state.cache.invalidate(hostname);
        }

        state.attachments.push(Attachment {
            pattern,
            app: app.clone(),
        });

        let event = ReadyEvent {
            binding: self.id,
            port: self.port,
            hostname: hostname.to_string(),
        };
        let (pending, notice) = PendingReady::new(app.clone(), event);

        info!(port = self.port, hostname = %hostname, active = state.active, "호스트 연결");

        if state.active {
            drop(state);
            pending.fire();
        } else {
            state.pending.push(pending);
        }

        Ok(notice)
    }

    /// 호스트 이름을 앱으로 해석합니다.
    ///
    /// 유효한 캐시 항목이 있으면 그대로 쓰고, 없으면 가장 잘 맞는 패턴을 찾아
    /// 결과(일치 없음 포함)를 캐시합니다.
    pub fn resolve(&self, hostname: &str) -> Option<App> {
        if let Some(hit) = Self::cached_result(&self.state.read().cache, hostname) {
            debug!(host = %hostname, "호스트 캐시 적중");
            return hit;
        }

        let mut state = self.state.write();
        // 락을 다시 잡는 사이 다른 스레드가 채웠을 수 있음
        if let Some(hit) = Self::cached_result(&state.cache, hostname) {
            return hit;
        }

        let app = best_compiled(&state.attachments, hostname).map(|a| a.app.clone());

        debug!(host = %hostname, found = app.is_some(), "호스트 해석");
        state.cache.store(hostname, app.clone());
        app
    }

    fn cached_result(cache: &HostCache, hostname: &str) -> Option<Option<App>> {
        match cache.get(hostname)? {
            CacheEntry::Resolved(app) => Some(Some(app.clone())),
            CacheEntry::Miss => Some(None),
            CacheEntry::Invalidated => None,
        }
    }

    /// 무효화된 항목을 포함한 캐시 상태
    pub fn cached(&self, hostname: &str) -> Option<CacheEntry> {
        self.state.read().cache.entry(hostname).cloned()
    }

    pub fn invalidate(&self, hostname: &str) -> bool {
        self.state.write().cache.invalidate(hostname)
    }

    pub fn invalidate_all(&self) {
        self.state.write().cache.invalidate_all();
        debug!(port = self.port, "호스트 캐시 전체 무효화");
    }

    /// 바인딩이 리스닝을 시작했음을 표시하고 대기 중인 준비 신호를 보냅니다.
    pub fn activate(&self) {
        let pending = {
            let mut state = self.state.write();
            if state.active {
                return;
            }
            state.active = true;
            std::mem::take(&mut state.pending)
        };

        info!(port = self.port, pending = pending.len(), "바인딩 활성화");
        for signal in pending {
            signal.fire();
        }
    }

    /// HTTP 요청의 Host 헤더와 경로로 처리할 앱과 핸들러를 찾습니다.
    pub fn route<B>(&self, req: &hyper::Request<B>) -> Result<Dispatch, RoutingError> {
        let host_info = HostInfo::from_request(req)?;
        debug!(host = %host_info.name, path = %req.uri().path(), "라우팅 요청 처리");

        let app = self.resolve(&host_info.name).ok_or_else(|| {
            warn!(
                host = %host_info.name,
                available = ?self.attachments(),
                "연결된 앱을 찾을 수 없음"
            );
            RoutingError::HostNotFound {
                host: host_info.name.clone(),
                port: self.port,
            }
        })?;

        Ok(app.dispatch(req.method(), req.uri().path()))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("port", &self.port)
            .field("active", &state.active)
            .field("attachments", &state.attachments.iter().map(|a| a.pattern.as_str()).collect::<Vec<_>>())
            .field("cached", &state.cache.len())
            .finish()
    }
}
