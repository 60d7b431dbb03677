//! 호스트 이름과 요청 경로를 앱과 핸들러로 해석하는 라우팅 핵심 모듈입니다.
//!
//! - [`Pattern`]: `*` 와일드카드를 지원하는 호스트 패턴
//! - [`Binding`]: 포트별 호스트 연결과 해석 캐시
//! - [`App`]: 마운트 테이블을 가진 라우팅 단위

mod error;
mod pattern;
mod cache;
mod ready;
mod host;
mod mount;
mod app;
mod binding;

pub use error::{ErrorKind, RoutingError};
pub use pattern::{best_compiled, best_match, Pattern, WILDCARD};
pub use cache::{CacheEntry, HostCache, MAX_CACHED_HOSTS};
pub use ready::{ReadyEvent, ReadyNotice};
pub use host::HostInfo;
pub use mount::{
    clean_path,
    normalize_directory,
    validate_directory,
    Handler,
    HandlerFn,
    InterceptHandlers,
    MountEntry,
    MountTable,
};
pub use app::{App, AppOptions, Dispatch, ResolvedOptions};
pub use binding::{Binding, BindingId};
