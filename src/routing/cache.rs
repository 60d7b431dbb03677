use std::collections::HashMap;
use tracing::debug;

use crate::routing::{App, Pattern};

/// 캐시에 유지하는 최대 호스트 수
pub const MAX_CACHED_HOSTS: usize = 4096;

/// 캐시된 호스트 해석 결과입니다.
#[derive(Clone, Debug)]
pub enum CacheEntry {
    /// 해석된 앱
    Resolved(App),
    /// 일치하는 패턴이 없었음
    Miss,
    /// 새 등록으로 더 이상 신뢰할 수 없는 항목
    Invalidated,
}

impl CacheEntry {
    pub fn is_valid(&self) -> bool {
        !matches!(self, CacheEntry::Invalidated)
    }
}

/// 요청 시점에 본 호스트 이름을 해석 결과에 매핑하는 캐시입니다.
///
/// 캐시 항목은 현재 등록된 패턴 집합 기준으로 더 이상 올바르지 않은 앱을
/// 가리켜서는 안 됩니다. 새 패턴이 등록될 때 [`HostCache::invalidate_matching`]
/// 또는 [`HostCache::invalidate`]로 영향을 받는 항목을 무효화합니다.
#[derive(Debug, Default)]
pub struct HostCache {
    entries: HashMap<String, CacheEntry>,
}

impl HostCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 유효한 항목만 반환합니다.
    pub fn get(&self, hostname: &str) -> Option<&CacheEntry> {
        self.entries.get(hostname).filter(|entry| entry.is_valid())
    }

    pub fn entry(&self, hostname: &str) -> Option<&CacheEntry> {
        self.entries.get(hostname)
    }

    /// 해석 결과를 기록합니다.
    ///
    /// 캐시가 가득 차면 무효화된 항목, 일치 없음 항목 순으로 비우고, 그래도
    /// 자리가 없으면 전체를 비운 뒤 기록합니다.
    pub fn store(&mut self, hostname: &str, app: Option<App>) {
        if self.entries.len() >= MAX_CACHED_HOSTS && !self.entries.contains_key(hostname) {
            self.make_room();
        }
        let entry = match app {
            Some(app) => CacheEntry::Resolved(app),
            None => CacheEntry::Miss,
        };
        self.entries.insert(hostname.to_string(), entry);
    }

    fn make_room(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid());
        if self.entries.len() >= MAX_CACHED_HOSTS {
            self.entries.retain(|_, entry| !matches!(entry, CacheEntry::Miss));
        }
        if self.entries.len() >= MAX_CACHED_HOSTS {
            self.entries.clear();
        }
        debug!(evicted = before - self.entries.len(), "호스트 캐시 공간 확보");
    }

    /// 해당 호스트 항목이 있으면 무효화합니다. 무효화했으면 true.
    pub fn invalidate(&mut self, hostname: &str) -> bool {
        match self.entries.get_mut(hostname) {
            Some(entry) if entry.is_valid() => {
                *entry = CacheEntry::Invalidated;
                debug!(host = %hostname, "캐시 항목 무효화");
                true
            }
            _ => false,
        }
    }

    /// 패턴과 일치하는 모든 호스트 항목을 무효화하고 무효화한 개수를 반환합니다.
    pub fn invalidate_matching(&mut self, pattern: &Pattern) -> usize {
        let mut count = 0;
        for (hostname, entry) in self.entries.iter_mut() {
            if entry.is_valid() && pattern.matches(hostname) {
                *entry = CacheEntry::Invalidated;
                count += 1;
            }
        }
        debug!(pattern = %pattern.as_str(), count, "와일드카드 등록으로 캐시 무효화");
        count
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            *entry = CacheEntry::Invalidated;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
