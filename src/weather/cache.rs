use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Raw response bodies keyed by request URL, each kept for a fixed time.
pub struct ResponseCache {
    entries: DashMap<String, (Instant, String)>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, body: String) {
        self.insert_at(key, body, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        if let Some(entry) = self.entries.get(key) {
            let (stored, body) = entry.value();
            if now.duration_since(*stored) < self.ttl {
                return Some(body.clone());
            }
        }

        self.entries.remove(key);
        None
    }

    fn insert_at(&self, key: String, body: String, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries
            .retain(|_, (stored, _)| now.saturating_duration_since(*stored) < self.ttl);
        self.entries.insert(key, (now, body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.insert_at("url".into(), "body".into(), start);

        assert_eq!(cache.get_at("url", start + Duration::from_secs(59)).as_deref(), Some("body"));
        assert_eq!(cache.get_at("url", start + Duration::from_secs(60)), None);
        assert!(cache.entries.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.insert_at("oslo".into(), "a".into(), start);
        cache.insert_at("berlin".into(), "b".into(), start + Duration::from_secs(30));
        cache.insert_at("paris".into(), "c".into(), start + Duration::from_secs(61));

        assert!(!cache.entries.contains_key("oslo"));
        assert!(cache.entries.contains_key("berlin"));
        assert_eq!(cache.entries.len(), 2);
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("url".into(), "body".into());
        assert_eq!(cache.get("url"), None);
    }
}
