// --- File: crates/geohosting_checkout/src/session_test.rs ---
#[cfg(test)]
mod tests {
    use crate::session::SessionCache;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let mut cache = SessionCache::new(Duration::from_secs(60), 10);
        cache.insert("token-a", 1);
        assert_eq!(cache.get("token-a"), Some(&1));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("token-a"), None);

        // An expired entry is replaced, not returned.
        assert_eq!(*cache.get_or_insert_with("token-a", || 2), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let mut cache = SessionCache::new(Duration::from_secs(3600), 3);
        for i in 0..3 {
            cache.insert(format!("token-{i}"), i);
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        cache.insert("token-3", 3);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("token-0"), None);
        assert_eq!(cache.get("token-3"), Some(&3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_distinct_tokens_stay_bounded() {
        let mut cache = SessionCache::new(Duration::from_secs(3600), 100);
        for i in 0..10_000 {
            cache.get_or_insert_with(&format!("forged-token-{i}"), || i);
        }
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let mut cache = SessionCache::new(Duration::from_secs(60), 1);
        cache.insert("token", "a");
        cache.insert("token", "b");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove("token"), Some("b"));
        assert!(cache.is_empty());
    }
}
