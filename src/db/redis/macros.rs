/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues the
/// computed value for a background write with the given TTL (seconds) and
/// returns it. A failed cache read is logged and treated as a miss, so an
/// unreachable Redis only costs the live lookup.
///
/// # Example
/// ```rust,ignore
/// let keywords: Vec<Keyword> = cached!(cache, CacheKey::KeywordSearch(term), ttl, async move {
///     fetch_keywords(term).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            result => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, fetching live");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
