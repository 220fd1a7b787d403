/// Wraps an async computation with a read-through Redis cache.
///
/// `$cache` is an `Option<Cache>`; with `None` the block always runs. A cache
/// read failure is logged and treated as a miss so the catalog is still asked.
/// On a miss the block's value is queued for a background write with `$ttl`.
///
/// # Arguments
/// * `$cache`: `Option<Cache>` to read from and write to.
/// * `$key`: the `CacheKey` for this value.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: a future yielding `AppResult<T>`, evaluated only on a miss.
///
/// # Example
/// ```rust,ignore
/// let regions: Vec<String> = cached!(self.cache, key, 3600, async move {
///     fetch_regions().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match &$cache {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            None => {
                let value = $block.await?;
                if let Some(cache) = &$cache {
                    cache.set_in_background(&key, &value, $ttl);
                }
                Ok(value)
            }
        }
    }};
}
