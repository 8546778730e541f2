use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// member id -> display name, used to annotate bonus creators without a join
/// on every roster fetch.
pub static MEMBER_NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn put(member_id: u64, full_name: &str) {
    MEMBER_NAME_CACHE
        .insert(member_id, full_name.to_string())
        .await;
}

pub async fn evict(member_id: u64) {
    MEMBER_NAME_CACHE.invalidate(&member_id).await;
}

/// Cached lookup with database fallback. Returns None when the member does
/// not exist (or the fallback query fails, which is non-fatal here).
pub async fn display_name(pool: &MySqlPool, member_id: u64) -> Option<String> {
    if let Some(name) = MEMBER_NAME_CACHE.get(&member_id).await {
        return Some(name);
    }

    let fetched = sqlx::query_scalar::<_, String>(
        "SELECT full_name FROM team_members WHERE id = ? LIMIT 1",
    )
    .bind(member_id)
    .fetch_optional(pool)
    .await
    .ok()
    .flatten()?;

    MEMBER_NAME_CACHE.insert(member_id, fetched.clone()).await;
    Some(fetched)
}

/// Batch insert names into the cache
async fn batch_put(entries: &[(u64, String)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(id, name)| MEMBER_NAME_CACHE.insert(*id, name.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load active member names into the in-memory cache (batched)
pub async fn warmup_member_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT id, full_name
        FROM team_members
        WHERE status = 'active'
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let entry = row?;
        batch.push(entry);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_put(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_put(&batch).await;
    }

    log::info!(
        "Member name cache warmup complete: {} active members",
        total_count
    );

    Ok(())
}
