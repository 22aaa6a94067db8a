// DailyCache tests: freshness by mtime day, load failures as miss, store overwrite

mod common;

use chrono::{Duration, Local};
use common::{age_file, now_clock, record};
use std::sync::Arc;
use tempfile::TempDir;
use trafficboard::clock::FixedClock;
use trafficboard::daily_cache::{CacheState, DailyCache};
use trafficboard::models::CachedAggregate;

fn sample() -> CachedAggregate {
    CachedAggregate {
        aggregate: vec![record("Alpha", "101", 5, 40, 900), record("Beta", "102", 1, 2, 3)],
    }
}

#[tokio::test]
async fn missing_file_is_stale() {
    let dir = TempDir::new().unwrap();
    let cache = DailyCache::new(dir.path().join("data.json"), now_clock());
    assert_eq!(cache.state().await, CacheState::Stale);
    assert!(cache.modified_at().await.is_none());
    assert!(cache.load().await.is_none());
}

#[tokio::test]
async fn store_then_load_is_fresh() {
    let dir = TempDir::new().unwrap();
    let cache = DailyCache::new(dir.path().join("data.json"), now_clock());
    cache.store(&sample()).await;
    assert_eq!(cache.state().await, CacheState::Fresh);
    assert_eq!(cache.load().await, Some(sample()));
}

#[tokio::test]
async fn store_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".data").join("nested").join("data.json");
    let cache = DailyCache::new(&path, now_clock());
    cache.store(&sample()).await;
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn file_written_yesterday_is_stale() {
    let dir = TempDir::new().unwrap();
    let cache = DailyCache::new(dir.path().join("data.json"), now_clock());
    cache.store(&sample()).await;
    age_file(cache.path(), 1);
    assert_eq!(cache.state().await, CacheState::Stale);
}

#[tokio::test]
async fn freshness_follows_injected_clock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    DailyCache::new(&path, now_clock()).store(&sample()).await;

    let tomorrow = Arc::new(FixedClock(Local::now() + Duration::days(1)));
    let cache = DailyCache::new(&path, tomorrow);
    assert_eq!(cache.state().await, CacheState::Stale);
}

#[tokio::test]
async fn corrupt_file_loads_as_miss() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"{\"aggregate\": [ not json").unwrap();
    let cache = DailyCache::new(&path, now_clock());
    assert_eq!(cache.state().await, CacheState::Fresh);
    assert!(cache.load().await.is_none());
}

#[tokio::test]
async fn store_overwrites_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let cache = DailyCache::new(dir.path().join("data.json"), now_clock());
    cache.store(&sample()).await;
    let replacement = CachedAggregate {
        aggregate: vec![record("Gamma", "103", 9, 9, 9)],
    };
    cache.store(&replacement).await;
    assert_eq!(cache.load().await, Some(replacement));
}

#[tokio::test]
async fn store_failure_is_swallowed() {
    let dir = TempDir::new().unwrap();
    // Parent path is a regular file, so the directory cannot be created
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let cache = DailyCache::new(blocker.join("data.json"), now_clock());
    cache.store(&sample()).await;
    assert_eq!(cache.state().await, CacheState::Stale);
}
