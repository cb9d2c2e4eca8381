use fileq::HandleConfig;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

use crate::support::{
    registry, registry_with, settled_stats, CodelessReadFailure, GatedFileSystem,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_handle_does_not_delay_other_handles() {
    let temp_dir = TempDir::new().unwrap();
    let fs = Arc::new(GatedFileSystem::new());
    let gate = Arc::clone(&fs.gate);
    let registry = registry_with(fs, HandleConfig::default());

    let slow = registry.get_handle(temp_dir.path().join("slow.txt")).unwrap();
    let fast = registry.get_handle(temp_dir.path().join("fast.txt")).unwrap();

    slow.write("eventually").await.unwrap();
    let stuck = slow.read();
    let behind_stuck = slow.write("after");

    timeout(Duration::from_secs(5), async {
        fast.write("quick").await.unwrap();
        assert_eq!(fast.read().await.unwrap(), "quick");
    })
    .await
    .expect("fast handle was blocked by slow handle");

    // The slow handle's later write is still queued behind its read.
    assert!(slow.stats().pending >= 1);

    gate.add_permits(1);
    assert_eq!(stuck.await.unwrap(), "eventually");
    behind_stuck.await.unwrap();
    assert_eq!(
        tokio::fs::read_to_string(slow.path()).await.unwrap(),
        "after"
    );
}

#[tokio::test]
async fn codeless_failure_is_unexpected_and_queue_continues() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_with(Arc::new(CodelessReadFailure::new()), HandleConfig::default());
    let file = registry.get_handle(temp_dir.path().join("flaky.txt")).unwrap();

    file.write("fine").await.unwrap();
    let err = file.read().await.unwrap_err();
    assert!(err.is_unexpected());
    assert!(err.code().is_none());

    file.write("still fine").await.unwrap();
    assert!(file.exists().await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn aliased_callers_share_one_queue() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Arc::new(registry());
    let base = temp_dir.path().to_path_buf();

    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&registry);
        let base = base.clone();
        tasks.push(tokio::spawn(async move {
            let spelling = match i % 3 {
                0 => base.join("shared.txt"),
                1 => base.join("./shared.txt"),
                _ => base.join("nested/../shared.txt"),
            };
            let file = registry.get_handle(spelling).unwrap();
            file.write(format!("writer {}", i)).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(registry.len(), 1);
    let file = registry.get_handle(base.join("shared.txt")).unwrap();
    assert_eq!(settled_stats(&file).await.completed, 32);
    assert!(file.read().await.unwrap().starts_with("writer "));
}

#[tokio::test]
async fn handles_outlive_dropped_futures() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry();
    let path = temp_dir.path().join("detached.txt");

    {
        let file = registry.get_handle(&path).unwrap();
        let _ = file.create();
        let _ = file.write("written by a dropped clone");
    }

    let file = registry.get_handle(&path).unwrap();
    assert_eq!(file.read().await.unwrap(), "written by a dropped clone");
}
