use fileq::is_handle;
use tempfile::TempDir;

use crate::support::registry;

#[tokio::test]
async fn same_exact_path_returns_same_instance() {
    let registry = registry();
    let a = registry.get_handle("./tmp/getFile.txt").unwrap();
    let b = registry.get_handle("./tmp/getFile.txt").unwrap();
    assert!(a.ptr_eq(&b));
    assert_eq!(a, b);
}

#[tokio::test]
async fn relative_and_absolute_spellings_share_instance() {
    let registry = registry();
    let relative = registry.get_handle("./tmp/getFile.txt").unwrap();
    let absolute = registry
        .get_handle(std::env::current_dir().unwrap().join("tmp/getFile.txt"))
        .unwrap();
    assert!(relative.ptr_eq(&absolute));
    assert!(relative.path().is_absolute());
}

#[tokio::test]
async fn dot_segments_share_instance() {
    let registry = registry();
    let temp_dir = TempDir::new().unwrap();
    let plain = registry.get_handle(temp_dir.path().join("a/b.txt")).unwrap();
    let dotted = registry
        .get_handle(temp_dir.path().join("a/./x/../b.txt"))
        .unwrap();
    assert!(plain.ptr_eq(&dotted));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn different_paths_get_different_instances() {
    let registry = registry();
    let a = registry.get_handle("./tmp/getFile.txt").unwrap();
    let b = registry.get_handle("./tmp/getFile.txt2").unwrap();
    assert!(!a.ptr_eq(&b));
    assert_ne!(a, b);
}

#[tokio::test]
async fn separate_registries_are_isolated() {
    let first = registry();
    let second = registry();
    let a = first.get_handle("./tmp/isolated.txt").unwrap();
    let b = second.get_handle("./tmp/isolated.txt").unwrap();
    assert!(!a.ptr_eq(&b));
}

#[tokio::test]
async fn is_handle_accepts_only_handles() {
    let registry = registry();
    let path = "./tmp/instanceofFile.txt";
    let file = registry.get_handle(path).unwrap();

    assert!(is_handle(&file));
    assert!(!is_handle(&path));
    assert!(!is_handle(&path.to_string()));
    assert!(!is_handle(&vec![1, 2, 3]));
}
