use std::fs;
use std::path::{Path, PathBuf};

use scone_client::testing::FakeScone;
use scone_knowledge::{load_local_knowledge, LoadError, LoaderConfig};

fn temp_root(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "scone-knowledge-it-{tag}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "(new-type {x} {thing})\n").unwrap();
}

#[test]
fn server_receives_files_in_walk_order() {
    let root = temp_root("order");
    for file in ["core/10.lisp", "00.lisp", "snapshots/last.lisp"] {
        touch(&root, file);
    }

    let scone = FakeScone::spawn().unwrap();
    let mut client = scone.connect().unwrap();
    let count = load_local_knowledge(&mut client, &root, &LoaderConfig::default()).unwrap();
    assert_eq!(count, 3);

    let loaded: Vec<String> = scone.knowledge_base().loaded_files().to_vec();
    let absolute = std::path::absolute(&root).unwrap();
    let expected: Vec<String> = ["00.lisp", "core/10.lisp", "snapshots/last.lisp"]
        .iter()
        .map(|name| absolute.join(name).to_string_lossy().into_owned())
        .collect();
    assert_eq!(loaded, expected);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn rejected_file_aborts_the_load() {
    let root = temp_root("reject");
    touch(&root, "00.lisp");
    touch(&root, "01-broken.lisp");
    touch(&root, "02.lisp");

    let scone = FakeScone::spawn().unwrap();
    let mut client = scone.connect().unwrap();
    let err = load_local_knowledge(&mut client, &root, &LoaderConfig::default()).unwrap_err();

    assert!(matches!(err, LoadError::LoadFailed { ref path, .. } if path.ends_with("01-broken.lisp")));
    assert_eq!(scone.knowledge_base().loaded_files().len(), 1);

    // The connection survives a rejected file.
    assert_eq!(client.predicate("(is-x-a-y? {bird} {animal})").unwrap(), "YES");

    fs::remove_dir_all(&root).unwrap();
}
