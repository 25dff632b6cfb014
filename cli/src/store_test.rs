use super::*;
use std::rc::Rc;

use session::storage::{TOKEN_KEY, USER_KEY};
use session::{SessionPersistence, StorageTier, User};

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("streampay-cli-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn missing_file_reads_as_empty() {
    let store = FileStore::new(temp_path("missing.json"));
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[test]
fn values_survive_a_new_handle() {
    let path = temp_path("roundtrip.json");
    FileStore::new(&path).set(TOKEN_KEY, "tok-1").unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("tok-1"));
}

#[test]
fn removing_last_key_deletes_file() {
    let path = temp_path("cleanup.json");
    let store = FileStore::new(&path);
    store.set(TOKEN_KEY, "tok-1").unwrap();
    store.set(USER_KEY, "{}").unwrap();

    store.remove(TOKEN_KEY);
    assert!(path.exists());
    store.remove(USER_KEY);
    assert!(!path.exists());
    store.remove(USER_KEY);
}

#[test]
fn garbage_file_reads_as_empty_and_is_replaced_on_write() {
    let path = temp_path("garbage.json");
    fs::write(&path, "not json").unwrap();
    let store = FileStore::new(&path);

    assert_eq!(store.get(TOKEN_KEY), None);
    store.set(TOKEN_KEY, "tok-2").unwrap();
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("tok-2"));
}

#[test]
fn creates_parent_directories() {
    let path = temp_path("nested").join("deeper").join("state.json");
    FileStore::new(&path).set(TOKEN_KEY, "tok-3").unwrap();
    assert!(path.exists());
}

#[test]
fn backs_durable_session_tier() {
    let path = temp_path("tier.json");
    let persistence = SessionPersistence::new(Rc::new(FileStore::new(&path)), Rc::new(session::MemoryStore::new()));
    let user = User::from_value(serde_json::json!({ "id": 1, "role": "admin" })).unwrap();

    persistence.save(StorageTier::Durable, "tok-4", &user).unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("tok-4"));
    assert_eq!(persistence.token_tier(), Some(StorageTier::Durable));
}
