use kennel_core::store::{keys, load_json, save_json};
use kennel_core::{
    open_store, KeyValueStore, MemoryStore, SqliteStore, StorageBackend, StorageConfig, StoreError,
};

fn backends() -> Vec<(&'static str, Box<dyn KeyValueStore>)> {
    let memory: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
    let sqlite: Box<dyn KeyValueStore> = Box::new(SqliteStore::open_in_memory().unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}

#[test]
fn values_overwrite_and_delete() {
    for (name, store) in backends() {
        assert_eq!(store.get("calendarEvents").unwrap(), None, "{name}");

        store.set("calendarEvents", "[1]").unwrap();
        store.set("calendarEvents", "[2]").unwrap();
        assert_eq!(
            store.get("calendarEvents").unwrap().as_deref(),
            Some("[2]"),
            "{name}"
        );

        assert!(store.delete("calendarEvents").unwrap(), "{name}");
        assert!(!store.delete("calendarEvents").unwrap(), "{name}");
        assert_eq!(store.get("calendarEvents").unwrap(), None, "{name}");
    }
}

#[test]
fn set_members_keep_insertion_order_without_duplicates() {
    for (name, store) in backends() {
        assert!(store.add_to_set(keys::CLIENT_IDS, "c").unwrap(), "{name}");
        assert!(store.add_to_set(keys::CLIENT_IDS, "a").unwrap(), "{name}");
        assert!(store.add_to_set(keys::CLIENT_IDS, "b").unwrap(), "{name}");
        assert!(!store.add_to_set(keys::CLIENT_IDS, "a").unwrap(), "{name}");

        assert_eq!(
            store.list_set_members(keys::CLIENT_IDS).unwrap(),
            vec!["c".to_string(), "a".to_string(), "b".to_string()],
            "{name}"
        );

        assert!(store.remove_from_set(keys::CLIENT_IDS, "a").unwrap(), "{name}");
        assert!(!store.remove_from_set(keys::CLIENT_IDS, "a").unwrap(), "{name}");
        assert_eq!(
            store.list_set_members(keys::CLIENT_IDS).unwrap(),
            vec!["c".to_string(), "b".to_string()],
            "{name}"
        );
        assert!(store.list_set_members("unknown").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn sets_and_values_do_not_share_a_namespace() {
    for (name, store) in backends() {
        store.set(keys::CLIENT_IDS, "plain").unwrap();
        store.add_to_set(keys::CLIENT_IDS, "member").unwrap();

        assert_eq!(
            store.get(keys::CLIENT_IDS).unwrap().as_deref(),
            Some("plain"),
            "{name}"
        );
        assert_eq!(
            store.list_set_members(keys::CLIENT_IDS).unwrap(),
            vec!["member".to_string()],
            "{name}"
        );
    }
}

#[test]
fn json_helpers_report_the_offending_key() {
    let store = MemoryStore::new();
    save_json(&store, "bookingHistory", &vec![1, 2, 3]).unwrap();
    let numbers: Option<Vec<u32>> = load_json(&store, "bookingHistory").unwrap();
    assert_eq!(numbers, Some(vec![1, 2, 3]));

    let missing: Option<Vec<u32>> = load_json(&store, "largeKennels").unwrap();
    assert!(missing.is_none());

    store.set("smallKennels", "{not json").unwrap();
    match load_json::<Vec<u32>>(&store, "smallKennels") {
        Err(StoreError::Decode { key, .. }) => assert_eq!(key, "smallKennels"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn open_store_resolves_configured_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        backend: StorageBackend::Sqlite,
        path: dir.path().join("kennel.sqlite3"),
    };

    let store = open_store(&config).unwrap();
    store.set(keys::LARGE_KENNELS, "[]").unwrap();
    drop(store);

    let reopened = open_store(&config).unwrap();
    assert_eq!(
        reopened.get(keys::LARGE_KENNELS).unwrap().as_deref(),
        Some("[]")
    );

    let memory = open_store(&StorageConfig::default()).unwrap();
    assert_eq!(memory.get(keys::LARGE_KENNELS).unwrap(), None);
}
