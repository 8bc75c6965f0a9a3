//! Preference store persistence tests

use tbm_horaires::store;
use tbm_horaires::{PreferenceStore, SqliteStore, StoreConfig, UserPreference};

mod common;
use common::{GAMBETTA, TRAM_B, TRAM_B_TO_BERGES, USER_ID};

fn preference() -> UserPreference {
    UserPreference {
        user_id: USER_ID.to_string(),
        stop_id: GAMBETTA.to_string(),
        line_id: TRAM_B.to_string(),
        direction: TRAM_B_TO_BERGES.to_string(),
    }
}

#[tokio::test]
async fn test_preference_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.db");

    {
        let store = SqliteStore::open(&path, "tbm_horaires_users").unwrap();
        store.put(&preference()).await.unwrap();
    }

    let store = SqliteStore::open(&path, "tbm_horaires_users").unwrap();
    assert_eq!(store.get(USER_ID).await.unwrap(), Some(preference()));
    assert!(store.get("someone-else").await.unwrap().is_none());
}

#[tokio::test]
async fn test_open_creates_region_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        region: "eu-west-3".to_string(),
        table: "users".to_string(),
        data_dir: dir.path().join("data"),
        in_memory: false,
    };

    let store = store::open(&config).unwrap();
    store.put(&preference()).await.unwrap();

    assert!(dir.path().join("data/preferences-eu-west-3.db").exists());
    assert_eq!(store.get(USER_ID).await.unwrap(), Some(preference()));
}

#[tokio::test]
async fn test_regions_do_not_share_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let config = |region: &str| StoreConfig {
        region: region.to_string(),
        table: "users".to_string(),
        data_dir: dir.path().to_path_buf(),
        in_memory: false,
    };

    let paris = store::open(&config("eu-west-3")).unwrap();
    paris.put(&preference()).await.unwrap();

    let ireland = store::open(&config("eu-west-1")).unwrap();
    assert!(ireland.get(USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_in_memory_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        region: "eu-west-1".to_string(),
        table: "users".to_string(),
        data_dir: dir.path().join("unused"),
        in_memory: true,
    };

    let store = store::open(&config).unwrap();
    store.put(&preference()).await.unwrap();

    assert_eq!(store.get(USER_ID).await.unwrap(), Some(preference()));
    assert!(!dir.path().join("unused").exists());
}

#[test]
fn test_region_with_path_separators_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        region: "../escape".to_string(),
        table: "users".to_string(),
        data_dir: dir.path().join("data"),
        in_memory: false,
    };

    assert!(store::open(&config).is_err());
    assert!(!dir.path().join("escape.db").exists());
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_invalid_table_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteStore::open(dir.path().join("p.db"), "users; DROP TABLE x");
    assert!(result.is_err());
}
