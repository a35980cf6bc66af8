//! Dropbox folder discovery from client databases.

use std::path::PathBuf;

use screengrab::error::GrabError;
use screengrab::sync_folder::{SyncFolderLocator, public_folder, read_database_path};

#[cfg(unix)]
use crate::common::env::with_home;
use crate::common::fixtures::{DropboxFixture, pickled_v0, pickled_v2};
use crate::common::init_test_logging;

#[test]
fn plain_path_in_config_db() {
    init_test_logging();
    let fixture = DropboxFixture::empty();
    let target = fixture.home().join("Sync");
    fixture.write_client_db("config.db", Some(&target.to_string_lossy()));

    assert_eq!(fixture.locator().resolve().unwrap(), target);
}

#[test]
fn pickled_path_in_legacy_db() {
    init_test_logging();
    let fixture = DropboxFixture::empty();
    fixture.write_client_db("dropbox.db", Some(&pickled_v0("/srv/dropbox")));

    assert_eq!(
        fixture.locator().resolve().unwrap(),
        PathBuf::from("/srv/dropbox")
    );
}

#[test]
fn binary_pickle_is_decoded() {
    init_test_logging();
    let fixture = DropboxFixture::empty();
    let db = fixture.write_client_db("dropbox.db", Some(&pickled_v2("/home/jo/My Dropbox")));

    assert_eq!(
        read_database_path(&db).unwrap(),
        Some(PathBuf::from("/home/jo/My Dropbox"))
    );
}

#[test]
fn config_db_is_tried_first() {
    init_test_logging();
    let fixture = DropboxFixture::empty();
    fixture.write_client_db("config.db", Some("/from/config"));
    fixture.write_client_db("dropbox.db", Some(&pickled_v0("/from/legacy")));

    assert_eq!(
        fixture.locator().resolve().unwrap(),
        PathBuf::from("/from/config")
    );
}

#[test]
fn missing_row_falls_back_to_home_dropbox() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    fixture.write_client_db("config.db", None);

    assert_eq!(fixture.locator().resolve().unwrap(), fixture.sync_root());
}

#[test]
fn unreadable_database_falls_back_to_home_dropbox() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    std::fs::create_dir_all(fixture.client_data_dir()).unwrap();
    std::fs::write(fixture.client_data_dir().join("config.db"), b"not a database").unwrap();

    assert_eq!(fixture.locator().resolve().unwrap(), fixture.sync_root());
}

#[test]
fn nothing_found_lists_searched_locations() {
    init_test_logging();
    let fixture = DropboxFixture::empty();

    match fixture.locator().resolve() {
        Err(GrabError::SyncFolderNotFound { searched }) => {
            assert_eq!(searched.len(), 3);
            assert!(searched[0].ends_with("config.db"));
            assert!(searched[1].ends_with("dropbox.db"));
            assert!(searched[2].ends_with("Dropbox"));
        }
        other => panic!("Expected SyncFolderNotFound, got {other:?}"),
    }
}

#[test]
fn public_folder_is_below_root() {
    let fixture = DropboxFixture::new();
    assert_eq!(public_folder(&fixture.sync_root()), fixture.public());
}

#[cfg(unix)]
#[test]
fn environment_locator_follows_home() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let home = fixture.home().to_string_lossy().into_owned();
    let _home = with_home(&home);

    let locator = SyncFolderLocator::from_environment();
    assert_eq!(locator.fallback_dir(), Some(fixture.sync_root()));
    assert_eq!(
        locator.database_candidates(),
        vec![
            fixture.client_data_dir().join("config.db"),
            fixture.client_data_dir().join("dropbox.db"),
        ]
    );
    assert_eq!(locator.resolve().unwrap(), fixture.sync_root());
}
