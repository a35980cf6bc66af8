//! Settings persistence through the `SQLite` backend.

use screengrab::config::{ConfigBackend, ConfigStore, NAMESPACE, SqliteBackend};
use screengrab::error::GrabError;
use screengrab::settings::{AutoGrabType, ImageFormat, KEYS, Settings};

use crate::common::fixtures::DropboxFixture;
use crate::common::init_test_logging;

fn open(fixture: &DropboxFixture) -> ConfigStore<SqliteBackend> {
    ConfigStore::new(SqliteBackend::open(fixture.settings_db(), NAMESPACE).unwrap())
}

#[test]
fn empty_store_loads_defaults() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let settings = open(&fixture).load().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.filename_prefix, "screengrab");
    assert_eq!(settings.image_quality, "Very High");
    assert_eq!(settings.auto_grab_interval.to_string(), "60 minutes");
}

#[test]
fn saved_settings_survive_reopen() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let mut settings = Settings::default();
    settings.set("user_id", "521887").unwrap();
    settings.set("image_format", "JPEG").unwrap();
    settings.set("image_quality", "Medium").unwrap();
    settings.set("resize_image", "1").unwrap();
    settings.set("resize_value", "50%").unwrap();
    settings.set("auto_grab_type", "Active window").unwrap();
    settings.set("auto_grab_interval", "15 minutes").unwrap();
    settings.set("screenshot_save_directory", "shots").unwrap();

    open(&fixture).save(&settings, &fixture.public()).unwrap();

    let reloaded = open(&fixture).load().unwrap();
    assert_eq!(reloaded, settings);
    assert_eq!(reloaded.image_format, ImageFormat::Jpeg);
    assert_eq!(reloaded.auto_grab_type, AutoGrabType::ActiveWindow);
    assert_eq!(reloaded.auto_grab_interval.as_millis(), 900_000);
}

#[test]
fn save_writes_every_key() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    open(&fixture)
        .save(&Settings::default(), &fixture.public())
        .unwrap();

    let backend = SqliteBackend::open(fixture.settings_db(), NAMESPACE).unwrap();
    for key in KEYS {
        assert!(backend.read(key).unwrap().is_some(), "{key} was not written");
    }
}

#[test]
fn malformed_entries_fall_back_to_defaults() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let mut backend = SqliteBackend::open(fixture.settings_db(), NAMESPACE).unwrap();
    backend.write("resize_value", "lots").unwrap();
    backend.write("auto_grab", "maybe").unwrap();
    backend.write("user_id", "42").unwrap();

    let settings = ConfigStore::new(backend).load().unwrap();
    assert_eq!(settings.resize_value.get(), 95);
    assert!(!settings.auto_grab);
    assert_eq!(settings.user_id, "42");
}

#[test]
fn absolute_directory_inside_public_is_stored_relative() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let inside = fixture.public().join("shots");
    let settings = Settings {
        screenshot_save_directory: inside.to_string_lossy().into_owned(),
        ..Settings::default()
    };

    open(&fixture).save(&settings, &fixture.public()).unwrap();
    assert_eq!(open(&fixture).load().unwrap().screenshot_save_directory, "shots");
}

#[test]
fn absolute_directory_outside_public_is_cleared() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let outside = fixture.home().join("Documents");
    let settings = Settings {
        screenshot_save_directory: outside.to_string_lossy().into_owned(),
        ..Settings::default()
    };

    open(&fixture).save(&settings, &fixture.public()).unwrap();
    assert_eq!(open(&fixture).load().unwrap().screenshot_save_directory, "");
}

#[test]
fn namespaces_do_not_share_entries() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let mut ours = SqliteBackend::open(fixture.settings_db(), NAMESPACE).unwrap();
    ours.write("user_id", "1").unwrap();

    let other = SqliteBackend::open(fixture.settings_db(), "other_app").unwrap();
    assert_eq!(other.read("user_id").unwrap(), None);
}

#[test]
fn reset_restores_defaults() {
    init_test_logging();
    let fixture = DropboxFixture::new();
    let settings = Settings {
        user_id: "7".to_string(),
        auto_grab: true,
        ..Settings::default()
    };
    let mut store = open(&fixture);
    store.save(&settings, &fixture.public()).unwrap();
    store.reset(&fixture.public()).unwrap();

    assert_eq!(store.load().unwrap(), Settings::default());
}

#[test]
fn unknown_key_is_rejected() {
    let mut settings = Settings::default();
    assert!(matches!(
        settings.set("favourite_colour", "blue"),
        Err(GrabError::UnknownSetting { .. })
    ));
}
