#![forbid(unsafe_code)]

//! File-backed preferences: macros and bookmarks survive a reopen.
//!
//! Run:
//!   cargo test -p bined-runtime --features persistence --test json_preferences

use bined_runtime::{
    BinarySearch, BinaryEditor, BookmarkPreferences, BookmarkRecord, JsonFilePreferences,
    MacroManager, MacroPreferences, MacroRecord, PreferencesError, PreferencesStore, Rgb,
};
use bined_core::ByteArrayData;

#[test]
fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = JsonFilePreferences::open(dir.path().join("absent.json")).unwrap();
    assert!(prefs.get("macrosCount").is_none());
    assert!(!prefs.is_dirty());
}

#[test]
fn flush_writes_atomically_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = JsonFilePreferences::open(&path).unwrap();
    prefs.put("macrosCount", "0");
    assert!(prefs.is_dirty());
    prefs.flush().unwrap();
    assert!(!prefs.is_dirty());
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = JsonFilePreferences::open(&path).unwrap();
    assert_eq!(reopened.get("macrosCount").as_deref(), Some("0"));
}

#[test]
fn corrupt_and_foreign_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{not json").unwrap();
    assert!(matches!(
        JsonFilePreferences::open(&corrupt),
        Err(PreferencesError::Format(_))
    ));

    let future = dir.path().join("future.json");
    std::fs::write(&future, r#"{"version": 9, "values": {}}"#).unwrap();
    assert!(matches!(
        JsonFilePreferences::open(&future),
        Err(PreferencesError::Version { found: 9, expected: 1 })
    ));
}

#[test]
fn recorded_macros_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("macros.json");

    {
        let store = JsonFilePreferences::open(&path).unwrap();
        let mut manager: MacroManager<_, BinarySearch> = MacroManager::new(store, None);
        let mut editor = BinaryEditor::new(ByteArrayData::from(vec![0u8; 2]));
        manager.start_macro_recording(&mut editor);
        editor.type_text("7").unwrap();
        manager.stop_macro_recording(&mut editor).unwrap();
    }

    let prefs = MacroPreferences::new(JsonFilePreferences::open(&path).unwrap());
    assert_eq!(
        prefs.load_records(),
        vec![MacroRecord::with_steps("Macro 1", vec!["key-press(\"7\")".into()])]
    );
}

#[test]
fn bookmarks_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    let records = vec![
        BookmarkRecord::new(0, 8, Some(Rgb::new(0x12, 0xab, 0xef))),
        BookmarkRecord::new(32, 2, None),
    ];

    let mut prefs = BookmarkPreferences::new(JsonFilePreferences::open(&path).unwrap());
    prefs.save_records(&records).unwrap();

    let reopened = BookmarkPreferences::new(JsonFilePreferences::open(&path).unwrap());
    assert_eq!(reopened.load_records(), records);
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"bookmark.0.bookmarkColor\": \"#12abef\""));
}
