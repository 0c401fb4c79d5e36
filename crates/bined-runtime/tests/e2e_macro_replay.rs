#![forbid(unsafe_code)]

//! End-to-end macro scenarios: record on one editor, replay on another,
//! and check the structured log events emitted on the way.
//!
//! Run:
//!   cargo test -p bined-runtime --test e2e_macro_replay

use std::sync::{Arc, Mutex};

use bined_core::{
    ByteArrayData, CaretPosition, CodeAreaSection, EditOperation, KeyCode, KeyEvent, Modifiers,
    SelectionRange,
};
use bined_runtime::{
    BinarySearch, BinaryEditor, MacroExecutionError, MacroManager, MemoryPreferences,
};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Log capture
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    macro_event: Option<String>,
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    fn macro_events(&self, level: tracing::Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .filter_map(|e| e.macro_event.clone())
            .collect()
    }
}

struct MacroEventVisitor(Option<String>);

impl tracing::field::Visit for MacroEventVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "macro_event" {
            self.0 = Some(format!("{value:?}").trim_matches('"').to_string());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "macro_event" {
            self.0 = Some(value.to_string());
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MacroEventVisitor(None);
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            macro_event: visitor.0,
        });
    }
}

// ============================================================================
// Helpers
// ============================================================================

type Manager = MacroManager<MemoryPreferences, BinarySearch>;

fn manager() -> Manager {
    MacroManager::new(MemoryPreferences::new(), Some(BinarySearch::new()))
}

fn text_editor(bytes: &[u8]) -> BinaryEditor {
    let mut editor = BinaryEditor::new(ByteArrayData::from(bytes));
    editor
        .view
        .area
        .set_caret_position(CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview));
    editor
}

fn press(editor: &mut BinaryEditor, code: KeyCode) {
    editor.key_pressed(KeyEvent::new(code)).unwrap();
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn typed_text_and_moves_replay_identically() {
    let mut manager = manager();
    let mut recorded = text_editor(b"......");
    manager.start_macro_recording(&mut recorded);
    recorded.type_text("hi").unwrap();
    press(&mut recorded, KeyCode::Right);
    press(&mut recorded, KeyCode::Right);
    let index = manager.stop_macro_recording(&mut recorded).unwrap();

    assert_eq!(index, Some(0));
    assert_eq!(
        manager.macro_records()[0].steps,
        ["key-press(\"hi\")", "caret-move(RIGHT,2)"]
    );
    assert_eq!(recorded.bytes(), b"hi....".to_vec());

    let mut replayed = text_editor(b"......");
    manager.execute_macro(&mut replayed, 0).unwrap();
    assert_eq!(replayed.bytes(), recorded.bytes());
    assert_eq!(
        replayed.view.area.caret_position(),
        recorded.view.area.caret_position()
    );
    assert_eq!(replayed.view.area.caret_position().data_position, 4);
}

#[test]
fn replayed_edits_undo_like_recorded_ones() {
    let mut manager = manager();
    let mut recorded = BinaryEditor::new(ByteArrayData::from(vec![0u8; 4]));
    manager.start_macro_recording(&mut recorded);
    recorded.type_text("ff").unwrap();
    recorded
        .key_pressed(KeyEvent::new(KeyCode::Right).with_modifiers(Modifiers::SHIFT))
        .unwrap();
    recorded.key_pressed(KeyEvent::new(KeyCode::Delete)).unwrap();
    manager.stop_macro_recording(&mut recorded).unwrap();

    let mut replayed = BinaryEditor::new(ByteArrayData::from(vec![0u8; 4]));
    manager.execute_last_macro(&mut replayed).unwrap();
    assert_eq!(replayed.bytes(), recorded.bytes());
    assert_eq!(
        replayed.view.history.undo_depth(),
        recorded.view.history.undo_depth()
    );
    while replayed.view.history.can_undo() {
        replayed.view.undo();
    }
    assert_eq!(replayed.bytes(), vec![0u8; 4]);
}

#[test]
fn insert_mode_toggle_is_part_of_the_macro() {
    let mut manager = manager();
    let mut recorded = text_editor(b"ab");
    manager.start_macro_recording(&mut recorded);
    press(&mut recorded, KeyCode::Insert);
    recorded.type_text("x").unwrap();
    manager.stop_macro_recording(&mut recorded).unwrap();
    assert_eq!(recorded.bytes(), b"xab".to_vec());

    let mut replayed = text_editor(b"ab");
    manager.execute_macro(&mut replayed, 0).unwrap();
    assert_eq!(replayed.bytes(), b"xab".to_vec());
    assert_eq!(replayed.view.area.edit_operation(), EditOperation::Insert);
}

#[test]
fn search_steps_replay_through_the_service() {
    let mut manager = manager();
    let mut recorded = text_editor(b"one two one two");
    manager.start_macro_recording(&mut recorded);
    manager.find_text(&mut recorded, "two", true);
    manager.find_again(&mut recorded);
    manager.stop_macro_recording(&mut recorded).unwrap();
    assert_eq!(
        manager.macro_records()[0].steps,
        ["search-find-text(\"two\",1)", "search-find-again"]
    );

    let mut replayed = text_editor(b"one two one two");
    manager.execute_macro(&mut replayed, 0).unwrap();
    assert_eq!(replayed.view.area.selection(), SelectionRange::new(12, 15));
}

#[test]
fn playback_stops_at_first_failing_line() {
    let mut manager = manager();
    manager
        .set_macro_records(vec![bined_runtime::MacroRecord::with_steps(
            "partial",
            vec![
                "key-press(\"z\")".into(),
                "no-such-step".into(),
                "key-press(\"y\")".into(),
            ],
        )])
        .unwrap();
    let mut editor = text_editor(b"..");
    let err = manager.execute_macro(&mut editor, 0).unwrap_err();
    assert!(matches!(err, MacroExecutionError::Step { line: 2, .. }));
    assert_eq!(
        err.to_string(),
        "Error on line 2: Unknown operation: no-such-step at position 0"
    );
    assert_eq!(editor.bytes(), b"z.".to_vec());
}

#[test]
fn lifecycle_and_step_events_are_logged() {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut manager = manager();
        let mut editor = text_editor(b"....");
        manager.start_macro_recording(&mut editor);
        editor.type_text("ab").unwrap();
        manager.stop_macro_recording(&mut editor).unwrap();
        let mut other = text_editor(b"....");
        manager.execute_macro(&mut other, 0).unwrap();
    });

    let info = capture.macro_events(tracing::Level::INFO);
    assert_eq!(info, ["recording_started", "recording_stopped", "execute"]);
    let debug = capture.macro_events(tracing::Level::DEBUG);
    assert!(debug.iter().any(|e| e == "step_recorded"));
    assert!(debug.iter().any(|e| e == "step_executed"));
    assert!(capture.macro_events(tracing::Level::WARN).is_empty());
}
