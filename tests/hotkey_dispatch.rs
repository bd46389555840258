
use fakes::FakeHotkeys;
use ink_overlay::command::{Command, Rgb, LARGE_BRUSH, SMALL_BRUSH};
use ink_overlay::error::HotkeyRegistrationError;
use ink_overlay::global_hotkey::HotkeyDispatcher;
use ink_overlay::hotkey::{parse_hotkey, HotkeyTable};

fn combo(s: &str) -> ink_overlay::hotkey::KeyCombo {
    parse_hotkey(s).unwrap()
}

#[test]
fn register_then_unregister_leaves_no_registrations() {
    let backend = FakeHotkeys::default();
    let os = backend.clone();
    let mut dispatcher = HotkeyDispatcher::new(backend, HotkeyTable::fixed());

    let report = dispatcher.register_all();
    assert!(report.is_complete());
    assert_eq!(os.active_count(), 11);

    dispatcher.unregister_all();
    assert_eq!(os.active_count(), 0);
    assert_eq!(dispatcher.registered_count(), 0);
}

#[test]
fn second_unregister_is_harmless() {
    let backend = FakeHotkeys::default();
    let os = backend.clone();
    let mut dispatcher = HotkeyDispatcher::new(backend, HotkeyTable::fixed());
    dispatcher.register_all();

    assert_eq!(dispatcher.unregister_all(), 11);
    assert_eq!(dispatcher.unregister_all(), 0);
    drop(dispatcher);
    assert_eq!(os.active_count(), 0);
}

#[test]
fn rejected_undo_does_not_block_redo() {
    let backend = FakeHotkeys::rejecting([combo("Ctrl+Z")]);
    let os = backend.clone();
    let mut dispatcher = HotkeyDispatcher::new(backend, HotkeyTable::fixed());

    let report = dispatcher.register_all();
    assert_eq!(report.registered.len(), 10);
    assert!(matches!(
        report.failed.as_slice(),
        [HotkeyRegistrationError::AlreadyClaimed { combo: c, .. }] if *c == combo("Ctrl+Z")
    ));
    assert!(os.holds(combo("Ctrl+Y")));
    assert!(!os.holds(combo("Ctrl+Z")));

    let redo_id = dispatcher.table().id_for(combo("Ctrl+Y")).unwrap();
    let undo_id = dispatcher.table().id_for(combo("Ctrl+Z")).unwrap();
    assert_eq!(dispatcher.resolve(redo_id), Some(Command::Redo));
    assert_eq!(dispatcher.resolve(undo_id), None);
}

#[test]
fn registration_order_is_the_table_order() {
    let mut dispatcher = HotkeyDispatcher::new(FakeHotkeys::default(), HotkeyTable::fixed());
    let first = dispatcher.register_all();
    let second = dispatcher.register_all();
    assert_eq!(first.registered, second.registered);
    assert_eq!(first.registered[0], combo("Ctrl+Shift+D"));
    assert_eq!(first.registered[10], combo("Ctrl+Y"));
}

#[test]
fn fixed_table_maps_every_combo() {
    let dispatcher = {
        let mut d = HotkeyDispatcher::new(FakeHotkeys::default(), HotkeyTable::fixed());
        d.register_all();
        d
    };
    let expected = [
        ("Ctrl+Shift+D", Command::ToggleOverlay),
        ("Ctrl+Shift+C", Command::ClearCanvas),
        ("Ctrl+Shift+R", Command::SetColor(Rgb::RED)),
        ("Ctrl+Shift+B", Command::SetColor(Rgb::BLUE)),
        ("Ctrl+Shift+W", Command::SetColor(Rgb::WHITE)),
        ("Ctrl+Shift+G", Command::SetColor(Rgb::GREEN)),
        ("Ctrl+Shift+1", Command::SetBrushSize(SMALL_BRUSH)),
        ("Ctrl+Shift+2", Command::SetBrushSize(LARGE_BRUSH)),
        ("Ctrl+Shift+T", Command::ToggleClickThrough),
        ("Ctrl+Z", Command::Undo),
        ("Ctrl+Y", Command::Redo),
    ];
    for (text, command) in expected {
        let id = dispatcher.table().id_for(combo(text)).unwrap();
        assert_eq!(dispatcher.resolve(id), Some(command), "{text}");
    }
}
