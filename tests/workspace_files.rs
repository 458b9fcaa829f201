//! Workspace file handling and settings delivery.

mod common;

use common::setup_test_logging;
use ember::{EditorHost, Error, Settings, TokenKind, Workspace};
use proptest::prelude::*;
use serde_json::{Value, json};

#[test]
fn open_edit_save_roundtrip() {
    setup_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.py");
    std::fs::write(&path, "def main():\n    return 1\n").unwrap();

    let mut ws = Workspace::default();
    let tab = ws.open_in_new_tab(&path).unwrap();
    let buffer = ws.tab(tab).unwrap().buffer();
    assert!(
        buffer
            .tokens_for_line(0)
            .iter()
            .any(|t| t.kind == TokenKind::Keyword)
    );

    let buffer = ws.tab_mut(tab).unwrap().buffer_mut();
    let end = buffer.document().len_chars();
    buffer.set_cursor_by_offset(end);
    buffer.insert("main()\n");
    assert!(ws.tab(tab).unwrap().is_modified());

    let copy = dir.path().join("copy.py");
    ws.save_tab(tab, Some(&copy)).unwrap();
    assert_eq!(
        std::fs::read_to_string(&copy).unwrap(),
        "def main():\n    return 1\nmain()\n"
    );
    assert_eq!(ws.tab(tab).unwrap().title(), "copy.py");
    // The original file is untouched by save-as.
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "def main():\n    return 1\n"
    );
}

#[test]
fn binary_file_opens_no_tab() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    std::fs::write(&path, [0x89, b'P', b'N', b'G', 0, 0, 0, 13]).unwrap();

    let mut ws = Workspace::default();
    let err = ws.open_file(&path).unwrap_err();
    assert!(matches!(err, Error::BinaryContent { .. }));
    assert!(err.to_string().contains("blob.bin"));
    assert!(ws.tabs().is_empty());
}

#[test]
fn settings_reload_restyles_without_retokenizing() {
    let mut ws = Workspace::default();
    let tab = ws.new_tab();
    ws.tab_mut(tab).unwrap().buffer_mut().insert("# note");
    let before = ws.tab(tab).unwrap().buffer().styled_line(0);

    let settings =
        Settings::from_json_str(r##"{ "syntax": { "comment_color": "#112233" } }"##).unwrap();
    ws.reload_settings(settings);

    let buffer = ws.tab(tab).unwrap().buffer();
    let after = buffer.styled_line(0);
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].0, after[0].0);
    assert_ne!(before[0].1, after[0].1);
    assert_eq!(buffer.tokens_for_line(0)[0].kind, TokenKind::Comment);
}

#[test]
fn malformed_settings_fall_back_per_key() {
    let settings = Settings::from_value(&json!({
        "font_size": "large",
        "tab_width": 0,
        "editor_bg": "not a color",
        "editor_fg": "#ABCDEF",
        "syntax": 7,
    }));
    let defaults = Settings::default();
    assert_eq!(settings.font_size, defaults.font_size);
    assert_eq!(settings.tab_width, defaults.tab_width);
    assert_eq!(settings.colors.background, defaults.colors.background);
    assert_eq!(settings.colors.foreground.to_hex(), "#ABCDEF");
    assert_eq!(settings.syntax, defaults.syntax);

    assert!(Settings::from_json_str("{ not json").is_err());
    assert_eq!(Settings::from_value(&Value::Null), defaults);
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[#a-zA-Z0-9 ]{0,10}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn any_settings_object_resolves(
        entries in proptest::collection::vec(
            (
                prop_oneof![
                    Just("font_family"),
                    Just("font_size"),
                    Just("tab_width"),
                    Just("editor_bg"),
                    Just("selection_fg"),
                    Just("syntax"),
                    Just("unknown"),
                ],
                json_leaf(),
            ),
            0..8,
        )
    ) {
        let object: serde_json::Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let settings = Settings::from_value(&Value::Object(object));
        prop_assert!(settings.tab_width >= 1);
        prop_assert!(settings.font_size >= 1);
        prop_assert!(!settings.font_family.trim().is_empty());
    }
}
