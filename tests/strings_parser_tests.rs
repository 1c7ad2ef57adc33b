use indoc::indoc;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use stringsgen::{
    ConflictPolicy, ContextOptions, Entry, Error, Node, PlaceholderType, StringsFileParser,
};
use tempfile::NamedTempFile;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn parse_fixture(name: &str) -> StringsFileParser {
    let mut parser = StringsFileParser::new();
    parser
        .parse_file(fixture(name))
        .unwrap_or_else(|err| panic!("fixture {name} should parse: {err}"));
    parser
}

fn keys(parser: &StringsFileParser) -> Vec<&str> {
    parser.entries().iter().map(Entry::key).collect()
}

#[test]
fn test_entries_with_defaults_context() {
    let mut parser = StringsFileParser::new();
    parser.add_entry(Entry::new("Title", "My awesome title").unwrap());
    parser.add_entry(
        Entry::with_types(
            "Greetings",
            "Hello, my name is %@ and I'm %d",
            [PlaceholderType::Object, PlaceholderType::Int],
        )
        .unwrap(),
    );

    let output = parser.stencil_context(None);
    assert!(output.conflicts.is_empty());

    let expected = json!({
        "strings": {
            "enumName": "L10n",
            "entries": [
                {
                    "key": "Title",
                    "translation": "My awesome title",
                    "types": [],
                    "params": { "count": 0, "names": [], "types": [], "typednames": [] }
                },
                {
                    "key": "Greetings",
                    "translation": "Hello, my name is %@ and I'm %d",
                    "types": ["object", "int"],
                    "params": {
                        "count": 2,
                        "names": ["p1", "p2"],
                        "types": ["String", "Int"],
                        "typednames": ["p1: String", "p2: Int"]
                    }
                }
            ],
            "structuredEntries": {
                "children": {
                    "Title": {
                        "kind": "leaf",
                        "name": "Title",
                        "key": "Title",
                        "translation": "My awesome title",
                        "types": [],
                        "params": { "count": 0, "names": [], "types": [], "typednames": [] }
                    },
                    "Greetings": {
                        "kind": "leaf",
                        "name": "Greetings",
                        "key": "Greetings",
                        "translation": "Hello, my name is %@ and I'm %d",
                        "types": ["object", "int"],
                        "params": {
                            "count": 2,
                            "names": ["p1", "p2"],
                            "types": ["String", "Int"],
                            "typednames": ["p1: String", "p2: Int"]
                        }
                    }
                }
            }
        }
    });
    assert_eq!(output.context.to_json_value().unwrap(), expected);

    // Object keys keep insertion order in the rendered output
    let rendered = output.context.to_json_string_pretty().unwrap();
    let tree = &rendered[rendered.find("structuredEntries").unwrap()..];
    assert!(tree.find("\"Title\"").unwrap() < tree.find("\"Greetings\"").unwrap());
}

#[test]
fn test_file_with_defaults() {
    let parser = parse_fixture("Localizable.strings");
    assert_eq!(
        keys(&parser),
        vec![
            "alert_title",
            "alert_message",
            "greetings",
            "apples.count",
            "bananas.owner",
            "objectOwnership",
            "percent",
            "types",
            "settings.navigation-bar.title.even.deeper",
            "settings.navigation-bar.self",
            "settings.user_profile_section.header_title",
            "settings.user_profile_section.footer_text",
        ]
    );

    use PlaceholderType::*;
    assert_eq!(parser.get("greetings").unwrap().types(), &[Object, Int]);
    assert_eq!(
        parser.get("objectOwnership").unwrap().types(),
        &[Int, Object, Object]
    );
    assert!(parser.get("percent").unwrap().types().is_empty());
    assert_eq!(
        parser.get("types").unwrap().types(),
        &[Object, Char, Int, Float, CString, Unknown]
    );
    assert_eq!(
        parser.get("alert_title").unwrap().comment(),
        Some("Title of the alert")
    );
    assert_eq!(
        parser.get("settings.navigation-bar.title.even.deeper").unwrap().comment(),
        Some("Settings screen")
    );

    let output = parser.stencil_context(None);
    assert!(output.conflicts.is_empty());
    let root = &output.context.strings.structured_entries;
    let root_names: Vec<_> = root.children().map(|(name, _)| name).collect();
    assert_eq!(
        root_names,
        vec![
            "alert_title",
            "alert_message",
            "greetings",
            "apples",
            "bananas",
            "objectOwnership",
            "percent",
            "types",
            "settings",
        ]
    );

    let deeper = ["navigation-bar", "title", "even", "deeper"]
        .iter()
        .try_fold(root.get("settings").unwrap(), |node, name| {
            node.as_namespace().and_then(|ns| ns.get(name))
        })
        .unwrap();
    assert_eq!(deeper.as_leaf().unwrap().translation, "Deeper");
}

#[test]
fn test_file_with_custom_name() {
    let parser = parse_fixture("Localizable.strings");
    let output = parser.stencil_context(Some("XCTLoc"));
    assert_eq!(output.context.strings.enum_name, "XCTLoc");
    assert_eq!(
        output.context.strings.entries,
        parser.stencil_context(None).context.strings.entries
    );
}

#[test]
fn test_multiline() {
    let parser = parse_fixture("LocMultiline.strings");
    assert_eq!(parser.get("multiline").unwrap().translation(), "multi\nline");
    assert_eq!(
        parser.get("multiLineNKey").unwrap().translation(),
        "multi\nline"
    );
    assert_eq!(
        parser.get("singleline").unwrap().translation(),
        "single line"
    );
    let nested = parser.get("nested.multiline").unwrap();
    assert_eq!(nested.translation(), "Nested\nmultiline for %@");
    assert_eq!(nested.types(), &[PlaceholderType::Object]);
    assert_eq!(
        parser.get("endingWith").unwrap().translation(),
        "Ending with a\n"
    );
}

#[test]
fn test_utf8_file() {
    let parser = parse_fixture("LocUTF8.strings");
    assert_eq!(
        parser.get("settings.title").unwrap().translation(),
        "Réglages"
    );
    assert_eq!(parser.get("settings.title").unwrap().comment(), Some("Réglages"));
    assert_eq!(
        parser.get("greeting").unwrap().translation(),
        "こんにちは、%@さん"
    );
    assert_eq!(
        parser.get("emoji").unwrap().types(),
        &[PlaceholderType::Int]
    );
    assert_eq!(
        parser.get("currency").unwrap().types(),
        &[PlaceholderType::Float]
    );
}

#[test]
fn test_file_with_structured_only() {
    let parser = parse_fixture("LocStructuredOnly.strings");
    let output = parser.stencil_context(None);
    let root = &output.context.strings.structured_entries;

    assert_eq!(root.len(), 2);
    assert!(root.children().all(|(_, node)| matches!(node, Node::Namespace(_))));

    let onboarding = root.get("onboarding").unwrap().as_namespace().unwrap();
    let pages: Vec<_> = onboarding.children().map(|(name, _)| name).collect();
    assert_eq!(pages, vec!["page1", "page2"]);
    assert_eq!(
        onboarding.leaf_keys(),
        vec![
            "onboarding.page1.title",
            "onboarding.page1.body",
            "onboarding.page2.title",
        ]
    );
}

#[test]
fn test_utf16_file_on_disk() {
    let content = "/* Heading */\n\"home.title\" = \"Startseite für %@\";\n";
    let mut bytes = vec![0xFF, 0xFE];
    for unit in content.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let mut parser = StringsFileParser::new();
    parser.parse_file(file.path()).unwrap();
    let entry = parser.get("home.title").unwrap();
    assert_eq!(entry.translation(), "Startseite für %@");
    assert_eq!(entry.comment(), Some("Heading"));
    assert_eq!(entry.types(), &[PlaceholderType::Object]);
}

#[test]
fn test_declared_encoding_for_legacy_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"\"menu.dish\" = \"cr\xe8me br\xfbl\xe9e\";").unwrap();
    file.flush().unwrap();

    let mut strict = StringsFileParser::new();
    let err = strict.parse_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::File { .. }));
    assert_eq!(err.location(), Some((1, 18)));

    let mut parser = StringsFileParser::new()
        .with_encoding(encoding_rs::Encoding::for_label(b"windows-1252"));
    parser.parse_file(file.path()).unwrap();
    assert_eq!(
        parser.get("menu.dish").unwrap().translation(),
        "crème brûlée"
    );
}

#[test]
fn test_missing_file_names_path() {
    let mut parser = StringsFileParser::new();
    let err = parser
        .parse_file(fixture("DoesNotExist.strings"))
        .unwrap_err();
    match &err {
        Error::File { path, source } => {
            assert!(path.ends_with("DoesNotExist.strings"));
            assert!(matches!(**source, Error::Io(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("DoesNotExist.strings"));
}

#[test]
fn test_failed_file_keeps_previous_file_entries() {
    let mut parser = parse_fixture("LocStructuredOnly.strings");
    let before = parser.len();

    let mut broken = NamedTempFile::new().unwrap();
    broken
        .write_all(
            indoc! {r#"
            "extra" = "fine";
            "broken" = "missing semicolon"
            "#}
            .as_bytes(),
        )
        .unwrap();
    broken.flush().unwrap();

    let err = parser.parse_file(broken.path()).unwrap_err();
    assert_eq!(err.location(), Some((3, 1)));
    assert_eq!(parser.len(), before);
    assert!(parser.get("extra").is_none());
}

#[test]
fn test_duplicate_keys_across_files() {
    let mut parser = parse_fixture("Localizable.strings");
    parser
        .parse_str(indoc! {r#"
            /* Overridden */
            "greetings" = "Hi %@";
            "brand_new" = "New";
        "#})
        .unwrap();

    assert_eq!(parser.len(), 13);
    assert_eq!(keys(&parser)[2], "greetings");
    assert_eq!(keys(&parser)[12], "brand_new");
    let greetings = parser.get("greetings").unwrap();
    assert_eq!(greetings.translation(), "Hi %@");
    assert_eq!(greetings.types(), &[PlaceholderType::Object]);
    assert_eq!(greetings.comment(), Some("Overridden"));
}

#[test]
fn test_conflicting_keys_are_reported_not_dropped() {
    let mut parser = StringsFileParser::new();
    parser
        .parse_str(indoc! {r#"
            "profile" = "Profile";
            "profile.title" = "Your profile";
            "profile.avatar.alt" = "Avatar of %@";
        "#})
        .unwrap();

    let output = parser.stencil_context(None);
    assert_eq!(output.context.strings.entries.len(), 3);
    assert_eq!(output.conflicts.len(), 1);
    assert_eq!(output.conflicts[0].shadowed_key, "profile");
    assert_eq!(output.conflicts[0].winning_key, "profile.title");

    let leaf_policy = ContextOptions::new().with_conflict_policy(ConflictPolicy::PreferLeaf);
    let output = parser.stencil_context_with(&leaf_policy);
    let root = &output.context.strings.structured_entries;
    assert_eq!(root.get("profile").unwrap().as_leaf().unwrap().key, "profile");
    let shadowed: Vec<_> = output
        .conflicts
        .iter()
        .map(|c| c.shadowed_key.as_str())
        .collect();
    assert_eq!(shadowed, vec!["profile.title", "profile.avatar.alt"]);
    assert!(output.conflicts.iter().all(|c| c.winning_key == "profile"));
}

#[test]
fn test_keys_without_tree_position_are_listed() {
    let mut parser = StringsFileParser::new();
    parser
        .parse_str(indoc! {r#"
            "menu..title" = "Menu";
            "footer." = "Footer";
            "menu.close" = "Close";
        "#})
        .unwrap();

    let output = parser.stencil_context(None);
    assert_eq!(output.skipped_keys, vec!["menu..title", "footer."]);
    assert_eq!(output.context.strings.entries.len(), 3);

    let json = output.context.to_json_string().unwrap();
    assert!(!json.contains(r#""":"#));
}
