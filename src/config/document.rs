//! Document parser
//!
//! Turns the bytes of one manifest or settings file into a [`ConfigFragment`].
//! Parsing is pure. Fields may sit at the top level or inside a `manifest:` or
//! `settings:` section; the first layer that specifies a field wins, in the
//! order top level, `settings`, `manifest`.

use serde_yaml::{Mapping, Value};
use std::path::PathBuf;

use super::fragment::ConfigFragment;
use super::live::{WindowMode, UNNAMED_PLACEHOLDER};
use crate::error::{ShellError, ShellResult};

const MANIFEST_SECTION: &str = "manifest";
const SETTINGS_SECTION: &str = "settings";

/// One layer after applying the sentinel rules
#[derive(Debug, Default)]
struct Layer {
    name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    mode: Option<WindowMode>,
    fullscreen: Option<bool>,
}

/// Parse a document into a fragment.
///
/// Malformed syntax, or a top level that is not a mapping, is a
/// [`ShellError::Parse`] with an empty path; callers attach the file path.
pub fn parse_document(bytes: &[u8]) -> ShellResult<ConfigFragment> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigFragment::default());
    }

    let tree: Value = serde_yaml::from_slice(bytes).map_err(parse_error)?;
    let mut root = match tree {
        Value::Null => return Ok(ConfigFragment::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(parse_error(format!(
                "expected a mapping at the top level, found {}",
                describe(&other)
            )))
        }
    };

    let manifest = take_section(&mut root, MANIFEST_SECTION);
    let settings = take_section(&mut root, SETTINGS_SECTION);
    let top = read_layer(&root);

    Ok(resolve(&[top, settings, manifest]))
}

fn take_section(root: &mut Mapping, key: &str) -> Layer {
    match root.remove(key) {
        Some(Value::Mapping(section)) => read_layer(&section),
        Some(Value::Null) | None => Layer::default(),
        Some(other) => {
            log::debug!(
                "[document] Ignoring '{}' section holding {}",
                key,
                describe(&other)
            );
            Layer::default()
        }
    }
}

/// Look up the recognised keys. Anything else in the mapping, including
/// non-string keys, is ignored.
fn read_layer(mapping: &Mapping) -> Layer {
    Layer {
        name: mapping.get("name").and_then(name_value),
        width: mapping.get("width").and_then(|v| size_value("width", v)),
        height: mapping.get("height").and_then(|v| size_value("height", v)),
        mode: mapping
            .get("windowmode")
            .or_else(|| mapping.get("window_mode"))
            .and_then(mode_value),
        fullscreen: mapping.get("fullscreen").and_then(|v| match v {
            Value::Bool(b) => Some(*b),
            other => {
                log::debug!("[document] 'fullscreen' is {}, not a bool", describe(other));
                None
            }
        }),
    }
}

fn resolve(layers: &[Layer]) -> ConfigFragment {
    let window_mode = layers
        .iter()
        .find_map(|l| l.mode)
        .or_else(|| {
            layers.iter().find_map(|l| {
                l.fullscreen.map(|full| {
                    if full {
                        WindowMode::Fullscreen
                    } else {
                        WindowMode::Windowed
                    }
                })
            })
        });

    ConfigFragment {
        display_name: layers.iter().find_map(|l| l.name.clone()),
        width: layers.iter().find_map(|l| l.width),
        height: layers.iter().find_map(|l| l.height),
        window_mode,
    }
}

/// The placeholder name and the empty string both mean "unspecified"
fn name_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() || s == UNNAMED_PLACEHOLDER => None,
        Value::String(s) => Some(s.clone()),
        other => {
            log::debug!("[document] 'name' is {}, not a string", describe(other));
            None
        }
    }
}

/// Negative or out-of-range sizes mean "unspecified"
fn size_value(key: &str, value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| u32::try_from(v).ok()),
        other => {
            log::debug!("[document] '{}' is {}, not an integer", key, describe(other));
            None
        }
    }
}

fn mode_value(value: &Value) -> Option<WindowMode> {
    match value {
        Value::String(token) => Some(WindowMode::from_token(token)).filter(|m| m.is_known()),
        other => {
            log::debug!("[document] 'windowmode' is {}, not a token", describe(other));
            None
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn parse_error(error: impl std::fmt::Display) -> ShellError {
    ShellError::Parse {
        path: PathBuf::new(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let data = b"
---
manifest:
    name: TestName
";
        let fragment = parse_document(data).expect("manifest should parse");
        assert_eq!(fragment.display_name.as_deref(), Some("TestName"));
        assert_eq!(fragment.width, None);
        assert_eq!(fragment.window_mode, None);
    }

    #[test]
    fn test_parse_settings() {
        let data = b"width: 888\nheight: 555\nwindowmode: \"fullscreen\"\n";
        let fragment = parse_document(data).expect("settings should parse");
        assert_eq!(fragment.width, Some(888));
        assert_eq!(fragment.height, Some(555));
        assert_eq!(fragment.window_mode, Some(WindowMode::Fullscreen));
        assert_eq!(fragment.display_name, None);
    }

    #[test]
    fn test_parse_nested_settings_with_fullscreen_flag() {
        let data = b"
---
settings:
    width: 888
    height: 555
    fullscreen: true
";
        let fragment = parse_document(data).expect("settings should parse");
        assert_eq!(fragment.width, Some(888));
        assert_eq!(fragment.height, Some(555));
        assert_eq!(fragment.window_mode, Some(WindowMode::Fullscreen));
    }

    #[test]
    fn test_malformed_yaml_fails() {
        let err = parse_document(b"name: [unclosed\nwidth: 3").unwrap_err();
        assert!(matches!(err, ShellError::Parse { .. }));
    }

    #[test]
    fn test_non_mapping_top_level_fails() {
        let err = parse_document(b"- just\n- a list\n").unwrap_err();
        assert!(err.to_string().contains("expected a mapping"));
        assert!(parse_document(b"42").is_err());
    }

    #[test]
    fn test_empty_document_is_empty_fragment() {
        assert!(parse_document(b"").unwrap().is_empty());
        assert!(parse_document(b"  \n\t\n").unwrap().is_empty());
        assert!(parse_document(b"---\n~\n").unwrap().is_empty());
    }

    #[test]
    fn test_sentinels_are_unspecified() {
        let data = b"name: Unnamed\nwidth: -1\nheight: -600\nwindowmode: borderless\n";
        let fragment = parse_document(data).unwrap();
        assert!(fragment.is_empty());

        let fragment = parse_document(b"name: \"\"\n").unwrap();
        assert_eq!(fragment.display_name, None);
    }

    #[test]
    fn test_zero_size_is_a_real_value() {
        let fragment = parse_document(b"width: 0\nheight: 0\n").unwrap();
        assert_eq!(fragment.width, Some(0));
        assert_eq!(fragment.height, Some(0));
    }

    #[test]
    fn test_wrong_types_are_unspecified() {
        let data = b"name: 12\nwidth: wide\nheight: 1.5\nwindowmode: 3\nfullscreen: yes-please\n";
        let fragment = parse_document(data).expect("loosely typed fields never fail the document");
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_oversized_dimension_is_unspecified() {
        let fragment = parse_document(b"width: 99999999999\nheight: 720\n").unwrap();
        assert_eq!(fragment.width, None);
        assert_eq!(fragment.height, Some(720));
    }

    #[test]
    fn test_layer_precedence() {
        let data = b"
name: Top
manifest:
    name: FromManifest
    width: 10
settings:
    width: 20
    height: 30
";
        let fragment = parse_document(data).unwrap();
        assert_eq!(fragment.display_name.as_deref(), Some("Top"));
        assert_eq!(fragment.width, Some(20));
        assert_eq!(fragment.height, Some(30));
    }

    #[test]
    fn test_windowmode_beats_fullscreen_flag() {
        let fragment = parse_document(b"windowmode: windowed\nfullscreen: true\n").unwrap();
        assert_eq!(fragment.window_mode, Some(WindowMode::Windowed));

        let fragment = parse_document(b"window_mode: nonsense\nfullscreen: false\n").unwrap();
        assert_eq!(fragment.window_mode, Some(WindowMode::Windowed));
    }

    #[test]
    fn test_unknown_keys_and_odd_sections_are_ignored() {
        let data = b"title: ignored\nmanifest: just-a-string\nheight: 480\n";
        let fragment = parse_document(data).unwrap();
        assert_eq!(fragment.height, Some(480));
        assert_eq!(fragment.display_name, None);
    }

    #[test]
    fn test_non_string_keys_are_ignored() {
        let fragment = parse_document(b"true: x\nname: Ok\n").expect("bool key is just noise");
        assert_eq!(fragment.display_name.as_deref(), Some("Ok"));

        let fragment = parse_document(b"0: Sneaky\n1: 777\nwidth: 640\n").unwrap();
        assert_eq!(fragment.width, Some(640));
        assert_eq!(fragment.display_name, None);

        let data = b"settings:\n    404: missing\n    height: 480\n";
        assert_eq!(parse_document(data).unwrap().height, Some(480));
    }

    #[test]
    fn test_both_mode_spellings_prefer_windowmode() {
        let data = b"name: Keep\nwindowmode: fullscreen\nwindow_mode: windowed\n";
        let fragment = parse_document(data).expect("both spellings in one layer still parse");
        assert_eq!(fragment.display_name.as_deref(), Some("Keep"));
        assert_eq!(fragment.window_mode, Some(WindowMode::Fullscreen));
    }
}
