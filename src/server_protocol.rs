use serde_json::Value;

use crate::types::Direction;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Hello {
        name: String,
        spectator: bool,
    },
    /// Press or release one direction key; `dir: none` releases every key.
    Input {
        dir: Direction,
        held: bool,
    },
    Restart,
    Ping {
        t: f64,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "hello" => {
            let name = object.get("name")?.as_str()?.to_string();
            let spectator = match object.get("spectator") {
                None => false,
                Some(value) => value.as_bool()?,
            };
            Some(ParsedClientMessage::Hello { name, spectator })
        }
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            let held = match object.get("held") {
                None => true,
                Some(value) => value.as_bool()?,
            };
            Some(ParsedClientMessage::Input { dir, held })
        }
        "restart" => Some(ParsedClientMessage::Restart),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hello_message() {
        let parsed = parse_client_message(r#"{"type":"hello","name":"A","spectator":true}"#)
            .expect("hello message should parse");
        assert_eq!(
            parsed,
            ParsedClientMessage::Hello {
                name: "A".to_string(),
                spectator: true,
            }
        );
    }

    #[test]
    fn parse_hello_rejects_non_bool_spectator() {
        let parsed = parse_client_message(r#"{"type":"hello","name":"A","spectator":"yes"}"#);
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_input_defaults_to_pressed() {
        let parsed = parse_client_message(r#"{"type":"input","dir":"up"}"#);
        assert_eq!(
            parsed,
            Some(ParsedClientMessage::Input {
                dir: Direction::Up,
                held: true,
            })
        );
    }

    #[test]
    fn parse_input_release() {
        let parsed = parse_client_message(r#"{"type":"input","dir":"left","held":false}"#);
        assert_eq!(
            parsed,
            Some(ParsedClientMessage::Input {
                dir: Direction::Left,
                held: false,
            })
        );
    }

    #[test]
    fn parse_input_rejects_invalid_direction() {
        assert!(parse_client_message(r#"{"type":"input","dir":"invalid"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input"}"#).is_none());
    }

    #[test]
    fn parse_ping_requires_number() {
        let parsed = parse_client_message(r#"{"type":"ping","t":12.5}"#);
        assert_eq!(parsed, Some(ParsedClientMessage::Ping { t: 12.5 }));
        assert!(parse_client_message(r#"{"type":"ping","t":"now"}"#).is_none());
    }

    #[test]
    fn unknown_type_and_garbage_are_ignored() {
        assert!(parse_client_message(r#"{"type":"lobby_start"}"#).is_none());
        assert!(parse_client_message("not json").is_none());
        assert_eq!(
            parse_client_message(r#"{"type":"restart"}"#),
            Some(ParsedClientMessage::Restart)
        );
    }

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(""), "Player");
        assert_eq!(sanitize_name("   "), "Player");
        assert_eq!(sanitize_name(" Alice "), "Alice");
        assert_eq!(sanitize_name("12345678901234567890"), "1234567890123456");
    }
}
