//! Chat command parsing: a configurable prefix followed by a verb and its
//! argument text, e.g. `!urban rick roll`. Verbs are case-insensitive.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Urban(String),  // urban <term>
    Lmgtfy(String), // lmgtfy <query>
    Stats,          // stats
    Unknown(String),
}

/// Parse a chat message. `None` means the text is not addressed to the bot
/// as a command (it may still carry a link).
pub fn parse_command(prefix: &str, input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix(prefix)?;
    if prefix.is_empty() || body.is_empty() || body.starts_with(char::is_whitespace) {
        return None;
    }

    let mut parts = body.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let command = match (verb.to_ascii_lowercase().as_str(), rest) {
        ("urban", Some(term)) => Command::Urban(term.to_string()),
        ("lmgtfy", Some(query)) => Command::Lmgtfy(query.to_string()),
        ("stats", _) => Command::Stats,
        _ => Command::Unknown(trimmed.to_string()),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_verbs() {
        assert_eq!(
            parse_command("!", "!urban  rick roll "),
            Some(Command::Urban("rick roll".into()))
        );
        assert_eq!(
            parse_command("!", "!URBAN yeet"),
            Some(Command::Urban("yeet".into()))
        );
        assert_eq!(
            parse_command("!", "!ud yeet"),
            Some(Command::Unknown("!ud yeet".into()))
        );
        assert_eq!(
            parse_command("!", "!lmgtfy how do magnets work"),
            Some(Command::Lmgtfy("how do magnets work".into()))
        );
        assert_eq!(parse_command("!", "!stats"), Some(Command::Stats));
        assert_eq!(parse_command("!", "!stats please"), Some(Command::Stats));
    }

    #[test]
    fn missing_arguments_are_unknown() {
        assert_eq!(
            parse_command("!", "!urban"),
            Some(Command::Unknown("!urban".into()))
        );
        assert_eq!(
            parse_command("!", "!lmgtfy   "),
            Some(Command::Unknown("!lmgtfy".into()))
        );
    }

    #[test]
    fn plain_chat_is_not_a_command() {
        assert_eq!(parse_command("!", "hello http://example.com/x"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("!", "! urban x"), None);
        assert_eq!(parse_command("", "urban x"), None);
    }

    #[test]
    fn multi_character_prefix() {
        assert_eq!(parse_command("leader:", "leader:stats"), Some(Command::Stats));
        assert_eq!(parse_command("leader:", "!stats"), None);
    }
}
