use strum_macros::{Display, EnumIter, EnumString};

/// Control directives typed during a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Command {
    Save,
    Quit,
    Delete,
    Help,
}

impl Command {
    pub fn description(self) -> &'static str {
        match self {
            Command::Save => "Save your current progress.",
            Command::Quit => "Quit the current case and return to the main menu.",
            Command::Delete => "Delete the current save file and return to the main menu.",
            Command::Help => "Show this help message.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Command(Command),
    /// In-character action or dialogue, passed to the narrator unchanged.
    Narrative(String),
    Empty,
}

impl PlayerInput {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return PlayerInput::Empty;
        }
        trimmed
            .strip_prefix('/')
            .and_then(|name| name.parse().ok())
            .map(PlayerInput::Command)
            .unwrap_or_else(|| PlayerInput::Narrative(trimmed.to_string()))
    }
}

pub fn help_text() -> String {
    use strum::IntoEnumIterator;

    let mut text = String::from(
        "Enter your actions or dialogue as Sherlock Holmes.\nSpecial commands:\n",
    );
    for command in Command::iter() {
        text.push_str(&format!("  /{:<7} - {}\n", command, command.description()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_recognized() {
        assert_eq!(PlayerInput::parse("/save"), PlayerInput::Command(Command::Save));
        assert_eq!(PlayerInput::parse("  /QUIT "), PlayerInput::Command(Command::Quit));
        assert_eq!(PlayerInput::parse("/delete"), PlayerInput::Command(Command::Delete));
        assert_eq!(PlayerInput::parse("/Help"), PlayerInput::Command(Command::Help));
    }

    #[test]
    fn everything_else_is_narrative() {
        assert_eq!(
            PlayerInput::parse("I examine the /save mark on the door"),
            PlayerInput::Narrative("I examine the /save mark on the door".to_string())
        );
        assert_eq!(
            PlayerInput::parse("/dance"),
            PlayerInput::Narrative("/dance".to_string())
        );
        assert_eq!(PlayerInput::parse("   "), PlayerInput::Empty);
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for name in ["/save", "/quit", "/delete", "/help"] {
            assert!(help.contains(name));
        }
    }
}
