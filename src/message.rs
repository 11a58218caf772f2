use crate::case::{Speaker, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Player,
    Narrator,
    System,
}

/// One entry in the case view's scrollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
}

impl Message {
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            message_type,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageType::System, content)
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let message_type = match turn.speaker {
            Speaker::Player => MessageType::Player,
            Speaker::Narrator => MessageType::Narrator,
        };
        Self::new(message_type, turn.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseState, Genre};

    #[test]
    fn resumed_turns_become_scrollback() {
        let mut case = CaseState::new(Genre::Mystery, 4);
        case.record_turn(Speaker::Player, "I open the letter");
        case.record_turn(Speaker::Narrator, "The seal bears a crowned lion.");

        let messages: Vec<Message> = case.recent_turns().map(Message::from).collect();
        assert_eq!(
            messages,
            [
                Message::new(MessageType::Player, "I open the letter"),
                Message::new(MessageType::Narrator, "The seal bears a crowned lion."),
            ]
        );
    }
}
