use crate::{
    game::GameController, message::Message, save::SaveManager, settings::Settings,
    ui::spinner::Spinner,
};

/// Read-only view of the app handed to components for input and drawing.
#[derive(Debug)]
pub struct Context<'a> {
    pub controller: &'a GameController<SaveManager>,
    pub settings: &'a Settings,
    pub messages: &'a [Message],
    pub spinner: &'a Spinner,
    pub narrator_ready: bool,
}

impl Context<'_> {
    pub fn waiting(&self) -> bool {
        self.controller.state() == crate::game::ControllerState::AwaitingModelReply
    }

    /// The newest system message, shown on the menu console.
    pub fn console_message(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|message| message.message_type == crate::message::MessageType::System)
            .map(|message| message.content.as_str())
    }
}
