use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders};
use tui_textarea::TextArea;

pub fn new_textarea(placeholder: impl Into<String>) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(placeholder);
    textarea.set_cursor_line_style(Style::default());
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.set_selection_style(Style::new().bg(Color::LightCyan));
    textarea
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Typing,
    Waiting,
}

impl InputMode {
    pub fn block<'a>(self) -> Block<'a> {
        let (mode, help, color) = match self {
            InputMode::Typing => ("TYPING", "Enter to send, Esc to leave the case", Color::LightCyan),
            InputMode::Waiting => ("WAITING", "Esc to cancel the request", Color::DarkGray),
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .border_type(BorderType::Rounded)
            .title_bottom(Line::from(format!(" {mode} ")).left_aligned())
            .title_bottom(Line::from(format!(" {help} ")).right_aligned())
            .title_alignment(Alignment::Center)
    }

    pub fn cursor_style(self) -> Style {
        let color = match self {
            InputMode::Typing => Color::LightBlue,
            InputMode::Waiting => Color::DarkGray,
        };
        Style::default().fg(color).add_modifier(Modifier::REVERSED)
    }
}
