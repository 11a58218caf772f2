use super::{Component, utils::center_rect};
use crate::{app::Action, context::Context};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Quit,
    Delete,
    Solved,
}

impl ConfirmKind {
    fn question(self) -> &'static str {
        match self {
            ConfirmKind::Quit => "Save your progress before returning to the main menu?",
            ConfirmKind::Delete => "Delete this case and its save file? This cannot be undone.",
            ConfirmKind::Solved => "The case is solved! Delete its save file?",
        }
    }

    fn keys(self) -> &'static str {
        match self {
            ConfirmKind::Quit => "y: save and quit   n: quit without saving   Esc: keep playing",
            ConfirmKind::Delete => "y: delete   n/Esc: keep playing",
            ConfirmKind::Solved => "y: delete and return to the menu   n/Esc: keep the save",
        }
    }
}

/// A yes/no popup drawn over the screen it interrupts.
#[derive(Debug)]
pub struct ConfirmDialog {
    kind: ConfirmKind,
    underlying: Option<Box<dyn Component>>,
}

impl ConfirmDialog {
    pub fn new(kind: ConfirmKind, underlying: Box<dyn Component>) -> Self {
        Self {
            kind,
            underlying: Some(underlying),
        }
    }

    fn back(&mut self) -> Option<Action> {
        self.underlying.take().map(Action::SwitchComponent)
    }
}

impl Component for ConfirmDialog {
    fn on_key(&mut self, key: KeyEvent, _context: &Context) -> Option<Action> {
        match (self.kind, key.code) {
            (ConfirmKind::Quit, KeyCode::Char('y' | 'Y')) => Some(Action::QuitCase { save: true }),
            (ConfirmKind::Quit, KeyCode::Char('n' | 'N')) => Some(Action::QuitCase { save: false }),
            (ConfirmKind::Delete | ConfirmKind::Solved, KeyCode::Char('y' | 'Y')) => {
                Some(Action::DeleteCase)
            }
            (ConfirmKind::Solved, KeyCode::Char('n' | 'N') | KeyCode::Esc) => {
                Some(Action::QuitCase { save: true })
            }
            (ConfirmKind::Delete, KeyCode::Char('n' | 'N')) | (_, KeyCode::Esc) => self.back(),
            _ => None,
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        if let Some(underlying) = self.underlying.as_mut() {
            underlying.render(area, buffer, context);
        }

        let popup = center_rect(area, Constraint::Percentage(50), Constraint::Length(7));
        Clear.render(popup, buffer);
        let block = Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red));
        Paragraph::new(vec![
            Line::from(self.kind.question()),
            Line::from(""),
            Line::from(self.kind.keys()).style(Style::default().fg(Color::DarkGray)),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(popup, buffer);
    }
}
