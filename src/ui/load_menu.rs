// ui/load_menu.rs

use super::{
    Component, MenuLayout,
    header::{render_header, render_status, render_title},
    main_menu::MainMenu,
    render_menu_lines,
};
use crate::{app::Action, context::Context, save::SaveSummary};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{ListState, Paragraph, Widget},
};

#[derive(Debug)]
pub struct LoadMenu {
    saves: Vec<SaveSummary>,
    state: ListState,
    backspace_counter: bool,
}

impl Component for LoadMenu {
    fn on_key(&mut self, key: KeyEvent, _context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('l') => {
                self.selected().map(|save| Action::LoadCase(save.session_id))
            }
            KeyCode::Esc | KeyCode::Char('h') => {
                Some(Action::SwitchComponent(Box::new(MainMenu::default())))
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.backspace_counter = false;
                self.state.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.backspace_counter = false;
                if self.state.selected().is_some_and(|i| i + 1 < self.saves.len()) {
                    self.state.select_next();
                }
                None
            }
            KeyCode::Backspace => {
                if self.backspace_counter {
                    self.backspace_counter = false;
                    let index = self.state.selected()?;
                    let save = self.saves.get(index)?;
                    Some(Action::DeleteSave {
                        session_id: save.session_id,
                        index,
                    })
                } else {
                    self.backspace_counter = self.selected().is_some();
                    None
                }
            }
            KeyCode::Char(c) => {
                self.backspace_counter = false;
                let index = (c.to_digit(10)? as usize).checked_sub(1)?;
                let save = self.saves.get(index)?;
                self.state.select(Some(index));
                Some(Action::LoadCase(save.session_id))
            }
            _ => None,
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let layout = MenuLayout::new(area, self.saves.len().max(1) as u16);
        render_header(buffer, layout.header);
        render_title(buffer, layout.title);

        let console_text = match context.console_message() {
            Some(message) => message.to_string(),
            None if self.saves.is_empty() => format!(
                "No saved cases found in {}",
                context.controller.store().dir().display()
            ),
            None => "Select a case to resume".to_string(),
        };
        Paragraph::new(console_text)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .render(layout.console, buffer);

        let items: Vec<String> = self
            .saves
            .iter()
            .map(|save| {
                format!(
                    "{} [{}] {}",
                    save.title,
                    save.genre,
                    save.saved_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                )
            })
            .collect();
        render_menu_lines(
            buffer,
            layout.menu,
            &items,
            self.state.selected(),
            self.backspace_counter,
        );
        render_status(
            buffer,
            layout.status,
            "Enter or number to load, Backspace twice to delete, Esc to go back",
        );
    }
}

impl LoadMenu {
    pub fn new(saves: Vec<SaveSummary>) -> Self {
        let selected = (!saves.is_empty()).then_some(0);
        Self {
            saves,
            state: ListState::default().with_selected(selected),
            backspace_counter: false,
        }
    }

    /// Rebuilds the list after a deletion, keeping the cursor in range.
    pub fn refreshed(saves: Vec<SaveSummary>, previous: usize) -> Self {
        let mut menu = Self::new(saves);
        let last = menu.saves.len().checked_sub(1);
        menu.state.select(last.map(|last| previous.min(last)));
        menu
    }

    fn selected(&self) -> Option<&SaveSummary> {
        self.saves.get(self.state.selected()?)
    }
}
