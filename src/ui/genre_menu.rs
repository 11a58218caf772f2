// ui/genre_menu.rs

use super::{
    Component, MenuLayout,
    header::{render_console, render_header, render_status, render_title},
    main_menu::MainMenu,
    render_menu_lines,
};
use crate::{app::Action, case::Genre, context::Context};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{buffer::Buffer, layout::Rect, widgets::ListState};
use strum::IntoEnumIterator;

/// Genre choice for a new case, with a random pick as the last entry.
#[derive(Debug)]
pub struct GenreMenu {
    genres: Vec<Genre>,
    state: ListState,
}

impl Default for GenreMenu {
    fn default() -> Self {
        Self {
            genres: Genre::iter().collect(),
            state: ListState::default().with_selected(Some(0)),
        }
    }
}

impl Component for GenreMenu {
    fn on_key(&mut self, key: KeyEvent, _context: &Context) -> Option<Action> {
        let len = self.len();
        match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self.state.selected().map(|i| self.pick(i)),
            KeyCode::Esc | KeyCode::Char('h') => {
                Some(Action::SwitchComponent(Box::new(MainMenu::default())))
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let current = self.state.selected().unwrap_or(0);
                self.state.select(Some((current + len - 1) % len));
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let current = self.state.selected().unwrap_or(0);
                self.state.select(Some((current + 1) % len));
                None
            }
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|digit| (digit as usize).checked_sub(1))
                .filter(|&i| i < len)
                .map(|i| {
                    self.state.select(Some(i));
                    self.pick(i)
                }),
            _ => None,
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let layout = MenuLayout::new(area, self.len() as u16);
        render_header(buffer, layout.header);
        render_title(buffer, layout.title);
        render_console(buffer, context, layout.console);
        let mut items: Vec<String> = self.genres.iter().map(Genre::to_string).collect();
        items.push("Random".to_string());
        render_menu_lines(buffer, layout.menu, &items, self.state.selected(), false);
        render_status(
            buffer,
            layout.status,
            "Choose a genre with Enter or its number, Esc to go back",
        );
    }
}

impl GenreMenu {
    fn len(&self) -> usize {
        self.genres.len() + 1
    }

    fn pick(&self, index: usize) -> Action {
        let genre = self.genres.get(index).copied().unwrap_or_else(Genre::random);
        Action::NewCase(genre)
    }
}
