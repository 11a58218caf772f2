// src/ui/main_menu.rs

use super::{
    Component, MenuLayout,
    genre_menu::GenreMenu,
    header::{render_art, render_console, render_header, render_status, render_title},
    load_menu::LoadMenu,
    render_menu_lines,
};
use crate::{app::Action, context::Context};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{buffer::Buffer, layout::Rect, widgets::ListState};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, FromRepr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumCountMacro, FromRepr)]
enum MainMenuItem {
    #[strum(to_string = "Start a new case")]
    NewCase,
    #[strum(to_string = "Load a case")]
    LoadCase,
    #[strum(to_string = "Quit")]
    Quit,
}

#[derive(Debug)]
pub struct MainMenu {
    state: ListState,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self {
            state: ListState::default().with_selected(Some(0)),
        }
    }
}

impl Component for MainMenu {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('l') => self
                .state
                .selected()
                .and_then(MainMenuItem::from_repr)
                .map(|item| self.choose(item, context)),
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_offset(MainMenuItem::COUNT - 1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_offset(1);
                None
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|digit| MainMenuItem::from_repr((digit as usize).checked_sub(1)?))
                .map(|item| self.choose(item, context)),
            _ => None,
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let layout = MenuLayout::new(area, MainMenuItem::COUNT as u16);
        render_header(buffer, layout.header);
        render_art(buffer, layout.art);
        render_title(buffer, layout.title);
        render_console(buffer, context, layout.console);
        let items: Vec<String> = MainMenuItem::iter().map(|item| item.to_string()).collect();
        render_menu_lines(buffer, layout.menu, &items, self.state.selected(), false);
        render_status(
            buffer,
            layout.status,
            "Enter or number to choose, j/k or arrows to move, q to quit",
        );
    }
}

impl MainMenu {
    fn select_offset(&mut self, offset: usize) {
        let current = self.state.selected().unwrap_or(0);
        self.state
            .select(Some((current + offset) % MainMenuItem::COUNT));
    }

    fn choose(&mut self, item: MainMenuItem, context: &Context) -> Action {
        self.state.select(Some(item as usize));
        match item {
            MainMenuItem::NewCase => Action::SwitchComponent(Box::new(GenreMenu::default())),
            MainMenuItem::LoadCase => Action::SwitchComponent(Box::new(LoadMenu::new(
                context.controller.list_saves(),
            ))),
            MainMenuItem::Quit => Action::Quit,
        }
    }
}
