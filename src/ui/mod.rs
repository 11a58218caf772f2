// ui/mod.rs

mod component;
mod confirm;
mod constants;
pub mod game;
mod genre_menu;
mod header;
mod load_menu;
pub mod main_menu;
pub mod spinner;
mod textarea;
pub mod utils;

pub use component::Component;
pub use confirm::{ConfirmDialog, ConfirmKind};
pub use game::CaseScreen;
pub use load_menu::LoadMenu;
pub use main_menu::MainMenu;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use utils::center_rect;

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

/// Shared vertical layout of the menu screens.
#[derive(Debug, Clone, Copy)]
struct MenuLayout {
    header: Rect,
    art: Rect,
    title: Rect,
    console: Rect,
    menu: Rect,
    status: Rect,
}

impl MenuLayout {
    fn new(area: Rect, items: u16) -> Self {
        let art_height = if area.height > items + 40 { 17 } else { 0 };
        let [header, art, title, console, menu, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(art_height),
            Constraint::Length(8),
            Constraint::Length(2),
            Constraint::Min(items + 2),
            Constraint::Length(1),
        ])
        .areas(area);
        Self {
            header,
            art,
            title,
            console,
            menu,
            status,
        }
    }
}

/// Numbered menu lines, the selected one highlighted. `alarm` marks a pending
/// destructive action on the selection.
fn render_menu_lines(
    buffer: &mut Buffer,
    area: Rect,
    items: &[String],
    selected: Option<usize>,
    alarm: bool,
) {
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = format!("{}. {}", i + 1, item);
            if Some(i) == selected {
                let style = if alarm {
                    Style::default().fg(Color::Red).rapid_blink()
                } else {
                    Style::default().fg(Color::Yellow)
                };
                Line::from(Span::styled(text, style.add_modifier(Modifier::BOLD)))
            } else {
                Line::from(Span::raw(text))
            }
        })
        .collect();

    let max_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let centered_area = center_rect(
        area,
        Constraint::Length(max_width.min(area.width)),
        Constraint::Length((items.len() as u16).min(area.height)),
    );

    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .style(Style::default().fg(Color::White))
        .render(centered_area, buffer);
}

/// Shown instead of any screen when the terminal is too small to lay it out.
pub fn render_too_small(area: Rect, buffer: &mut Buffer) -> bool {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        Paragraph::new(format!(
            "Terminal too small. Please resize to at least {MIN_WIDTH}x{MIN_HEIGHT}."
        ))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .render(area, buffer);
        return true;
    }
    false
}
