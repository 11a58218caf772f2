use super::{
    constants::{ART, TITLE},
    utils::center_rect,
};
use crate::context::Context;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

pub fn render_header(buffer: &mut Buffer, area: Rect) {
    let header = Paragraph::new(format!("Sherlock Ratatui v{}", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().border_type(BorderType::Rounded))
        .alignment(Alignment::Center);
    header.render(area, buffer);
}

pub fn render_art(buffer: &mut Buffer, area: Rect) {
    if area.height < 15 {
        return;
    }
    let inner_rect = center_rect(area, Constraint::Length(66), Constraint::Length(15));

    let inner_block = Block::default()
        .border_type(BorderType::Rounded)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Yellow));
    inner_block.render(inner_rect, buffer);

    let art = Paragraph::new(ART)
        .alignment(Alignment::Left)
        .style(Style::default().fg(Color::Yellow));
    art.render(inner_rect, buffer);
}

pub fn render_title(buffer: &mut Buffer, area: Rect) {
    let title_area = center_rect(area, Constraint::Length(44), Constraint::Length(7));
    let title = Paragraph::new(TITLE)
        .alignment(Alignment::Left)
        .style(Style::default().fg(Color::Yellow));
    title.render(title_area, buffer);
}

// Latest system message, if any.
pub fn render_console(buffer: &mut Buffer, context: &Context, area: Rect) {
    if let Some(message) = context.console_message() {
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .render(area, buffer);
    }
}

pub fn render_status(buffer: &mut Buffer, area: Rect, status: &str) {
    Paragraph::new(status)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .render(area, buffer);
}
