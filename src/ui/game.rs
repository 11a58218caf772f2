// ui/game.rs

use super::{
    Component, ConfirmKind,
    textarea::{InputMode, new_textarea},
    utils::wrap_paragraphs,
};
use crate::{
    app::Action,
    case::CaseState,
    context::Context,
    message::{Message, MessageType},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use tui_textarea::TextArea;

/// The in-case screen: narrative on the left, the case file on the right.
#[derive(Debug)]
pub struct CaseScreen {
    textarea: TextArea<'static>,
    // Lines scrolled up from the bottom; 0 follows the newest text.
    scroll: usize,
}

impl Default for CaseScreen {
    fn default() -> Self {
        Self {
            textarea: new_textarea(super::constants::INPUT_HINT),
            scroll: 0,
        }
    }
}

impl Component for CaseScreen {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(5);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(5);
                return None;
            }
            _ => {}
        }

        if context.waiting() {
            return (key.code == KeyCode::Esc).then_some(Action::CancelTurn);
        }

        match key.code {
            KeyCode::Esc => Some(Action::Confirm(ConfirmKind::Quit)),
            KeyCode::Enter if !key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                let text = self.textarea.lines().join("\n");
                self.textarea = new_textarea(super::constants::INPUT_HINT);
                self.scroll = 0;
                Some(Action::SubmitInput(text))
            }
            _ => {
                self.textarea.input(key);
                None
            }
        }
    }

    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let [story_area, file_area] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(area);
        let [narrative_area, input_area] =
            Layout::vertical([Constraint::Min(5), Constraint::Length(5)]).areas(story_area);

        let case = context.controller.case();
        self.render_narrative(buffer, narrative_area, context, case);
        self.render_input(buffer, input_area, context);
        match case {
            Some(case) => render_case_file(buffer, file_area, case),
            None => Paragraph::new("No active case.")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .render(file_area, buffer),
        }
    }
}

impl CaseScreen {
    fn render_narrative(
        &mut self,
        buffer: &mut Buffer,
        area: Rect,
        context: &Context,
        case: Option<&CaseState>,
    ) {
        let title = case.map_or_else(
            || " The game is afoot ".to_string(),
            |case| match case.title() {
                Some(title) => format!(" {title} "),
                None => format!(" A new {} case opens ", case.genre()),
            },
        );
        let mut block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));
        if context.settings.debug_mode {
            block = block.title_bottom(
                Line::from(format!(" {} ", context.settings.model)).right_aligned(),
            );
        }
        let inner = block.inner(area);
        block.render(area, buffer);

        let width = inner.width.saturating_sub(1) as usize;
        let lines = message_lines(context.messages, width);
        let height = inner.height as usize;
        let max_scroll = lines.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
        let start = max_scroll - self.scroll;

        let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
        Paragraph::new(visible).render(inner, buffer);

        if context.waiting() && inner.height > 0 {
            let spinner_area = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
            Paragraph::new(context.spinner.status_line())
                .style(Style::default().fg(Color::Green))
                .alignment(Alignment::Center)
                .render(spinner_area, buffer);
        }
    }

    fn render_input(&mut self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let mode = if context.waiting() {
            InputMode::Waiting
        } else {
            InputMode::Typing
        };
        let mut block = mode.block();
        if !context.narrator_ready {
            block = block.title(" No API key: set NEBIUS_API_KEY or OPENAI_API_KEY ");
        }
        self.textarea.set_block(block);
        self.textarea.set_cursor_style(mode.cursor_style());
        (&self.textarea).render(area, buffer);
    }
}

fn message_lines(messages: &[Message], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        let (style, alignment, prefix) = match message.message_type {
            MessageType::Player => (Style::default().fg(Color::Cyan), Alignment::Right, "> "),
            MessageType::Narrator => (Style::default().fg(Color::White), Alignment::Left, ""),
            MessageType::System => (Style::default().fg(Color::Yellow), Alignment::Center, ""),
        };
        let text = format!("{prefix}{}", message.content);
        for line in wrap_paragraphs(&text, width) {
            lines.push(Line::styled(line, style).alignment(alignment));
        }
        lines.push(Line::default());
    }
    lines
}

fn render_case_file(buffer: &mut Buffer, area: Rect, case: &CaseState) {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Case: ", heading),
            Span::raw(case.display_title()),
        ]),
        Line::from(vec![
            Span::styled("Genre: ", heading),
            Span::raw(case.genre().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Time: ", heading),
            Span::raw(case.current_time().unwrap_or("Unknown").to_string()),
        ]),
    ];
    if case.is_solved() {
        lines.push(Line::styled(
            "SOLVED",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let sections = [
        ("Clues", case.clues()),
        ("Suspects", case.suspects()),
        ("Locations", case.locations()),
        ("Items", case.items()),
    ];
    for (name, values) in sections {
        lines.push(Line::default());
        lines.push(Line::styled(format!("{name} ({})", values.len()), heading));
        if values.is_empty() {
            lines.push(Line::styled("  none yet", Style::default().fg(Color::DarkGray)));
        }
        lines.extend(values.iter().map(|value| Line::raw(format!("  • {value}"))));
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Case File ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .render(area, buffer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_wrap_with_spacing() {
        let messages = vec![
            Message::new(MessageType::Player, "I knock on the door"),
            Message::new(
                MessageType::Narrator,
                "Mrs Hudson opens it with a look of weary patience.",
            ),
        ];
        let lines = message_lines(&messages, 20);
        let blanks = lines.iter().filter(|line| line.width() == 0).count();
        assert_eq!(blanks, 2);
        assert!(lines.iter().all(|line| line.width() <= 20));
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
    }
}
