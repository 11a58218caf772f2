// ui/utils.rs

use ratatui::layout::{Constraint, Flex, Layout, Rect};

pub fn center_rect(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

/// Wraps each paragraph to `width`, keeping blank lines between them.
pub fn wrap_paragraphs(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_wrap_and_keep_gaps() {
        let lines = wrap_paragraphs("The fog lay thick upon the street.\n\nA cab waited.", 12);
        assert!(lines.iter().all(|line| line.chars().count() <= 12));
        assert!(lines.contains(&String::new()));
        assert_eq!(lines.last().map(String::as_str), Some("A cab waited."));
    }

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = center_rect(outer, Constraint::Length(20), Constraint::Length(10));
        assert_eq!(inner, Rect::new(40, 15, 20, 10));
    }
}
