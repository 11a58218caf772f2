// ui/spinner.rs

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Progress indicator for the narrator's turn, advanced on every tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Spinner {
    ticks: usize,
}

impl Spinner {
    pub fn advance(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn frame(&self) -> char {
        FRAMES[self.ticks % FRAMES.len()]
    }

    pub fn status_line(&self) -> String {
        format!(" Holmes is thinking {}  (Esc to cancel) ", self.frame())
    }
}
