// src/tui.rs
use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};

use color_eyre::eyre::Result;
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use ratatui::DefaultTerminal;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::ui::{MIN_HEIGHT, MIN_WIDTH};

/// What the app loop reacts to: keys, redraws and the spinner clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TuiEvent {
    Init,
    Tick,
    Render,
    Key(KeyEvent),
    Resize(u16, u16),
    Error,
}

/// Key presses and resizes; the rest of crossterm's stream is dropped.
fn translate(event: std::io::Result<CrosstermEvent>) -> Option<TuiEvent> {
    match event {
        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(TuiEvent::Key(key)),
        Ok(CrosstermEvent::Resize(width, height)) => Some(TuiEvent::Resize(width, height)),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Terminal event error: {e}");
            Some(TuiEvent::Error)
        }
    }
}

/// The terminal plus a background task pumping [`TuiEvent`]s into a channel.
pub struct Tui {
    terminal: DefaultTerminal,
    restored: bool,
    task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<TuiEvent>,
    event_tx: UnboundedSender<TuiEvent>,
    tick_rate: f64,
    frame_rate: f64,
}

impl Tui {
    pub fn new(tick_rate: f64, frame_rate: f64) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            terminal: ratatui::init(),
            restored: false,
            task: None,
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            tick_rate,
            frame_rate,
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
            log::warn!(
                "Terminal is {}x{}, smaller than {MIN_WIDTH}x{MIN_HEIGHT}",
                size.width,
                size.height
            );
        }
        self.start();
        Ok(())
    }

    fn start(&mut self) {
        let tick_delay = Duration::from_secs_f64(1.0 / self.tick_rate);
        let render_delay = Duration::from_secs_f64(1.0 / self.frame_rate);
        let token = self.cancellation_token.clone();
        let event_tx = self.event_tx.clone();

        self.task = Some(tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticks = tokio::time::interval(tick_delay);
            let mut frames = tokio::time::interval(render_delay);
            let mut next = Some(TuiEvent::Init);
            loop {
                if let Some(event) = next.take() {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                next = tokio::select! {
                    _ = token.cancelled() => break,
                    event = reader.next().fuse() => match event {
                        Some(event) => translate(event),
                        None => break,
                    },
                    _ = ticks.tick() => Some(TuiEvent::Tick),
                    _ = frames.tick() => Some(TuiEvent::Render),
                };
            }
        }));
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.event_rx.recv().await
    }

    /// Stops the event task and gives the terminal back. Safe to call twice.
    pub fn exit(&mut self) -> Result<()> {
        self.cancellation_token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if !self.restored {
            self.restored = true;
            ratatui::restore();
            log::info!("Sherlock exit: {}", chrono::Local::now());
        }
        Ok(())
    }
}

impl Deref for Tui {
    type Target = DefaultTerminal;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            log::error!("Failed to restore the terminal: {e}");
        }
    }
}
