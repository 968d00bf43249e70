//! Terminal event abstraction.
//!
//! A background task polls crossterm and forwards the events the reader
//! cares about over a channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

impl AppEvent {
    /// Translate a raw crossterm event.  Key releases/repeats on terminals
    /// that report them and non-wheel mouse events are dropped.
    fn from_crossterm(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(k) if k.kind == KeyEventKind::Press => Some(Self::Key(k)),
            CtEvent::Mouse(m)
                if matches!(m.kind, MouseEventKind::ScrollUp | MouseEventKind::ScrollDown) =>
            {
                Some(Self::Mouse(m))
            }
            CtEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Spawns a background task that polls the terminal for events and sends them
/// through the returned channel.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let has_event = event::poll(tick_rate).unwrap_or(false);
        let app_event = if has_event {
            match event::read() {
                Ok(ev) => match AppEvent::from_crossterm(ev) {
                    Some(app_event) => app_event,
                    None => continue,
                },
                Err(err) => {
                    tracing::warn!(%err, "terminal read failed");
                    continue;
                }
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}
