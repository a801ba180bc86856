//! Prints controller events for the terminal.

use client_core::DirectoryEvent;
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

pub struct Reporter {
    events: Receiver<DirectoryEvent>,
    failed: bool,
}

impl Reporter {
    pub fn new(events: Receiver<DirectoryEvent>) -> Self {
        Self {
            events,
            failed: false,
        }
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Writes every pending notice and error to stderr.
    pub fn flush(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.report(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    eprintln!("({skipped} messages dropped)");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn report(&mut self, event: DirectoryEvent) {
        match event {
            DirectoryEvent::Notice(text) => eprintln!("{text}"),
            DirectoryEvent::ImportFinished(summary) => {
                for error in &summary.errors {
                    eprintln!("  - {error}");
                }
            }
            DirectoryEvent::Error(error) => {
                self.failed = true;
                eprintln!("error: {}", error.message());
            }
            DirectoryEvent::CollectionReplaced { .. }
            | DirectoryEvent::ModalOpened { .. }
            | DirectoryEvent::ModalModeChanged(_)
            | DirectoryEvent::ModalClosed
            | DirectoryEvent::ExportSaved { .. } => {}
        }
    }
}
