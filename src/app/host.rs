//! Host-Fähigkeiten, die die Session konsumiert: Edit-Block, Bestätigung, View-Steuerung.

use super::RouterError;
use crate::core::NetCode;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Benachrichtigung an den Host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Fehler aus der Taxonomie (Info-Bar)
    Error(RouterError),
    /// Interaktive Größen haben sich geändert
    SizesChanged,
    /// Geometrie wurde ins Board übernommen
    Committed { added: usize, modified: usize, removed: usize },
    /// Freitext-Hinweis
    Info(String),
}

/// Fähigkeiten des Host-Editors.
///
/// Alle Methoden nehmen `&self`: die Session teilt den Host per `Rc`,
/// damit der Interaktions-Guard ihn im `Drop` erreicht.
pub trait RouterHost {
    /// Sperrt extern ausgelöstes Undo/Redo und Modell-Änderungen.
    fn acquire_edit_block(&self);
    /// Hebt die Sperre wieder auf.
    fn release_edit_block(&self);
    /// Fragt den User nach einer Freigabe (z. B. gesperrte Items).
    fn confirm_override(&self, reason: &str) -> bool;
    fn set_auto_pan(&self, enabled: bool);
    fn capture_cursor(&self, captured: bool);
    /// Hebt ein Netz hervor (`None` = Hervorhebung aus).
    fn highlight_net(&self, net: Option<NetCode>);
    /// Entfernt die Vorschau-Geometrie.
    fn clear_preview(&self);
    fn notify(&self, notification: Notification);
}

/// Hält alle Interaktions-Ressourcen einer Operation.
///
/// Erwerb im Konstruktor, Freigabe im `Drop`: die Freigabe kann auf keinem
/// Terminierungspfad übersprungen werden.
pub struct InteractionGuard {
    host: Rc<dyn RouterHost>,
}

impl InteractionGuard {
    /// Erwirbt Edit-Block, Auto-Pan, Cursor-Capture und Netz-Highlight.
    pub fn acquire(host: Rc<dyn RouterHost>, net: Option<NetCode>) -> Self {
        host.acquire_edit_block();
        host.set_auto_pan(true);
        host.capture_cursor(true);
        if net.is_some() {
            host.highlight_net(net);
        }
        Self { host }
    }
}

impl Drop for InteractionGuard {
    fn drop(&mut self) {
        self.host.clear_preview();
        self.host.highlight_net(None);
        self.host.capture_cursor(false);
        self.host.set_auto_pan(false);
        self.host.release_edit_block();
    }
}

impl std::fmt::Debug for InteractionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InteractionGuard")
    }
}

/// Aufgezeichnetes Host-Ereignis.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    EditBlock(bool),
    AutoPan(bool),
    CursorCapture(bool),
    Highlight(Option<NetCode>),
    PreviewCleared,
    Confirm(String),
    Notified(Notification),
}

/// Host ohne UI, der alle Aufrufe aufzeichnet (Replay-Binary und Tests).
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: RefCell<Vec<HostEvent>>,
    block_depth: Cell<i32>,
    confirm_answer: Cell<bool>,
}

impl RecordingHost {
    /// Erstellt einen Host, der Rückfragen mit `confirm_answer` beantwortet.
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            confirm_answer: Cell::new(confirm_answer),
            ..Self::default()
        }
    }

    /// Antwort auf künftige Rückfragen setzen.
    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Ist der Edit-Block aktuell gehalten?
    pub fn edit_block_held(&self) -> bool {
        self.block_depth.get() > 0
    }

    /// Aktuelle Verschachtelungstiefe des Edit-Blocks.
    pub fn edit_block_depth(&self) -> i32 {
        self.block_depth.get()
    }

    /// Kopie aller aufgezeichneten Ereignisse.
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Alle gemeldeten Notifications in Reihenfolge.
    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HostEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Alle gemeldeten Fehler in Reihenfolge.
    pub fn errors(&self) -> Vec<RouterError> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl RouterHost for RecordingHost {
    fn acquire_edit_block(&self) {
        self.block_depth.set(self.block_depth.get() + 1);
        self.push(HostEvent::EditBlock(true));
    }

    fn release_edit_block(&self) {
        self.block_depth.set(self.block_depth.get() - 1);
        self.push(HostEvent::EditBlock(false));
    }

    fn confirm_override(&self, reason: &str) -> bool {
        self.push(HostEvent::Confirm(reason.to_string()));
        self.confirm_answer.get()
    }

    fn set_auto_pan(&self, enabled: bool) {
        self.push(HostEvent::AutoPan(enabled));
    }

    fn capture_cursor(&self, captured: bool) {
        self.push(HostEvent::CursorCapture(captured));
    }

    fn highlight_net(&self, net: Option<NetCode>) {
        self.push(HostEvent::Highlight(net));
    }

    fn clear_preview(&self) {
        self.push(HostEvent::PreviewCleared);
    }

    fn notify(&self, notification: Notification) {
        log::debug!("Router-Notification: {:?}", notification);
        self.push(HostEvent::Notified(notification));
    }
}
