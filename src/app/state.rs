use super::bindings::ActionRegistry;
use super::history::EditHistory;
use super::session::RoutingSession;
use super::CommandLog;
use crate::core::Board;
use crate::shared::RouterOptions;
use std::sync::Arc;

/// Hauptzustand des Routing-Werkzeugs
pub struct RouterState {
    /// Aktuelles Board (Arc für O(1)-Snapshots)
    pub board: Arc<Board>,
    /// Interaktive Session (Zustandsautomat)
    pub session: RoutingSession,
    /// Laufzeit-Optionen
    pub options: RouterOptions,
    /// Tastenbelegung Akkord → Aktion
    pub bindings: ActionRegistry,
    /// Verlauf ausgeführter Commands
    pub command_log: CommandLog,
    /// Undo/Redo-History (Snapshot-basiert)
    pub history: EditHistory,
    cancel_requested: bool,
}

impl RouterState {
    /// Erstellt einen Zustand mit leerem Board und Standard-Optionen.
    pub fn new() -> Self {
        Self::with_board(Board::default(), RouterOptions::default())
    }

    /// Erstellt einen Zustand für ein geladenes Board.
    pub fn with_board(board: Board, options: RouterOptions) -> Self {
        let bindings = ActionRegistry::from_bindings(&options.key_bindings);
        Self {
            board: Arc::new(board),
            session: RoutingSession::new(&options),
            bindings,
            options,
            command_log: CommandLog::new(),
            history: EditHistory::new_with_capacity(200),
            cancel_requested: false,
        }
    }

    /// Fordert einen kooperativen Abbruch an (geprüft vor dem nächsten Intent).
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    /// Liest und löscht die Abbruch-Anforderung.
    pub fn take_cancel_request(&mut self) -> bool {
        std::mem::take(&mut self.cancel_requested)
    }

    /// Anzahl der Board-Items (für Anzeige und Tests)
    pub fn item_count(&self) -> usize {
        self.board.item_count()
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new()
    }
}
