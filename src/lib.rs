//! PCB Interactive Router Library.
//! Routing-Session als Library exportiert für Host-Editoren, Tests und das Replay-Binary.

pub mod app;
pub mod core;
pub mod engine;
pub mod shared;

pub use app::{
    RecordingHost, RouterCommand, RouterController, RouterError, RouterHost, RouterIntent,
    RouterServices, RouterState, SessionState,
};
pub use core::{
    Board, BoardFile, DesignSettings, Item, ItemDraft, ItemId, ItemKind, LayerId, LayerPair,
    SizesSettings, Stackup, ViaType,
};
pub use engine::{DirectRouter, PathEngine, RuleEngine, RuleSet};
pub use shared::RouterOptions;
