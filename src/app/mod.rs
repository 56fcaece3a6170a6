//! Application-Layer: Controller, State, Session, Events und Use-Cases.

pub mod bindings;
pub mod command_log;
pub mod controller;
pub mod error;
pub mod events;
pub mod handlers;
pub mod history;
pub mod host;
mod intent_mapping;
/// Zustandsautomat der interaktiven Routing-Session
pub mod session;
pub mod state;
pub mod use_cases;

pub use bindings::{ActionRegistry, KeyChord, RouterAction};
pub use command_log::CommandLog;
pub use controller::{RouterController, RouterServices};
pub use error::RouterError;
pub use events::{RouterCommand, RouterIntent};
pub use host::{HostEvent, InteractionGuard, Notification, RecordingHost, RouterHost};
pub use session::{RoutingSession, SessionState};
pub use state::RouterState;
