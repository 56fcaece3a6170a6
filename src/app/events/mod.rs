//! RouterIntent- und RouterCommand-Enums für den Intent/Command-Datenfluss.

mod command;
mod intent;

pub use command::RouterCommand;
pub use intent::RouterIntent;
