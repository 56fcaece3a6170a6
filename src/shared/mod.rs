//! Geteilte Typen für schichtübergreifende Verträge.
//!
//! Enthält die Laufzeit-Optionen, die zwischen `app` und Binary geteilt werden.

pub mod options;

pub use options::RouterOptions;
pub use options::{SNAP_RADIUS_NM, TRANSITION_TRAIL_LEN};
