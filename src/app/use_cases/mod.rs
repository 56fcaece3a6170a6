//! Use-Cases der Routing-Session: Policies und Pipelines ohne Host-Zugriff.

pub mod break_track;
pub mod commit;
pub mod drag;
pub mod layer_nav;
pub mod sizing;
pub mod via_policy;
