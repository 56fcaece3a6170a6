//! Feature-Handler für RouterCommand-Verarbeitung.
//!
//! Jeder Handler gruppiert die Command-Ausführung eines Feature-Bereichs.
//! Der Controller dispatcht an die passende Handler-Funktion.

pub mod dragging;
pub mod editing;
pub mod layers;
pub mod routing;
pub mod sizes;
pub mod world;
