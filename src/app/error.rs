//! Fehler-Taxonomie der Routing-Session. Alle Fehler werden lokal behandelt.

use crate::core::ViaType;

/// Benutzer-sichtbare Fehler der Routing-Session.
///
/// Keiner dieser Fehler beendet den Host; sie werden als Notification
/// gemeldet und die Session kehrt in ihren letzten stabilen Zustand zurück.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// Start einer Operation abgelehnt (z. B. kein Kupfer-Layer)
    #[error("Eingabe abgelehnt: {0}")]
    InputRejected(String),
    /// Via-Typ in den Board-Einstellungen deaktiviert
    #[error("{} sind in den Design-Regeln deaktiviert", via_type_name(.0))]
    ViaTypeDisabled(ViaType),
    /// Via-Typ passt nicht zu Lagenanzahl/Nachbarschaft
    #[error("{0}")]
    StackupIncompatible(String),
    /// Pfad-Engine konnte nicht starten (Grund wörtlich)
    #[error("{0}")]
    RouterStartFailure(String),
    /// Keine legale Geometrie im aktiven Modus
    #[error("Keine geometrische Lösung im aktiven Modus")]
    NoGeometricSolution,
    /// Commit-Validierung fehlgeschlagen, Board unverändert
    #[error("Commit fehlgeschlagen: {0}")]
    CommitFailed(String),
}

fn via_type_name(via_type: &ViaType) -> &'static str {
    match via_type {
        ViaType::Through => "Durchgangs-Vias",
        ViaType::BlindBuried => "Blind/Buried-Vias",
        ViaType::Microvia => "Microvias",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_failure_is_reported_verbatim() {
        let err = RouterError::RouterStartFailure("Start-Item 3 existiert nicht.".into());
        assert_eq!(err.to_string(), "Start-Item 3 existiert nicht.");
    }

    #[test]
    fn disabled_via_type_names_the_type() {
        let err = RouterError::ViaTypeDisabled(ViaType::Microvia);
        assert!(err.to_string().starts_with("Microvias"));
    }
}
