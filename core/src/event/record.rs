use crate::prelude::{ClassificationResult, Confidence};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction vertex inside the detector volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// One synthetic detector event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Nuclear recoil energy in keV.
    pub recoil_energy: f64,
    pub scintillation_yield: f64,
    pub ionization_charge: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_shape: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl EventRecord {
    pub fn new(recoil_energy: f64, scintillation_yield: f64, ionization_charge: f64) -> Self {
        Self {
            recoil_energy,
            scintillation_yield,
            ionization_charge,
            pulse_shape: None,
            position: None,
        }
    }

    pub fn with_pulse_shape(mut self, pulse_shape: f64) -> Self {
        self.pulse_shape = Some(pulse_shape);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// A batch row: the originating event merged with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    /// 1-based position in the batch.
    pub id: usize,
    pub recoil_energy: f64,
    pub scintillation_yield: f64,
    pub ionization_charge: f64,
    pub pulse_shape: Option<f64>,
    /// Rendered as `"(x, y, z)"`.
    pub position: Option<String>,
    pub classification: Option<String>,
    pub confidence: Option<Confidence>,
    pub reasoning: Option<String>,
}

impl ClassifiedEvent {
    pub fn new(id: usize, event: &EventRecord, result: ClassificationResult) -> Self {
        Self {
            id,
            recoil_energy: event.recoil_energy,
            scintillation_yield: event.scintillation_yield,
            ionization_charge: event.ionization_charge,
            pulse_shape: event.pulse_shape,
            position: event.position.map(|p| p.to_string()),
            classification: result.classification,
            confidence: result.confidence,
            reasoning: result.reasoning,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.classification.as_deref() == Some(crate::prelude::ERROR_CLASSIFICATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_renders_as_tuple() {
        assert_eq!(Position::new(1.5, -4.25, 0.0).to_string(), "(1.50, -4.25, 0.00)");
    }

    #[test]
    fn classified_event_merges_record_and_result() {
        let event = EventRecord::new(12.5, 80.0, 120.0)
            .with_pulse_shape(0.42)
            .with_position(Position::new(1.0, 2.0, 3.0));
        let result = ClassificationResult {
            classification: Some("WIMP".into()),
            confidence: Some(Confidence::Percent(90)),
            reasoning: Some("nuclear recoil".into()),
        };

        let row = ClassifiedEvent::new(3, &event, result);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["position"], "(1.00, 2.00, 3.00)");
        assert_eq!(json["pulse_shape"], 0.42);
        assert_eq!(json["confidence"], 90);
        assert!(!row.is_failure());
    }

    #[test]
    fn missing_optional_fields_serialize_as_null() {
        let row = ClassifiedEvent::new(1, &EventRecord::new(1.0, 10.0, 50.0), Default::default());
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["pulse_shape"].is_null());
        assert!(json["position"].is_null());
        assert!(json["classification"].is_null());
    }
}
