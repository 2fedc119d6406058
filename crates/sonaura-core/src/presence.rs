//! Edge detection over face-detection results

use serde::{Deserialize, Serialize};

/// Outcome of feeding one detection sample to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceEvent {
    /// At least one face after a sample with none
    Appeared,
    /// No faces after a sample with at least one
    Disappeared,
    /// Same state as the previous sample
    None,
}

/// Converts per-frame detection counts into appear/disappear edges.
///
/// Repeated detections while already present emit nothing.
#[derive(Debug, Clone, Default)]
pub struct PresenceBridge {
    last_state: bool,
}

impl PresenceBridge {
    /// Start in the absent state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the number of detections in the latest frame
    pub fn update(&mut self, detection_count: u32) -> PresenceEvent {
        let present = detection_count > 0;
        let event = match (self.last_state, present) {
            (false, true) => PresenceEvent::Appeared,
            (true, false) => PresenceEvent::Disappeared,
            _ => PresenceEvent::None,
        };
        self.last_state = present;
        event
    }

    /// Whether the last sample had a detection
    pub fn is_present(&self) -> bool {
        self.last_state
    }
}
