use serde::{Deserialize, Serialize};

/// Connection quality derived from a scheduler's consecutive-failure
/// count, consumed by UI badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Degraded,
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Degraded => "degraded",
            ConnectionStatus::Offline => "offline",
        }
    }
}

/// Monotonic in failures, no hysteresis: the projection flips back and
/// forth as the count crosses the thresholds.
pub fn project(consecutive_failures: u32) -> ConnectionStatus {
    match consecutive_failures {
        0 => ConnectionStatus::Connected,
        1..=2 => ConnectionStatus::Degraded,
        _ => ConnectionStatus::Offline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_thresholds() {
        assert_eq!(project(0), ConnectionStatus::Connected);
        assert_eq!(project(1), ConnectionStatus::Degraded);
        assert_eq!(project(2), ConnectionStatus::Degraded);
        assert_eq!(project(3), ConnectionStatus::Offline);
        assert_eq!(project(100), ConnectionStatus::Offline);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionStatus::Connected.label(), "connected");
        assert_eq!(ConnectionStatus::Degraded.label(), "degraded");
        assert_eq!(ConnectionStatus::Offline.label(), "offline");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ConnectionStatus::Degraded).unwrap();
        assert_eq!(json, r#""degraded""#);
    }
}
