use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-user notification preferences, server-authoritative.
///
/// Loaded once per sync engine instance; `updatePreferences` round-trips
/// through the server and replaces the local copy with the server's echo,
/// so no partially-patched state is ever observed by a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub sound_enabled: bool,
    pub sound_volume: u8,
    pub notification_types: HashSet<String>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            sound_volume: 70,
            notification_types: ["ticket_reply", "ticket_assigned", "chat_message"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl NotificationPreferences {
    /// Whether a notification of the given kind passes the type filter.
    pub fn allows(&self, kind: &str) -> bool {
        self.notification_types.contains(kind)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sound_volume > 100 {
            anyhow::bail!(
                "sound_volume must be between 0 and 100, got {}",
                self.sound_volume
            );
        }
        Ok(())
    }
}

/// Partial update sent to the server. Absent fields are left unchanged;
/// the server echoes the merged result back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_volume: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_types: Option<HashSet<String>>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.sound_enabled.is_none()
            && self.sound_volume.is_none()
            && self.notification_types.is_none()
    }

    /// Merge semantics the server applies; used by test doubles so the
    /// echo they return matches production behavior.
    pub fn apply_to(&self, prefs: &NotificationPreferences) -> NotificationPreferences {
        NotificationPreferences {
            sound_enabled: self.sound_enabled.unwrap_or(prefs.sound_enabled),
            sound_volume: self.sound_volume.unwrap_or(prefs.sound_volume),
            notification_types: self
                .notification_types
                .clone()
                .unwrap_or_else(|| prefs.notification_types.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.sound_enabled);
        assert_eq!(prefs.sound_volume, 70);
        assert!(prefs.allows("ticket_reply"));
        assert!(!prefs.allows("marketing"));
    }

    #[test]
    fn test_validation() {
        let mut prefs = NotificationPreferences::default();
        assert!(prefs.validate().is_ok());

        prefs.sound_volume = 101;
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_patch_application() {
        let prefs = NotificationPreferences::default();
        let patch = PreferencesPatch {
            sound_enabled: Some(false),
            sound_volume: None,
            notification_types: None,
        };

        let merged = patch.apply_to(&prefs);
        assert!(!merged.sound_enabled);
        assert_eq!(merged.sound_volume, prefs.sound_volume);
        assert_eq!(merged.notification_types, prefs.notification_types);
    }

    #[test]
    fn test_empty_patch() {
        assert!(PreferencesPatch::default().is_empty());
        let patch = PreferencesPatch {
            sound_volume: Some(40),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_parse_partial_json_uses_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"sound_enabled": false}"#).unwrap();
        assert!(!prefs.sound_enabled);
        assert_eq!(prefs.sound_volume, 70);
    }
}
