use serde::{Deserialize, Serialize};

/// Generate a ULID-like ID using timestamp + random bytes.
/// Uses only std — no external ULID crate needed.
pub fn new_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;

    let random: u64 = {
        // Simple random from /dev/urandom or fallback
        let mut buf = [0u8; 8];
        if let Ok(mut f) = std::fs::File::open("/dev/urandom") {
            use std::io::Read;
            let _ = f.read_exact(&mut buf);
        } else {
            // Fallback: use timestamp nanos as entropy
            buf = ts.to_le_bytes();
        }
        u64::from_le_bytes(buf)
    };

    format!("{ts:012x}{random:016x}")
}

/// Unix epoch timestamp in seconds.
pub fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Placeholder chat id written by the provisioning flow before a real user
/// registers. Profiles carrying it must never be messaged.
pub const SENTINEL_CHAT_ID: &str = "temp";

/// The four canonical reminder slots, used when a profile has none stored.
pub const DEFAULT_REMINDER_SLOTS: [&str; 4] = ["06:00", "12:00", "18:00", "21:00"];

/// A registered user, keyed by Telegram chat id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub chat_id: String,
    /// Reminder times-of-day as "HH:00" strings. None means the defaults apply.
    pub reminder_times: Option<Vec<String>>,
}

impl UserProfile {
    /// True if this profile may receive proactive messages.
    pub fn is_notifiable(&self) -> bool {
        !self.chat_id.is_empty() && self.chat_id != SENTINEL_CHAT_ID
    }

    /// The effective reminder slots for this user.
    pub fn reminder_slots(&self) -> Vec<String> {
        match &self.reminder_times {
            Some(times) => times.clone(),
            None => DEFAULT_REMINDER_SLOTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A stored goal record. Pending plans await commitment; approved plans are
/// active and tracked. Both tables share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub chat_id: String,
    pub goal: String,
    pub status: String,
    pub created_at: i64,
}

impl Plan {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// A content snippet returned by the vector-search collaborator. Ephemeral —
/// never persisted by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub content: String,
    pub similarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_profile_is_not_notifiable() {
        let profile = UserProfile {
            chat_id: SENTINEL_CHAT_ID.to_string(),
            reminder_times: None,
        };
        assert!(!profile.is_notifiable());
    }

    #[test]
    fn empty_chat_id_is_not_notifiable() {
        let profile = UserProfile {
            chat_id: String::new(),
            reminder_times: None,
        };
        assert!(!profile.is_notifiable());
    }

    #[test]
    fn regular_profile_is_notifiable() {
        let profile = UserProfile {
            chat_id: "12345".to_string(),
            reminder_times: None,
        };
        assert!(profile.is_notifiable());
    }

    #[test]
    fn missing_reminder_times_fall_back_to_defaults() {
        let profile = UserProfile {
            chat_id: "12345".to_string(),
            reminder_times: None,
        };
        assert_eq!(profile.reminder_slots(), vec!["06:00", "12:00", "18:00", "21:00"]);
    }

    #[test]
    fn custom_reminder_times_are_kept_as_is() {
        let profile = UserProfile {
            chat_id: "12345".to_string(),
            reminder_times: Some(vec!["09:00".to_string()]),
        };
        assert_eq!(profile.reminder_slots(), vec!["09:00"]);
    }
}
