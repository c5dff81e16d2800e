use serde::{Deserialize, Serialize};

use super::transaction::BusinessStatus;

/// Notification transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Push];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "EMAIL",
            Channel::Sms => "SMS",
            Channel::Push => "PUSH",
        }
    }

    /// Lowercase label used for metrics and provider names
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
        }
    }

    /// Recipient field this channel cannot deliver without
    pub fn required_field(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "phone",
            Channel::Push => "deviceToken",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the delivery channel for a transaction's business status.
///
/// Exhaustive over `BusinessStatus`: adding a status is a compile error here.
pub fn select_channel(status: BusinessStatus) -> Channel {
    match status {
        BusinessStatus::Completed => Channel::Email,
        BusinessStatus::Pending => Channel::Push,
        BusinessStatus::Rejected => Channel::Sms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_channel() {
        assert_eq!(select_channel(BusinessStatus::Completed), Channel::Email);
        assert_eq!(select_channel(BusinessStatus::Pending), Channel::Push);
        assert_eq!(select_channel(BusinessStatus::Rejected), Channel::Sms);
    }

    #[test]
    fn test_select_channel_is_injective() {
        let statuses = [
            BusinessStatus::Completed,
            BusinessStatus::Pending,
            BusinessStatus::Rejected,
        ];
        let channels: std::collections::HashSet<Channel> =
            statuses.iter().map(|s| select_channel(*s)).collect();
        assert_eq!(channels.len(), Channel::ALL.len());
    }

    #[test]
    fn test_channel_serde() {
        assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"SMS\"");
        assert_eq!(Channel::Push.label(), "push");
    }
}
