use serde::Serialize;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }

    pub fn avatar(self) -> &'static str {
        match self {
            Sender::User => "👤",
            Sender::Ai => "🤖",
        }
    }
}

/// One chat bubble. Fields are fixed at construction; a rendered message
/// never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    text: String,
    sender: Sender,
    timestamp: String,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, local_timestamp())
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Ai, local_timestamp())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

pub fn local_timestamp() -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_timestamp(OffsetDateTime::now_utc().to_offset(offset))
}

pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", at.hour(), at.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamps_are_zero_padded_hours_and_minutes() {
        assert_eq!(format_timestamp(datetime!(2024-03-01 09:05:59 UTC)), "09:05");
        assert_eq!(format_timestamp(datetime!(2024-03-01 23:40:00 +02:00)), "23:40");
    }

    #[test]
    fn local_timestamp_has_clock_shape() {
        let stamp = local_timestamp();
        assert_eq!(stamp.len(), 5);
        assert_eq!(stamp.as_bytes()[2], b':');
        assert!(stamp
            .chars()
            .enumerate()
            .all(|(i, c)| i == 2 || c.is_ascii_digit()));
    }

    #[test]
    fn constructors_tag_the_sender() {
        let user = Message::user("Hello");
        assert_eq!(user.sender(), Sender::User);
        assert_eq!(user.text(), "Hello");

        let ai = Message::new("Hi", Sender::Ai, "12:00");
        assert_eq!(ai.sender().as_str(), "ai");
        assert_eq!(ai.sender().avatar(), "🤖");
        assert_eq!(ai.timestamp(), "12:00");
    }

    #[test]
    fn sender_serializes_lowercase() {
        let value = serde_json::to_value(Message::new("x", Sender::User, "08:00")).unwrap();
        assert_eq!(value["sender"], "user");
        assert_eq!(value["timestamp"], "08:00");
    }
}
