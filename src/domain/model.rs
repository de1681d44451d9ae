use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NO_MATCHES_MESSAGE: &str = "No pet sitters found matching the criteria.";

/// One pet-care provider profile as stored in the dataset.
///
/// Only the attributes the search engine inspects are typed; every other
/// profile field (name, bio, certifications, ...) rides along in `extra` so
/// lookups return the record exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitterRecord {
    pub id: i64,
    pub location: String,
    #[serde(default)]
    pub type_of_pets: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub days_available: Vec<String>,
    pub hourly_rate: f64,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Optional search constraints. `None` means the constraint is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub pet_type: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub day_needed: Option<String>,
    #[serde(default)]
    pub max_rate: Option<f64>,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.pet_type.is_none()
            && self.service.is_none()
            && self.day_needed.is_none()
            && self.max_rate.is_none()
            && self.specialization.is_none()
    }

    /// Blank strings arrive from form posts and tool calls; they count as unset.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            location: keep(self.location),
            pet_type: keep(self.pet_type),
            service: keep(self.service),
            day_needed: keep(self.day_needed),
            max_rate: self.max_rate,
            specialization: keep(self.specialization),
        }
    }
}

/// Result of a search: a populated list, or the "nothing matched" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Matches(Vec<SitterRecord>),
    NoMatches { message: String },
}

impl SearchOutcome {
    pub fn no_matches() -> Self {
        SearchOutcome::NoMatches {
            message: NO_MATCHES_MESSAGE.to_string(),
        }
    }

    pub fn matches(&self) -> &[SitterRecord] {
        match self {
            SearchOutcome::Matches(records) => records,
            SearchOutcome::NoMatches { .. } => &[],
        }
    }

    pub fn is_no_matches(&self) -> bool {
        matches!(self, SearchOutcome::NoMatches { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isTyping", default, skip_serializing_if = "Option::is_none")]
    pub is_typing: Option<bool>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            is_typing: None,
        }
    }

    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn from_agent(content: impl Into<String>) -> Self {
        Self::new(Sender::Agent, content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub conversation_id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationHistory {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sitter_record_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "id": 7,
            "name": "Jordan Lee",
            "location": "Seattle",
            "typeOfPets": ["dogs"],
            "services": ["dog_walking"],
            "daysAvailable": ["Monday"],
            "hourlyRate": 25.0,
            "specializations": [],
            "rating": 4.8,
            "reviewCount": 31,
            "insured": true
        });

        let record: SitterRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.type_of_pets, vec!["dogs"]);
        assert_eq!(record.extra.get("name").unwrap(), "Jordan Lee");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn normalized_drops_blank_strings_but_keeps_zero_rate() {
        let criteria = SearchCriteria {
            location: Some(String::new()),
            max_rate: Some(0.0),
            ..Default::default()
        }
        .normalized();

        assert_eq!(criteria.location, None);
        assert_eq!(criteria.max_rate, Some(0.0));
    }

    #[test]
    fn no_matches_serializes_as_message_object() {
        let json = serde_json::to_value(SearchOutcome::no_matches()).unwrap();
        assert_eq!(json, serde_json::json!({ "message": NO_MATCHES_MESSAGE }));
    }

    #[test]
    fn chat_message_uses_lowercase_sender() {
        let json = serde_json::to_value(ChatMessage::from_agent("hi")).unwrap();
        assert_eq!(json["sender"], "agent");
        assert!(json.get("isTyping").is_none());
    }
}
