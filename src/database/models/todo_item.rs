use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalize a raw enum value: lowercase, with spaces, underscores and hyphens removed.
/// "In Progress", "in_progress" and "InProgress" all become "inprogress".
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StatusType {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl StatusType {
    pub const ALL: [StatusType; 3] = [StatusType::NotStarted, StatusType::InProgress, StatusType::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusType::NotStarted => "NotStarted",
            StatusType::InProgress => "InProgress",
            StatusType::Completed => "Completed",
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Accepts a variant name (case and separators ignored) or its ordinal.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<u8>() {
            return Self::ALL.into_iter().find(|s| s.ordinal() == n);
        }
        let wanted = normalize(raw);
        Self::ALL.into_iter().find(|s| normalize(s.as_str()) == wanted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum PriorityType {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityType {
    pub const ALL: [PriorityType; 4] = [
        PriorityType::Low,
        PriorityType::Medium,
        PriorityType::High,
        PriorityType::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityType::Low => "Low",
            PriorityType::Medium => "Medium",
            PriorityType::High => "High",
            PriorityType::Critical => "Critical",
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Accepts a variant name (case and separators ignored) or its ordinal.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<u8>() {
            return Self::ALL.into_iter().find(|p| p.ordinal() == n);
        }
        let wanted = normalize(raw);
        Self::ALL.into_iter().find(|p| normalize(p.as_str()) == wanted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
        }
    }

    pub fn from_raw(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// An entry on a list. Items only exist inside their list and are removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: StatusType,
    pub priority: PriorityType,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
}

impl TodoItem {
    pub fn new(list_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id,
            name: name.into(),
            description: String::new(),
            due_date: None,
            status: StatusType::default(),
            priority: PriorityType::default(),
            media_url: None,
            media_type: None,
        }
    }
}
