use crate::undo::UndoSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_UNIT: &str = "pc";

/// Serde adapter for ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{s}': {e}")))
    }
}

/// Fields a consumer supplies when adding to the basket; quantity and unit come separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: String,
    pub name: String,
    pub image: String,
    pub urgent: Option<bool>,
}

impl ItemDraft {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        ItemDraft {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            urgent: None,
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgent = Some(true);
        self
    }

    pub fn into_item(self, quantity: f64, unit: impl Into<String>) -> Item {
        Item {
            id: self.id,
            name: self.name,
            image: self.image,
            quantity,
            unit: unit.into(),
            urgent: self.urgent,
            purchased: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl Item {
    pub fn is_urgent(&self) -> bool {
        self.urgent.unwrap_or(false)
    }

    pub fn is_purchased(&self) -> bool {
        self.purchased.unwrap_or(false)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} {}", self.name, self.quantity, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub enabled: bool,
}

impl Reminder {
    pub fn at(date: DateTime<Utc>) -> Self {
        Reminder {
            date,
            enabled: true,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> ReminderStatus {
        if self.date < now {
            ReminderStatus::Due
        } else {
            ReminderStatus::Upcoming
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStatus {
    Upcoming,
    Due,
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderStatus::Upcoming => write!(f, "Reminder"),
            ReminderStatus::Due => write!(f, "Due"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
}

impl List {
    pub fn purchased_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_purchased()).count()
    }

    /// "k of n items completed"
    pub fn progress(&self) -> String {
        format!(
            "{} of {} items completed",
            self.purchased_count(),
            self.items.len()
        )
    }
}

/// A name/quantity pair used when composing a list up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub quantity: f64,
}

impl ListEntry {
    pub fn new(name: impl Into<String>, quantity: f64) -> Self {
        ListEntry {
            name: name.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingState {
    pub basket: Vec<Item>,
    pub hidden_items: BTreeSet<String>,
    pub current_list_name: Option<String>,
    pub last_archived_list: UndoSlot<List>,
    pub past_lists: Vec<List>,
}

impl ShoppingState {
    /// Ids of urgent basket items. Derived from each item's own flag.
    pub fn urgent_items(&self) -> BTreeSet<String> {
        self.basket
            .iter()
            .filter(|i| i.is_urgent())
            .map(|i| i.id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    pub has_completed_onboarding: bool,
}
