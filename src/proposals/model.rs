use crate::error::{self, InputError};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Storage format of `created_date`.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Current local wall-clock time at second precision (UTC if the offset is unknown).
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let dt = PrimitiveDateTime::new(now.date(), now.time());
    dt.replace_nanosecond(0).unwrap_or(dt)
}

pub fn serialize_timestamp<S: Serializer>(dt: &PrimitiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    let text = dt.format(TIMESTAMP_FORMAT).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Functionality,
    Performance,
    Security,
    Integration,
    UiUx,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Functionality,
        Category::Performance,
        Category::Security,
        Category::Integration,
        Category::UiUx,
        Category::Other,
    ];

    /// Stable key stored in the database.
    pub fn key(self) -> &'static str {
        match self {
            Category::Functionality => "functionality",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::Integration => "integration",
            Category::UiUx => "ui_ux",
            Category::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Functionality => "Functionality extension",
            Category::Performance => "Performance improvement",
            Category::Security => "Security",
            Category::Integration => "Integration",
            Category::UiUx => "Interface improvement",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    InProgress,
    Approved,
    Rejected,
    Completed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::New,
        Status::InProgress,
        Status::Approved,
        Status::Rejected,
        Status::Completed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::InProgress => "in_progress",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
            Status::Completed => "completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::New => "New",
            Status::InProgress => "In progress",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 1 is the most urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    High = 1,
    Medium = 2,
    #[default]
    Low = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: i64) -> Result<Self, InputError> {
        match level {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(InputError::OutOfRange {
                field: "priority",
                range: "1..=3",
                value: other as f64,
            }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.level()
    }
}

impl TryFrom<u8> for Priority {
    type Error = InputError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Priority::from_level(level.into())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a user can enter or edit on a proposal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProposalFields {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub author: String,
    pub department: String,
    pub priority: Priority,
    pub expected_benefit: String,
    pub estimated_cost: f64,
    pub implementation_time: String,
    pub risks: String,
}

impl ProposalFields {
    /// Trim text fields and enforce the required ones.
    pub fn validated(self) -> Result<Self, InputError> {
        let estimated_cost = error::finite("estimated cost", self.estimated_cost)?;
        if estimated_cost < 0.0 {
            return Err(InputError::OutOfRange {
                field: "estimated cost",
                range: "[0, ∞)",
                value: estimated_cost,
            });
        }
        Ok(Self {
            title: error::required("title", &self.title)?,
            description: error::required("description", &self.description)?,
            author: error::required("author", &self.author)?,
            department: error::required("department", &self.department)?,
            expected_benefit: self.expected_benefit.trim().to_string(),
            implementation_time: self.implementation_time.trim().to_string(),
            risks: self.risks.trim().to_string(),
            estimated_cost,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    pub id: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_date: PrimitiveDateTime,
    #[serde(flatten)]
    pub fields: ProposalFields,
}

/// Partial edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub author: Option<String>,
    pub department: Option<String>,
    pub priority: Option<Priority>,
    pub expected_benefit: Option<String>,
    pub estimated_cost: Option<f64>,
    pub implementation_time: Option<String>,
    pub risks: Option<String>,
}

impl ProposalPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.author.is_none()
            && self.department.is_none()
            && self.priority.is_none()
            && self.expected_benefit.is_none()
            && self.estimated_cost.is_none()
            && self.implementation_time.is_none()
            && self.risks.is_none()
    }

    pub fn apply(self, mut f: ProposalFields) -> ProposalFields {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { f.$field = v; })*
            };
        }
        take!(
            title,
            description,
            category,
            status,
            author,
            department,
            priority,
            expected_benefit,
            estimated_cost,
            implementation_time,
            risks
        );
        f
    }
}
