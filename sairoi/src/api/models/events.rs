//! Wire enumerations and payloads for logging AI-assist events.

use super::{WireCode, is_checked, non_blank};
use crate::api::models::categories::CategoryResponse;
use crate::db::models::events::AiEventDBResponse;
use crate::errors::Error;
use crate::types::{CategoryId, EventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// AI assistant used for the interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Tool {
    ChatGpt,
    Claude,
    Copilot,
    Gemini,
    Other,
}

impl WireCode for Tool {
    const ALL: &'static [Self] = &[Tool::ChatGpt, Tool::Claude, Tool::Copilot, Tool::Gemini, Tool::Other];

    fn code(self) -> &'static str {
        match self {
            Tool::ChatGpt => "CHATGPT",
            Tool::Claude => "CLAUDE",
            Tool::Copilot => "COPILOT",
            Tool::Gemini => "GEMINI",
            Tool::Other => "OTHER",
        }
    }
}

/// Observed time saved, recorded as a range rather than a number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum TimeSavedBucket {
    #[serde(rename = "M1_2")]
    M1To2,
    #[serde(rename = "M3_5")]
    M3To5,
    #[serde(rename = "M6_10")]
    M6To10,
    #[serde(rename = "M11_20")]
    M11To20,
    #[serde(rename = "M20_PLUS")]
    M20Plus,
}

impl TimeSavedBucket {
    /// Minutes credited for this bucket: always the low end of the range.
    pub const fn conservative_minutes(self) -> u64 {
        match self {
            TimeSavedBucket::M1To2 => 1,
            TimeSavedBucket::M3To5 => 3,
            TimeSavedBucket::M6To10 => 6,
            TimeSavedBucket::M11To20 => 11,
            TimeSavedBucket::M20Plus => 20,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TimeSavedBucket::M1To2 => "1-2 min",
            TimeSavedBucket::M3To5 => "3-5 min",
            TimeSavedBucket::M6To10 => "6-10 min",
            TimeSavedBucket::M11To20 => "11-20 min",
            TimeSavedBucket::M20Plus => "20+ min",
        }
    }
}

impl WireCode for TimeSavedBucket {
    const ALL: &'static [Self] = &[
        TimeSavedBucket::M1To2,
        TimeSavedBucket::M3To5,
        TimeSavedBucket::M6To10,
        TimeSavedBucket::M11To20,
        TimeSavedBucket::M20Plus,
    ];

    fn code(self) -> &'static str {
        match self {
            TimeSavedBucket::M1To2 => "M1_2",
            TimeSavedBucket::M3To5 => "M3_5",
            TimeSavedBucket::M6To10 => "M6_10",
            TimeSavedBucket::M11To20 => "M11_20",
            TimeSavedBucket::M20Plus => "M20_PLUS",
        }
    }
}

/// How much the AI output had to be corrected before use.
///
/// Variants share names with `Option`'s; always refer to them qualified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReworkLevel {
    None,
    Some,
    Heavy,
}

impl WireCode for ReworkLevel {
    const ALL: &'static [Self] = &[ReworkLevel::None, ReworkLevel::Some, ReworkLevel::Heavy];

    fn code(self) -> &'static str {
        match self {
            ReworkLevel::None => "NONE",
            ReworkLevel::Some => "SOME",
            ReworkLevel::Heavy => "HEAVY",
        }
    }
}

/// Where the assisted work ended up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    SentToCustomer,
    InternalOnly,
    Escalated,
}

impl WireCode for Outcome {
    const ALL: &'static [Self] = &[Outcome::SentToCustomer, Outcome::InternalOnly, Outcome::Escalated];

    fn code(self) -> &'static str {
        match self {
            Outcome::SentToCustomer => "SENT_TO_CUSTOMER",
            Outcome::InternalOnly => "INTERNAL_ONLY",
            Outcome::Escalated => "ESCALATED",
        }
    }
}

/// Event logging form, as submitted by the browser.
///
/// Every field arrives as optional text so that missing or malformed values can be reported as
/// a validation failure naming the field, rather than a generic extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventCreateForm {
    pub tool: Option<String>,
    pub category_id: Option<String>,
    pub time_saved: Option<String>,
    pub rework: Option<String>,
    pub outcome: Option<String>,
    pub risk_personal: Option<String>,
    pub risk_payment: Option<String>,
    pub risk_internal: Option<String>,
    pub note: Option<String>,
}

/// A fully validated event submission.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSubmission {
    pub tool: Tool,
    pub category_id: CategoryId,
    pub time_saved: TimeSavedBucket,
    pub rework: ReworkLevel,
    pub outcome: Outcome,
    pub risk_personal_data: bool,
    pub risk_payment_data: bool,
    pub risk_internal_info: bool,
    pub note: Option<String>,
}

fn required<T: WireCode>(field: &str, value: Option<&str>) -> Result<T, Error> {
    let raw = non_blank(value).ok_or_else(|| Error::BadRequest {
        message: format!("Missing required field: {field}"),
    })?;
    T::from_code(raw).ok_or_else(|| Error::BadRequest {
        message: format!("Invalid value for {field}: {raw}"),
    })
}

impl EventCreateForm {
    pub fn validate(&self) -> Result<EventSubmission, Error> {
        let tool = required::<Tool>("tool", self.tool.as_deref())?;
        let category_raw = non_blank(self.category_id.as_deref()).ok_or_else(|| Error::BadRequest {
            message: "Missing required field: categoryId".to_string(),
        })?;
        let category_id = Uuid::parse_str(category_raw).map_err(|_| Error::BadRequest {
            message: format!("Invalid value for categoryId: {category_raw}"),
        })?;
        let time_saved = required::<TimeSavedBucket>("timeSaved", self.time_saved.as_deref())?;
        let rework = required::<ReworkLevel>("rework", self.rework.as_deref())?;
        let outcome = required::<Outcome>("outcome", self.outcome.as_deref())?;

        Ok(EventSubmission {
            tool,
            category_id,
            time_saved,
            rework,
            outcome,
            risk_personal_data: is_checked(self.risk_personal.as_deref()),
            risk_payment_data: is_checked(self.risk_payment.as_deref()),
            risk_internal_info: is_checked(self.risk_internal.as_deref()),
            note: non_blank(self.note.as_deref()).map(str::to_string),
        })
    }
}

/// One selectable tool with its current approval state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolOption {
    pub tool: Tool,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BucketOption {
    pub code: TimeSavedBucket,
    pub label: String,
    /// Minutes credited when this bucket is chosen
    pub minutes: u64,
}

impl From<TimeSavedBucket> for BucketOption {
    fn from(bucket: TimeSavedBucket) -> Self {
        Self {
            code: bucket,
            label: bucket.label().to_string(),
            minutes: bucket.conservative_minutes(),
        }
    }
}

/// Everything the event logging page needs to render its form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogFormResponse {
    /// Active categories, by name
    pub categories: Vec<CategoryResponse>,
    pub tools: Vec<ToolOption>,
    pub time_saved_options: Vec<BucketOption>,
    pub rework_options: Vec<ReworkLevel>,
    pub outcome_options: Vec<Outcome>,
}

/// An event as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventId,
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub tool: Tool,
    pub category: String,
    /// Stored bucket code, e.g. `M3_5`
    pub time_saved: String,
    /// Human label for the bucket; the raw code when it is not a current bucket
    pub time_saved_label: String,
    pub rework: ReworkLevel,
    pub outcome: Outcome,
    pub tool_approved: bool,
}

impl From<&AiEventDBResponse> for EventResponse {
    fn from(db: &AiEventDBResponse) -> Self {
        Self {
            id: db.id,
            created_at: db.created_at,
            email: db.user_email.clone(),
            tool: db.tool,
            category: db.category_name.clone(),
            time_saved_label: TimeSavedBucket::from_code(&db.time_saved)
                .map(|b| b.label().to_string())
                .unwrap_or_else(|| db.time_saved.clone()),
            time_saved: db.time_saved.clone(),
            rework: db.rework,
            outcome: db.outcome,
            tool_approved: db.tool_approved,
        }
    }
}
