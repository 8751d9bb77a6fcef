//! Submission types for lsc-inbox.
//!
//! A [`Submission`] is one support request or staff application sent through
//! the site's forms. The stored JSON shape is the one the site has always
//! written:
//!
//! ```json
//! {
//!   "id": "1735689600000-k3j9x0a1b",
//!   "type": "support",
//!   "data": { "name": "...", "contactMethod": "...", "message": "..." },
//!   "timestamp": "2025-01-01T00:00:00.000Z",
//!   "read": false
//! }
//! ```
//!
//! Decoding is strict about the envelope (id, known `type`, object `data`,
//! RFC 3339 `timestamp`) and lenient about payload fields, which default to
//! empty strings when missing.

use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Characters used for the random id suffix.
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random id suffix.
const ID_SUFFIX_LEN: usize = 9;

/// Which form produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionKind {
    /// The support/contact form.
    #[serde(rename = "support")]
    Support,
    /// The staff application form.
    #[serde(rename = "staff-application")]
    StaffApplication,
}

impl SubmissionKind {
    /// The stored `type` tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::StaffApplication => "staff-application",
        }
    }

    /// Human-readable label for listings.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Support => "Support",
            Self::StaffApplication => "Staff application",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of the support/contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    /// Name the requester gave.
    pub name: String,
    /// How to reach them (Discord handle, e-mail, ...).
    pub contact_method: String,
    /// The request itself.
    pub message: String,
}

/// Fields of the staff application form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffApplicationForm {
    /// Applicant's full name.
    pub full_name: String,
    /// Age, as typed.
    pub age: String,
    /// Timezone, as typed.
    pub timezone: String,
    /// Discord username.
    pub discord_username: String,
    /// Roblox username.
    pub roblox_username: String,
    /// Position applied for.
    pub position: String,
    /// Hours per week the applicant can commit.
    pub weekly_hours: String,
    /// Previous moderation or staff experience.
    pub experience: String,
    /// Why they want the position.
    pub motivation: String,
    /// Answer to the scenario question.
    pub scenario: String,
    /// Anything else.
    pub additional_info: String,
}

/// The form payload of a submission, keyed by [`SubmissionKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// A support request.
    Support(ContactForm),
    /// A staff application.
    StaffApplication(StaffApplicationForm),
}

impl Payload {
    /// The kind tag for this payload.
    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Support(_) => SubmissionKind::Support,
            Self::StaffApplication(_) => SubmissionKind::StaffApplication,
        }
    }

    /// Fields the dashboard search looks at.
    #[must_use]
    pub fn search_fields(&self) -> Vec<&str> {
        match self {
            Self::Support(form) => vec![
                form.name.as_str(),
                form.message.as_str(),
                form.contact_method.as_str(),
            ],
            Self::StaffApplication(form) => vec![
                form.full_name.as_str(),
                form.discord_username.as_str(),
                form.roblox_username.as_str(),
                form.position.as_str(),
            ],
        }
    }

    /// Labeled, non-empty fields in form order.
    #[must_use]
    pub fn detail_fields(&self) -> Vec<(&'static str, &str)> {
        let fields: Vec<(&'static str, &str)> = match self {
            Self::Support(form) => vec![
                ("Name", form.name.as_str()),
                ("Contact method", form.contact_method.as_str()),
                ("Message", form.message.as_str()),
            ],
            Self::StaffApplication(form) => vec![
                ("Full name", form.full_name.as_str()),
                ("Age", form.age.as_str()),
                ("Timezone", form.timezone.as_str()),
                ("Discord username", form.discord_username.as_str()),
                ("Roblox username", form.roblox_username.as_str()),
                ("Position", form.position.as_str()),
                ("Weekly hours", form.weekly_hours.as_str()),
                ("Experience", form.experience.as_str()),
                ("Motivation", form.motivation.as_str()),
                ("Scenario", form.scenario.as_str()),
                ("Additional info", form.additional_info.as_str()),
            ],
        };
        fields
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    /// Who sent it, for list rows.
    #[must_use]
    pub fn sender(&self) -> &str {
        match self {
            Self::Support(form) => &form.name,
            Self::StaffApplication(form) => &form.full_name,
        }
    }

    /// Short second line for list rows: the message, or the position applied for.
    #[must_use]
    pub fn preview(&self) -> String {
        match self {
            Self::Support(form) => form.message.clone(),
            Self::StaffApplication(form) => format!("Position: {}", form.position),
        }
    }
}

impl From<ContactForm> for Payload {
    fn from(form: ContactForm) -> Self {
        Self::Support(form)
    }
}

impl From<StaffApplicationForm> for Payload {
    fn from(form: StaffApplicationForm) -> Self {
        Self::StaffApplication(form)
    }
}

/// One stored support request or staff application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// `<unix millis>-<9 base-36 chars>`. Best-effort unique.
    pub id: String,
    /// The form contents.
    pub payload: Payload,
    /// When the form was submitted, millisecond precision.
    pub timestamp: DateTime<Utc>,
    /// Whether an admin has marked it read.
    pub read: bool,
}

impl Submission {
    /// Create a new unread submission stamped with the current time.
    #[must_use]
    pub fn new(payload: impl Into<Payload>) -> Self {
        let timestamp = Utc::now().trunc_subsecs(3);
        Self {
            id: generate_id(timestamp),
            payload: payload.into(),
            timestamp,
            read: false,
        }
    }

    /// The submission's kind.
    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        self.payload.kind()
    }

    /// The timestamp in the stored format (`2025-01-01T00:00:00.000Z`).
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Generate a submission id from a timestamp plus a random suffix.
fn generate_id(timestamp: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("{}-{suffix}", timestamp.timestamp_millis())
}

/// Outgoing wire shape.
#[derive(Serialize)]
struct WireSubmission<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: SubmissionKind,
    data: &'a Payload,
    timestamp: String,
    read: bool,
}

/// Incoming wire shape, validated into a [`Submission`].
#[derive(Deserialize)]
struct RawSubmission {
    id: String,
    #[serde(rename = "type")]
    kind: SubmissionKind,
    data: serde_json::Value,
    timestamp: String,
    #[serde(default)]
    read: bool,
}

impl TryFrom<RawSubmission> for Submission {
    type Error = String;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err("submission id is empty".to_string());
        }
        if !raw.data.is_object() {
            return Err(format!("submission {} has non-object data", raw.id));
        }

        let payload = match raw.kind {
            SubmissionKind::Support => serde_json::from_value(raw.data).map(Payload::Support),
            SubmissionKind::StaffApplication => {
                serde_json::from_value(raw.data).map(Payload::StaffApplication)
            }
        }
        .map_err(|e| format!("submission {} has invalid data: {e}", raw.id))?;

        let timestamp = DateTime::parse_from_rfc3339(&raw.timestamp)
            .map_err(|e| format!("submission {} has invalid timestamp: {e}", raw.id))?
            .with_timezone(&Utc);

        Ok(Self {
            id: raw.id,
            payload,
            timestamp,
            read: raw.read,
        })
    }
}

impl Serialize for Submission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireSubmission {
            id: &self.id,
            kind: self.kind(),
            data: &self.payload,
            timestamp: self.timestamp_string(),
            read: self.read,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Submission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSubmission::deserialize(deserializer)?;
        Submission::try_from(raw).map_err(D::Error::custom)
    }
}
