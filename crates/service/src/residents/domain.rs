use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A stored resident as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw submission as decoded from a JSON, urlencoded or multipart body.
///
/// Every field is optional here; presence is checked by [`ResidentInput::validate`].
/// Unknown fields such as `id` or `createdAt` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

/// Submission that passed the required-field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_photo: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

/// Record ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResident {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_photo: String,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ResidentInput {
    /// `firstName`, `lastName` and `role` must be present and not blank.
    pub fn validate(self) -> Result<ValidatedInput, ServiceError> {
        match (required(self.first_name), required(self.last_name), required(self.role)) {
            (Some(first_name), Some(last_name), Some(role)) => Ok(ValidatedInput {
                first_name,
                last_name,
                role,
                profile_photo: self.profile_photo,
                linkedin: self.linkedin,
                twitter: self.twitter,
            }),
            _ => Err(ServiceError::missing_fields()),
        }
    }
}

impl ValidatedInput {
    /// Stamp the creation time (millisecond precision, as the store keeps it).
    pub fn into_new_resident(self, profile_photo: String) -> NewResident {
        NewResident {
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            profile_photo,
            linkedin: self.linkedin,
            twitter: self.twitter,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

impl NewResident {
    pub fn into_resident(self, id: String) -> Resident {
        Resident {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            profile_photo: self.profile_photo,
            linkedin: self.linkedin,
            twitter: self.twitter,
            created_at: self.created_at,
        }
    }
}
