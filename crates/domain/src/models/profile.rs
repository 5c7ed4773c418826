use chrono::{DateTime, Utc};
use common::{ProfileId, UserId};
use serde::{Deserialize, Serialize};

/// A user's profile as held by the profile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub auth_user_id: Option<UserId>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of `PATCH /api/users/{profileId}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_profile_decodes_with_optional_fields() {
        let profile: Profile = serde_json::from_value(json!({
            "id": 9,
            "authUserId": 7,
            "email": "a@b.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "createdAt": "2024-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert_eq!(profile.phone, None);
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = ProfileUpdate {
            phone: Some("555-0100".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "phone": "555-0100" })
        );
        assert!(ProfileUpdate::default().is_empty());
    }
}
