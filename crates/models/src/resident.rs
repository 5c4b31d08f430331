use mongodb::{
    bson::{self, oid::ObjectId},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// Stored shape of a resident; field names match the collection's camelCase layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    // older documents may carry null or no value here
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    pub created_at: bson::DateTime,
}

pub fn collection(db: &Database, name: &str) -> Collection<ResidentDocument> {
    db.collection::<ResidentDocument>(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn sample() -> ResidentDocument {
        ResidentDocument {
            id: None,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "Resident".into(),
            profile_photo: Some(String::new()),
            linkedin: None,
            twitter: Some("@ada".into()),
            created_at: bson::DateTime::from_millis(1_700_000_000_000),
        }
    }

    #[test]
    fn serializes_camel_case_without_id_or_missing_links() {
        let d = bson::to_document(&sample()).unwrap();
        assert!(d.get("_id").is_none());
        assert!(d.get("linkedin").is_none());
        assert_eq!(d.get_str("firstName").unwrap(), "Ada");
        assert_eq!(d.get_str("twitter").unwrap(), "@ada");
        assert!(d.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn reads_legacy_document_with_null_photo() {
        let oid = ObjectId::new();
        let d = doc! {
            "_id": oid,
            "firstName": "Grace",
            "lastName": "Hopper",
            "role": "Mentor",
            "profilePhoto": null,
            "createdAt": bson::DateTime::now(),
        };
        let parsed: ResidentDocument = bson::from_document(d).unwrap();
        assert_eq!(parsed.id, Some(oid));
        assert_eq!(parsed.profile_photo, None);
        assert_eq!(parsed.linkedin, None);
    }
}
