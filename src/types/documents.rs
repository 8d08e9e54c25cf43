use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const CHATS: &str = "chats";
pub const USERS: &str = "users";
pub const EVENTS: &str = "events";

pub const FCM_TOKEN_FIELD: &str = "fcmToken";

/// A document as returned by a [`crate::ports::DocumentStore`], with its
/// fields already decoded into plain JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender_id: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Reads an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participant_names: HashMap<String, Option<String>>,
}

impl Chat {
    pub fn participant_name(&self, user_id: &str) -> Option<&str> {
        self.participant_names
            .get(user_id)?
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn recipient_for(&self, sender_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .map(String::as_str)
            .find(|participant| *participant != sender_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub fcm_token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    pub fn token(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Event {
    pub fn organizer(&self) -> Option<&str> {
        self.organizer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub applicants: Vec<String>,
}
