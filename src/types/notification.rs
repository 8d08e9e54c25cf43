use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One push notification, shaped like the `message` object of the FCM HTTP v1
/// `messages:send` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub token: String,
    pub notification: NotificationContent,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpush: Option<WebpushConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebpushConfig {
    pub fcm_options: WebpushFcmOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebpushFcmOptions {
    pub link: String,
}

/// Acknowledgement returned by the push gateway for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub name: String,
}

impl NotificationPayload {
    pub fn new(token: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            notification: NotificationContent {
                title: title.into(),
                body: body.into(),
            },
            data: BTreeMap::new(),
            android: None,
            apns: None,
            webpush: None,
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_android(mut self, channel_id: &str, sound: &str) -> Self {
        self.android = Some(AndroidConfig {
            priority: AndroidPriority::High,
            notification: Some(AndroidNotification {
                channel_id: Some(channel_id.to_string()),
                sound: Some(sound.to_string()),
            }),
        });
        self
    }

    pub fn with_apns(mut self, badge: u32, sound: &str) -> Self {
        self.apns = Some(ApnsConfig {
            payload: ApnsPayload {
                aps: Aps {
                    badge: Some(badge),
                    sound: Some(sound.to_string()),
                },
            },
        });
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.webpush = Some(WebpushConfig {
            fcm_options: WebpushFcmOptions { link: link.into() },
        });
        self
    }
}
