use crate::types::notification::NotificationPayload;

pub(crate) const MESSAGE_BODY_LIMIT: usize = 100;
pub(crate) const UNKNOWN_USER_NAME: &str = "Someone";
pub(crate) const EMPTY_MESSAGE_BODY: &str = "New message";
pub(crate) const UNTITLED_EVENT: &str = "your event";

pub(crate) const MESSAGE_TYPE: &str = "message";
pub(crate) const APPLICATION_TYPE: &str = "application";

const ANDROID_CHANNEL_MESSAGES: &str = "messages";
const ANDROID_CHANNEL_APPLICATIONS: &str = "applications";
const DEFAULT_SOUND: &str = "default";

pub(crate) struct MessageNotice<'a> {
    pub(crate) token: &'a str,
    pub(crate) chat_id: &'a str,
    pub(crate) message_id: &'a str,
    pub(crate) sender_id: &'a str,
    pub(crate) sender_name: &'a str,
    pub(crate) text: Option<&'a str>,
}

pub(crate) struct ApplicationNotice<'a> {
    pub(crate) token: &'a str,
    pub(crate) event_id: &'a str,
    pub(crate) event_title: Option<&'a str>,
    pub(crate) slot_index: usize,
    pub(crate) applicant_id: &'a str,
    pub(crate) applicant_name: &'a str,
}

/// First [`MESSAGE_BODY_LIMIT`] characters of the text, or a placeholder when
/// there is nothing to show.
pub(crate) fn message_body(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.trim().is_empty() => text.chars().take(MESSAGE_BODY_LIMIT).collect(),
        _ => EMPTY_MESSAGE_BODY.to_string(),
    }
}

pub(crate) fn message_notification(notice: &MessageNotice<'_>, web_base_url: &str) -> NotificationPayload {
    NotificationPayload::new(
        notice.token,
        format!("{} sent a message", notice.sender_name),
        message_body(notice.text),
    )
    .with_data("chatId", notice.chat_id)
    .with_data("messageId", notice.message_id)
    .with_data("senderId", notice.sender_id)
    .with_data("type", MESSAGE_TYPE)
    .with_android(ANDROID_CHANNEL_MESSAGES, DEFAULT_SOUND)
    .with_apns(1, DEFAULT_SOUND)
    .with_link(link(web_base_url, &format!("chat/{}", notice.chat_id)))
}

pub(crate) fn application_notification(
    notice: &ApplicationNotice<'_>,
    web_base_url: &str,
) -> NotificationPayload {
    let title = notice
        .event_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED_EVENT);
    NotificationPayload::new(
        notice.token,
        "New application",
        format!("{} applied to \"{title}\"", notice.applicant_name),
    )
    .with_data("eventId", notice.event_id)
    .with_data("applicantId", notice.applicant_id)
    .with_data("slotIndex", notice.slot_index.to_string())
    .with_data("type", APPLICATION_TYPE)
    .with_android(ANDROID_CHANNEL_APPLICATIONS, DEFAULT_SOUND)
    .with_link(link(web_base_url, &format!("event/{}", notice.event_id)))
}

fn link(base: &str, path: &str) -> String {
    format!("{}/{path}", base.trim_end_matches('/'))
}
