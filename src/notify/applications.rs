use super::compose::{self, ApplicationNotice};
use super::slots::{NewApplicant, new_applicants};
use super::{AttemptResult, Dispatcher, LookupError, SkipReason};
use crate::ports::{DocumentStore, PushSender};
use crate::types::documents::{USERS, User};
use crate::types::triggers::EventUpdated;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReport {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    pub attempts: Vec<ApplicationAttempt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAttempt {
    pub slot_index: usize,
    pub applicant_id: String,
    pub result: AttemptResult,
}

impl ApplicationReport {
    fn skipped(event_id: &str, reason: SkipReason) -> Self {
        Self {
            event_id: event_id.to_string(),
            skipped: Some(reason),
            attempts: Vec::new(),
        }
    }
}

impl<S, P> Dispatcher<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    /// Notifies the event organizer once per applicant added to any slot.
    ///
    /// Applicants are processed one after another; a failure for one of them
    /// is recorded and the rest still get their attempt.
    pub async fn on_event_updated(&self, trigger: &EventUpdated) -> ApplicationReport {
        let event_id = trigger.params.event_id.as_str();
        let added = new_applicants(&trigger.before.slots, &trigger.after.slots);
        if added.is_empty() {
            return ApplicationReport::skipped(event_id, SkipReason::NoNewApplicants);
        }

        let Some(organizer_id) = trigger.after.organizer() else {
            tracing::info!(event_id, "event has no organizer; skipping application notifications");
            return ApplicationReport::skipped(event_id, SkipReason::NoOrganizer);
        };

        let organizer = match self.load::<User>(USERS, organizer_id).await {
            Ok(Some(organizer)) => organizer,
            Ok(None) => {
                tracing::info!(event_id, organizer_id, "organizer not found");
                return ApplicationReport::skipped(event_id, SkipReason::OrganizerNotFound);
            }
            Err(err) => {
                tracing::error!(event_id, organizer_id, error = %err, "organizer lookup failed");
                return ApplicationReport {
                    event_id: event_id.to_string(),
                    skipped: None,
                    attempts: added
                        .into_iter()
                        .map(|applicant| ApplicationAttempt {
                            slot_index: applicant.slot_index,
                            applicant_id: applicant.applicant_id,
                            result: AttemptResult::Failed {
                                error: err.to_string(),
                            },
                        })
                        .collect(),
                };
            }
        };
        let Some(token) = organizer.token() else {
            tracing::info!(event_id, organizer_id, "organizer has no device token");
            return ApplicationReport::skipped(event_id, SkipReason::NoToken);
        };

        let mut attempts = Vec::with_capacity(added.len());
        let mut token_cleared = false;
        for applicant in added {
            let result = match self.applicant_name(&applicant).await {
                Ok(applicant_name) => {
                    let payload = compose::application_notification(
                        &ApplicationNotice {
                            token,
                            event_id,
                            event_title: trigger.after.title.as_deref(),
                            slot_index: applicant.slot_index,
                            applicant_id: &applicant.applicant_id,
                            applicant_name: &applicant_name,
                        },
                        &self.web_base_url,
                    );
                    let (result, cleaned) =
                        self.deliver(organizer_id, &payload, !token_cleared).await;
                    token_cleared |= cleaned;
                    match result {
                        Ok(receipt) => {
                            tracing::info!(
                                event_id,
                                applicant_id = %applicant.applicant_id,
                                receipt = %receipt.name,
                                "application notification sent"
                            );
                            AttemptResult::Sent { receipt }
                        }
                        Err(err) => {
                            tracing::error!(
                                event_id,
                                applicant_id = %applicant.applicant_id,
                                error = %err,
                                "push delivery error"
                            );
                            AttemptResult::Failed {
                                error: err.to_string(),
                            }
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(
                        event_id,
                        applicant_id = %applicant.applicant_id,
                        error = %err,
                        "applicant lookup failed"
                    );
                    AttemptResult::Failed {
                        error: err.to_string(),
                    }
                }
            };
            attempts.push(ApplicationAttempt {
                slot_index: applicant.slot_index,
                applicant_id: applicant.applicant_id,
                result,
            });
        }

        ApplicationReport {
            event_id: event_id.to_string(),
            skipped: None,
            attempts,
        }
    }

    async fn applicant_name(&self, applicant: &NewApplicant) -> Result<String, LookupError> {
        let user = self.load::<User>(USERS, &applicant.applicant_id).await?;
        Ok(user
            .as_ref()
            .and_then(User::display_name)
            .unwrap_or(compose::UNKNOWN_USER_NAME)
            .to_string())
    }
}
