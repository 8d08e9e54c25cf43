use crate::types::documents::Slot;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicant {
    pub slot_index: usize,
    pub applicant_id: String,
}

/// Applicants present in `after` but not in the matching slot of `before`,
/// in slot order then applicant order.
///
/// Slots carrying an `id` are matched by id, so reordering or inserting slots
/// does not produce phantom applicants. Slots without an id fall back to
/// matching by position. A slot with no counterpart contributes all of its
/// applicants.
pub fn new_applicants(before: &[Slot], after: &[Slot]) -> Vec<NewApplicant> {
    let mut found = Vec::new();
    for (slot_index, slot) in after.iter().enumerate() {
        let previous = counterpart(before, slot_index, slot)
            .map(|slot| slot.applicants.as_slice())
            .unwrap_or_default();
        let mut seen: Vec<&str> = Vec::new();
        for applicant in &slot.applicants {
            let applicant = applicant.as_str();
            if applicant.is_empty()
                || previous.iter().any(|existing| existing == applicant)
                || seen.contains(&applicant)
            {
                continue;
            }
            seen.push(applicant);
            found.push(NewApplicant {
                slot_index,
                applicant_id: applicant.to_string(),
            });
        }
    }
    found
}

fn counterpart<'a>(before: &'a [Slot], index: usize, slot: &Slot) -> Option<&'a Slot> {
    match slot.id.as_deref() {
        Some(id) => before
            .iter()
            .find(|candidate| candidate.id.as_deref() == Some(id))
            // before-snapshots written ahead of slot ids existing
            .or_else(|| before.get(index).filter(|candidate| candidate.id.is_none())),
        None => before.get(index),
    }
}
