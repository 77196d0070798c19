//! Reversing journals.
//!
//! Posted journals are never edited. A correction is a new journal that
//! mirrors the original line by line with debit and credit swapped, and
//! references the original by id.

use chrono::NaiveDate;
use koperasi_shared::types::UserId;

use super::types::{Journal, JournalLine, JournalLineInput, PostJournalInput, REVERSAL_REFERENCE_TYPE};

/// Stateless builder for reversing journals.
pub struct ReversalService;

impl ReversalService {
    /// Mirrors lines by swapping debit and credit.
    #[must_use]
    pub fn reverse_lines(lines: &[JournalLine]) -> Vec<JournalLineInput> {
        lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                description: Some(match &line.description {
                    Some(memo) => format!("Reversal: {memo}"),
                    None => "Reversal".to_string(),
                }),
            })
            .collect()
    }

    /// Builds the posting input that reverses `original`.
    ///
    /// The reversal carries `reference_type = "reversal"` and the original
    /// journal id as `reference_id`, so reversing the same journal twice
    /// replays the first reversal instead of posting a second one.
    #[must_use]
    pub fn build_reversal(
        original: &Journal,
        reversal_date: NaiveDate,
        created_by: UserId,
        reason: Option<&str>,
    ) -> PostJournalInput {
        let description = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("Reversal of journal {}: {reason}", original.id),
            None => format!("Reversal of journal {}", original.id),
        };

        PostJournalInput {
            tenant_id: original.tenant_id,
            business_unit: original.business_unit.clone(),
            transaction_date: reversal_date,
            description,
            reference_id: Some(original.id.to_string()),
            reference_type: Some(REVERSAL_REFERENCE_TYPE.to_string()),
            lines: Self::reverse_lines(&original.lines),
            created_by,
        }
    }
}
