//! Validation of new chart of accounts entries.

use koperasi_shared::types::AccountId;

use super::error::CoaError;
use super::types::{Account, NewAccount};

/// Validates a new account against the tenant's existing chart and builds it.
///
/// Checks, in order: non-blank code and name, unique code, normal balance
/// consistent with the type, and (for child accounts) a parent that exists,
/// is a header of the same type and whose code prefixes the child's code.
/// The level is derived from the parent.
///
/// `existing` must contain only accounts of `input.tenant_id`.
pub fn validate_new_account(input: &NewAccount, existing: &[Account]) -> Result<Account, CoaError> {
    let code = input.code.trim();
    let name = input.name.trim();
    if code.is_empty() {
        return Err(CoaError::MissingField("code"));
    }
    if name.is_empty() {
        return Err(CoaError::MissingField("name"));
    }

    if existing.iter().any(|a| a.code == code) {
        return Err(CoaError::DuplicateCode(code.to_string()));
    }

    let expected = input.account_type.normal_balance();
    if let Some(given) = input.normal_balance
        && given != expected
    {
        return Err(CoaError::NormalBalanceMismatch {
            account_type: input.account_type,
            expected,
            given,
        });
    }

    let parent_code = input
        .parent_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let level = match parent_code {
        None => 1,
        Some(parent_code) => {
            let parent = existing
                .iter()
                .find(|a| a.code == parent_code)
                .ok_or_else(|| CoaError::ParentNotFound(parent_code.to_string()))?;
            if !parent.is_header {
                return Err(CoaError::ParentNotHeader(parent_code.to_string()));
            }
            if parent.account_type != input.account_type {
                return Err(CoaError::ParentTypeMismatch {
                    parent_code: parent_code.to_string(),
                    parent_type: parent.account_type,
                    child_type: input.account_type,
                });
            }
            if !code.starts_with(parent_code) || code == parent_code {
                return Err(CoaError::CodeOutsideParent {
                    code: code.to_string(),
                    parent_code: parent_code.to_string(),
                });
            }
            parent.level + 1
        }
    };

    Ok(Account {
        id: AccountId::new(),
        tenant_id: input.tenant_id,
        code: code.to_string(),
        name: name.to_string(),
        account_type: input.account_type,
        normal_balance: expected,
        parent_code: parent_code.map(str::to_string),
        level,
        is_header: input.is_header,
        is_active: true,
    })
}
