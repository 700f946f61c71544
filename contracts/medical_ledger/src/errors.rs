use ledger_common::TransitionError;
use soroban_sdk::contracterror;

/// Errors returned by every ledger entry point.
///
/// Discriminants are part of the contract ABI and must stay stable.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LedgerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Privileged operation attempted without the required role.
    Unauthorized = 3,
    /// Record read or write on a patient without a grant for the caller.
    PermissionDenied = 4,
    /// Verification target is past the end of the patient's records.
    InvalidIndex = 5,
    NotFound = 6,
    InvalidInput = 7,
    /// Removing the role would leave the ledger without an Admin or Validator.
    LastRoleHolder = 8,
    InvalidTransition = 9,
}

impl From<TransitionError> for LedgerError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition => LedgerError::InvalidTransition,
        }
    }
}
