//! API credential capability probe.
//!
//! The orchestrator only needs to know whether a credential is selected and
//! to obtain it when setup starts. Picking a credential is optional; a
//! front-end without a picker degrades to a disabled setup action.

use secrecy::SecretString;

use clinicbot_types::error::CredentialError;

/// Source of the API credential used by the remote gateway.
pub trait CredentialProbe: Send + Sync {
    /// The currently selected credential, if any.
    fn selected_credential(&self) -> Option<SecretString>;

    /// Whether a credential is currently selected.
    fn has_credential_selected(&self) -> bool {
        self.selected_credential().is_some()
    }

    /// Let the operator choose a credential.
    ///
    /// Returns whether a credential is selected afterwards. The default
    /// implementation has no picker and reports `false`.
    fn open_credential_picker(&self) -> Result<bool, CredentialError> {
        Ok(false)
    }
}
