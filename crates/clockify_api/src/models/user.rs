//! Account models returned by Clockify identity endpoints.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Represents the authenticated account returned by the `user` endpoint; the id is what per-client configs call `UserId`.
pub struct UserAccount {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub default_workspace: Option<String>,
}

impl UserAccount {
    /// Returns the best human-readable label for the account.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}
