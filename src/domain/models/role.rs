use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Any role outside the known vocabulary. Relayed as a user message
    /// rather than rejected.
    #[serde(other)]
    Unknown,
}

impl Default for Role {
    fn default() -> Role {
        return Role::User;
    }
}
