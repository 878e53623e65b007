use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of account is acting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Driver => "driver",
        }
    }
}

/// The authenticated actor behind a command.
///
/// Identity verification happens in a collaborator in front of the API; by
/// the time a coordinator call is made, the context is trusted. It is passed
/// explicitly into every operation instead of living in ambient session
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub actor_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn student(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            role: Role::Student,
        }
    }

    pub fn driver(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            role: Role::Driver,
        }
    }
}
