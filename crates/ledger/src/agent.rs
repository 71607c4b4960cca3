use serde::{Deserialize, Serialize};

use floatbook_core::{AgentId, DomainError, DomainResult, Entity};

/// A field agent receiving float from the business.
///
/// Agents are created by explicit registration (or bulk import upstream);
/// the ledger never creates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone: String,
}

impl Agent {
    /// Register a new agent; the name must not be blank.
    pub fn register(
        name: impl Into<String>,
        location: impl Into<String>,
        phone: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::with_id(AgentId::new(), name, location, phone)
    }

    pub fn with_id(
        id: AgentId,
        name: impl Into<String>,
        location: impl Into<String>,
        phone: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("agent name must not be blank"));
        }
        Ok(Self {
            id,
            name,
            location: location.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
        })
    }
}

impl Entity for Agent {
    type Id = AgentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_trims_fields() {
        let agent = Agent::register("  Modou Lamin ", "Serrekunda Market", " 3344556").unwrap();
        assert_eq!(agent.name, "Modou Lamin");
        assert_eq!(agent.phone, "3344556");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Agent::register("   ", "Bakau", "").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
