use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendantRole {
    Atendente,
    Supervisor,
    Admin,
}

impl std::fmt::Display for AttendantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendantRole::Atendente => write!(f, "atendente"),
            AttendantRole::Supervisor => write!(f, "supervisor"),
            AttendantRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendant {
    pub id: Uuid,
    pub name: String,
    pub is_online: bool,
    pub role: AttendantRole,
}

impl Attendant {
    pub fn new(name: impl Into<String>, role: AttendantRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_online: false,
            role,
        }
    }

    pub fn online(mut self) -> Self {
        self.is_online = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(AttendantRole::Atendente.to_string(), "atendente");
        assert_eq!(AttendantRole::Supervisor.to_string(), "supervisor");
        assert_eq!(AttendantRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_attendant_new() {
        let attendant = Attendant::new("Carlos", AttendantRole::Atendente);

        assert_eq!(attendant.name, "Carlos");
        assert_eq!(attendant.role, AttendantRole::Atendente);
        assert!(!attendant.is_online);
        assert!(attendant.online().is_online);
    }
}
