//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles within the office portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Manages users, services, payments, and activity logs.
    Admin,
    /// Fulfills orders and revisions.
    Akuntan,
    /// Orders services, uploads documents, pays invoices.
    Klien,
}

impl UserRole {
    /// Returns true if this role can manage users and services.
    #[must_use]
    pub const fn can_manage_office(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can work on orders and revisions.
    #[must_use]
    pub const fn can_fulfill_orders(&self) -> bool {
        matches!(self, Self::Admin | Self::Akuntan)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Akuntan => write!(f, "AKUNTAN"),
            Self::Klien => write!(f, "KLIEN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "AKUNTAN" => Ok(Self::Akuntan),
            "KLIEN" => Ok(Self::Klien),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.can_manage_office());
        assert!(!UserRole::Akuntan.can_manage_office());
        assert!(!UserRole::Klien.can_manage_office());

        assert!(UserRole::Admin.can_fulfill_orders());
        assert!(UserRole::Akuntan.can_fulfill_orders());
        assert!(!UserRole::Klien.can_fulfill_orders());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Akuntan, UserRole::Klien] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }
}
