//! Modelo de Customer
//!
//! Mapea la tabla `customers`. Los registros nunca se borran físicamente:
//! `deleted_at` marca el borrado lógico y toda búsqueda lo excluye.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer principal - mapea exactamente a la tabla customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    /// CPF normalizado (11 dígitos)
    pub cpf: String,
    pub email: String,
    /// Teléfono normalizado (solo dígitos)
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Datos para crear un nuevo customer
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: String,
}

/// Actualización parcial: solo se modifican los campos presentes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cpf.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Filtros para listado de customers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilters {
    pub name: Option<String>,
}

impl CustomerFilters {
    pub fn matches(&self, customer: &Customer) -> bool {
        match &self.name {
            Some(name) => customer.name.to_lowercase().contains(&name.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        assert!(CustomerPatch::default().is_empty());

        let patch = CustomerPatch {
            phone: Some("11987654321".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_from_json_ignores_missing_fields() {
        let patch: CustomerPatch = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(patch.email.as_deref(), Some("a@b.com"));
        assert!(patch.name.is_none());

        let patch: CustomerPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
