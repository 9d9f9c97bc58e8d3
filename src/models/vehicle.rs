//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla `vehicles`; cada vehículo pertenece a un customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    /// Placa normalizada (mayúsculas, sin espacios)
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Datos para crear un nuevo vehículo
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub customer_id: Uuid,
}

/// Actualización parcial de un vehículo
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehiclePatch {
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub customer_id: Option<Uuid>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.license_plate.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.color.is_none()
            && self.customer_id.is_none()
    }
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

fn contains_ignore_case(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

impl VehicleFilters {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        contains_ignore_case(&vehicle.brand, &self.brand)
            && contains_ignore_case(&vehicle.model, &self.model)
            && contains_ignore_case(&vehicle.color, &self.color)
    }
}
