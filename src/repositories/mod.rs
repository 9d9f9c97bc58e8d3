//! Almacenamiento de registros
//!
//! Los servicios no conocen la base de datos: trabajan contra una
//! transacción abierta con [`RecordStore::begin`]. Toda búsqueda excluye los
//! registros con borrado lógico. Una transacción que se descarta sin
//! [`StoreTransaction::commit`] no deja ningún cambio visible.

pub mod in_memory_store;
pub mod postgres_store;

pub use in_memory_store::InMemoryRecordStore;
pub use postgres_store::PgRecordStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerFilters, NewCustomer};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilters};
use crate::utils::errors::AppResult;

/// Campos con restricción de unicidad entre registros vivos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    CustomerCpf,
    CustomerEmail,
    VehicleLicensePlate,
}

impl UniqueField {
    pub fn resource(&self) -> &'static str {
        match self {
            UniqueField::CustomerCpf | UniqueField::CustomerEmail => "Customer",
            UniqueField::VehicleLicensePlate => "Vehicle",
        }
    }

    /// Nombre del campo en los mensajes de error
    pub fn label(&self) -> &'static str {
        match self {
            UniqueField::CustomerCpf => "CPF",
            UniqueField::CustomerEmail => "email",
            UniqueField::VehicleLicensePlate => "license plate",
        }
    }

    /// Índice único parcial que respalda el campo en PostgreSQL
    pub fn constraint_name(&self) -> &'static str {
        match self {
            UniqueField::CustomerCpf => "customers_cpf_live_key",
            UniqueField::CustomerEmail => "customers_email_live_key",
            UniqueField::VehicleLicensePlate => "vehicles_license_plate_live_key",
        }
    }

    pub fn from_constraint(name: &str) -> Option<Self> {
        [
            UniqueField::CustomerCpf,
            UniqueField::CustomerEmail,
            UniqueField::VehicleLicensePlate,
        ]
        .into_iter()
        .find(|field| field.constraint_name() == name)
    }
}

/// Fábrica de transacciones sobre el almacenamiento
#[async_trait]
pub trait RecordStore: Clone + Send + Sync + 'static {
    type Tx: StoreTransaction;

    async fn begin(&self) -> AppResult<Self::Tx>;
}

/// Operaciones disponibles dentro de una transacción.
///
/// `insert_*` y `update_*` reciben valores ya validados y normalizados; el
/// almacenamiento asigna id y timestamps. Una violación de unicidad detectada
/// por el propio almacenamiento se devuelve como `AppError::DuplicateValue`.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn find_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>>;

    async fn list_customers(&mut self, filters: &CustomerFilters) -> AppResult<Vec<Customer>>;

    async fn insert_customer(&mut self, customer: &NewCustomer) -> AppResult<Customer>;

    async fn update_customer(&mut self, customer: &Customer) -> AppResult<Customer>;

    /// Devuelve `false` si no había un registro vivo con ese id
    async fn soft_delete_customer(&mut self, id: Uuid) -> AppResult<bool>;

    async fn find_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn find_vehicle_by_plate(&mut self, license_plate: &str) -> AppResult<Option<Vehicle>>;

    async fn list_vehicles(&mut self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>>;

    async fn insert_vehicle(&mut self, vehicle: &NewVehicle) -> AppResult<Vehicle>;

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle>;

    async fn soft_delete_vehicle(&mut self, id: Uuid) -> AppResult<bool>;

    /// Id del registro vivo que ya usa `value` en `field`
    async fn find_id_by_unique(&mut self, field: UniqueField, value: &str) -> AppResult<Option<Uuid>>;

    async fn commit(self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_round_trip() {
        for field in [
            UniqueField::CustomerCpf,
            UniqueField::CustomerEmail,
            UniqueField::VehicleLicensePlate,
        ] {
            assert_eq!(UniqueField::from_constraint(field.constraint_name()), Some(field));
        }
        assert_eq!(UniqueField::from_constraint("vehicles_pkey"), None);
    }
}
