//! Almacenamiento en memoria
//!
//! Cada transacción toma el mutex del estado completo. Las lecturas van
//! directo al estado publicado; la primera escritura crea una copia de
//! trabajo que `commit` publica. Las transacciones quedan serializadas, lo
//! que basta para tests y para ejecutar el servicio sin PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{RecordStore, StoreTransaction, UniqueField};
use crate::models::customer::{Customer, CustomerFilters, NewCustomer};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilters};
use crate::utils::errors::{duplicate_error, not_found_error, AppResult};

#[derive(Debug, Clone, Default)]
struct StoreState {
    customers: HashMap<Uuid, Customer>,
    vehicles: HashMap<Uuid, Vehicle>,
}

impl StoreState {
    fn live_customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values().filter(|c| !c.is_deleted())
    }

    fn live_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values().filter(|v| !v.is_deleted())
    }

    fn find_id_by_unique(&self, field: UniqueField, value: &str) -> Option<Uuid> {
        match field {
            UniqueField::CustomerCpf => self.live_customers().find(|c| c.cpf == value).map(|c| c.id),
            UniqueField::CustomerEmail => self.live_customers().find(|c| c.email == value).map(|c| c.id),
            UniqueField::VehicleLicensePlate => self
                .live_vehicles()
                .find(|v| v.license_plate == value)
                .map(|v| v.id),
        }
    }

    /// Equivalente a los índices únicos parciales de PostgreSQL
    fn ensure_free(&self, field: UniqueField, value: &str, owner: Uuid) -> AppResult<()> {
        match self.find_id_by_unique(field, value) {
            Some(id) if id != owner => Err(duplicate_error(field.resource(), field.label(), value)),
            _ => Ok(()),
        }
    }
}

/// Almacenamiento en memoria compartible entre tareas
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<StoreState>>,
    transactions: Arc<AtomicUsize>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de transacciones abiertas desde la creación del store
    pub fn transactions_started(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Todos los customers, incluidos los borrados lógicamente
    pub async fn all_customers(&self) -> Vec<Customer> {
        self.state.lock().await.customers.values().cloned().collect()
    }

    /// Todos los vehículos, incluidos los borrados lógicamente
    pub async fn all_vehicles(&self) -> Vec<Vehicle> {
        self.state.lock().await.vehicles.values().cloned().collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> AppResult<Self::Tx> {
        let guard = self.state.clone().lock_owned().await;
        self.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryTransaction { guard, working: None })
    }
}

/// Transacción en memoria: los cambios viven en `working` hasta el commit
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: Option<StoreState>,
}

impl InMemoryTransaction {
    /// Estado visible dentro de la transacción
    fn view(&self) -> &StoreState {
        self.working.as_ref().unwrap_or(&*self.guard)
    }

    /// Copia de trabajo, creada en la primera escritura
    fn working_mut(&mut self) -> &mut StoreState {
        let published = &self.guard;
        self.working.get_or_insert_with(|| StoreState::clone(published))
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn find_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.view().customers.get(&id).filter(|c| !c.is_deleted()).cloned())
    }

    async fn list_customers(&mut self, filters: &CustomerFilters) -> AppResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self
            .view()
            .live_customers()
            .filter(|c| filters.matches(c))
            .cloned()
            .collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> AppResult<Customer> {
        let id = Uuid::new_v4();
        self.view().ensure_free(UniqueField::CustomerCpf, &customer.cpf, id)?;
        self.view().ensure_free(UniqueField::CustomerEmail, &customer.email, id)?;

        let now = Utc::now();
        let record = Customer {
            id,
            name: customer.name.clone(),
            cpf: customer.cpf.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.working_mut().customers.insert(id, record.clone());
        Ok(record)
    }

    async fn update_customer(&mut self, customer: &Customer) -> AppResult<Customer> {
        self.view().ensure_free(UniqueField::CustomerCpf, &customer.cpf, customer.id)?;
        self.view().ensure_free(UniqueField::CustomerEmail, &customer.email, customer.id)?;

        let stored = self
            .working_mut()
            .customers
            .get_mut(&customer.id)
            .filter(|c| !c.is_deleted())
            .ok_or_else(|| not_found_error("Customer", "id", customer.id))?;

        stored.name = customer.name.clone();
        stored.cpf = customer.cpf.clone();
        stored.email = customer.email.clone();
        stored.phone = customer.phone.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn soft_delete_customer(&mut self, id: Uuid) -> AppResult<bool> {
        match self.working_mut().customers.get_mut(&id).filter(|c| !c.is_deleted()) {
            Some(customer) => {
                let now = Utc::now();
                customer.deleted_at = Some(now);
                customer.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.view().vehicles.get(&id).filter(|v| !v.is_deleted()).cloned())
    }

    async fn find_vehicle_by_plate(&mut self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        Ok(self
            .view()
            .live_vehicles()
            .find(|v| v.license_plate == license_plate)
            .cloned())
    }

    async fn list_vehicles(&mut self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .view()
            .live_vehicles()
            .filter(|v| filters.matches(v))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles)
    }

    async fn insert_vehicle(&mut self, vehicle: &NewVehicle) -> AppResult<Vehicle> {
        let id = Uuid::new_v4();
        self.view()
            .ensure_free(UniqueField::VehicleLicensePlate, &vehicle.license_plate, id)?;

        let now = Utc::now();
        let record = Vehicle {
            id,
            license_plate: vehicle.license_plate.clone(),
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            color: vehicle.color.clone(),
            customer_id: vehicle.customer_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.working_mut().vehicles.insert(id, record.clone());
        Ok(record)
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        self.view()
            .ensure_free(UniqueField::VehicleLicensePlate, &vehicle.license_plate, vehicle.id)?;

        let stored = self
            .working_mut()
            .vehicles
            .get_mut(&vehicle.id)
            .filter(|v| !v.is_deleted())
            .ok_or_else(|| not_found_error("Vehicle", "id", vehicle.id))?;

        stored.license_plate = vehicle.license_plate.clone();
        stored.brand = vehicle.brand.clone();
        stored.model = vehicle.model.clone();
        stored.year = vehicle.year;
        stored.color = vehicle.color.clone();
        stored.customer_id = vehicle.customer_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn soft_delete_vehicle(&mut self, id: Uuid) -> AppResult<bool> {
        match self.working_mut().vehicles.get_mut(&id).filter(|v| !v.is_deleted()) {
            Some(vehicle) => {
                let now = Utc::now();
                vehicle.deleted_at = Some(now);
                vehicle.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_id_by_unique(&mut self, field: UniqueField, value: &str) -> AppResult<Option<Uuid>> {
        Ok(self.view().find_id_by_unique(field, value))
    }

    async fn commit(self) -> AppResult<()> {
        let InMemoryTransaction { mut guard, working } = self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }
}
