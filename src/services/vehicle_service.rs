//! Servicio de vehículos
//!
//! Mismo protocolo que customers, más la resolución del customer dueño: un
//! vehículo solo se crea o se reasigna hacia un customer vivo.

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilters, VehiclePatch};
use crate::repositories::{RecordStore, StoreTransaction, UniqueField};
use crate::services::uniqueness::ensure_unique;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{
    is_valid_license_plate, normalize_license_plate, FieldChecks, MAX_VEHICLE_YEAR, MIN_VEHICLE_YEAR,
};

fn check_license_plate(checks: &mut FieldChecks, plate: &str) {
    checks.check(
        "license_plate",
        is_valid_license_plate(plate),
        "license_plate",
        "Invalid license plate format (expected: ABC1234 or ABC1D23)",
    );
}

fn check_year(checks: &mut FieldChecks, year: i32) {
    checks.range("year", year, MIN_VEHICLE_YEAR, MAX_VEHICLE_YEAR);
}

/// Validar un alta completa y devolverla normalizada
pub fn validate_new_vehicle(request: &NewVehicle) -> AppResult<NewVehicle> {
    let mut checks = FieldChecks::new();
    check_license_plate(&mut checks, &request.license_plate);
    checks.length("brand", &request.brand, 2, 50);
    checks.length("model", &request.model, 2, 50);
    check_year(&mut checks, request.year);
    checks.length("color", &request.color, 3, 30);
    checks.finish()?;

    Ok(NewVehicle {
        license_plate: normalize_license_plate(&request.license_plate),
        brand: request.brand.trim().to_string(),
        model: request.model.trim().to_string(),
        year: request.year,
        color: request.color.trim().to_string(),
        customer_id: request.customer_id,
    })
}

/// Validar solo los campos presentes del patch y devolverlos normalizados
pub fn validate_vehicle_patch(patch: &VehiclePatch) -> AppResult<VehiclePatch> {
    let mut checks = FieldChecks::new();
    if let Some(plate) = &patch.license_plate {
        check_license_plate(&mut checks, plate);
    }
    if let Some(brand) = &patch.brand {
        checks.length("brand", brand, 2, 50);
    }
    if let Some(model) = &patch.model {
        checks.length("model", model, 2, 50);
    }
    if let Some(year) = patch.year {
        check_year(&mut checks, year);
    }
    if let Some(color) = &patch.color {
        checks.length("color", color, 3, 30);
    }
    checks.finish()?;

    Ok(VehiclePatch {
        license_plate: patch.license_plate.as_deref().map(normalize_license_plate),
        brand: patch.brand.as_deref().map(|b| b.trim().to_string()),
        model: patch.model.as_deref().map(|m| m.trim().to_string()),
        year: patch.year,
        color: patch.color.as_deref().map(|c| c.trim().to_string()),
        customer_id: patch.customer_id,
    })
}

fn merge_vehicle(vehicle: &mut Vehicle, patch: VehiclePatch) {
    if let Some(plate) = patch.license_plate {
        vehicle.license_plate = plate;
    }
    if let Some(brand) = patch.brand {
        vehicle.brand = brand;
    }
    if let Some(model) = patch.model {
        vehicle.model = model;
    }
    if let Some(year) = patch.year {
        vehicle.year = year;
    }
    if let Some(color) = patch.color {
        vehicle.color = color;
    }
    if let Some(customer_id) = patch.customer_id {
        vehicle.customer_id = customer_id;
    }
}

/// Resolver el customer dueño o fallar con `NotFound`
async fn ensure_owner_exists<T: StoreTransaction>(tx: &mut T, customer_id: Uuid) -> AppResult<()> {
    match tx.find_customer(customer_id).await? {
        Some(_) => Ok(()),
        None => Err(not_found_error("Customer", "id", customer_id)),
    }
}

/// Servicio de vehículos sobre cualquier `RecordStore`
#[derive(Debug, Clone)]
pub struct VehicleService<S> {
    store: S,
}

impl<S: RecordStore> VehicleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Vehicle> {
        debug!("Finding vehicle by id: {}", id);
        let mut tx = self.store.begin().await?;
        tx.find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", "id", id))
    }

    pub async fn find_by_license_plate(&self, license_plate: &str) -> AppResult<Vehicle> {
        debug!("Finding vehicle by license plate: {}", license_plate);
        let plate = normalize_license_plate(license_plate);
        let mut tx = self.store.begin().await?;
        tx.find_vehicle_by_plate(&plate)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", "license plate", plate))
    }

    pub async fn list(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        debug!("Finding vehicles with filters: {:?}", filters);
        let mut tx = self.store.begin().await?;
        tx.list_vehicles(filters).await
    }

    pub async fn create(&self, request: NewVehicle) -> AppResult<Vehicle> {
        info!("Creating new vehicle with plate: {}", request.license_plate);

        let candidate = validate_new_vehicle(&request)?;

        let mut tx = self.store.begin().await?;
        ensure_unique(
            &mut tx,
            UniqueField::VehicleLicensePlate,
            Some(&candidate.license_plate),
            None,
        )
        .await?;
        ensure_owner_exists(&mut tx, candidate.customer_id).await?;

        let vehicle = tx.insert_vehicle(&candidate).await?;
        tx.commit().await?;

        info!("Vehicle created successfully with id: {}", vehicle.id);
        Ok(vehicle)
    }

    pub async fn partial_update(&self, id: Uuid, patch: VehiclePatch) -> AppResult<Vehicle> {
        info!("Partially updating vehicle with id: {}", id);

        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        let mut tx = self.store.begin().await?;
        let mut vehicle = tx
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", "id", id))?;

        let patch = validate_vehicle_patch(&patch)?;

        let plate = patch
            .license_plate
            .as_deref()
            .filter(|plate| *plate != vehicle.license_plate);
        ensure_unique(&mut tx, UniqueField::VehicleLicensePlate, plate, Some(id)).await?;

        if let Some(customer_id) = patch.customer_id {
            ensure_owner_exists(&mut tx, customer_id).await?;
        }

        merge_vehicle(&mut vehicle, patch);
        let vehicle = tx.update_vehicle(&vehicle).await?;
        tx.commit().await?;

        info!("Vehicle updated successfully with id: {}", id);
        Ok(vehicle)
    }

    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        info!("Deleting vehicle with id: {}", id);

        let mut tx = self.store.begin().await?;
        if !tx.soft_delete_vehicle(id).await? {
            return Err(not_found_error("Vehicle", "id", id));
        }
        tx.commit().await?;

        info!("Vehicle soft deleted successfully with id: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewVehicle {
        NewVehicle {
            license_plate: "abc 1d23".to_string(),
            brand: " Fiat ".to_string(),
            model: "Uno".to_string(),
            year: 2015,
            color: "Branco".to_string(),
            customer_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_validate_new_vehicle_normalizes_plate() {
        let candidate = validate_new_vehicle(&request()).unwrap();
        assert_eq!(candidate.license_plate, "ABC1D23");
        assert_eq!(candidate.brand, "Fiat");
    }

    #[test]
    fn test_year_bounds() {
        for (year, ok) in [(1899, false), (1900, true), (2100, true), (2101, false)] {
            let vehicle = NewVehicle { year, ..request() };
            assert_eq!(validate_new_vehicle(&vehicle).is_ok(), ok, "year {year}");
        }
    }

    #[test]
    fn test_invalid_plate_rejected() {
        let vehicle = NewVehicle {
            license_plate: "1234ABC".to_string(),
            ..request()
        };
        match validate_new_vehicle(&vehicle).unwrap_err() {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("license_plate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_patch_keeps_absent_fields_absent() {
        let patch = VehiclePatch {
            color: Some(" Preto ".to_string()),
            ..Default::default()
        };
        let normalized = validate_vehicle_patch(&patch).unwrap();
        assert_eq!(normalized.color.as_deref(), Some("Preto"));
        assert!(normalized.license_plate.is_none());
        assert!(normalized.year.is_none());
    }
}
