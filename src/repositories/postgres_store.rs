//! Almacenamiento PostgreSQL con SQLx
//!
//! Una `sqlx::Transaction` por operación. La unicidad entre registros vivos
//! la respaldan índices únicos parciales (`WHERE deleted_at IS NULL`); si dos
//! escrituras concurrentes compiten por el mismo valor, la violación del
//! índice se traduce a `AppError::DuplicateValue`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::{RecordStore, StoreTransaction, UniqueField};
use crate::models::customer::{Customer, CustomerFilters, NewCustomer};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilters};
use crate::utils::errors::{duplicate_error, not_found_error, AppError, AppResult};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        cpf VARCHAR(14) NOT NULL,
        email VARCHAR(100) NOT NULL,
        phone VARCHAR(20) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS customers_cpf_live_key ON customers (cpf) WHERE deleted_at IS NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS customers_email_live_key ON customers (email) WHERE deleted_at IS NULL",
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id UUID PRIMARY KEY,
        license_plate VARCHAR(7) NOT NULL,
        brand VARCHAR(50) NOT NULL,
        model VARCHAR(50) NOT NULL,
        year INTEGER NOT NULL CHECK (year BETWEEN 1900 AND 2100),
        color VARCHAR(30) NOT NULL,
        customer_id UUID NOT NULL REFERENCES customers (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS vehicles_license_plate_live_key ON vehicles (license_plate) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS vehicles_customer_id_idx ON vehicles (customer_id)",
];

/// Traducir una violación de índice único a `DuplicateValue`
fn map_write_error(err: sqlx::Error, value_of: impl Fn(UniqueField) -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(field) = db_err.constraint().and_then(UniqueField::from_constraint) {
                return duplicate_error(field.resource(), field.label(), value_of(field));
            }
        }
    }
    AppError::Database(err)
}

/// Patrón ILIKE de subcadena con `%`, `_` y `\\` escapados
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Almacenamiento sobre un pool de PostgreSQL
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear tablas e índices si no existen
    pub async fn ensure_schema(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("✅ Schema de customers/vehicles verificado");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    type Tx = PgStoreTransaction;

    async fn begin(&self) -> AppResult<Self::Tx> {
        let tx = self.pool.begin().await?;
        Ok(PgStoreTransaction { tx })
    }
}

/// Transacción PostgreSQL; se revierte al descartarse sin commit
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn find_customer(&mut self, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(customer)
    }

    async fn list_customers(&mut self, filters: &CustomerFilters) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filters.name.as_deref().map(contains_pattern))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(customers)
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> AppResult<Customer> {
        let created = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, name, cpf, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&customer.name)
        .bind(&customer.cpf)
        .bind(&customer.email)
        .bind(&customer.phone)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(e, |field| match field {
                UniqueField::CustomerEmail => customer.email.clone(),
                _ => customer.cpf.clone(),
            })
        })?;

        debug!("Customer insertado: {}", created.id);
        Ok(created)
    }

    async fn update_customer(&mut self, customer: &Customer) -> AppResult<Customer> {
        let updated = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, cpf = $3, email = $4, phone = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.cpf)
        .bind(&customer.email)
        .bind(&customer.phone)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(e, |field| match field {
                UniqueField::CustomerEmail => customer.email.clone(),
                _ => customer.cpf.clone(),
            })
        })?;

        updated.ok_or_else(|| not_found_error("Customer", "id", customer.id))
    }

    async fn soft_delete_customer(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE customers SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_vehicle(&mut self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(vehicle)
    }

    async fn find_vehicle_by_plate(&mut self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE license_plate = $1 AND deleted_at IS NULL",
        )
        .bind(license_plate)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(vehicle)
    }

    async fn list_vehicles(&mut self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR brand ILIKE $1)
              AND ($2::text IS NULL OR model ILIKE $2)
              AND ($3::text IS NULL OR color ILIKE $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filters.brand.as_deref().map(contains_pattern))
        .bind(filters.model.as_deref().map(contains_pattern))
        .bind(filters.color.as_deref().map(contains_pattern))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(vehicles)
    }

    async fn insert_vehicle(&mut self, vehicle: &NewVehicle) -> AppResult<Vehicle> {
        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, license_plate, brand, model, year, color, customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&vehicle.license_plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.color)
        .bind(vehicle.customer_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, |_| vehicle.license_plate.clone()))?;

        debug!("Vehicle insertado: {}", created.id);
        Ok(created)
    }

    async fn update_vehicle(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET license_plate = $2, brand = $3, model = $4, year = $5, color = $6,
                customer_id = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.color)
        .bind(vehicle.customer_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, |_| vehicle.license_plate.clone()))?;

        updated.ok_or_else(|| not_found_error("Vehicle", "id", vehicle.id))
    }

    async fn soft_delete_vehicle(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE vehicles SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_id_by_unique(&mut self, field: UniqueField, value: &str) -> AppResult<Option<Uuid>> {
        let query = match field {
            UniqueField::CustomerCpf => "SELECT id FROM customers WHERE cpf = $1 AND deleted_at IS NULL",
            UniqueField::CustomerEmail => "SELECT id FROM customers WHERE email = $1 AND deleted_at IS NULL",
            UniqueField::VehicleLicensePlate => {
                "SELECT id FROM vehicles WHERE license_plate = $1 AND deleted_at IS NULL"
            }
        };

        let id = sqlx::query_scalar::<_, Uuid>(query)
            .bind(value)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(id)
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database error {}", self.code)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            if self.code == UNIQUE_VIOLATION {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn db_error(code: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { code, constraint }))
    }

    fn value_of(field: UniqueField) -> String {
        match field {
            UniqueField::CustomerCpf => "52998224725".to_string(),
            UniqueField::CustomerEmail => "maria@example.com".to_string(),
            UniqueField::VehicleLicensePlate => "ABC1D23".to_string(),
        }
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_value() {
        match map_write_error(db_error("23505", Some("customers_email_live_key")), value_of) {
            AppError::DuplicateValue { resource, field, value } => {
                assert_eq!(resource, "Customer");
                assert_eq!(field, "email");
                assert_eq!(value, "maria@example.com");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = map_write_error(db_error("23505", Some("vehicles_license_plate_live_key")), value_of);
        assert_eq!(err.to_string(), "Vehicle with license plate ABC1D23 already exists");

        let err = map_write_error(db_error("23505", Some("customers_cpf_live_key")), value_of);
        assert_eq!(err.to_string(), "Customer with CPF 52998224725 already exists");
    }

    #[test]
    fn test_other_database_errors_stay_database_errors() {
        let cases = [
            db_error("22001", None),
            db_error("23503", Some("vehicles_customer_id_fkey")),
            db_error("23505", Some("customers_pkey")),
            db_error("23505", None),
        ];
        for err in cases {
            assert!(matches!(map_write_error(err, value_of), AppError::Database(_)));
        }

        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound, value_of),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("fiat"), "%fiat%");
        assert_eq!(contains_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
