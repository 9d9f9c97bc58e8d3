//! Servicio de customers
//!
//! Alta, actualización parcial y borrado lógico de customers. Cada operación
//! valida todo y comprueba unicidad dentro de su transacción antes de
//! escribir; cualquier error descarta la transacción sin cambios.

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerFilters, CustomerPatch, NewCustomer};
use crate::repositories::{RecordStore, StoreTransaction, UniqueField};
use crate::services::uniqueness::ensure_unique;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{
    digits_only, is_valid_cpf, is_valid_email, is_valid_phone, normalize_email, FieldChecks,
};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 100;

fn check_name(checks: &mut FieldChecks, name: &str) {
    checks.length("name", name, NAME_MIN, NAME_MAX);
}

fn check_cpf(checks: &mut FieldChecks, cpf: &str) {
    checks.check("cpf", is_valid_cpf(cpf), "cpf", "Invalid CPF");
}

fn check_email(checks: &mut FieldChecks, email: &str) {
    checks.check("email", is_valid_email(email), "email", "Invalid email format");
    checks.length("email", email, 1, EMAIL_MAX);
}

fn check_phone(checks: &mut FieldChecks, phone: &str) {
    checks.check("phone", is_valid_phone(phone), "phone", "Invalid phone number");
}

/// Validar un alta completa y devolverla normalizada
pub fn validate_new_customer(request: &NewCustomer) -> AppResult<NewCustomer> {
    let mut checks = FieldChecks::new();
    check_name(&mut checks, &request.name);
    check_cpf(&mut checks, &request.cpf);
    check_email(&mut checks, &request.email);
    check_phone(&mut checks, &request.phone);
    checks.finish()?;

    Ok(NewCustomer {
        name: request.name.trim().to_string(),
        cpf: digits_only(&request.cpf),
        email: normalize_email(&request.email),
        phone: digits_only(&request.phone),
    })
}

/// Validar solo los campos presentes del patch y devolverlos normalizados
pub fn validate_customer_patch(patch: &CustomerPatch) -> AppResult<CustomerPatch> {
    let mut checks = FieldChecks::new();
    if let Some(name) = &patch.name {
        check_name(&mut checks, name);
    }
    if let Some(cpf) = &patch.cpf {
        check_cpf(&mut checks, cpf);
    }
    if let Some(email) = &patch.email {
        check_email(&mut checks, email);
    }
    if let Some(phone) = &patch.phone {
        check_phone(&mut checks, phone);
    }
    checks.finish()?;

    Ok(CustomerPatch {
        name: patch.name.as_deref().map(|n| n.trim().to_string()),
        cpf: patch.cpf.as_deref().map(digits_only),
        email: patch.email.as_deref().map(normalize_email),
        phone: patch.phone.as_deref().map(digits_only),
    })
}

/// Aplicar los campos presentes sobre el registro
fn merge_customer(customer: &mut Customer, patch: CustomerPatch) {
    if let Some(name) = patch.name {
        customer.name = name;
    }
    if let Some(cpf) = patch.cpf {
        customer.cpf = cpf;
    }
    if let Some(email) = patch.email {
        customer.email = email;
    }
    if let Some(phone) = patch.phone {
        customer.phone = phone;
    }
}

/// Servicio de customers sobre cualquier `RecordStore`
#[derive(Debug, Clone)]
pub struct CustomerService<S> {
    store: S,
}

impl<S: RecordStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Customer> {
        debug!("Finding customer by id: {}", id);
        let mut tx = self.store.begin().await?;
        tx.find_customer(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", "id", id))
    }

    pub async fn list(&self, filters: &CustomerFilters) -> AppResult<Vec<Customer>> {
        debug!("Listing customers with filters: {:?}", filters);
        let mut tx = self.store.begin().await?;
        tx.list_customers(filters).await
    }

    pub async fn create(&self, request: NewCustomer) -> AppResult<Customer> {
        info!("Creating new customer");

        let candidate = validate_new_customer(&request)?;

        let mut tx = self.store.begin().await?;
        ensure_unique(&mut tx, UniqueField::CustomerCpf, Some(&candidate.cpf), None).await?;
        ensure_unique(&mut tx, UniqueField::CustomerEmail, Some(&candidate.email), None).await?;

        let customer = tx.insert_customer(&candidate).await?;
        tx.commit().await?;

        info!("Customer created successfully with id: {}", customer.id);
        Ok(customer)
    }

    pub async fn partial_update(&self, id: Uuid, patch: CustomerPatch) -> AppResult<Customer> {
        info!("Partially updating customer with id: {}", id);

        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }

        let mut tx = self.store.begin().await?;
        let mut customer = tx
            .find_customer(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", "id", id))?;

        let patch = validate_customer_patch(&patch)?;

        let cpf = patch.cpf.as_deref().filter(|cpf| *cpf != customer.cpf);
        ensure_unique(&mut tx, UniqueField::CustomerCpf, cpf, Some(id)).await?;

        let email = patch.email.as_deref().filter(|email| *email != customer.email);
        ensure_unique(&mut tx, UniqueField::CustomerEmail, email, Some(id)).await?;

        merge_customer(&mut customer, patch);
        let customer = tx.update_customer(&customer).await?;
        tx.commit().await?;

        info!("Customer updated successfully with id: {}", id);
        Ok(customer)
    }

    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        info!("Deleting customer with id: {}", id);

        let mut tx = self.store.begin().await?;
        if !tx.soft_delete_customer(id).await? {
            return Err(not_found_error("Customer", "id", id));
        }
        tx.commit().await?;

        info!("Customer soft deleted successfully with id: {}", id);
        Ok(())
    }
}
