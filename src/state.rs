//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::RecordStore;
use crate::services::{CustomerService, VehicleService};

pub struct AppState<S> {
    pub config: Arc<EnvironmentConfig>,
    pub customers: Arc<CustomerService<S>>,
    pub vehicles: Arc<VehicleService<S>>,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(store: S, config: EnvironmentConfig) -> Self {
        Self {
            config: Arc::new(config),
            customers: Arc::new(CustomerService::new(store.clone())),
            vehicles: Arc::new(VehicleService::new(store)),
        }
    }
}

// Manual: derive exigiría `S: Clone` aunque solo se clonan los Arc
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            customers: Arc::clone(&self.customers),
            vehicles: Arc::clone(&self.vehicles),
        }
    }
}
