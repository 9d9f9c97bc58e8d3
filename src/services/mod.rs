//! Services module
//!
//! Este módulo contiene la lógica de negocio: validación de formato,
//! control de unicidad y mutación de customers y vehículos.

pub mod customer_service;
pub mod uniqueness;
pub mod vehicle_service;

pub use customer_service::CustomerService;
pub use vehicle_service::VehicleService;
