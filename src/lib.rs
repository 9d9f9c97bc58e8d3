//! Vehicle Registry
//!
//! Servicio REST de customers y vehículos: validación de CPF, teléfono y
//! placa, unicidad entre registros vivos, actualización parcial y borrado
//! lógico.

pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
