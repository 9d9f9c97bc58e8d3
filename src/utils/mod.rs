//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, extracción de
//! JSON y validación de formatos del dominio.

pub mod errors;
pub mod json;
pub mod validation;
