//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL, junto con los datos de alta y actualización parcial.

pub mod customer;
pub mod vehicle;
