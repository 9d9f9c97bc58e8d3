//! DTOs de la API
//!
//! Respuestas serializadas por la capa web. Los cuerpos de entrada se
//! deserializan directamente a los tipos de `models`.

pub mod api_response;
pub mod customer_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
