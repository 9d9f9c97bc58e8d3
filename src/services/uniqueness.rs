//! Control de unicidad
//!
//! Comprueba que un valor de campo único no lo use ya otro registro vivo.
//! En actualizaciones se pasa el id del propio registro para que pueda
//! conservar su valor actual; en creaciones no se excluye nada.

use uuid::Uuid;

use crate::repositories::{StoreTransaction, UniqueField};
use crate::utils::errors::{duplicate_error, AppResult};

/// Decidir si el registro encontrado choca con el candidato
pub fn check_collision(
    field: UniqueField,
    value: &str,
    existing: Option<Uuid>,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    match existing {
        Some(id) if exclude_id != Some(id) => {
            Err(duplicate_error(field.resource(), field.label(), value))
        }
        _ => Ok(()),
    }
}

/// Buscar el valor en el almacenamiento y fallar con `DuplicateValue` si
/// otro registro vivo ya lo usa. Un valor ausente no se comprueba.
pub async fn ensure_unique<T: StoreTransaction>(
    tx: &mut T,
    field: UniqueField,
    value: Option<&str>,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };

    let existing = tx.find_id_by_unique(field, value).await?;
    check_collision(field, value, existing, exclude_id)
}
