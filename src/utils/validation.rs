//! Utilidades de validación
//!
//! Validadores de formato del dominio (CPF, teléfono, placa) y helpers
//! para acumular errores por campo con `validator::ValidationErrors`.
//!
//! Los validadores de formato son predicados puros: nunca fallan ni hacen
//! I/O, una entrada malformada simplemente devuelve `false`.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub const MIN_VEHICLE_YEAR: i32 = 1900;
pub const MAX_VEHICLE_YEAR: i32 = 2100;

lazy_static! {
    /// Formato antiguo: ABC1234
    static ref LEGACY_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9]{4}$").unwrap();
    /// Formato Mercosur: ABC1D23
    static ref MERCOSUL_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z][0-9]{2}$").unwrap();
}

/// Extraer solo los dígitos ASCII de un string
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizar una placa: sin espacios y en mayúsculas
pub fn normalize_license_plate(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Normalizar un email para comparación y almacenamiento
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let first_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}

/// Validar un CPF (con o sin puntuación)
pub fn is_valid_cpf(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }

    // 000.000.000-00, 111.111.111-11, ... pasan el cálculo pero no son válidos
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    cpf_check_digit(&digits[..9]) == digits[9] && cpf_check_digit(&digits[..10]) == digits[10]
}

/// Validar un teléfono brasileño: DDD + 8 dígitos, o DDD + 9 + 8 dígitos
pub fn is_valid_phone(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    let digits = digits_only(value);
    if digits.len() != 10 && digits.len() != 11 {
        return false;
    }

    let area_code: u32 = match digits[..2].parse() {
        Ok(code) => code,
        Err(_) => return false,
    };
    if !(11..=99).contains(&area_code) {
        return false;
    }

    digits.len() == 10 || digits.as_bytes()[2] == b'9'
}

/// Validar una placa en formato antiguo o Mercosur
pub fn is_valid_license_plate(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    let plate = normalize_license_plate(value);
    if plate.chars().count() != 7 {
        return false;
    }

    LEGACY_PLATE.is_match(&plate) || MERCOSUL_PLATE.is_match(&plate)
}

/// Validar forma básica de email
pub fn is_valid_email(value: &str) -> bool {
    !value.trim().is_empty() && validator::validate_email(value.trim())
}

/// Crear un `ValidationError` con mensaje legible
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Acumulador de errores de validación por campo.
///
/// Todas las comprobaciones de una operación se registran aquí antes de
/// tocar el almacenamiento, de modo que el cliente recibe todos los campos
/// inválidos en una sola respuesta.
#[derive(Debug)]
pub struct FieldChecks {
    errors: ValidationErrors,
}

impl Default for FieldChecks {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldChecks {
    pub fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    /// Registrar un error si `valid` es falso
    pub fn check(&mut self, field: &'static str, valid: bool, code: &'static str, message: &'static str) {
        if !valid {
            self.errors.add(field, field_error(code, message));
        }
    }

    /// Registrar un error si el texto (sin espacios extremos) no tiene longitud en [min, max]
    pub fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            let mut error = ValidationError::new("length");
            error.add_param("min".into(), &min);
            error.add_param("max".into(), &max);
            error.add_param("actual".into(), &len);
            self.errors.add(field, error);
        }
    }

    /// Registrar un error si el valor está fuera de [min, max]
    pub fn range(&mut self, field: &'static str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            let mut error = ValidationError::new("range");
            error.add_param("min".into(), &min);
            error.add_param("max".into(), &max);
            error.add_param("actual".into(), &value);
            self.errors.add(field, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convertir en resultado: `Err` si hubo algún error registrado
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cpf() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("111.444.777-35"));
        assert!(is_valid_cpf("  111 444 777 35 "));
    }

    #[test]
    fn test_cpf_check_digit_corruption() {
        for d in 0..=9 {
            if d != 2 {
                assert!(!is_valid_cpf(&format!("529982247{}5", d)));
            }
            if d != 5 {
                assert!(!is_valid_cpf(&format!("5299822472{}", d)));
            }
        }
    }

    #[test]
    fn test_cpf_repeated_digits() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert!(!is_valid_cpf(&cpf), "{} should be rejected", cpf);
        }
    }

    #[test]
    fn test_cpf_malformed() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("   "));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529982247251"));
        assert!(!is_valid_cpf("abc.def.ghi-jk"));
    }

    #[test]
    fn test_check_digit_rolls_over_to_zero() {
        // suma % 11 < 2 => dígito 0
        assert!(is_valid_cpf("123.456.789-09"));
    }

    #[test]
    fn test_valid_phone() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("(11) 3456-7890"));
        assert!(is_valid_phone("99987654321"));
        assert!(is_valid_phone("1134567890"));
    }

    #[test]
    fn test_invalid_phone() {
        assert!(!is_valid_phone("(11) 88765-4321"));
        assert!(!is_valid_phone("(00) 98765-4321"));
        assert!(!is_valid_phone("(10) 3456-7890"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("119876543210"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("  "));
    }

    #[test]
    fn test_valid_license_plate() {
        assert!(is_valid_license_plate("ABC1234"));
        assert!(is_valid_license_plate("abc1d23"));
        assert!(is_valid_license_plate("ABC 1D23"));
        assert!(is_valid_license_plate(" abc 1234 "));
    }

    #[test]
    fn test_invalid_license_plate() {
        assert!(!is_valid_license_plate("ABC123"));
        assert!(!is_valid_license_plate("1234ABC"));
        assert!(!is_valid_license_plate("ABCD123"));
        assert!(!is_valid_license_plate("ABC-1234"));
        assert!(!is_valid_license_plate("ABC12D3"));
        assert!(!is_valid_license_plate(""));
        assert!(!is_valid_license_plate("ÁBC1234"));
    }

    #[test]
    fn test_normalizers() {
        assert_eq!(normalize_license_plate(" abc 1d23 "), "ABC1D23");
        assert_eq!(digits_only("(11) 98765-4321"), "11987654321");
        assert_eq!(normalize_email("  Maria@Example.COM "), "maria@example.com");
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("maria@example.com"));
        assert!(!is_valid_email("maria.example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_field_checks() {
        let mut checks = FieldChecks::new();
        checks.length("name", "Jo", 3, 100);
        checks.range("year", 1899, MIN_VEHICLE_YEAR, MAX_VEHICLE_YEAR);
        checks.check("cpf", true, "cpf", "Invalid CPF");
        let errors = checks.finish().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("year"));
        assert!(!fields.contains_key("cpf"));

        let mut checks = FieldChecks::new();
        checks.range("year", 2100, MIN_VEHICLE_YEAR, MAX_VEHICLE_YEAR);
        assert!(checks.is_empty());
        assert!(checks.finish().is_ok());
    }
}
