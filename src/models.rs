pub mod auth;
pub mod client;
pub mod dashboard;
pub mod order;
pub mod pricing;
pub mod product;
pub mod quotation;
pub mod settings;

use rust_decimal::Decimal;
use validator::ValidationError;

// Validação compartilhada pelos payloads com valores monetários.
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("validation.negative".into());
        return Err(err);
    }
    Ok(())
}
