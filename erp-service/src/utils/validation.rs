use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// JSON object body that has passed `validator` checks. Malformed JSON or a
/// non-object body is a 400, failed field checks are a 422 carrying the
/// per-field messages.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;

        // Arrays would otherwise fill struct fields positionally.
        if !body.is_object() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Json parse error: expected a JSON object"
            )));
        }

        let value = serde_json::from_value::<T>(body)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Rejects empty or whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("This field is required"));
        return Err(err);
    }
    Ok(())
}
