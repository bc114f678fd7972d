//! Request body extractor with field validation
//!
//! Malformed JSON is answered with 400 (415 without a JSON content type),
//! field rule violations with 422. Both use the `ApiResponse` envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{ApiError, ApiResponse};

/// `Json<T>` that also runs `T::validate()`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(malformed_body)?;
        value.validate().map_err(invalid_fields)?;
        Ok(ValidatedJson(value))
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    debug!(reason = %rejection.body_text(), "Rejected request body");
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiResponse::error(format!(
            "malformed request body: {}",
            rejection.body_text()
        ))),
    )
}

fn invalid_fields(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    let problems: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| describe(&field.to_string(), e)))
        .collect();
    let message = if problems.is_empty() {
        "request body failed validation".to_string()
    } else {
        problems.join("; ")
    };

    debug!(%message, "Request body failed validation");
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiResponse::error(message)))
}

/// Human text for one rule violation. Explicit rule messages win; otherwise
/// the text is built from the rule's bounds.
fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let bound = |name: &str| error.params.get(name).map(|v| v.to_string());
    match (error.code.as_ref(), bound("min"), bound("max")) {
        ("range", Some(min), Some(max)) => format!("{} must be between {} and {}", field, min, max),
        ("range", Some(min), None) => format!("{} must be at least {}", field, min),
        ("range", None, Some(max)) => format!("{} must be at most {}", field, max),
        ("length", Some(min), Some(max)) => {
            format!("{} must be {} to {} characters", field, min, max)
        }
        ("length", None, Some(max)) => format!("{} must be at most {} characters", field, max),
        ("length", Some(min), None) => format!("{} must be at least {} characters", field, min),
        ("email", _, _) => format!("{} must be a valid email address", field),
        (code, _, _) => format!("{} is invalid ({})", field, code),
    }
}
