use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;

use crate::error::AppError;

/// Extract the bearer token from the Authorization header
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Reject the request unless it carries `expected` as its bearer token.
///
/// An unset or empty secret rejects every caller.
pub fn authorize(req: &HttpRequest, expected: Option<&str>) -> Result<(), AppError> {
    let expected = expected.filter(|secret| !secret.is_empty()).ok_or(AppError::Unauthorized)?;

    match bearer_token(req) {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
