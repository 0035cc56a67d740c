use crate::delegation::Delegation;
use crate::types::GatewayError;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Internal redirect target for the downstream proxy
pub const X_ACCEL_REDIRECT: HeaderName = HeaderName::from_static("x-accel-redirect");
/// Signed authorization the proxy forwards to the store
pub const X_AUTHORIZATION: HeaderName = HeaderName::from_static("x-authorization");
/// Signed date the proxy forwards as `x-amz-date`
pub const X_AMZ_DATE: HeaderName = HeaderName::from_static("x-amz-date");
/// File name hint for content disposition at the edge
pub const X_FILENAME: HeaderName = HeaderName::from_static("x-filename");

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(value)
        .map_err(|e| GatewayError::Internal(format!("invalid {} header value: {}", name, e)))
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), GatewayError> {
    let value = header_value(&name, value)?;
    headers.insert(name, value);
    Ok(())
}

/// Turn a delegation into the wire response
///
/// Header and URL delegations produce an empty `200` carrying the internal
/// redirect headers. Stream delegations carry content headers and the object
/// bytes. Header values are validated up front so a bad value fails the
/// request instead of producing a partial response.
pub fn compose(delegation: Delegation) -> Result<Response, GatewayError> {
    let mut headers = HeaderMap::new();

    match delegation {
        Delegation::Header(delegation) => {
            insert(&mut headers, X_ACCEL_REDIRECT, &delegation.redirect)?;
            insert(&mut headers, X_AUTHORIZATION, &delegation.authorization)?;
            insert(&mut headers, X_AMZ_DATE, &delegation.amz_date)?;
            insert(&mut headers, X_FILENAME, &delegation.file_name)?;
            Ok((StatusCode::OK, headers).into_response())
        }
        Delegation::Url(delegation) => {
            insert(&mut headers, X_ACCEL_REDIRECT, &delegation.redirect)?;
            insert(&mut headers, X_FILENAME, &delegation.file_name)?;
            Ok((StatusCode::OK, headers).into_response())
        }
        Delegation::Stream(delegation) => {
            insert(&mut headers, header::CONTENT_TYPE, &delegation.content_type)?;
            insert(
                &mut headers,
                header::CONTENT_DISPOSITION,
                &delegation.content_disposition,
            )?;
            if let Some(size) = delegation.content_length {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
            }
            if let Some(etag) = &delegation.etag {
                insert(&mut headers, header::ETAG, etag)?;
            }
            Ok((
                StatusCode::OK,
                headers,
                Body::from_stream(delegation.body),
            )
                .into_response())
        }
    }
}
