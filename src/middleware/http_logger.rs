use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Instant;

fn should_ignore_path(path: &str) -> bool {
    matches!(path, "/health" | "/health/")
}

fn filter_sensitive_data(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        // Face descriptors are biometric payloads; never log them.
        let sensitive_fields = [
            "password",
            "token",
            "access_token",
            "refresh_token",
            "authorization",
            "secret",
            "api_key",
            "descriptor",
            "face_descriptor",
        ];

        for field in sensitive_fields {
            if map.contains_key(field) {
                map.insert(field.to_string(), Value::String("[REDACTED]".to_string()));
            }
        }
    }
    value
}

fn filter_sensitive_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered_headers = headers.clone();

    let sensitive_headers = ["authorization", "cookie", "x-api-key", "x-auth-token"];

    for header_name in sensitive_headers {
        if let Ok(name) = header_name.parse::<http::HeaderName>() {
            if filtered_headers.contains_key(&name) {
                filtered_headers.insert(name, "[REDACTED]".parse().unwrap());
            }
        }
    }

    filtered_headers
}

pub async fn http_logger(
    req: Request,
    next: Next,
) -> std::result::Result<impl IntoResponse, (StatusCode, String)> {
    let path = req.uri().path().to_string();
    if should_ignore_path(&path) {
        return Ok(next.run(req).await);
    }

    let method = req.method().clone();
    let headers = filter_sensitive_headers(req.headers());

    let (parts, body) = req.into_parts();
    let bytes = body
        .collect()
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read request body: {}", e),
            )
        })?
        .to_bytes();

    if !bytes.is_empty() {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(json) => {
                tracing::debug!(
                    "--> {} {} body={}",
                    method,
                    path,
                    filter_sensitive_data(json)
                );
            }
            Err(_) => {
                tracing::debug!("--> {} {} body=<{} bytes>", method, path, bytes.len());
            }
        }
    } else {
        tracing::debug!("--> {} {} headers={:?}", method, path, headers);
    }

    let req = Request::from_parts(parts, Body::from(Bytes::copy_from_slice(&bytes)));

    let start = Instant::now();
    let response: Response = next.run(req).await;
    let elapsed = start.elapsed();

    let status = response.status();
    if status.is_server_error() {
        tracing::error!("<-- {} {} {} in {:?}", method, path, status, elapsed);
    } else if status.is_client_error() {
        tracing::warn!("<-- {} {} {} in {:?}", method, path, status, elapsed);
    } else {
        tracing::info!("<-- {} {} {} in {:?}", method, path, status, elapsed);
    }

    Ok(response)
}
