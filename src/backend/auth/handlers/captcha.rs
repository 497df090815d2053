/**
 * Captcha Handler
 *
 * POST /auth/captcha
 *
 * Forwards a reCAPTCHA token to the assessment API together with the
 * caller's IP and user agent. Every outcome, including a malformed body,
 * answers with the captcha body shape `{success, score?, action?, reasons?,
 * message}` so the client has one format to read.
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::Json,
};

use crate::backend::auth::handlers::types::{CaptchaRequest, CaptchaResponse};
use crate::backend::captcha::AssessmentEvent;
use crate::backend::error::INTERNAL_MESSAGE;
use crate::backend::server::state::AppState;

/// First `X-Forwarded-For` hop, else `X-Real-IP`
fn client_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
}

pub async fn verify_captcha(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CaptchaRequest>, JsonRejection>,
) -> (StatusCode, Json<CaptchaResponse>) {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected captcha body: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(CaptchaResponse::failure("Invalid request format")));
        }
    };

    if request.token.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(CaptchaResponse::failure("Token is required")));
    }

    let Some(client) = app_state.captcha.as_ref() else {
        tracing::error!("reCAPTCHA is not configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(CaptchaResponse::failure(INTERNAL_MESSAGE)));
    };

    let event = AssessmentEvent {
        token: &request.token,
        expected_action: &request.action,
        user_ip: client_ip(&headers),
        user_agent: headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
    };

    match client.assess(event).await {
        Ok(Some(result)) => {
            tracing::info!("Captcha accepted: action={} score={}", result.action, result.score);
            (
                StatusCode::OK,
                Json(CaptchaResponse {
                    success: true,
                    score: Some(result.score),
                    action: Some(result.action),
                    reasons: Some(result.reasons),
                    message: "Captcha verified successfully".to_string(),
                }),
            )
        }
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(CaptchaResponse::failure("reCAPTCHA verification failed")),
        ),
        Err(e) => {
            tracing::error!("reCAPTCHA assessment failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(CaptchaResponse::failure(INTERNAL_MESSAGE)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), Some("198.51.100.2"));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers), Some("203.0.113.7"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
