//! reCAPTCHA Enterprise
//!
//! Client for the assessment REST endpoint
//! `POST {base_url}/v1/projects/{project}/assessments?key={api_key}`.
//!
//! An assessment is accepted when Google reports the token valid and, if the
//! caller named an expected action, the token's action matches it. Rejected
//! tokens are `Ok(None)`; only transport and decoding failures are errors.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::RecaptchaSettings;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("reCAPTCHA request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("reCAPTCHA returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Facts about the caller forwarded with the token
#[derive(Debug, Clone, Default)]
pub struct AssessmentEvent<'a> {
    pub token: &'a str,
    pub expected_action: &'a str,
    pub user_ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Outcome of an accepted assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub score: f32,
    pub action: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentRequest<'a> {
    event: EventBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody<'a> {
    token: &'a str,
    site_key: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    expected_action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_ip_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentResponse {
    #[serde(default)]
    token_properties: Option<TokenProperties>,
    #[serde(default)]
    risk_analysis: Option<RiskAnalysis>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenProperties {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    invalid_reason: Option<String>,
    #[serde(default)]
    action: String,
}

#[derive(Debug, Default, Deserialize)]
struct RiskAnalysis {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    reasons: Vec<String>,
}

pub struct RecaptchaClient {
    http: Client,
    settings: RecaptchaSettings,
}

impl RecaptchaClient {
    pub fn new(settings: RecaptchaSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    fn assessments_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/assessments",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.project_id
        )
    }

    /// Create an assessment; `None` when the token is invalid or the action differs
    pub async fn assess(&self, event: AssessmentEvent<'_>) -> Result<Option<AssessmentResult>, CaptchaError> {
        let body = AssessmentRequest {
            event: EventBody {
                token: event.token,
                site_key: &self.settings.site_key,
                expected_action: event.expected_action,
                user_ip_address: event.user_ip,
                user_agent: event.user_agent,
            },
        };

        let response = self
            .http
            .post(self.assessments_url())
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CaptchaError::Status { status, body });
        }

        let assessment: AssessmentResponse = response.json().await?;

        let Some(properties) = assessment.token_properties else {
            tracing::warn!("reCAPTCHA response carried no token properties");
            return Ok(None);
        };
        if !properties.valid {
            tracing::warn!(
                "reCAPTCHA token invalid: {}",
                properties.invalid_reason.as_deref().unwrap_or("unknown")
            );
            return Ok(None);
        }
        if !event.expected_action.is_empty() && properties.action != event.expected_action {
            tracing::warn!(
                "reCAPTCHA action mismatch: expected {}, got {}",
                event.expected_action,
                properties.action
            );
            return Ok(None);
        }

        let risk = assessment.risk_analysis.unwrap_or_default();
        Ok(Some(AssessmentResult {
            score: risk.score,
            action: properties.action,
            reasons: risk.reasons,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RecaptchaClient {
        RecaptchaClient::new(RecaptchaSettings {
            project_id: "planner-test".into(),
            site_key: "site-key".into(),
            api_key: "api-key".into(),
            base_url: server.uri(),
        })
    }

    fn event<'a>(token: &'a str, action: &'a str) -> AssessmentEvent<'a> {
        AssessmentEvent {
            token,
            expected_action: action,
            user_ip: Some("203.0.113.7"),
            user_agent: Some("test-agent"),
        }
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/planner-test/assessments"))
            .and(query_param("key", "api-key"))
            .and(body_partial_json(serde_json::json!({
                "event": { "token": "tok", "siteKey": "site-key", "expectedAction": "login" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tokenProperties": { "valid": true, "action": "login" },
                "riskAnalysis": { "score": 0.9, "reasons": ["LOW_CONFIDENCE_SCORE"] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).assess(event("tok", "login")).await.unwrap().unwrap();
        assert_eq!(result.action, "login");
        assert!((result.score - 0.9).abs() < f32::EPSILON);
        assert_eq!(result.reasons, vec!["LOW_CONFIDENCE_SCORE".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tokenProperties": { "valid": false, "invalidReason": "EXPIRED" }
            })))
            .mount(&server)
            .await;

        assert!(client(&server).assess(event("tok", "login")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_action_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tokenProperties": { "valid": true, "action": "signup" }
            })))
            .mount(&server)
            .await;

        assert!(client(&server).assess(event("tok", "login")).await.unwrap().is_none());
        assert!(client(&server).assess(event("tok", "")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client(&server).assess(event("tok", "login")).await.unwrap_err();
        assert!(matches!(err, CaptchaError::Status { status: 403, .. }));
    }
}
