//! OTP flow integration tests
//!
//! Reference issuing, delivery, verification, rate limiting and the
//! password-reset flow built on top of them.

#[macro_use]
mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{TestApp, TEST_PASSWORD};
use dayplanner::backend::store::Store;
use dayplanner::shared::planner::{OtpChannel, OtpRecord};

/// Ask for a reference, then have the code mailed for it
async fn send_code(app: &TestApp, email: &str, record: &str) -> String {
    let route = if record == "1" { "/auth/IdentityOTP" } else { "/auth/resetpasswordOTP" };
    let (status, body) = app.post(route, json!({ "email": email })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let reference = body["ref"].as_str().unwrap().to_string();

    let (status, body) = app
        .post("/auth/sendemail", json!({ "email": email, "reference": reference, "record": record }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    reference
}

fn verify_body(email: &str, reference: &str, otp: &str, record: &str) -> Value {
    json!({ "email": email, "ref": reference, "otp": otp, "record": record })
}

#[tokio::test]
async fn test_identity_reference_is_alphanumeric() {
    let app = TestApp::new();
    app.create_user("ref@example.com", false).await;

    let (status, body) = app.post("/auth/IdentityOTP", json!({ "email": "ref@example.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OTP has been sent to your email identity");
    let reference = body["ref"].as_str().unwrap();
    assert_eq!(reference.len(), 10);
    assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));

    // Nothing is mailed until sendemail
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_unregistered_email_is_rejected() {
    let app = TestApp::new();

    assert_error!(
        app.post("/auth/IdentityOTP", json!({ "email": "nobody@example.com" })).await,
        StatusCode::BAD_REQUEST,
        "Email is not already registered"
    );
    assert_error!(
        app.post("/auth/resendotp", json!({ "email": "nobody@example.com", "record": "1" })).await,
        StatusCode::BAD_REQUEST,
        "Email is not already registered"
    );
}

#[tokio::test]
async fn test_verify_marks_account_verified_and_returns_tokens() {
    let app = TestApp::new();
    let user = app.create_user("verify@example.com", false).await;

    let reference = send_code(&app, "verify@example.com", "1").await;
    let mail = app.mailer.last_to("verify@example.com").await.unwrap();
    assert_contains!(mail.html, reference.as_str());
    let otp = app.last_otp("verify@example.com").await;
    assert_eq!(otp.len(), 6);

    let (status, body) = app
        .post("/auth/verifyOTP", verify_body("verify@example.com", &reference, &otp, "1"))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "OTP verified successfully");
    let refresh = body["refreshToken"].as_str().unwrap().to_string();
    assert!(body["accessToken"].as_str().is_some());

    let stored = app.store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.is_verified);
    assert!(app.store.find_token_record(user.id).await.unwrap().is_some());

    // The returned refresh token is the stored one
    let (status, _) = app.post_auth("/auth/refresh", json!({}), &refresh).await;
    assert_eq!(status, StatusCode::OK);

    app.sign_in("verify@example.com").await;
}

#[tokio::test]
async fn test_code_is_consumable_once() {
    let app = TestApp::new();
    app.create_user("once@example.com", false).await;

    let reference = send_code(&app, "once@example.com", "1").await;
    let otp = app.last_otp("once@example.com").await;

    let (status, _) = app
        .post("/auth/verifyOTP", verify_body("once@example.com", &reference, &otp, "1"))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_error!(
        app.post("/auth/verifyOTP", verify_body("once@example.com", &reference, &otp, "1")).await,
        StatusCode::BAD_REQUEST,
        "OTP has already been used"
    );
}

#[tokio::test]
async fn test_verify_failures() {
    let app = TestApp::new();
    app.create_user("fail@example.com", false).await;
    let reference = send_code(&app, "fail@example.com", "1").await;
    let otp = app.last_otp("fail@example.com").await;
    let wrong = if otp == "000000" { "111111" } else { "000000" };

    assert_error!(
        app.post("/auth/verifyOTP", verify_body("fail@example.com", "nosuchref0", &otp, "1")).await,
        StatusCode::NOT_FOUND,
        "Invalid reference code"
    );
    assert_error!(
        app.post("/auth/verifyOTP", verify_body("fail@example.com", &reference, wrong, "1")).await,
        StatusCode::BAD_REQUEST,
        "Invalid OTP"
    );
    // The reference belongs to the verify channel only
    assert_error!(
        app.post("/auth/verifyOTP", verify_body("fail@example.com", &reference, &otp, "2")).await,
        StatusCode::NOT_FOUND,
        "Invalid reference code"
    );
    assert_error!(
        app.post("/auth/verifyOTP", verify_body("fail@example.com", &reference, "", "1")).await,
        StatusCode::BAD_REQUEST,
        "Record, Reference and OTP are required"
    );
    assert_error!(
        app.post("/auth/verifyOTP", verify_body("fail@example.com", &reference, &otp, "7")).await,
        StatusCode::BAD_REQUEST,
        "Invalid record code: 7"
    );
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let app = TestApp::new();
    app.create_user("late@example.com", false).await;

    let past = Utc::now() - Duration::minutes(30);
    let record = OtpRecord::new(
        "late@example.com",
        OtpChannel::Verify,
        "oldref0000",
        "123456",
        past,
        Duration::minutes(15),
    );
    app.store.save_otp(record).await.unwrap();

    assert_error!(
        app.post("/auth/verifyOTP", verify_body("late@example.com", "oldref0000", "123456", "1")).await,
        StatusCode::BAD_REQUEST,
        "OTP has expired"
    );
}

#[tokio::test]
async fn test_resend_blocks_after_limit() {
    let app = TestApp::new();
    app.create_user("spam@example.com", false).await;
    let body = json!({ "email": "spam@example.com", "record": "1" });

    for _ in 0..3 {
        let (status, response) = app.post("/auth/resendotp", body.clone()).await;
        assert_eq!(status, StatusCode::OK, "{}", response);
        assert_eq!(response["message"], "OTP has been sent to your email");
    }
    assert_eq!(app.mailer.sent().await.len(), 3);

    assert_error!(
        app.post("/auth/resendotp", body.clone()).await,
        StatusCode::FORBIDDEN,
        "Too many OTP requests. Your email has been blocked temporarily."
    );
    assert_error!(
        app.post("/auth/IdentityOTP", json!({ "email": "spam@example.com" })).await,
        StatusCode::FORBIDDEN,
        "Too many OTP requests. Please try again later."
    );

    // The reset channel is counted separately
    let (status, _) = app
        .post("/auth/resetpasswordOTP", json!({ "email": "spam@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_requests_accepted_once_block_expires() {
    let app = TestApp::new();
    app.create_user("again@example.com", false).await;

    // Three codes issued 11 minutes ago: still valid, and they earned a block
    // that ran out a minute ago
    let issued = Utc::now() - Duration::minutes(11);
    for reference in ["again00001", "again00002", "again00003"] {
        let record = OtpRecord::new(
            "again@example.com",
            OtpChannel::Verify,
            reference,
            "123456",
            issued,
            Duration::minutes(15),
        );
        app.store.save_otp(record).await.unwrap();
    }
    let blocked = app
        .store
        .block_if_over_limit("again@example.com", OtpChannel::Verify, issued, 3, Duration::minutes(10))
        .await
        .unwrap();
    assert!(blocked);

    let (status, body) = app.post("/auth/IdentityOTP", json!({ "email": "again@example.com" })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    // The earlier codes still verify
    let (status, body) = app
        .post("/auth/verifyOTP", verify_body("again@example.com", "again00001", "123456", "1"))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    // Counting starts over: three fresh requests are needed for the next block
    let resend = json!({ "email": "again@example.com", "record": "1" });
    for _ in 0..3 {
        let (status, response) = app.post("/auth/resendotp", resend.clone()).await;
        assert_eq!(status, StatusCode::OK, "{}", response);
    }
    assert_error!(
        app.post("/auth/resendotp", resend).await,
        StatusCode::FORBIDDEN,
        "Too many OTP requests. Your email has been blocked temporarily."
    );
}

#[tokio::test]
async fn test_mail_failure_stores_nothing() {
    let app = TestApp::with_failing_mailer();
    app.create_user("down@example.com", false).await;

    let (_, body) = app.post("/auth/IdentityOTP", json!({ "email": "down@example.com" })).await;
    let reference = body["ref"].as_str().unwrap().to_string();

    assert_error!(
        app.post(
            "/auth/sendemail",
            json!({ "email": "down@example.com", "reference": reference, "record": "1" })
        )
        .await,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to send email"
    );

    let stored = app
        .store
        .find_otp("down@example.com", OtpChannel::Verify, &reference)
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    app.create_user("forgot@example.com", true).await;

    let reference = send_code(&app, "forgot@example.com", "2").await;
    let otp = app.last_otp("forgot@example.com").await;

    // Not verified yet
    assert_error!(
        app.post(
            "/auth/resetpassword",
            json!({ "email": "forgot@example.com", "ref": reference, "password": "new secret" })
        )
        .await,
        StatusCode::FORBIDDEN,
        "OTP verification is required before resetting the password"
    );

    let (status, body) = app
        .post("/auth/verifyOTP", verify_body("forgot@example.com", &reference, &otp, "2"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("accessToken").is_none());

    assert_message!(
        app.post(
            "/auth/resetpassword",
            json!({ "email": "forgot@example.com", "ref": reference, "password": "new secret" })
        )
        .await,
        StatusCode::OK,
        "Password reset successfully"
    );

    // One reset per verified code
    let (status, _) = app
        .post(
            "/auth/resetpassword",
            json!({ "email": "forgot@example.com", "ref": reference, "password": "again" })
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_error!(
        app.post("/auth/signin", json!({ "email": "forgot@example.com", "password": TEST_PASSWORD }))
            .await,
        StatusCode::UNAUTHORIZED,
        "Invalid password"
    );
    let (status, _) = app
        .post("/auth/signin", json!({ "email": "forgot@example.com", "password": "new secret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}
