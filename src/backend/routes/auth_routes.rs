/**
 * Authentication Routes
 *
 * # Routes
 *
 * ## Public
 * - `POST /auth/signup`, `/auth/signin`, `/auth/googlelogin`
 * - `POST /auth/IdentityOTP`, `/auth/resetpasswordOTP`
 * - `POST /auth/sendemail`, `/auth/resendotp`, `/auth/verifyOTP`
 * - `POST /auth/resetpassword`
 * - `POST /auth/captcha`
 *
 * ## Bearer token
 * - `POST /auth/signout` - access token
 * - `POST /auth/refresh` - refresh token
 */

use axum::{middleware, routing::post, Router};

use crate::backend::auth::handlers::{
    google_login, identity_otp, refresh, resend_otp, reset_password, reset_password_otp, send_email, signin,
    signout, signup, verify_captcha, verify_otp,
};
use crate::backend::middleware::{auth_middleware, refresh_token_middleware};
use crate::backend::server::state::AppState;

/// Configure the `/auth` routes
pub fn configure_auth_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/googlelogin", post(google_login))
        .route("/auth/IdentityOTP", post(identity_otp))
        .route("/auth/resetpasswordOTP", post(reset_password_otp))
        .route("/auth/sendemail", post(send_email))
        .route("/auth/resendotp", post(resend_otp))
        .route("/auth/verifyOTP", post(verify_otp))
        .route("/auth/resetpassword", post(reset_password))
        .route("/auth/captcha", post(verify_captcha));

    let signed_in = Router::new()
        .route("/auth/signout", post(signout))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    let refreshing = Router::new()
        .route("/auth/refresh", post(refresh))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), refresh_token_middleware));

    router.merge(public).merge(signed_in).merge(refreshing)
}
