/**
 * Application State
 *
 * `AppState` is cloned into every handler. Each field is an `Arc`, so a
 * clone only bumps reference counts.
 *
 * # Fields
 *
 * - `store` - persistence, PostgreSQL or in-memory
 * - `tokens` - JWT issuing and verification
 * - `otp` - OTP generation, rate limiting and delivery
 * - `captcha` - reCAPTCHA client, `None` when not configured
 * - `config` - the configuration the server was started with
 */

use std::sync::Arc;

use crate::backend::auth::otp::OtpService;
use crate::backend::auth::sessions::TokenService;
use crate::backend::captcha::RecaptchaClient;
use crate::backend::mail::Mailer;
use crate::backend::store::Store;
use crate::shared::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub otp: Arc<OtpService>,
    pub captcha: Option<Arc<RecaptchaClient>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the services for `config` on top of `store` and `mailer`
    pub fn new(config: AppConfig, store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.tokens, config.bcrypt_cost));
        let otp = Arc::new(OtpService::new(store.clone(), mailer, config.otp));
        let captcha = config
            .recaptcha
            .clone()
            .map(|settings| Arc::new(RecaptchaClient::new(settings)));

        Self {
            store,
            tokens,
            otp,
            captcha,
            config: Arc::new(config),
        }
    }
}
