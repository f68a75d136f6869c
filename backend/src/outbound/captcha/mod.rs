//! CAPTCHA verification adapters.

mod recaptcha;

pub use recaptcha::{RECAPTCHA_VERIFY_ENDPOINT, RecaptchaVerifier};
