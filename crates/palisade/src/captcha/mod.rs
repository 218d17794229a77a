//! Captcha lifecycle: generation, expiring storage, one-time verification.
//!
//! The service itself is stateless; the stored answer is the only mutable
//! state and lives in the injected [`ExpiringStore`]. A challenge is
//! consumed by its first verification attempt, matching or not, and
//! otherwise evicted by its TTL.

mod render;

pub use render::CodeRenderer;

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use palisade_common::{AdminError, CaptchaChallenge};
use rand::Rng;
use uuid::Uuid;

use crate::config::CaptchaConfig;
use crate::store::ExpiringStore;

/// Captcha code alphabet: uppercase letters and digits.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Captcha generation and verification service.
pub struct CaptchaService {
    config: CaptchaConfig,
    renderer: CodeRenderer,
    store: Arc<dyn ExpiringStore>,
}

impl CaptchaService {
    pub fn new(config: CaptchaConfig, store: Arc<dyn ExpiringStore>) -> Result<Self, AdminError> {
        let renderer = CodeRenderer::new(config.width, config.height)?;
        Ok(Self {
            config,
            renderer,
            store,
        })
    }

    /// Generate a new challenge: mint a code and an identifier, store the
    /// answer with the configured TTL, render the image.
    ///
    /// The store write happens before rendering, so a write failure never
    /// hands out an image without a backing answer.
    pub async fn generate(&self) -> Result<CaptchaChallenge, AdminError> {
        let code = self.random_code();
        let id = Uuid::new_v4().simple().to_string();

        self.store
            .set_with_expiry(&self.key_for(&id), self.config.expire_secs, &code)
            .await?;

        let png = self.renderer.render(&code)?;
        let image = STANDARD.encode(&png);

        tracing::debug!(captcha_id = %id, "Generated captcha challenge");

        Ok(CaptchaChallenge { id, image })
    }

    /// Verify a candidate answer against a previously issued challenge.
    ///
    /// The stored answer is consumed by the first attempt regardless of the
    /// outcome; a missing, expired, or already-consumed identifier reads as
    /// a plain mismatch. Store failures propagate instead of degrading into
    /// `false`, so callers can tell "wrong code" from "store down".
    pub async fn verify(&self, id: &str, candidate: &str) -> Result<bool, AdminError> {
        if !is_valid_id(id) {
            return Err(AdminError::InvalidInput(format!(
                "malformed captcha id: {id:?}"
            )));
        }

        match self.store.fetch_and_delete(&self.key_for(id)).await? {
            Some(code) => {
                let matched = code.eq_ignore_ascii_case(candidate);
                tracing::debug!(captcha_id = %id, matched, "Captcha verification attempt");
                Ok(matched)
            }
            None => Ok(false),
        }
    }

    fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.config.key_prefix, id)
    }

    fn random_code(&self) -> String {
        let mut rng = rand::rng();
        (0..self.config.code_length)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

/// Identifiers are 128-bit values in 32-character hex form.
fn is_valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit())
}
