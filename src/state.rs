use crate::{
    config::AppConfig,
    crypto::FieldCipher,
    db::{DbPool, OrmConn},
    mail::Mailer,
};

/// Shared clients are constructed once at startup and injected here rather
/// than living as module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub stripe: stripe::Client,
    pub mailer: Option<Mailer>,
    pub cipher: FieldCipher,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        orm: OrmConn,
        config: AppConfig,
        mailer: Option<Mailer>,
    ) -> Self {
        let stripe = stripe::Client::new(config.stripe_secret_key.clone());
        let cipher = FieldCipher::new(config.encryption_key);
        Self {
            pool,
            orm,
            config,
            stripe,
            mailer,
            cipher,
        }
    }
}
