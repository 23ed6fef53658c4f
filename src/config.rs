use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// 32-byte AES key for order PII fields, hex encoded in the environment.
    pub encryption_key: [u8; 32],
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub client_success_url: String,
    pub client_cancel_url: String,
    /// Public base URL uploaded files are served under.
    pub server_url: String,
    pub upload_dir: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        let encryption_key = parse_encryption_key(&env::var("ENCRYPTION_KEY")?)?;
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")?;
        let client_success_url = env::var("CLIENT_SUCCESS_URL")?;
        let client_cancel_url = env::var("CLIENT_CANCEL_URL")?;
        let server_url =
            env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            encryption_key,
            stripe_secret_key,
            stripe_webhook_secret,
            client_success_url,
            client_cancel_url,
            server_url,
            upload_dir,
        })
    }
}

impl SmtpConfig {
    /// Mail delivery is optional: without SMTP credentials the service runs
    /// and order confirmations are skipped with a warning.
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok()?;
        let username = env::var("SMTP_USERNAME").ok()?;
        let password = env::var("SMTP_PASSWORD").ok()?;
        let from = env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());
        Some(Self {
            host,
            username,
            password,
            from,
        })
    }
}

fn parse_encryption_key(raw: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = hex::decode(raw.trim())?;
    let key: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be 32 bytes of hex"))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::parse_encryption_key;

    #[test]
    fn accepts_64_hex_chars() {
        let key = parse_encryption_key(&"ab".repeat(32)).unwrap();
        assert_eq!(key[0], 0xab);
    }

    #[test]
    fn rejects_short_keys() {
        assert!(parse_encryption_key("abcd").is_err());
        assert!(parse_encryption_key("not hex at all").is_err());
    }
}
