use std::env;

/// Signing secrets shorter than this are rejected at startup.
const MIN_SECRET_BYTES: usize = 32;

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

/// Immutable token policy, built once at startup and shared by reference.
///
/// Centralizing the signing secret and expiry durations here means token
/// issuance and validation never read ambient configuration per call, and
/// a missing or too-short secret aborts the process before the server binds.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Access-token lifetime in minutes.
    pub access_token_minutes: i64,
    /// Refresh-token lifetime in days.
    pub refresh_token_days: i64,
}

impl AuthPolicy {
    /// Loads the policy from the environment.
    ///
    /// Returns an error if `JWT_SECRET` is absent or shorter than 32 bytes,
    /// or if a duration override fails to parse. Callers are expected to
    /// treat any error as fatal.
    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(format!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                secret.len()
            ));
        }

        let access_token_minutes = match env::var("ACCESS_TOKEN_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| "ACCESS_TOKEN_MINUTES must be a number".to_string())?,
            Err(_) => 60,
        };
        let refresh_token_days = match env::var("REFRESH_TOKEN_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| "REFRESH_TOKEN_DAYS must be a number".to_string())?,
            Err(_) => 7,
        };

        Ok(Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "taskvault".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "taskvault-api".to_string()),
            access_token_minutes,
            refresh_token_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        // Env-var mutation is process-global; serialize the tests that touch it.
        static ref ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();

        // Set required environment variables
        env::set_var("DATABASE_URL", "postgres://test");
        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");

        let config = Config::from_env();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");

        // Test custom values
        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");

        let config = Config::from_env();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");

        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
    }

    #[test]
    fn test_auth_policy_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();

        env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        env::remove_var("JWT_ISSUER");
        env::remove_var("JWT_AUDIENCE");
        env::remove_var("ACCESS_TOKEN_MINUTES");
        env::remove_var("REFRESH_TOKEN_DAYS");

        let policy = AuthPolicy::from_env().unwrap();
        assert_eq!(policy.issuer, "taskvault");
        assert_eq!(policy.audience, "taskvault-api");
        assert_eq!(policy.access_token_minutes, 60);
        assert_eq!(policy.refresh_token_days, 7);

        env::remove_var("JWT_SECRET");
    }

    #[test]
    fn test_auth_policy_rejects_short_secret() {
        let _guard = ENV_LOCK.lock().unwrap();

        env::set_var("JWT_SECRET", "too-short");
        let err = AuthPolicy::from_env().unwrap_err();
        assert!(err.contains("at least 32 bytes"));

        env::remove_var("JWT_SECRET");
    }

    #[test]
    fn test_auth_policy_rejects_missing_secret() {
        let _guard = ENV_LOCK.lock().unwrap();

        env::remove_var("JWT_SECRET");
        assert!(AuthPolicy::from_env().is_err());
    }
}
