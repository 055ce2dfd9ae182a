//! Configuration module
//!
//! Configuration is read once from the process environment at startup and then
//! passed explicitly into the service and handler layers. Nothing reads the
//! environment after `Config::from_env` returns.

use std::env;
use std::str::FromStr;

const SERVER_PORT: u16 = 8080;
const TOKEN_TTL_SECS: i64 = 300;
const MAX_UPLOAD_SIZE_MB: usize = 20;
const MIN_JWT_SECRET_LEN: usize = 32;
const MAX_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

pub const DEFAULT_ROBOFLOW_UPLOAD_URL: &str =
    "https://api.roboflow.com/windsichterwalnusskernschale/windsichterwalnusskernschale/5/upload";
pub const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// How upload failures are presented to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorPresentation {
    /// Every failure renders as `401 Unauthorized` with no diagnostic detail.
    #[default]
    Uniform,
    /// Each error kind renders with its own status and a JSON error body.
    Detailed,
}

impl FromStr for ErrorPresentation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(ErrorPresentation::Uniform),
            "detailed" => Ok(ErrorPresentation::Detailed),
            other => Err(anyhow::anyhow!(
                "ERROR_RESPONSE_MODE must be 'uniform' or 'detailed', got '{}'",
                other
            )),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub environment: String,
}

/// Gateway configuration: server settings plus the downstream collaborators.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base: BaseConfig,
    // Roboflow intake
    pub roboflow_key: String,
    pub roboflow_upload_url: String,
    // Google Drive file store
    pub drive_folder: String,
    pub google_service_account_json: String,
    pub drive_upload_url: String,
    pub drive_scope: String,
    // Upload handling
    pub max_upload_size_bytes: usize,
    pub error_presentation: ErrorPresentation,
    pub sanitize_labels: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatewayConfig>);

impl Config {
    fn as_gateway(&self) -> &GatewayConfig {
        &self.0
    }

    /// Load `.env` (if present) and read configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = GatewayConfig::from_source(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gateway().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_gateway().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_gateway().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gateway().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_gateway().base.jwt_secret
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.as_gateway().base.token_ttl_secs
    }

    pub fn environment(&self) -> &str {
        &self.as_gateway().base.environment
    }

    pub fn roboflow_key(&self) -> &str {
        &self.as_gateway().roboflow_key
    }

    pub fn roboflow_upload_url(&self) -> &str {
        &self.as_gateway().roboflow_upload_url
    }

    pub fn drive_folder(&self) -> &str {
        &self.as_gateway().drive_folder
    }

    pub fn google_service_account_json(&self) -> &str {
        &self.as_gateway().google_service_account_json
    }

    pub fn drive_upload_url(&self) -> &str {
        &self.as_gateway().drive_upload_url
    }

    pub fn drive_scope(&self) -> &str {
        &self.as_gateway().drive_scope
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_gateway().max_upload_size_bytes
    }

    pub fn error_presentation(&self) -> ErrorPresentation {
        self.as_gateway().error_presentation
    }

    pub fn sanitize_labels(&self) -> bool {
        self.as_gateway().sanitize_labels
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn required<F>(lookup: &F, key: &str) -> Result<String, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

impl GatewayConfig {
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            token_ttl_secs: lookup("TOKEN_TTL_SECS")
                .unwrap_or_else(|| TOKEN_TTL_SECS.to_string())
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("TOKEN_TTL_SECS must be a whole number of seconds"))?,
            environment,
        };

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let error_presentation = match lookup("ERROR_RESPONSE_MODE") {
            Some(mode) => mode.parse()?,
            None => ErrorPresentation::default(),
        };

        Ok(GatewayConfig {
            base,
            roboflow_key: required(&lookup, "ROBOFLOW_KEY")?,
            roboflow_upload_url: lookup("ROBOFLOW_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_ROBOFLOW_UPLOAD_URL.to_string()),
            drive_folder: required(&lookup, "DRIVE_FOLDER")?,
            google_service_account_json: required(&lookup, "GOOGLE_SERVICE_ACCOUNT_JSON")?,
            drive_upload_url: lookup("GOOGLE_DRIVE_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_DRIVE_UPLOAD_URL.to_string()),
            drive_scope: lookup("GOOGLE_DRIVE_SCOPE")
                .unwrap_or_else(|| DEFAULT_DRIVE_SCOPE.to_string()),
            max_upload_size_bytes,
            error_presentation,
            sanitize_labels: lookup("SANITIZE_LABELS")
                .map(|s| s.trim().to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            if is_production_name(&self.base.environment) {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} characters long in production",
                    MIN_JWT_SECRET_LEN
                ));
            }
            tracing::warn!(
                min_len = MIN_JWT_SECRET_LEN,
                "JWT_SECRET is shorter than recommended"
            );
        }

        if self.base.token_ttl_secs <= 0 || self.base.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(anyhow::anyhow!(
                "TOKEN_TTL_SECS must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        for (key, url) in [
            ("ROBOFLOW_UPLOAD_URL", &self.roboflow_upload_url),
            ("GOOGLE_DRIVE_UPLOAD_URL", &self.drive_upload_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", key));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef".to_string()),
            ("ROBOFLOW_KEY", "rf_key".to_string()),
            ("DRIVE_FOLDER", "folder123".to_string()),
            ("GOOGLE_SERVICE_ACCOUNT_JSON", "{}".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, anyhow::Error> {
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.server_port(), 8080);
        assert_eq!(config.token_ttl_secs(), 300);
        assert_eq!(config.roboflow_upload_url(), DEFAULT_ROBOFLOW_UPLOAD_URL);
        assert_eq!(config.drive_scope(), DEFAULT_DRIVE_SCOPE);
        assert_eq!(config.max_upload_size_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.error_presentation(), ErrorPresentation::Uniform);
        assert!(!config.sanitize_labels());
        assert_eq!(config.cors_origins().to_vec(), vec!["*".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_secret_rejected() {
        let mut vars = base_env();
        vars.remove("ROBOFLOW_KEY");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("ROBOFLOW_KEY"));
    }

    #[test]
    fn blank_secret_rejected() {
        let mut vars = base_env();
        vars.insert("DRIVE_FOLDER", "   ".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut vars = base_env();
        vars.insert("ENVIRONMENT", "production".to_string());
        assert!(load(&vars).is_err());

        vars.insert("CORS_ORIGINS", "https://lab.example.com".to_string());
        let config = load(&vars).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn short_secret_only_fatal_in_production() {
        let mut vars = base_env();
        vars.insert("JWT_SECRET", "short".to_string());
        assert!(load(&vars).unwrap().validate().is_ok());

        vars.insert("APP_ENV", "prod".to_string());
        vars.insert("CORS_ORIGINS", "https://lab.example.com".to_string());
        assert!(load(&vars).unwrap().validate().is_err());
    }

    #[test]
    fn error_mode_parsed() {
        let mut vars = base_env();
        vars.insert("ERROR_RESPONSE_MODE", "Detailed".to_string());
        assert_eq!(
            load(&vars).unwrap().error_presentation(),
            ErrorPresentation::Detailed
        );

        vars.insert("ERROR_RESPONSE_MODE", "verbose".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn sanitize_labels_flag() {
        let mut vars = base_env();
        vars.insert("SANITIZE_LABELS", "TRUE".to_string());
        assert!(load(&vars).unwrap().sanitize_labels());
    }

    #[test]
    fn malformed_token_ttl_rejected() {
        let mut vars = base_env();
        vars.insert("TOKEN_TTL_SECS", "five minutes".to_string());
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL_SECS"));
    }

    #[test]
    fn token_ttl_bounded() {
        let mut vars = base_env();
        vars.insert("TOKEN_TTL_SECS", "0".to_string());
        assert!(load(&vars).unwrap().validate().is_err());

        vars.insert("TOKEN_TTL_SECS", i64::MAX.to_string());
        assert!(load(&vars).unwrap().validate().is_err());

        vars.insert("TOKEN_TTL_SECS", "86400".to_string());
        assert!(load(&vars).unwrap().validate().is_ok());
    }

    #[test]
    fn upload_size_overflow_rejected() {
        let mut vars = base_env();
        vars.insert("MAX_UPLOAD_SIZE_MB", usize::MAX.to_string());
        assert!(load(&vars).is_err());

        vars.insert("MAX_UPLOAD_SIZE_MB", "lots".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn non_http_url_rejected() {
        let mut vars = base_env();
        vars.insert("ROBOFLOW_UPLOAD_URL", "ftp://example.com".to_string());
        assert!(load(&vars).unwrap().validate().is_err());
    }
}
