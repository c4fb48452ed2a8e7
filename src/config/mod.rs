use std::env;

/// Runtime configuration for the content API
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (default: 3000)
    pub port: u16,

    /// Destination folder for uploaded images, fixed per deployment
    /// (default: "case-studies")
    pub upload_folder: String,

    /// Maximum size of a single uploaded image in bytes (default: 10 MB)
    pub max_upload_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upload_folder: "case-studies".to_string(),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_folder: env::var("UPLOAD_FOLDER").unwrap_or(default.upload_folder),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_folder, "case-studies");
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_from_env_fallback() {
        unsafe { env::remove_var("UPLOAD_FOLDER") };
        unsafe { env::remove_var("MAX_UPLOAD_SIZE") };
        let config = AppConfig::from_env();
        let default_config = AppConfig::default();
        assert_eq!(config.upload_folder, default_config.upload_folder);
        assert_eq!(config.max_upload_size, default_config.max_upload_size);
    }
}
