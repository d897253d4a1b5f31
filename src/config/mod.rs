use std::env;

/// Runtime configuration for the admissions backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory uploaded admission documents are stored under (default: "media")
    pub media_root: String,

    /// Maximum size of one uploaded document in bytes (default: 8 MB)
    pub max_upload_size: usize,

    /// JWT secret for staff sessions
    pub jwt_secret: String,

    /// Seed demo departments on startup (default: false)
    pub seed_demo_data: bool,

    /// Allowed CORS origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media_root: "media".to_string(),
            max_upload_size: 8 * 1024 * 1024, // 8 MB
            jwt_secret: "secret".to_string(),
            seed_demo_data: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            media_root: env::var("MEDIA_ROOT").unwrap_or(default.media_root),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),

            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.seed_demo_data),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (demo data, relaxed secret)
    pub fn development() -> Self {
        Self {
            seed_demo_data: true,
            ..Self::default()
        }
    }
}
