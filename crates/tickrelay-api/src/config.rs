//! Query API settings.

/// Bind settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind, e.g. `0.0.0.0`.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
