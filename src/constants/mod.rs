/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Process-level configuration from the environment. Runtime-tunable
/// behavior (size limits, timeouts, maintenance mode) lives in the
/// `settings` table instead, so admins can change it without a restart.
pub struct Env {
    pub database_url: String,
    pub frontend_url: String,
    pub upload_dir: String,
    pub seed_admin_username: String,
    pub seed_admin_email: String,
    pub seed_admin_password: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let upload_dir =
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let seed_admin_username =
            std::env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let seed_admin_email =
            std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
        let seed_admin_password =
            std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());

        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        Env {
            database_url,
            frontend_url,
            upload_dir,
            seed_admin_username,
            seed_admin_email,
            seed_admin_password,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
