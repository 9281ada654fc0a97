//! Application configuration
//!
//! Settings come from command-line flags, falling back to environment
//! variables (a `.env` file is loaded first by `main`).

use clap::Parser;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";
pub const DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Parser)]
#[command(name = "talentdesk", about = "TalentDesk recruiting back-office API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// SQLite database path, or `:memory:`
    #[arg(long, env = "DATABASE_URL", default_value = "talentdesk.db")]
    pub database_url: String,

    /// Secret used to sign bearer tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// bcrypt work factor for password hashing
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Email of the admin account seeded on first start
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@talentdesk.local")]
    pub admin_email: String,

    /// Password of the admin account seeded on first start
    #[arg(long, env = "ADMIN_PASSWORD", default_value = DEV_ADMIN_PASSWORD, hide_env_values = true)]
    pub admin_password: String,
}

impl Config {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn uses_dev_admin_password(&self) -> bool {
        self.admin_password == DEV_ADMIN_PASSWORD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "talentdesk",
            "--bind",
            "127.0.0.1:8080",
            "--database-url",
            ":memory:",
            "--jwt-secret",
            "a-real-secret",
            "--bcrypt-cost",
            "4",
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.bcrypt_cost, 4);
        assert!(!config.uses_dev_secret());
    }
}
