//! Token CLI commands
//!
//! Issue and inspect bearer tokens offline with the configured secret.

use chrono::{TimeZone, Utc};
use clap::Subcommand;

use crate::auth::{issue, login_user, verify};
use crate::config::Settings;
use crate::error::{ModelConfigError, ModelConfigResult};

/// Token subcommands
#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue a token signed with SESSION_SECRET
    Issue {
        /// User recorded in the token
        #[arg(short, long)]
        user: Option<String>,
        /// Lifetime in seconds (defaults to TOKEN_TTL_SECS)
        #[arg(long)]
        ttl: Option<i64>,
    },
    /// Verify a token and print its claims
    Verify {
        /// Token text
        token: String,
    },
}

/// Handle a token command
pub fn handle_token_command(settings: &Settings, cmd: TokenCommands) -> ModelConfigResult<()> {
    let secret = settings.session_secret()?;

    match cmd {
        TokenCommands::Issue { user, ttl } => {
            let ttl = ttl.unwrap_or(settings.token_ttl_secs);
            if ttl <= 0 {
                return Err(ModelConfigError::Config("ttl must be positive".into()));
            }
            let user = login_user(user.as_deref());
            println!("{}", issue(&user, secret.as_bytes(), ttl)?);
        }

        TokenCommands::Verify { token } => {
            let claims = verify(token.trim(), secret.as_bytes())?;
            let expires = Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| claims.exp.to_string());
            println!("User:    {}", claims.user);
            println!("Expires: {}", expires);
        }
    }

    Ok(())
}
