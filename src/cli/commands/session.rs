use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::auth::{issue_session, Claims, Identity, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::BusinessId;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Mint a signed session token")]
    Mint {
        #[arg(long, help = "Email the session is issued to")]
        email: String,

        #[arg(long, value_enum, help = "Session role")]
        role: RoleArg,

        #[arg(long, help = "Business number, required for the user role")]
        business_id: Option<String>,
    },
}

/// Claims for a CLI-minted session
pub fn mint_claims(email: &str, role: Role, business_id: Option<&str>, ttl_hours: u64) -> anyhow::Result<Claims> {
    let business_number = business_id.map(str::parse::<BusinessId>).transpose()?;
    if role == Role::User && business_number.is_none() {
        anyhow::bail!("--business-id is required for the user role");
    }

    let identity = Identity {
        uid: format!("cli:{}", email),
        email: email.to_string(),
        name: None,
        picture: None,
    };
    Ok(Claims::new(&identity, role, business_number, ttl_hours))
}

pub fn handle(cmd: SessionCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Mint { email, role, business_id } => {
            let claims = mint_claims(&email, role.into(), business_id.as_deref(), config.security.session_ttl_hours)?;
            let token = issue_session(&claims, &config.security)?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Session minted",
                    Some(json!({
                        "token": token,
                        "cookie": config.security.cookie_name,
                        "expiresAt": claims.exp
                    })),
                ),
                OutputFormat::Text => {
                    println!("{}={}", config.security.cookie_name, token);
                    Ok(())
                }
            }
        }
    }
}
