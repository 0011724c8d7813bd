use anyhow::Context;
use serde_json::json;

use crate::auth::{issue_token, Claims};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(config: &AppConfig, sub: String, email: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = Claims::new(sub, email, config.security.jwt_expiry_hours);
    let token = issue_token(&config.security.jwt_secret, &claims).context("cannot mint token")?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "token": token, "expires_at": claims.exp })),
        OutputFormat::Text => println!("{token}"),
    }
    Ok(())
}
