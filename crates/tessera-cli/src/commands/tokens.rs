use anyhow::{Context, Result};
use serde_json::json;
use tessera_auth::{Identity, TokenConfig, TokenError, TokenService, TokenType};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::cli::{IdentityArgs, IssueKind, TokenKind};
use crate::output::{print_field, print_json, print_success};

fn service(config: TokenConfig) -> Result<TokenService> {
    TokenService::new(config).context("Cannot derive signing key from secret")
}

fn rejected(err: TokenError) -> anyhow::Error {
    let hint = if err.should_refresh() {
        " (exchange a refresh token with: tessera refresh <TOKEN>)"
    } else {
        ""
    };
    anyhow::Error::new(err).context(format!("Token rejected{hint}"))
}

fn identity(
    service: &TokenService,
    args: &IdentityArgs,
    token_type: TokenType,
) -> Result<Identity> {
    let id = args.id.unwrap_or_else(Uuid::new_v4);
    let identity = service.create(args.subject.as_str(), args.role.as_str(), id, token_type)?;
    Ok(identity)
}

pub fn issue(config: TokenConfig, kind: &IssueKind) -> Result<()> {
    let service = service(config)?;

    let token = match kind {
        IssueKind::Access(args) => {
            service.generate_access_token(&identity(&service, args, TokenType::Access)?)?
        }
        IssueKind::Refresh(args) => {
            service.generate_refresh_token(&identity(&service, args, TokenType::Refresh)?)?
        }
        IssueKind::Service => service.generate_service_token()?,
    };

    println!("{token}");
    Ok(())
}

pub fn verify(config: TokenConfig, kind: TokenKind, token: &str) -> Result<()> {
    let service = service(config)?;

    let identity = match kind {
        TokenKind::Access => service.parse_access_token(token.trim()),
        TokenKind::Refresh => service.parse_refresh_token(token.trim()),
    }
    .map_err(rejected)?;

    print_json(&identity)?;
    print_success(&format!("Valid token for {identity}"));
    Ok(())
}

pub fn inspect(config: TokenConfig, token: &str) -> Result<()> {
    let service = service(config)?;
    let codec = service.codec();

    let claims = codec.decode_allow_expired(token.trim()).map_err(rejected)?;
    let now = OffsetDateTime::now_utc();
    let expires_at = claims
        .expires_at()
        .map(|at| at.format(&Rfc3339))
        .transpose()
        .context("Cannot format expiry")?;

    print_json(&json!({
        "algorithm": codec.algorithm().as_str(),
        "claims": &claims,
        "expires_at": expires_at,
        "expired": claims.is_expired_at(now),
    }))
}

pub fn refresh(config: TokenConfig, refresh_token: &str) -> Result<()> {
    let service = service(config)?;
    let token = service
        .exchange_refresh_token(refresh_token.trim())
        .map_err(rejected)?;

    println!("{token}");
    Ok(())
}

pub fn show_config(config: &TokenConfig) {
    let secret = if config.secret.trim().is_empty() {
        "(not set)".to_string()
    } else {
        match tessera_auth::token::derive(&config.secret) {
            Ok(key) => format!("(set, {})", key.algorithm()),
            Err(e) => format!("(invalid: {e})"),
        }
    };

    print_field("Secret", secret);
    print_field(
        "Access token lifetime",
        format!("{:?}", config.access_token_lifetime),
    );
    print_field(
        "Refresh token lifetime",
        format!("{:?}", config.refresh_token_lifetime),
    );
    print_field("Service name", &config.service_name);
}
