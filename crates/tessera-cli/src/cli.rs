use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera CLI: issue and verify identity tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file (defaults to ~/.config/tessera/config.toml if present)
    #[arg(short, long, global = true, env = "TESSERA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base64 signing secret (overrides config and TESSERA_SECRET env var)
    #[arg(long, global = true)]
    pub secret: Option<String>,

    /// Subject used for service tokens (overrides config)
    #[arg(long, global = true)]
    pub service_name: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a random signing secret
    Keygen(KeygenArgs),
    /// Issue a token
    Issue(IssueArgs),
    /// Verify a token and print the identity it carries
    Verify(VerifyArgs),
    /// Print the claims of a token, even if it has expired
    Inspect(InspectArgs),
    /// Exchange a refresh token for a new access token
    Refresh(RefreshArgs),
    /// Show the effective configuration
    Config,
}

#[derive(clap::Args)]
pub struct KeygenArgs {
    /// Secret length in bytes (32, 48 or 64+ select HS256, HS384 or HS512)
    #[arg(short, long, default_value_t = 64)]
    pub bytes: usize,
}

#[derive(clap::Args)]
pub struct IssueArgs {
    #[command(subcommand)]
    pub kind: IssueKind,
}

#[derive(Subcommand)]
pub enum IssueKind {
    /// Issue an access token for a user
    Access(IdentityArgs),
    /// Issue a refresh token for a user
    Refresh(IdentityArgs),
    /// Issue an access token for the configured service
    Service,
}

#[derive(clap::Args)]
pub struct IdentityArgs {
    /// Username
    #[arg(short, long)]
    pub subject: String,
    /// Role (e.g. ROLE_USER)
    #[arg(short, long)]
    pub role: String,
    /// User id (random if omitted)
    #[arg(long)]
    pub id: Option<Uuid>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Expected token kind
    pub kind: TokenKind,
    /// The token to verify
    pub token: String,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// The token to inspect
    pub token: String,
}

#[derive(clap::Args)]
pub struct RefreshArgs {
    /// The refresh token
    pub token: String,
}
