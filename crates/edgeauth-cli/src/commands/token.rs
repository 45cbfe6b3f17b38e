//! Token issuance command.
//!
//! `edgeauth token` - Build and sign a digest token from flags and config.

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use clap::Args;
use edgeauth_token::TokenBuilder;
use std::fs;
use std::path::PathBuf;

use crate::config::EdgeAuthConfig;

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Application id used for signing
    #[arg(long, env = "EDGEAUTH_APPLICATION_ID")]
    pub application_id: Option<String>,

    /// Application secret used for signing
    #[arg(long, env = "EDGEAUTH_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// YAML config file with credentials and defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Token lifetime in seconds (defaults to the config value)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "expires_at")]
    pub expires_in_seconds: Option<i64>,

    /// Absolute expiry as RFC 3339, e.g. 2030-01-01T00:00:00Z
    #[arg(long)]
    pub expires_at: Option<DateTime<FixedOffset>>,

    /// Restrict the token to authentication
    #[arg(long, conflicts_with_all = ["streaming_only", "publishing_only"])]
    pub authentication_only: bool,

    /// Restrict the token to streaming
    #[arg(long, conflicts_with = "publishing_only")]
    pub streaming_only: bool,

    /// Restrict the token to publishing
    #[arg(long)]
    pub publishing_only: bool,

    /// Capability to grant (repeatable)
    #[arg(long = "capability")]
    pub capabilities: Vec<String>,

    /// Session the token is bound to
    #[arg(long)]
    pub session_id: Option<String>,

    /// Remote address the token is bound to
    #[arg(long)]
    pub remote_address: Option<String>,

    /// Origin stream the token is bound to
    #[arg(long)]
    pub origin_stream_id: Option<String>,

    /// Channel id to require
    #[arg(long, conflicts_with_all = ["channel_alias", "room", "room_alias", "tag"])]
    pub channel: Option<String>,

    /// Channel alias to require
    #[arg(long, conflicts_with_all = ["room", "room_alias", "tag"])]
    pub channel_alias: Option<String>,

    /// Room id to require
    #[arg(long, conflicts_with_all = ["room_alias", "tag"])]
    pub room: Option<String>,

    /// Room alias to require
    #[arg(long, conflicts_with = "tag")]
    pub room_alias: Option<String>,

    /// Arbitrary tag to require on the origin stream
    #[arg(long)]
    pub tag: Option<String>,

    /// Tag to apply to a newly created stream (repeatable)
    #[arg(long = "apply-tag")]
    pub apply_tags: Vec<String>,

    /// Write the token to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the claims to stderr before signing
    #[arg(long, default_value_t = false)]
    pub show_claims: bool,
}

/// Apply flags and config defaults to a fresh builder.
fn configure(args: &TokenArgs, config: &EdgeAuthConfig) -> anyhow::Result<TokenBuilder> {
    let mut builder = TokenBuilder::new();

    if let Some(application_id) = config.resolve_application_id(args.application_id.clone()) {
        builder.application_id(application_id)?;
    }
    let secret = config
        .resolve_secret(args.secret.clone())
        .context("Failed to read secret")?;
    if let Some(secret) = secret {
        builder.secret(secret)?;
    }

    if let Some(uri) = &args.uri {
        builder.uri(uri)?;
    }

    match args.expires_at {
        Some(at) => builder.expires_at(at),
        None => builder
            .expires_in_seconds(args.expires_in_seconds.unwrap_or(config.default_expires_in_seconds)),
    };

    if args.authentication_only {
        builder.for_authentication_only();
    } else if args.streaming_only {
        builder.for_streaming_only();
    } else if args.publishing_only {
        builder.for_publishing_only();
    }

    for capability in config.default_capabilities.iter().chain(&args.capabilities) {
        builder.with_capability(capability)?;
    }

    if let Some(session_id) = &args.session_id {
        builder.for_session(session_id)?;
    }
    if let Some(remote_address) = &args.remote_address {
        builder.for_remote_address(remote_address)?;
    }
    if let Some(origin_stream_id) = &args.origin_stream_id {
        builder.for_origin_stream(origin_stream_id)?;
    }

    if let Some(channel) = &args.channel {
        builder.for_channel(channel)?;
    } else if let Some(alias) = &args.channel_alias {
        builder.for_channel_alias(alias)?;
    } else if let Some(room) = &args.room {
        builder.for_room(room)?;
    } else if let Some(alias) = &args.room_alias {
        builder.for_room_alias(alias)?;
    } else if let Some(tag) = &args.tag {
        builder.with_required_tag(tag)?;
    }

    for tag in &args.apply_tags {
        builder.apply_tag(tag)?;
    }

    Ok(builder)
}

/// Build and sign a token.
pub fn build_token(args: &TokenArgs) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => EdgeAuthConfig::load(path)?,
        None => EdgeAuthConfig::default(),
    };

    let builder = configure(args, &config)?;

    if args.show_claims {
        eprintln!("{}", builder.finalized_claims().to_json()?);
    }

    tracing::debug!(
        claims = builder.claims().len(),
        capabilities = builder.capabilities().map_or(0, <[String]>::len),
        "Issuing token"
    );

    builder.build().context(
        "Failed to sign token. Pass --application-id and --secret, \
         set EDGEAUTH_APPLICATION_ID and EDGEAUTH_SECRET, or configure them in --config",
    )
}

/// Issue a token and print it or write it to `--output`.
pub fn issue(args: TokenArgs) -> anyhow::Result<()> {
    let token = build_token(&args)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &token)
            .with_context(|| format!("Failed to write token to: {}", output_path.display()))?;
        eprintln!("✔ Token written to: {}", output_path.display());
    } else {
        println!("{}", token);
    }

    Ok(())
}
