//! # edgeauth-token
//!
//! Signed access tokens for a streaming platform's channels, rooms and streams.
//!
//! This crate provides functionality for:
//! - Assembling an ordered claim set with a fluent [`TokenBuilder`]
//! - Signing the claims into an opaque `DIGEST:` token with [`DigestSigner`]
//! - Plugging in another signing scheme through the [`Signer`] trait
//!
//! ## Claims
//!
//! | Claim | Kind | Setter |
//! |-------|------|--------|
//! | `uri` | singular | `uri` |
//! | `type` | singular | `for_authentication_only`, `for_streaming_only`, `for_publishing_only` |
//! | `sessionId` | singular | `for_session` |
//! | `remoteAddress` | singular | `for_remote_address` |
//! | `originStreamId` | singular | `for_origin_stream` |
//! | `expires` | singular | `expires_in_seconds`, `expires_at` |
//! | `requiredTag` | singular | `with_required_tag`, `for_channel`, `for_channel_alias`, `for_room`, `for_room_alias` |
//! | `capabilities` | list | `with_capability` |
//! | `applyTags` | list | `apply_tag` |
//!
//! Claim order is part of the signed payload: two builders holding the same
//! claims set in a different order produce different tokens.

pub mod builder;
pub mod claims;
pub mod error;
pub mod signer;

pub use builder::{ClaimArgument, SigningContext, TokenBuilder};
pub use claims::{ClaimKey, ClaimSet, TokenType};
pub use error::TokenError;
pub use signer::{DIGEST_TOKEN_PREFIX, DigestSigner, Signer};
