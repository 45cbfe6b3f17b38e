//! Fluent claim-set builder.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::claims::{ClaimKey, ClaimSet, TokenType, tag_prefix};
use crate::error::TokenError;
use crate::signer::{DigestSigner, Signer};

/// A value accepted by a string-valued setter.
///
/// `None` is the absent value and is rejected with
/// [`TokenError::InvalidArgument`]. Network address types normalize to their
/// textual form so that `IpAddr` and its string produce the same claim.
pub trait ClaimArgument {
    fn into_claim(self) -> Option<String>;
}

impl ClaimArgument for &str {
    fn into_claim(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClaimArgument for String {
    fn into_claim(self) -> Option<String> {
        Some(self)
    }
}

impl ClaimArgument for &String {
    fn into_claim(self) -> Option<String> {
        Some(self.clone())
    }
}

impl ClaimArgument for IpAddr {
    fn into_claim(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClaimArgument for Ipv4Addr {
    fn into_claim(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ClaimArgument for Ipv6Addr {
    fn into_claim(self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Only the IP part is kept: the claim binds a network origin, not a port.
impl ClaimArgument for SocketAddr {
    fn into_claim(self) -> Option<String> {
        Some(self.ip().to_string())
    }
}

impl<T: ClaimArgument> ClaimArgument for Option<T> {
    fn into_claim(self) -> Option<String> {
        self.and_then(ClaimArgument::into_claim)
    }
}

fn required(value: impl ClaimArgument, argument: &'static str) -> Result<String, TokenError> {
    value
        .into_claim()
        .ok_or(TokenError::InvalidArgument { argument })
}

/// Application id and secret handed to the signer. Never part of the claims.
#[derive(Clone, Default)]
pub struct SigningContext {
    application_id: Option<String>,
    secret: Option<String>,
}

impl SigningContext {
    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("application_id", &self.application_id)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Builder for signed access tokens.
///
/// Singular claims overwrite on every call; `capabilities` and `applyTags`
/// accumulate in call order and are appended to the claims only at
/// [`build`](Self::build) time, and only if something was appended.
///
/// Setters validate before mutating, so a rejected call leaves the builder
/// exactly as it was.
///
/// ```
/// use edgeauth_token::TokenBuilder;
///
/// # fn main() -> Result<(), edgeauth_token::TokenError> {
/// let token = TokenBuilder::new()
///     .application_id("my-application")?
///     .secret("my-secret")?
///     .expires_in_seconds(3600)
///     .with_capability("streaming")?
///     .for_channel("us-northeast#my-application#channel.1234")?
///     .build()?;
/// assert!(token.starts_with("DIGEST:"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenBuilder<S = DigestSigner> {
    signer: S,
    context: SigningContext,
    claims: ClaimSet,
    capabilities: Option<Vec<String>>,
    apply_tags: Option<Vec<String>>,
}

impl TokenBuilder {
    /// Create a builder that signs with [`DigestSigner`].
    pub fn new() -> Self {
        Self::with_signer(DigestSigner)
    }
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TokenBuilder<S> {
    /// Create a builder that signs with a custom signer.
    pub fn with_signer(signer: S) -> Self {
        Self {
            signer,
            context: SigningContext::default(),
            claims: ClaimSet::new(),
            capabilities: None,
            apply_tags: None,
        }
    }

    fn set_claim(
        &mut self,
        key: ClaimKey,
        value: impl ClaimArgument,
        argument: &'static str,
    ) -> Result<&mut Self, TokenError> {
        let value = required(value, argument)?;
        self.claims.set(key, value);
        Ok(self)
    }

    /// Set the backend URI.
    pub fn uri(&mut self, uri: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.set_claim(ClaimKey::Uri, uri, "uri")
    }

    /// Set the application id used for signing.
    pub fn application_id(
        &mut self,
        application_id: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        self.context.application_id = Some(required(application_id, "applicationId")?);
        Ok(self)
    }

    /// Set the secret used for signing.
    pub fn secret(&mut self, secret: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.context.secret = Some(required(secret, "secret")?);
        Ok(self)
    }

    /// Grant a capability. Repeated calls append, duplicates included.
    pub fn with_capability(
        &mut self,
        capability: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        let capability = required(capability, "capability")?;
        self.capabilities
            .get_or_insert_with(Vec::new)
            .push(capability);
        Ok(self)
    }

    /// Expire the token `seconds` from now. The clock is read at call time.
    pub fn expires_in_seconds(&mut self, seconds: i64) -> &mut Self {
        let expires = Utc::now()
            .timestamp_millis()
            .saturating_add(seconds.saturating_mul(1000));
        self.claims.set(ClaimKey::Expires, expires);
        self
    }

    /// Expire the token at an absolute instant.
    pub fn expires_at<Tz: TimeZone>(&mut self, at: DateTime<Tz>) -> &mut Self {
        self.claims.set(ClaimKey::Expires, at.timestamp_millis());
        self
    }

    fn restrict(&mut self, token_type: TokenType) -> &mut Self {
        self.claims.set(ClaimKey::Type, token_type.as_str());
        self
    }

    /// Limit the token to authentication.
    pub fn for_authentication_only(&mut self) -> &mut Self {
        self.restrict(TokenType::Auth)
    }

    /// Limit the token to streaming.
    pub fn for_streaming_only(&mut self) -> &mut Self {
        self.restrict(TokenType::Stream)
    }

    /// Limit the token to publishing.
    pub fn for_publishing_only(&mut self) -> &mut Self {
        self.restrict(TokenType::Publish)
    }

    /// Bind the token to a session.
    pub fn for_session(&mut self, session_id: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.set_claim(ClaimKey::SessionId, session_id, "sessionId")
    }

    /// Bind the token to a remote address, given as text or as a `std::net` address.
    ///
    /// Text that parses as an IP address is stored in canonical form, so
    /// `"0:0:0:0:0:0:0:1"` and `Ipv6Addr::LOCALHOST` give the same claim.
    /// Anything else is stored verbatim.
    pub fn for_remote_address(
        &mut self,
        remote_address: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        let remote_address = required(remote_address, "remoteAddress")?;
        let normalized = remote_address
            .parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .unwrap_or(remote_address);
        self.claims.set(ClaimKey::RemoteAddress, normalized);
        Ok(self)
    }

    /// Bind the token to an origin stream.
    pub fn for_origin_stream(
        &mut self,
        origin_stream_id: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        self.set_claim(ClaimKey::OriginStreamId, origin_stream_id, "originStreamId")
    }

    fn tag_with_prefix(
        &mut self,
        prefix: &str,
        value: impl ClaimArgument,
        argument: &'static str,
    ) -> Result<&mut Self, TokenError> {
        let value = required(value, argument)?;
        self.claims
            .set(ClaimKey::RequiredTag, format!("{prefix}{value}"));
        Ok(self)
    }

    /// Require `channelId:<channel_id>`. Replaces any other required tag.
    pub fn for_channel(&mut self, channel_id: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.tag_with_prefix(tag_prefix::CHANNEL_ID, channel_id, "channelId")
    }

    /// Require `channelAlias:<channel_alias>`. Replaces any other required tag.
    pub fn for_channel_alias(
        &mut self,
        channel_alias: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        self.tag_with_prefix(tag_prefix::CHANNEL_ALIAS, channel_alias, "channelAlias")
    }

    /// Require `roomId:<room_id>`. Replaces any other required tag.
    pub fn for_room(&mut self, room_id: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.tag_with_prefix(tag_prefix::ROOM_ID, room_id, "roomId")
    }

    /// Require `roomAlias:<room_alias>`. Replaces any other required tag.
    pub fn for_room_alias(
        &mut self,
        room_alias: impl ClaimArgument,
    ) -> Result<&mut Self, TokenError> {
        self.tag_with_prefix(tag_prefix::ROOM_ALIAS, room_alias, "roomAlias")
    }

    /// Require an arbitrary tag on the origin stream. Last call wins.
    pub fn with_required_tag(&mut self, tag: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        self.set_claim(ClaimKey::RequiredTag, tag, "tag")
    }

    /// Tag to apply to a newly created stream. Repeated calls append.
    pub fn apply_tag(&mut self, tag: impl ClaimArgument) -> Result<&mut Self, TokenError> {
        let tag = required(tag, "tag")?;
        self.apply_tags.get_or_insert_with(Vec::new).push(tag);
        Ok(self)
    }

    /// Singular claims set so far, in insertion order.
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Pending capabilities, `None` if none was ever added.
    pub fn capabilities(&self) -> Option<&[String]> {
        self.capabilities.as_deref()
    }

    /// Pending apply-tags, `None` if none was ever added.
    pub fn apply_tags(&self) -> Option<&[String]> {
        self.apply_tags.as_deref()
    }

    pub fn signing_context(&self) -> &SigningContext {
        &self.context
    }

    /// JSON of the singular claims, without list claims and unsigned.
    pub fn claims_json(&self) -> Result<String, TokenError> {
        self.claims.to_json()
    }

    /// The claim set exactly as [`build`](Self::build) would sign it.
    pub fn finalized_claims(&self) -> ClaimSet {
        self.claims
            .with_lists(self.capabilities.as_deref(), self.apply_tags.as_deref())
    }
}

impl<S: Signer> TokenBuilder<S> {
    /// Sign the current claims. The builder is left unchanged.
    ///
    /// Signer errors, including missing credentials, are returned as-is.
    pub fn build(&self) -> Result<String, TokenError> {
        let claims = self.finalized_claims();

        self.signer.sign_and_encode(
            self.context.application_id(),
            self.context.secret(),
            &claims,
        )
    }
}
