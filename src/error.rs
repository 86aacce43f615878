//! Relay error types.
//!
//! [`RelayError`] is the central error type. Protocol variants are never
//! sent back to clients: the relay has no error channel, so the hub logs
//! them with the stable [`RelayError::kind`] label and drops the message.
//! Startup variants (`Config`, `Io`) propagate to `main`.

use crate::domain::{Identity, Role};

/// Server-side error enum.
///
/// # Kinds
///
/// | Kind                    | Meaning                                          |
/// |-------------------------|--------------------------------------------------|
/// | `malformed`             | Body is not a valid envelope for its `type`      |
/// | `unknown_type`          | Envelope `type` is not part of the protocol      |
/// | `not_authenticated`     | Non-`auth` message before `auth`                 |
/// | `already_authenticated` | Second `auth` with a different identity          |
/// | `role_mismatch`         | Message type not allowed for the session's role  |
/// | `identity_mismatch`     | Message claims an id other than the session's    |
/// | `config`                | Invalid configuration at startup                 |
/// | `io`                    | Socket bind/serve failure                        |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Message body failed to parse as the expected envelope.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `auth` declared a role without the matching identifier field.
    #[error("auth as {0} is missing its identifier")]
    MissingIdentifier(Role),

    /// Envelope carried a `type` the relay does not handle.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// A message other than `auth` arrived before authentication.
    #[error("{message_type} received before auth")]
    NotAuthenticated {
        /// Protocol name of the rejected message.
        message_type: &'static str,
    },

    /// The connection already authenticated under a different identity.
    #[error("connection already authenticated as {current}, refusing {requested}")]
    AlreadyAuthenticated {
        /// Identity bound to the connection.
        current: Identity,
        /// Identity the rejected `auth` asked for.
        requested: Identity,
    },

    /// The session's role may not send this message type.
    #[error("{message_type} is not accepted from a {role} connection")]
    RoleMismatch {
        /// Protocol name of the rejected message.
        message_type: &'static str,
        /// Role bound to the connection.
        role: Role,
    },

    /// The message names an identifier other than the session's own.
    #[error("{message_type} claims {claimed} but connection is {session}")]
    IdentityMismatch {
        /// Protocol name of the rejected message.
        message_type: &'static str,
        /// Identifier carried in the message.
        claimed: String,
        /// Identity bound to the connection.
        session: Identity,
    },

    /// Configuration is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns the stable label used as the `kind` log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) | Self::MissingIdentifier(_) => "malformed",
            Self::UnknownType(_) => "unknown_type",
            Self::NotAuthenticated { .. } => "not_authenticated",
            Self::AlreadyAuthenticated { .. } => "already_authenticated",
            Self::RoleMismatch { .. } => "role_mismatch",
            Self::IdentityMismatch { .. } => "identity_mismatch",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}
