//! The authentication-related request/response bodies: `Authenticate`,
//! `AuthResponse`, `AuthChallenge`, `AuthSuccess`.

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_bytes, encoded_len_string, read_bytes, read_string, write_bytes, write_string};

/// `Authenticate` response: names the SASL authenticator the server expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticate {
    /// Fully-qualified authenticator class/identifier. Non-empty on encode.
    pub authenticator: String,
}

impl Authenticate {
    /// Decode the authenticator name.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(Authenticate {
            authenticator: read_string(buf, limits)?,
        })
    }

    /// Encode, rejecting an empty authenticator name.
    pub fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        if self.authenticator.is_empty() {
            return Err(ProtocolError::precondition(
                "authenticate.authenticator",
                "must be non-empty",
            ));
        }
        write_string(buf, &self.authenticator);
        Ok(())
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> Result<usize> {
        if self.authenticator.is_empty() {
            return Err(ProtocolError::precondition(
                "authenticate.authenticator",
                "must be non-empty",
            ));
        }
        Ok(encoded_len_string(&self.authenticator))
    }
}

fn read_token(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Option<Vec<u8>>> {
    read_bytes(buf, limits)
}

fn write_token(buf: &mut impl BufMut, token: &Option<Vec<u8>>) {
    write_bytes(buf, token.as_deref());
}

fn encoded_len_token(token: &Option<Vec<u8>>) -> usize {
    encoded_len_bytes(token.as_deref())
}

/// `AuthResponse` request: one round of a SASL exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// SASL payload; null permitted.
    pub token: Option<Vec<u8>>,
}

impl AuthResponse {
    /// Decode the token.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(AuthResponse {
            token: read_token(buf, limits)?,
        })
    }

    /// Encode the token.
    pub fn write(&self, buf: &mut impl BufMut) {
        write_token(buf, &self.token);
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> usize {
        encoded_len_token(&self.token)
    }
}

/// `AuthChallenge` response: the server's side of a SASL exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// SASL payload; null permitted.
    pub token: Option<Vec<u8>>,
}

impl AuthChallenge {
    /// Decode the token.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(AuthChallenge {
            token: read_token(buf, limits)?,
        })
    }

    /// Encode the token.
    pub fn write(&self, buf: &mut impl BufMut) {
        write_token(buf, &self.token);
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> usize {
        encoded_len_token(&self.token)
    }
}

/// `AuthSuccess` response: terminates a SASL exchange successfully. A null
/// token is accepted (an earlier codec generation rejected it; that
/// restriction does not match the wire format and is not carried forward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    /// Final SASL payload, if the mechanism produces one.
    pub token: Option<Vec<u8>>,
}

impl AuthSuccess {
    /// Decode the token.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(AuthSuccess {
            token: read_token(buf, limits)?,
        })
    }

    /// Encode the token.
    pub fn write(&self, buf: &mut impl BufMut) {
        write_token(buf, &self.token);
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> usize {
        encoded_len_token(&self.token)
    }
}
