//! `Startup` request: the first message on every connection.

use std::collections::HashMap;

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_string_map, read_string_map, write_string_map};

/// `[string map]` of startup options (`CQL_VERSION`, `COMPRESSION`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    /// Option name/value pairs. Key order is not meaningful.
    pub options: HashMap<String, String>,
}

impl Startup {
    /// Decode the options map.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(Startup {
            options: read_string_map(buf, limits)?,
        })
    }

    /// Encode the options map.
    pub fn write(&self, buf: &mut impl BufMut) {
        write_string_map(buf, &self.options);
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> usize {
        encoded_len_string_map(&self.options)
    }
}
