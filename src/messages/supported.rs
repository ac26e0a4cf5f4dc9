//! `Supported` response: advertises server-side options in answer to an
//! `Options` request.

use std::collections::HashMap;

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::limits::DecodeLimits;
use crate::primitives::{encoded_len_string_multimap, read_string_multimap, write_string_multimap};

/// `[string multimap]` of supported option names to their allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supported {
    /// e.g. `CQL_VERSION -> ["3.0.0"]`, `COMPRESSION -> ["snappy", "lz4"]`.
    pub options: HashMap<String, Vec<String>>,
}

impl Supported {
    /// Decode the options multimap.
    pub fn read(buf: &mut impl Buf, limits: &DecodeLimits) -> Result<Self> {
        Ok(Supported {
            options: read_string_multimap(buf, limits)?,
        })
    }

    /// Encode the options multimap.
    pub fn write(&self, buf: &mut impl BufMut) {
        write_string_multimap(buf, &self.options);
    }

    /// Byte length of the encoded body.
    pub fn encoded_len(&self) -> usize {
        encoded_len_string_multimap(&self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_multiple_values_per_option() {
        let limits = DecodeLimits::default();
        let mut options = HashMap::new();
        options.insert(
            "COMPRESSION".to_string(),
            vec!["snappy".to_string(), "lz4".to_string()],
        );
        let message = Supported { options };
        let mut buf = Vec::new();
        message.write(&mut buf);
        assert_eq!(message.encoded_len(), buf.len());
        let mut slice = &buf[..];
        assert_eq!(Supported::read(&mut slice, &limits).unwrap(), message);
    }
}
