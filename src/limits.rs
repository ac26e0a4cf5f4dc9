//! Caller-tunable decode limits.
//!
//! The core has no configuration surface of its own (no CLI, env, or file
//! input), but every length-prefixed primitive reads an
//! attacker-controlled count before it allocates anything for it. Mirrors
//! `ProtocolValidatorConfig` from the teacher's protocol validator: a plain
//! struct of ceilings threaded into decode, not a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum element count accepted for any length-prefixed list/map
    /// (`[string list]`, `[string map]`, positional/named values, batch
    /// children, column lists, ...).
    pub max_collection_len: u32,
    /// Maximum byte length accepted for any single `[bytes]`/`[long
    /// string]`/`[short bytes]` payload.
    pub max_blob_len: u32,
}

impl Default for DecodeLimits {
    /// The protocol's own representational ceiling: no tighter bound is
    /// imposed unless the caller asks for one.
    fn default() -> Self {
        DecodeLimits {
            max_collection_len: u32::from(u16::MAX),
            max_blob_len: i32::MAX as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_protocol_ceiling() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_collection_len, 65535);
        assert_eq!(limits.max_blob_len, i32::MAX as u32);
    }
}
