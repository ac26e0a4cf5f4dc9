//! Protocol version enumeration and per-version capability predicates.
//!
//! Rather than scatter `fn supports_x(version) -> bool` free functions
//! through every codec (the shape the original driver takes), capabilities
//! are computed once into a plain struct of booleans and threaded to
//! codecs by value. See [`VersionCapabilities::of`].

use std::fmt;

/// A Cassandra native protocol dialect.
///
/// Closed enumeration: there is no "unknown" variant, because version
/// negotiation happens above this crate; version selection is an input,
/// not something this crate infers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// Native protocol v2.
    V2,
    /// Native protocol v3.
    V3,
    /// Native protocol v4.
    V4,
    /// Native protocol v5.
    V5,
    /// DataStax Enterprise dialect 1 (based on v4).
    DseV1,
    /// DataStax Enterprise dialect 2 (based on v5).
    DseV2,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolVersion::V2 => "V2",
            ProtocolVersion::V3 => "V3",
            ProtocolVersion::V4 => "V4",
            ProtocolVersion::V5 => "V5",
            ProtocolVersion::DseV1 => "DSE_V1",
            ProtocolVersion::DseV2 => "DSE_V2",
        };
        f.write_str(s)
    }
}

impl ProtocolVersion {
    /// Every version this crate knows how to speak.
    pub const ALL: [ProtocolVersion; 6] = [
        ProtocolVersion::V2,
        ProtocolVersion::V3,
        ProtocolVersion::V4,
        ProtocolVersion::V5,
        ProtocolVersion::DseV1,
        ProtocolVersion::DseV2,
    ];

    /// Whether this is one of the two DSE dialects.
    pub fn is_dse(self) -> bool {
        matches!(self, ProtocolVersion::DseV1 | ProtocolVersion::DseV2)
    }

    /// Compute this version's capability set.
    pub fn capabilities(self) -> VersionCapabilities {
        VersionCapabilities::of(self)
    }
}

/// Boolean capability set computed once per [`ProtocolVersion`] and
/// referenced by field name throughout the codecs, replacing a
/// proliferation of small `supports_*` predicate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCapabilities {
    /// The version this capability set describes.
    pub version: ProtocolVersion,
    /// `Prepare` carries a flags byte and optional keyspace.
    pub prepare_flags: bool,
    /// `Prepared`/`Execute` carry a result-metadata id.
    pub result_metadata_id: bool,
    /// `WriteTimeout` with `writeType == "CAS"` carries a contentions count.
    pub write_timeout_contentions: bool,
    /// `ReadFailure`/`WriteFailure` carry a reason map instead of a raw
    /// failure count.
    pub failure_reason_map: bool,
    /// Query/batch flags are a 4-byte int rather than a 1-byte mask.
    pub query_flags_are_int: bool,
    /// DSE reinterprets two extra high-order flag bits (page-size-in-bytes,
    /// continuous-paging, now-in-seconds depending on dialect).
    pub dse_flag_bits: bool,
    /// Query-options/batch carry a keyspace override field.
    pub keyspace_option: bool,
    /// Query-options/batch carry a now-in-seconds override field.
    pub now_in_seconds_option: bool,
    /// Continuous paging (DSE only) is available.
    pub continuous_paging: bool,
    /// Named values are permitted (mutually exclusive with positional).
    pub named_values: bool,
    /// `SchemaChange`'s target can be `FUNCTION`/`AGGREGATE`.
    pub schema_change_function_aggregate: bool,
    /// `SchemaChange` carries an explicit `target` field (v2 infers it).
    pub schema_change_explicit_target: bool,
    /// `TopologyChange` may report `MOVED_NODE`.
    pub topology_change_moved_node: bool,
    /// A `[value]` may be "not set" (`len == -2`), distinct from null.
    pub not_set_values: bool,
}

impl VersionCapabilities {
    /// Compute the capability set for `version`.
    pub fn of(version: ProtocolVersion) -> Self {
        use ProtocolVersion::*;

        let is_v5_or_dse2 = matches!(version, V5 | DseV2);
        let is_v5_or_dse = matches!(version, V5 | DseV1 | DseV2);
        let is_v3_plus = !matches!(version, V2);
        let is_v4_plus = matches!(version, V4 | V5 | DseV1 | DseV2);

        VersionCapabilities {
            version,
            prepare_flags: is_v5_or_dse2,
            result_metadata_id: is_v5_or_dse2,
            write_timeout_contentions: is_v5_or_dse,
            failure_reason_map: is_v5_or_dse,
            query_flags_are_int: is_v5_or_dse,
            dse_flag_bits: version.is_dse(),
            // DSE_V1 supports the keyspace option but not now-in-seconds;
            // DSE_V1 predates the now-in-seconds override entirely.
            keyspace_option: matches!(version, V5 | DseV1 | DseV2),
            now_in_seconds_option: is_v5_or_dse2,
            continuous_paging: version.is_dse(),
            named_values: is_v3_plus,
            schema_change_function_aggregate: is_v4_plus,
            schema_change_explicit_target: is_v3_plus,
            topology_change_moved_node: is_v3_plus,
            not_set_values: is_v4_plus,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ProtocolVersion::V2, false)]
    #[case(ProtocolVersion::V3, false)]
    #[case(ProtocolVersion::V4, false)]
    #[case(ProtocolVersion::V5, false)]
    #[case(ProtocolVersion::DseV1, true)]
    #[case(ProtocolVersion::DseV2, true)]
    fn is_dse_matches_the_dse_dialects(#[case] version: ProtocolVersion, #[case] expected: bool) {
        assert_eq!(version.is_dse(), expected);
    }

    #[rstest]
    #[case(ProtocolVersion::V2)]
    #[case(ProtocolVersion::V3)]
    #[case(ProtocolVersion::V4)]
    #[case(ProtocolVersion::V5)]
    #[case(ProtocolVersion::DseV1)]
    #[case(ProtocolVersion::DseV2)]
    fn capabilities_is_deterministic(#[case] version: ProtocolVersion) {
        assert_eq!(version.capabilities(), version.capabilities());
    }

    #[test]
    fn dse_v1_has_keyspace_but_not_now_in_seconds() {
        let caps = ProtocolVersion::DseV1.capabilities();
        assert!(caps.keyspace_option);
        assert!(!caps.now_in_seconds_option);
    }

    #[test]
    fn v2_is_the_floor() {
        let caps = ProtocolVersion::V2.capabilities();
        assert!(!caps.named_values);
        assert!(!caps.schema_change_explicit_target);
        assert!(!caps.query_flags_are_int);
    }

    #[test]
    fn v5_and_dse_v2_share_the_newest_surface() {
        for v in [ProtocolVersion::V5, ProtocolVersion::DseV2] {
            let caps = v.capabilities();
            assert!(caps.result_metadata_id);
            assert!(caps.now_in_seconds_option);
            assert!(caps.write_timeout_contentions);
        }
    }
}
