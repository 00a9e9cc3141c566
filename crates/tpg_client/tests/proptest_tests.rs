//! Property-based tests for request construction and timestamps
//!
//! These tests use proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use tpg_client::{DEFAULT_BASE_URL, QueryParams, Timestamp, build_url, sorted_join};
use url::Url;

const PARAM_NAMES: [&str; 9] = [
    "departureCode",
    "destinationCode",
    "destinationsCode",
    "latitude",
    "line",
    "lineCode",
    "linesCode",
    "stopCode",
    "stopName",
];

fn params_strategy() -> impl Strategy<Value = QueryParams> {
    prop::collection::vec(
        (
            prop::sample::select(PARAM_NAMES.to_vec()),
            prop_oneof![Just(String::new()), "[A-Za-z0-9 ,]{1,12}"],
        ),
        0..6,
    )
    .prop_map(|pairs| pairs.into_iter().collect())
}

// ============================================================================
// URL building
// ============================================================================

mod url_tests {
    use super::*;

    proptest! {
        #[test]
        fn key_always_present(params in params_strategy(), api_key in "[a-z0-9]{1,16}") {
            let base = Url::parse(DEFAULT_BASE_URL).unwrap();
            let url = build_url(&base, "/GetStops", &params, &api_key);

            let keys: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            prop_assert!(keys.contains(&("key".to_string(), api_key)));
        }

        #[test]
        fn non_empty_params_present_and_empty_absent(params in params_strategy()) {
            let base = Url::parse(DEFAULT_BASE_URL).unwrap();
            let url = build_url(&base, "/GetStops", &params, "foo");
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

            for (name, value) in &params {
                let found = pairs.iter().find(|(k, _)| k == name);
                if value.is_empty() {
                    prop_assert!(found.is_none());
                } else {
                    prop_assert_eq!(found.map(|(_, v)| v.as_str()), Some(value.as_str()));
                }
            }
        }

        #[test]
        fn query_keys_sorted(params in params_strategy()) {
            let base = Url::parse(DEFAULT_BASE_URL).unwrap();
            let url = build_url(&base, "/GetStops", &params, "foo");
            let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();

            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);
        }

        #[test]
        fn path_keeps_prefix_and_extension(endpoint in "/[A-Za-z]{1,20}") {
            let base = Url::parse(DEFAULT_BASE_URL).unwrap();
            let url = build_url(&base, &endpoint, &QueryParams::new(), "foo");

            prop_assert_eq!(url.host_str(), Some("prod.ivtr-od.tpg.ch"));
            prop_assert_eq!(url.path(), format!("/v1{endpoint}.json"));
        }
    }
}

// ============================================================================
// Code list normalisation
// ============================================================================

mod sorted_join_tests {
    use super::*;

    proptest! {
        #[test]
        fn order_independent(mut codes in prop::collection::vec("[A-Z0-9]{1,6}", 0..10)) {
            let joined = sorted_join(&codes);
            codes.reverse();
            prop_assert_eq!(sorted_join(&codes), joined);
        }

        #[test]
        fn joined_parts_are_sorted(codes in prop::collection::vec("[A-Z0-9]{1,6}", 1..10)) {
            let joined = sorted_join(&codes);
            let parts: Vec<&str> = joined.split(',').collect();

            prop_assert_eq!(parts.len(), codes.len());
            prop_assert!(parts.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

// ============================================================================
// Timestamp property tests
// ============================================================================

mod timestamp_tests {
    use super::*;

    proptest! {
        #[test]
        fn api_layout_roundtrips(
            year in 1970u32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
            sign in prop_oneof![Just('+'), Just('-')],
            offset_hours in 1u32..14,
            offset_minutes in prop_oneof![Just(0u32), Just(30u32), Just(45u32)],
        ) {
            let raw = format!(
                "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}{sign}{offset_hours:02}{offset_minutes:02}"
            );
            let ts = Timestamp::parse(&raw).unwrap();
            prop_assert_eq!(ts.to_api_string(), raw);
        }

        #[test]
        fn colon_offsets_rejected(hours in 0u32..14, minutes in 0u32..60) {
            let raw = format!("2018-12-14T08:34:36+{hours:02}:{minutes:02}");
            prop_assert!(Timestamp::parse(&raw).is_err());
        }

        #[test]
        fn arbitrary_strings_never_panic(raw in "\\PC{0,30}") {
            let _ = Timestamp::parse(&raw);
        }
    }
}
