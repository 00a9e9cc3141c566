//! Request URL construction
//!
//! Every call is a GET on `<base>/<Endpoint>.json` with the API key and the
//! non-empty query parameters form-encoded in key order.

use std::collections::BTreeMap;
use std::fmt;

use url::{Url, form_urlencoded};

/// Production base URL of the TPG open-data API
pub const DEFAULT_BASE_URL: &str = "https://prod.ivtr-od.tpg.ch/v1";

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "key";

/// Suffix appended to every endpoint path
const JSON_EXTENSION: &str = ".json";

/// Query parameters of one request, ordered by key
pub type QueryParams = BTreeMap<&'static str, String>;

/// API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Logical stops
    GetStops,
    /// Logical stops with their platforms
    GetPhysicalStops,
    /// Next departures with real-time data
    GetNextDepartures,
    /// All remaining departures of the day
    GetAllNextDepartures,
    /// Route progress by logical stop
    GetThermometer,
    /// Route progress by physical stop
    GetThermometerPhysicalStops,
    /// Line display colors
    GetLinesColors,
    /// Network disruptions
    GetDisruptions,
}

impl Endpoint {
    /// Path of the endpoint below the base URL, without extension
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GetStops => "/GetStops",
            Self::GetPhysicalStops => "/GetPhysicalStops",
            Self::GetNextDepartures => "/GetNextDepartures",
            Self::GetAllNextDepartures => "/GetAllNextDepartures",
            Self::GetThermometer => "/GetThermometer",
            Self::GetThermometerPhysicalStops => "/GetThermometerPhysicalStops",
            Self::GetLinesColors => "/GetLinesColors",
            Self::GetDisruptions => "/GetDisruptions",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

/// Build the full request URL for `path`
///
/// `key` is always set to `api_key`, replacing any caller-supplied value,
/// and is sent even when empty. Other parameters with an empty value are
/// left out.
#[must_use]
pub fn build_url(base_url: &Url, path: &str, params: &QueryParams, api_key: &str) -> Url {
    let mut query: BTreeMap<&str, &str> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    query.insert(API_KEY_PARAM, api_key);

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();

    let mut url = base_url.clone();
    let prefix = base_url.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}{path}{JSON_EXTENSION}"));
    url.set_query(Some(&encoded));
    url
}

/// Sort codes ascending and join them with `,`
///
/// Normalises caller input so the same set of codes always yields the same URL.
#[must_use]
pub fn sorted_join<S: AsRef<str>>(codes: &[S]) -> String {
    let mut sorted: Vec<&str> = codes.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join(",")
}
