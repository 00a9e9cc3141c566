//! TPG open-data API client
//!
//! One method per API capability. Each assembles its query parameters,
//! sends a single GET through the configured [`HttpTransport`] and decodes
//! the JSON response. Nothing is cached or retried.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::TpgConfig;
use crate::error::{API_ERROR_STATUSES, TpgError, truncate_body};
use crate::models::{
    AllNextDeparturesResponse, ApiError, DisruptionsResponse, GeoPoint, LineColorsResponse,
    NextDeparturesResponse, PhysicalStopsResponse, StopsResponse, ThermometerResponse,
};
use crate::request::{Endpoint, QueryParams, build_url, sorted_join};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Filters for `GetStops`
///
/// Unset filters are not sent. An empty query lists every stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopQuery {
    /// Stop codes, sent sorted
    pub codes: Vec<String>,
    /// Substring of the stop name
    pub name: Option<String>,
    /// Line code
    pub line: Option<String>,
    /// Position for a proximity search
    pub near: Option<GeoPoint>,
}

impl StopQuery {
    /// Query matching every stop
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given stop codes
    #[must_use]
    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to stops whose name contains `name`
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict to stops served by `line`
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Search around `point`
    #[must_use]
    pub const fn near(mut self, point: GeoPoint) -> Self {
        self.near = Some(point);
        self
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::from([
            ("stopCode", sorted_join(&self.codes)),
            ("stopName", self.name.clone().unwrap_or_default()),
            ("line", self.line.clone().unwrap_or_default()),
        ]);

        if let Some(point) = self.near {
            params.insert("latitude", point.latitude.to_string());
            params.insert("longitude", point.longitude.to_string());
        }

        params
    }
}

/// Trait for TPG API clients
#[async_trait]
pub trait TpgClient: Send + Sync {
    /// All stops, ascending by stop code
    async fn get_stops(&self) -> Result<StopsResponse, TpgError>;

    /// Stops whose code is in `codes`
    async fn get_stops_by_codes(&self, codes: &[&str]) -> Result<StopsResponse, TpgError>;

    /// Stops whose name contains `name`
    async fn get_stops_by_name(&self, name: &str) -> Result<StopsResponse, TpgError>;

    /// Stops served by `line`
    async fn get_stops_by_line(&self, line: &str) -> Result<StopsResponse, TpgError>;

    /// Stops within the server's search radius of `point`, with distances
    async fn get_stops_near(&self, point: GeoPoint) -> Result<StopsResponse, TpgError>;

    /// Stops matching an arbitrary combination of filters
    async fn search_stops(&self, query: &StopQuery) -> Result<StopsResponse, TpgError>;

    /// Physical stops of the logical stops in `codes`
    async fn get_physical_stops_by_codes(
        &self,
        codes: &[&str],
    ) -> Result<PhysicalStopsResponse, TpgError>;

    /// Physical stops of the logical stops whose name contains `name`
    async fn get_physical_stops_by_name(
        &self,
        name: &str,
    ) -> Result<PhysicalStopsResponse, TpgError>;

    /// Next departures at a stop, optionally only the one with `departure_code`
    async fn get_next_departures(
        &self,
        stop_code: &str,
        departure_code: Option<i64>,
    ) -> Result<NextDeparturesResponse, TpgError>;

    /// Next departures for lines and destinations
    async fn get_next_departures_for_lines(
        &self,
        line_codes: &[&str],
        destination_codes: &[&str],
    ) -> Result<NextDeparturesResponse, TpgError>;

    /// Every remaining departure of a line towards a destination at a stop
    async fn get_all_next_departures(
        &self,
        stop_code: &str,
        line_code: &str,
        destination_code: &str,
    ) -> Result<AllNextDeparturesResponse, TpgError>;

    /// Route progress of a departure, by logical stop
    async fn get_thermometer(
        &self,
        departure_code: i64,
    ) -> Result<ThermometerResponse, TpgError>;

    /// Route progress of a departure, by physical stop
    async fn get_thermometer_physical_stops(
        &self,
        departure_code: i64,
    ) -> Result<ThermometerResponse, TpgError>;

    /// Display colors of every line
    async fn get_line_colors(&self) -> Result<LineColorsResponse, TpgError>;

    /// Current disruptions on the network
    async fn get_disruptions(&self) -> Result<DisruptionsResponse, TpgError>;
}

/// HTTP client for the TPG open-data API
pub struct TpgApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for TpgApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TpgApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TpgApiClient {
    /// Create a client using `reqwest` with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &TpgConfig) -> Result<Self, TpgError> {
        let transport = ReqwestTransport::new(config.timeout_secs)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client on top of a caller-supplied transport
    ///
    /// The transport's own timeout policy applies; `config.timeout_secs` is
    /// not used.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: &TpgConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, TpgError> {
        config.validate().map_err(TpgError::Configuration)?;
        let base_url = config
            .parsed_base_url()
            .map_err(TpgError::Configuration)?;

        Ok(Self {
            transport,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Full request URL for `endpoint`, API key included
    #[must_use]
    pub fn url_for(&self, endpoint: Endpoint, params: &QueryParams) -> Url {
        build_url(&self.base_url, endpoint.path(), params, &self.api_key)
    }

    /// Send one GET to `endpoint` and decode the response into `T`
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: QueryParams,
    ) -> Result<T, TpgError> {
        let url = self.url_for(endpoint, &params);

        debug!(%endpoint, "Sending request");

        let response = self.transport.get(url).await?;
        decode_response(response)
    }
}

/// Classify a response and decode its body
fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, TpgError> {
    let status = response.status;

    if status == StatusCode::OK {
        let body = response.body?;
        return match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(source) => Err(TpgError::Decode { source, body }),
        };
    }

    let status = status.as_u16();
    let body = response.body.unwrap_or_else(|e| e.to_string());

    let envelope = API_ERROR_STATUSES
        .contains(&status)
        .then(|| serde_json::from_str::<ApiError>(&body).ok())
        .flatten();
    if let Some(error) = envelope {
        return Err(TpgError::Api { status, error });
    }

    Err(TpgError::UnknownResponse {
        status,
        body: truncate_body(body),
    })
}

#[async_trait]
impl TpgClient for TpgApiClient {
    #[instrument(skip(self))]
    async fn get_stops(&self) -> Result<StopsResponse, TpgError> {
        self.search_stops(&StopQuery::new()).await
    }

    #[instrument(skip(self))]
    async fn get_stops_by_codes(&self, codes: &[&str]) -> Result<StopsResponse, TpgError> {
        self.search_stops(&StopQuery::new().with_codes(codes.iter().copied()))
            .await
    }

    #[instrument(skip(self))]
    async fn get_stops_by_name(&self, name: &str) -> Result<StopsResponse, TpgError> {
        self.search_stops(&StopQuery::new().with_name(name)).await
    }

    #[instrument(skip(self))]
    async fn get_stops_by_line(&self, line: &str) -> Result<StopsResponse, TpgError> {
        self.search_stops(&StopQuery::new().with_line(line)).await
    }

    #[instrument(skip(self))]
    async fn get_stops_near(&self, point: GeoPoint) -> Result<StopsResponse, TpgError> {
        self.search_stops(&StopQuery::new().near(point)).await
    }

    #[instrument(skip(self))]
    async fn search_stops(&self, query: &StopQuery) -> Result<StopsResponse, TpgError> {
        let response: StopsResponse = self.fetch(Endpoint::GetStops, query.to_params()).await?;
        debug!(count = response.stops.len(), "Stops found");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_physical_stops_by_codes(
        &self,
        codes: &[&str],
    ) -> Result<PhysicalStopsResponse, TpgError> {
        let params = QueryParams::from([("stopCode", sorted_join(codes))]);
        self.fetch(Endpoint::GetPhysicalStops, params).await
    }

    #[instrument(skip(self))]
    async fn get_physical_stops_by_name(
        &self,
        name: &str,
    ) -> Result<PhysicalStopsResponse, TpgError> {
        let params = QueryParams::from([("stopName", name.to_string())]);
        self.fetch(Endpoint::GetPhysicalStops, params).await
    }

    #[instrument(skip(self))]
    async fn get_next_departures(
        &self,
        stop_code: &str,
        departure_code: Option<i64>,
    ) -> Result<NextDeparturesResponse, TpgError> {
        let params = QueryParams::from([
            ("stopCode", stop_code.to_string()),
            (
                "departureCode",
                departure_code.map(|c| c.to_string()).unwrap_or_default(),
            ),
        ]);
        self.fetch(Endpoint::GetNextDepartures, params).await
    }

    #[instrument(skip(self))]
    async fn get_next_departures_for_lines(
        &self,
        line_codes: &[&str],
        destination_codes: &[&str],
    ) -> Result<NextDeparturesResponse, TpgError> {
        let params = QueryParams::from([
            ("linesCode", sorted_join(line_codes)),
            ("destinationsCode", sorted_join(destination_codes)),
        ]);
        self.fetch(Endpoint::GetNextDepartures, params).await
    }

    #[instrument(skip(self))]
    async fn get_all_next_departures(
        &self,
        stop_code: &str,
        line_code: &str,
        destination_code: &str,
    ) -> Result<AllNextDeparturesResponse, TpgError> {
        let params = QueryParams::from([
            ("stopCode", stop_code.to_string()),
            ("lineCode", line_code.to_string()),
            ("destinationCode", destination_code.to_string()),
        ]);
        self.fetch(Endpoint::GetAllNextDepartures, params).await
    }

    #[instrument(skip(self))]
    async fn get_thermometer(
        &self,
        departure_code: i64,
    ) -> Result<ThermometerResponse, TpgError> {
        let params = QueryParams::from([("departureCode", departure_code.to_string())]);
        self.fetch(Endpoint::GetThermometer, params).await
    }

    #[instrument(skip(self))]
    async fn get_thermometer_physical_stops(
        &self,
        departure_code: i64,
    ) -> Result<ThermometerResponse, TpgError> {
        let params = QueryParams::from([("departureCode", departure_code.to_string())]);
        self.fetch(Endpoint::GetThermometerPhysicalStops, params)
            .await
    }

    #[instrument(skip(self))]
    async fn get_line_colors(&self) -> Result<LineColorsResponse, TpgError> {
        self.fetch(Endpoint::GetLinesColors, QueryParams::new())
            .await
    }

    #[instrument(skip(self))]
    async fn get_disruptions(&self) -> Result<DisruptionsResponse, TpgError> {
        self.fetch(Endpoint::GetDisruptions, QueryParams::new())
            .await
    }
}
