//! Typed client for the TPG open-data API
//!
//! Provides stop lookup, next departures, thermometers (route progress),
//! line colors and disruptions from the Geneva public transport operator's
//! API at `https://prod.ivtr-od.tpg.ch/v1`.
//!
//! # Architecture
//!
//! [`TpgClient`] defines one method per API capability and is implemented by
//! [`TpgApiClient`]. Requests go through the [`HttpTransport`] seam, with
//! [`ReqwestTransport`] as the default. Responses decode into the types of
//! [`models`]; timestamps use the API's own layout via [`Timestamp`].
//!
//! Each call is exactly one GET. Nothing is cached and nothing is retried;
//! [`TpgError::is_retryable`] tells the caller when trying again makes sense.
//!
//! # Example
//!
//! ```rust,ignore
//! use tpg_client::{TpgApiClient, TpgClient, TpgConfig};
//!
//! let client = TpgApiClient::new(&TpgConfig::new("my-api-key"))?;
//!
//! let stops = client.get_stops_by_name("Cornavin").await?;
//! let departures = client.get_next_departures("CVIN", None).await?;
//! for next in &departures.departures {
//!     println!("{} in {} min", next.departure.line.line_code, next.departure.waiting_time);
//! }
//! ```

mod client;
mod config;
mod error;
pub mod models;
mod request;
mod timestamp;
mod transport;

pub use client::{StopQuery, TpgApiClient, TpgClient};
pub use config::TpgConfig;
pub use error::{API_ERROR_STATUSES, MAX_ERROR_BODY_CHARS, TpgError};
pub use models::{
    AllNextDeparturesResponse, ApiError, Connection, Coordinates, Departure, Deviation,
    Disruption, DisruptionsResponse, GeoPoint, InvalidCoordinates, LineColor, LineColorsResponse,
    NextDeparture, NextDeparturesResponse, PhysicalStop, PhysicalStopGroup, PhysicalStopsResponse,
    Reliability, Step, Stop, StopsResponse, ThermometerResponse,
};
pub use request::{API_KEY_PARAM, DEFAULT_BASE_URL, Endpoint, QueryParams, build_url, sorted_join};
pub use timestamp::{Timestamp, TimestampError};
pub use transport::{
    DEFAULT_TIMEOUT_SECS, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
    USER_AGENT,
};
