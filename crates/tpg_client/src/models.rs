//! TPG data models
//!
//! Typed representations of the JSON payloads returned by the TPG open-data
//! API: stops, physical stops, departures, thermometers, disruptions and line
//! colors. Every top-level response carries the server's [`Timestamp`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::timestamp::Timestamp;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

/// Error type for out-of-range coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
pub struct InvalidCoordinates;

impl GeoPoint {
    /// Create a new point with validation
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Error envelope returned by the API on 400, 403, 404, 410 and 503
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("TPG API error {error_code} at {timestamp}: {error_message}")]
pub struct ApiError {
    /// Server time of the failure
    pub timestamp: Timestamp,
    /// Numeric API error code
    pub error_code: i64,
    /// Human-readable message
    pub error_message: String,
}

/// A line/destination pair served from a stop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Destination stop code
    #[serde(default)]
    pub destination_code: String,
    /// Destination display name
    #[serde(default)]
    pub destination_name: String,
    /// Line code (e.g. "12", "NE")
    #[serde(default)]
    pub line_code: String,
}

/// A logical stop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stop {
    /// Stop code (e.g. "CVIN")
    #[serde(rename = "stopCode", default)]
    pub code: String,
    /// Stop name
    #[serde(rename = "stopName", default)]
    pub name: String,
    /// Distance in meters, only present for proximity queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    /// Lines and destinations served, in server order
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Stop {
    /// Distinct line codes served at this stop, in first-seen order
    #[must_use]
    pub fn line_codes(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        for connection in &self.connections {
            if !lines.contains(&connection.line_code.as_str()) {
                lines.push(&connection.line_code);
            }
        }
        lines
    }
}

/// Response of `GetStops`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopsResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// Matching stops
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl StopsResponse {
    /// Find a stop by its code
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.code == code)
    }
}

/// Coordinates of a physical stop
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude
    #[serde(default)]
    pub latitude: f64,
    /// Longitude
    #[serde(default)]
    pub longitude: f64,
    /// Reference system (e.g. "WGS84")
    #[serde(default)]
    pub referential: String,
}

/// A platform/post-level stop
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalStop {
    /// Physical stop code (e.g. "CVIN00")
    #[serde(default)]
    pub physical_stop_code: String,
    /// Stop name
    #[serde(default)]
    pub stop_name: String,
    /// Location of the platform
    #[serde(default)]
    pub coordinates: Coordinates,
    /// Lines and destinations served from this platform
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl PhysicalStop {
    /// Platform position, if the reported coordinates are in range
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.coordinates.latitude, self.coordinates.longitude).ok()
    }
}

/// A logical stop together with its physical stops
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalStopGroup {
    /// Logical stop code
    #[serde(default)]
    pub stop_code: String,
    /// Logical stop name
    #[serde(default)]
    pub stop_name: String,
    /// Platforms, in server order
    #[serde(default)]
    pub physical_stops: Vec<PhysicalStop>,
}

/// Response of `GetPhysicalStops`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStopsResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// Matching stop groups
    #[serde(default)]
    pub stops: Vec<PhysicalStopGroup>,
}

/// Reliability of a departure time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reliability {
    /// Real-time forecast
    #[serde(rename = "F")]
    Forecast,
    /// Timetable value
    #[serde(rename = "T")]
    Theoretical,
    /// Value not known to this client
    #[default]
    #[serde(other)]
    Unknown,
}

/// A scheduled or real-time departure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Departure code, usable for thermometer queries
    pub departure_code: i64,
    /// Line and destination
    #[serde(default)]
    pub line: Connection,
    /// Whether the time is forecast or theoretical
    #[serde(default)]
    pub reliability: Reliability,
    /// Departure time as sent by the server
    #[serde(default)]
    pub timestamp: String,
    /// Human waiting time ("3", "&gt;1h", "no more")
    #[serde(default)]
    pub waiting_time: String,
    /// Waiting time in milliseconds
    #[serde(default)]
    pub waiting_time_millis: i64,
}

impl Departure {
    /// Waiting time as a duration, negative values clamp to zero
    #[must_use]
    pub fn waiting_duration(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.waiting_time_millis).unwrap_or(0))
    }

    /// Whether the departure time comes from real-time tracking
    #[must_use]
    pub fn is_real_time(&self) -> bool {
        self.reliability == Reliability::Forecast
    }
}

/// A scheduled routing change
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    /// Deviation code
    #[serde(default)]
    pub deviation_code: String,
}

/// A service disruption
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disruption {
    /// Disruption code
    #[serde(rename = "disruptionCode", default)]
    pub code: String,
    /// Time the disruption was published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Where it happens
    #[serde(default)]
    pub place: String,
    /// What travellers should expect
    #[serde(default)]
    pub consequence: String,
    /// What happened
    #[serde(default)]
    pub nature: String,
    /// Affected line
    #[serde(default)]
    pub line_code: String,
    /// Affected stop
    #[serde(default)]
    pub stop_name: String,
}

/// A departure with real-time extras, as returned by `GetNextDepartures`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextDeparture {
    /// Base departure fields
    #[serde(flatten)]
    pub departure: Departure,
    /// Vehicle characteristics (e.g. "PMR")
    #[serde(default)]
    pub characteristics: String,
    /// Disruptions affecting this departure
    #[serde(default)]
    pub disruptions: Vec<Disruption>,
    /// Vehicle number
    #[serde(rename = "vehiculeNo", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<i64>,
    /// Vehicle type
    #[serde(rename = "vehiculeType", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    /// Deviation applied to this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<Deviation>,
    /// Waiting time for the connection, in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_waiting_time: Option<i64>,
}

/// Response of `GetNextDepartures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDeparturesResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// The queried stop
    #[serde(default)]
    pub stop: Stop,
    /// Upcoming departures, soonest first
    #[serde(default)]
    pub departures: Vec<NextDeparture>,
}

impl NextDeparturesResponse {
    /// Departures on one line
    pub fn for_line<'a>(&'a self, line_code: &'a str) -> impl Iterator<Item = &'a NextDeparture> {
        self.departures
            .iter()
            .filter(move |d| d.departure.line.line_code == line_code)
    }
}

/// Response of `GetAllNextDepartures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllNextDeparturesResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// The queried stop
    #[serde(default)]
    pub stop: Stop,
    /// Departures for the rest of the day
    #[serde(default)]
    pub departures: Vec<Departure>,
}

/// One stop along a thermometer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Departure code at this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_code: Option<i64>,
    /// Whether this step is affected by a deviation
    #[serde(default)]
    pub deviation: bool,
    /// Code of that deviation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation_code: Option<String>,
    /// Reliability of the time at this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<Reliability>,
    /// The stop served
    #[serde(default)]
    pub stop: Stop,
    /// Passing time as sent by the server
    #[serde(default)]
    pub timestamp: String,
    /// Whether the step should be displayed
    #[serde(default)]
    pub visible: bool,
}

/// Route progress of one departure, as returned by `GetThermometer`
/// and `GetThermometerPhysicalStops`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermometerResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// Destination stop code
    #[serde(default)]
    pub destination_code: String,
    /// Destination name
    #[serde(default)]
    pub destination_name: String,
    /// Line code
    #[serde(default)]
    pub line_code: String,
    /// Departure stop
    #[serde(default)]
    pub stop: Stop,
    /// Stops along the route, in travel order
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Disruptions on the route
    #[serde(default, deserialize_with = "one_or_many")]
    pub disruptions: Vec<Disruption>,
    /// Deviations on the route
    #[serde(default)]
    pub deviations: Vec<Deviation>,
}

impl ThermometerResponse {
    /// Steps flagged as visible
    pub fn visible_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.visible)
    }
}

/// Display colors of a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineColor {
    /// Line code
    pub line_code: String,
    /// Hex color without leading `#`
    #[serde(default)]
    pub hexa: String,
    /// Background color
    #[serde(default)]
    pub background: String,
    /// Text color
    #[serde(default)]
    pub text: String,
}

/// Response of `GetLinesColors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineColorsResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// One entry per line
    #[serde(default)]
    pub colors: Vec<LineColor>,
}

impl LineColorsResponse {
    /// Colors of one line
    #[must_use]
    pub fn color_for(&self, line_code: &str) -> Option<&LineColor> {
        self.colors.iter().find(|c| c.line_code == line_code)
    }
}

/// Response of `GetDisruptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionsResponse {
    /// Server time of the response
    pub timestamp: Timestamp,
    /// Current disruptions on the network
    #[serde(default)]
    pub disruptions: Vec<Disruption>,
}

/// Accept either a single object or an array of them
///
/// `null` and `{}` both mean "none".
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EmptyObject {}

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<V> {
        Many(Vec<V>),
        Empty(EmptyObject),
        One(V),
        Null(()),
    }

    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
        OneOrMany::Empty(_) | OneOrMany::Null(()) => Vec::new(),
    })
}
