//! Query parameters of the Vessel API endpoints.
//!
//! Every struct serializes to the API's dotted parameter names (`filter.idType`,
//! `time.from`, `pagination.nextToken`, ...) and leaves unset options out of the query.
//! Timestamps are RFC 3339 strings, passed through untouched.

use serde::{Serialize, Serializer};

/// How a vessel identifier should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// IMO number, the default for single-vessel lookups.
    #[default]
    Imo,
    /// Maritime Mobile Service Identity.
    Mmsi,
}

/// Query types that carry a pagination cursor.
///
/// Paginated wrappers work on a private copy of the caller's query and only advance the
/// copy's `pagination.nextToken`.
pub trait PageQuery: Serialize + Clone + Send + Sync + 'static {
    /// Replace the `pagination.nextToken` value.
    fn set_next_token(&mut self, token: Option<String>);
}

fn comma_separated<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

/// Implements [`PageQuery`] and the pagination setters for query types with `limit` and
/// `next_token` fields.
macro_rules! paginated {
    ($($query:ty),+ $(,)?) => {
        $(
            impl PageQuery for $query {
                fn set_next_token(&mut self, token: Option<String>) {
                    self.next_token = token;
                }
            }

            impl $query {
                /// Set `pagination.limit`.
                #[must_use]
                pub fn limit(mut self, limit: i32) -> Self {
                    self.limit = Some(limit);
                    self
                }

                /// Set `pagination.nextToken`, resuming from a previous page.
                #[must_use]
                pub fn next_token(mut self, token: impl Into<String>) -> Self {
                    self.next_token = Some(token.into());
                    self
                }
            }
        )+
    };
}

// ============================================================================
// Vessels
// ============================================================================

/// Single-vessel lookups (`/vessel/{id}`, `/vessel/{id}/position`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VesselQuery {
    /// Identifier kind, IMO unless told otherwise.
    #[serde(rename = "filter.idType")]
    pub id_type: IdType,
}

impl VesselQuery {
    /// Look the vessel up by MMSI.
    #[must_use]
    pub fn mmsi() -> Self {
        Self {
            id_type: IdType::Mmsi,
        }
    }
}

impl From<IdType> for VesselQuery {
    fn from(id_type: IdType) -> Self {
        Self { id_type }
    }
}

/// Paginated per-vessel history (`/vessel/{id}/casualties`, `/vessel/{id}/emissions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VesselPageQuery {
    /// Identifier kind.
    #[serde(rename = "filter.idType")]
    pub id_type: IdType,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Latest positions of several vessels (`/vessels/positions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VesselPositionsQuery {
    /// Identifier kind shared by all `ids`.
    #[serde(rename = "filter.idType")]
    pub id_type: IdType,
    /// Vessel identifiers, sent as one comma-separated value.
    #[serde(
        rename = "filter.ids",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ids: Vec<String>,
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl VesselPositionsQuery {
    /// Positions of the given vessels.
    pub fn new<I, S>(id_type: IdType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id_type,
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Port events
// ============================================================================

/// Port events, globally or for one port (`/portevents`, `/portevents/port/{unlocode}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortEventsQuery {
    /// Country name or code.
    #[serde(rename = "filter.country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Event kind, such as `arrival` or `departure`.
    #[serde(rename = "filter.eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Port events for ports matching a name (`/portevents/ports`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortEventsByPortsQuery {
    /// Port name to match.
    #[serde(rename = "filter.portName")]
    pub port_name: String,
    /// Event kind.
    #[serde(rename = "filter.eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl PortEventsByPortsQuery {
    /// Events for ports named `port_name`.
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }
}

/// Port events of one vessel (`/portevents/vessel/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortEventsByVesselQuery {
    /// Identifier kind.
    #[serde(rename = "filter.idType")]
    pub id_type: IdType,
    /// Event kind.
    #[serde(rename = "filter.eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Port events of vessels matching a name (`/portevents/vessels`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortEventsByVesselsQuery {
    /// Vessel name to match.
    #[serde(rename = "filter.vesselName")]
    pub vessel_name: String,
    /// Event kind.
    #[serde(rename = "filter.eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl PortEventsByVesselsQuery {
    /// Events for vessels named `vessel_name`.
    pub fn new(vessel_name: impl Into<String>) -> Self {
        Self {
            vessel_name: vessel_name.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Emissions
// ============================================================================

/// Fleet-wide emissions (`/emissions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmissionsQuery {
    /// Reporting year.
    #[serde(rename = "filter.period", skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

/// Vessel search (`/search/vessels`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchVesselsQuery {
    /// Vessel name.
    #[serde(rename = "filter.name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Flag state code.
    #[serde(rename = "filter.flag", skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// Vessel type, such as `Container Ship`.
    #[serde(rename = "filter.vesselType", skip_serializing_if = "Option::is_none")]
    pub vessel_type: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Port search (`/search/ports`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPortsQuery {
    /// Port name.
    #[serde(rename = "filter.name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Country code.
    #[serde(rename = "filter.country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Port type, such as `Seaport`.
    #[serde(rename = "filter.type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    /// Harbor size class (`V`, `S`, `M`, `L`).
    #[serde(rename = "filter.harborSize", skip_serializing_if = "Option::is_none")]
    pub harbor_size: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Name search over navigation aids (DGPS stations, light aids, MODUs, radio beacons).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameSearchQuery {
    /// Name to match.
    #[serde(rename = "filter.name")]
    pub name: String,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl NameSearchQuery {
    /// Search for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Location
// ============================================================================

/// Everything inside a latitude/longitude rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundingBoxQuery {
    /// Southern edge.
    #[serde(rename = "filter.latBottom", skip_serializing_if = "Option::is_none")]
    pub lat_bottom: Option<f64>,
    /// Northern edge.
    #[serde(rename = "filter.latTop", skip_serializing_if = "Option::is_none")]
    pub lat_top: Option<f64>,
    /// Western edge.
    #[serde(rename = "filter.lonLeft", skip_serializing_if = "Option::is_none")]
    pub lon_left: Option<f64>,
    /// Eastern edge.
    #[serde(rename = "filter.lonRight", skip_serializing_if = "Option::is_none")]
    pub lon_right: Option<f64>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl BoundingBoxQuery {
    /// Rectangle spanning `lon_left..lon_right` and `lat_bottom..lat_top`.
    #[must_use]
    pub fn new(lon_left: f64, lon_right: f64, lat_bottom: f64, lat_top: f64) -> Self {
        Self {
            lat_bottom: Some(lat_bottom),
            lat_top: Some(lat_top),
            lon_left: Some(lon_left),
            lon_right: Some(lon_right),
            ..Self::default()
        }
    }
}

/// Everything within `radius` meters of a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadiusQuery {
    /// Latitude of the center.
    #[serde(rename = "filter.latitude", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude of the center.
    #[serde(rename = "filter.longitude", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Radius in meters.
    #[serde(rename = "filter.radius")]
    pub radius: i64,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl RadiusQuery {
    /// Circle of `radius` meters around (`latitude`, `longitude`).
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, radius: i64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius,
            ..Self::default()
        }
    }
}

// ============================================================================
// Navtex
// ============================================================================

/// NAVTEX broadcasts (`/navtex`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavtexQuery {
    /// Start of the time window.
    #[serde(rename = "time.from", skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// End of the time window.
    #[serde(rename = "time.to", skip_serializing_if = "Option::is_none")]
    pub time_to: Option<String>,
    /// Page size.
    #[serde(rename = "pagination.limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    #[serde(rename = "pagination.nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

paginated!(
    VesselPageQuery,
    VesselPositionsQuery,
    PortEventsQuery,
    PortEventsByPortsQuery,
    PortEventsByVesselQuery,
    PortEventsByVesselsQuery,
    EmissionsQuery,
    SearchVesselsQuery,
    SearchPortsQuery,
    NameSearchQuery,
    BoundingBoxQuery,
    RadiusQuery,
    NavtexQuery,
);

#[cfg(test)]
mod tests {
    use vesselapi_core::to_query_string;

    use super::*;

    #[test]
    fn single_vessel_lookups_default_to_imo() {
        insta::assert_snapshot!(
            to_query_string(&VesselQuery::default()).expect("query"),
            @"filter.idType=imo"
        );
        insta::assert_snapshot!(
            to_query_string(&VesselQuery::mmsi()).expect("query"),
            @"filter.idType=mmsi"
        );
    }

    #[test]
    fn vessel_ids_are_comma_separated() {
        let query = VesselPositionsQuery::new(IdType::Mmsi, ["232003239", "246497000"]).limit(5);
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.idType=mmsi&filter.ids=232003239%2C246497000&pagination.limit=5"
        );
    }

    #[test]
    fn unset_options_are_left_out() {
        let query = PortEventsQuery {
            country: Some("Singapore".to_string()),
            event_type: Some("arrival".to_string()),
            ..PortEventsQuery::default()
        };
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.country=Singapore&filter.eventType=arrival"
        );
        assert_eq!(to_query_string(&NavtexQuery::default()).expect("query"), "");
    }

    #[test]
    fn location_queries() {
        let query = BoundingBoxQuery::new(4.25, 5.5, 51.75, 52.5).limit(5);
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.latBottom=51.75&filter.latTop=52.5&filter.lonLeft=4.25&filter.lonRight=5.5&pagination.limit=5"
        );

        let query = RadiusQuery::new(51.5, 4.5, 100_000);
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.latitude=51.5&filter.longitude=4.5&filter.radius=100000"
        );
    }

    #[test]
    fn search_ports_uses_the_type_filter() {
        let query = SearchPortsQuery {
            country: Some("NL".to_string()),
            port_type: Some("Seaport".to_string()),
            harbor_size: Some("L".to_string()),
            ..SearchPortsQuery::default()
        };
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.country=NL&filter.type=Seaport&filter.harborSize=L"
        );
    }

    #[test]
    fn next_token_setters() {
        let mut query = NameSearchQuery::new("Hammer Odde").next_token("abc");
        assert_eq!(query.next_token.as_deref(), Some("abc"));

        query.set_next_token(None);
        insta::assert_snapshot!(
            to_query_string(&query).expect("query"),
            @"filter.name=Hammer+Odde"
        );
    }
}
