//! Response payloads of the Vessel API.
//!
//! Records carry the fields most callers need as typed options; everything else the API
//! sends is kept in `extra`, so no data is lost when the server adds fields.

use serde::Deserialize;
use serde_json::{Map, Value};
use vesselapi_core::Page;

/// Fields of a record that have no typed counterpart.
pub type Extra = Map<String, Value>;

/// A response envelope holding one page of a paginated listing.
pub trait PageResponse {
    /// Record type of the listing.
    type Item;

    /// Split the envelope into its records and the cursor of the next page.
    fn into_page(self) -> Page<Self::Item>;
}

/// Declares a paginated envelope: a list field plus `nextToken`.
macro_rules! page_response {
    ($(#[$meta:meta])* $name:ident { $field:ident: $item:ty }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[doc = concat!("Records of this page, `", stringify!($field), "` in the payload.")]
            #[serde(default)]
            pub $field: Vec<$item>,
            /// Cursor of the next page, absent on the last one.
            #[serde(default)]
            pub next_token: Option<String>,
        }

        impl PageResponse for $name {
            type Item = $item;

            fn into_page(self) -> Page<$item> {
                Page::new(self.$field, self.next_token)
            }
        }
    };
}

// ============================================================================
// Records
// ============================================================================

/// A vessel's static particulars.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    /// IMO number.
    pub imo: Option<i64>,
    /// MMSI.
    pub mmsi: Option<i64>,
    /// Vessel name.
    pub name: Option<String>,
    /// Flag state.
    pub flag: Option<String>,
    /// Vessel type.
    pub vessel_type: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// An AIS position report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselPosition {
    /// IMO number.
    pub imo: Option<i64>,
    /// MMSI.
    pub mmsi: Option<i64>,
    /// Vessel name.
    pub vessel_name: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Report time, RFC 3339.
    pub timestamp: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A port.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// UN/LOCODE.
    pub unlo_code: Option<String>,
    /// Port name.
    pub name: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// An arrival at or departure from a port.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortEvent {
    /// Event kind.
    pub event: Option<String>,
    /// Event time, RFC 3339.
    pub timestamp: Option<String>,
    /// Untyped fields, vessel and port details included.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A marine casualty record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineCasualty {
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Yearly emissions report of a vessel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselEmission {
    /// IMO number.
    pub imo: Option<i64>,
    /// Vessel name.
    pub name: Option<String>,
    /// Reporting year.
    pub period: Option<i32>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A DGPS reference station.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DgpsStation {
    /// Station name.
    pub name: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A light, buoy or other lit aid to navigation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightAid {
    /// Aid name.
    pub name: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A mobile offshore drilling unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modu {
    /// Unit name.
    pub name: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A radio beacon.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioBeacon {
    /// Beacon name.
    pub name: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A NAVTEX maritime safety broadcast.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavtexMessage {
    /// Message text.
    pub message: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Inspection summary of a vessel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    /// Identifier to pass to the inspection detail endpoint.
    pub detail_id: Option<String>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

// ============================================================================
// Single-record envelopes
// ============================================================================

/// `GET /vessel/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselResponse {
    /// The vessel.
    pub vessel: Option<Vessel>,
}

/// `GET /vessel/{id}/position`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselPositionResponse {
    /// Latest position.
    pub vessel_position: Option<VesselPosition>,
}

/// `GET /vessel/{id}/classification`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponse {
    /// Classification society data.
    pub classification: Option<Value>,
    /// Untyped fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// `GET /vessel/{id}/eta`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselEtaResponse {
    /// Untyped payload.
    #[serde(flatten)]
    pub extra: Extra,
}

/// `GET /vessel/{id}/inspections`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionsResponse {
    /// Number of inspections on record.
    pub inspection_count: Option<i64>,
    /// Inspection summaries.
    #[serde(default)]
    pub inspections: Vec<Inspection>,
}

/// `GET /vessel/{id}/inspections/{detailId}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionDetailResponse {
    /// Untyped payload.
    #[serde(flatten)]
    pub extra: Extra,
}

/// `GET /vessel/{id}/ownership`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipResponse {
    /// Untyped payload.
    #[serde(flatten)]
    pub extra: Extra,
}

/// `GET /port/{unlocode}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortResponse {
    /// The port.
    pub port: Option<Port>,
}

/// `GET /portevents/vessel/{id}/last`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortEventResponse {
    /// Most recent event.
    pub port_event: Option<PortEvent>,
}

// ============================================================================
// Paginated envelopes
// ============================================================================

page_response!(
    /// `GET /vessel/{id}/casualties`.
    MarineCasualtiesResponse { casualties: MarineCasualty }
);

page_response!(
    /// `GET /vessel/{id}/emissions` and `GET /emissions`.
    VesselEmissionsResponse { emissions: VesselEmission }
);

page_response!(
    /// `GET /vessels/positions`.
    VesselPositionsResponse { vessel_positions: VesselPosition }
);

page_response!(
    /// Port event listings.
    PortEventsResponse { port_events: PortEvent }
);

page_response!(
    /// `GET /search/vessels`.
    FindVesselsResponse { vessels: Vessel }
);

page_response!(
    /// `GET /search/ports` and the port location queries.
    FindPortsResponse { ports: Port }
);

page_response!(
    /// `GET /search/dgps` and the DGPS location queries.
    FindDgpsStationsResponse { dgps_stations: DgpsStation }
);

page_response!(
    /// `GET /search/lightaids` and the light aid location queries.
    FindLightAidsResponse { light_aids: LightAid }
);

page_response!(
    /// `GET /search/modus` and the MODU location queries.
    FindModusResponse { modus: Modu }
);

page_response!(
    /// `GET /search/radiobeacons` and the radio beacon location queries.
    FindRadioBeaconsResponse { radio_beacons: RadioBeacon }
);

page_response!(
    /// Vessel location queries.
    VesselsWithinLocationResponse { vessels: VesselPosition }
);

page_response!(
    /// `GET /navtex`.
    NavtexMessagesResponse { navtex_messages: NavtexMessage }
);

#[cfg(test)]
mod tests {
    use vesselapi_core::from_json;

    use super::*;

    #[test]
    fn unknown_fields_are_kept() {
        let response: VesselResponse = from_json(
            br#"{"vessel":{"imo":9321483,"name":"EVER GIVEN","deadweight":199629}}"#,
        )
        .expect("decodes");

        let vessel = response.vessel.expect("vessel");
        assert_eq!(vessel.imo, Some(9_321_483));
        assert_eq!(vessel.name.as_deref(), Some("EVER GIVEN"));
        assert_eq!(vessel.mmsi, None);
        assert_eq!(vessel.extra.get("deadweight"), Some(&Value::from(199_629)));
    }

    #[test]
    fn page_envelopes_split_into_items_and_cursor() {
        let response: NavtexMessagesResponse = from_json(
            br#"{"navtexMessages":[{"message":"GALE WARNING"},{"message":"NAV WARNING"}],"nextToken":"t2"}"#,
        )
        .expect("decodes");

        let (items, cursor) = response.into_page().into_parts();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].message.as_deref(), Some("NAV WARNING"));
        assert_eq!(cursor.as_deref(), Some("t2"));
    }

    #[test]
    fn missing_list_and_cursor_mean_last_empty_page() {
        let response: FindPortsResponse = from_json(b"{}").expect("decodes");
        let page = response.into_page();
        assert!(page.items().is_empty());
        assert_eq!(page.next_cursor(), None);

        let response: FindPortsResponse =
            from_json(br#"{"ports":[{"unloCode":"NLRTM"}],"nextToken":""}"#).expect("decodes");
        let page = response.into_page();
        assert_eq!(page.items()[0].unlo_code.as_deref(), Some("NLRTM"));
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn decode_errors_name_the_field() {
        let err = from_json::<InspectionsResponse>(br#"{"inspectionCount":"many"}"#)
            .expect_err("bad count");
        assert!(err.to_string().contains("inspectionCount"), "{err}");
    }
}
