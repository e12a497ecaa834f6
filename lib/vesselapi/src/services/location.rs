use vesselapi_core::Pager;

use super::paginate;
use crate::models::{
    FindDgpsStationsResponse, FindLightAidsResponse, FindModusResponse, FindPortsResponse,
    FindRadioBeaconsResponse, PageResponse, VesselsWithinLocationResponse,
};
use crate::params::{BoundingBoxQuery, RadiusQuery};
use crate::{Result, VesselClient};

/// Geographic endpoints, see [`VesselClient::location`].
///
/// Every resource can be queried inside a bounding box or within a radius of a point.
#[derive(Debug, Clone, Copy)]
pub struct LocationService<'a> {
    client: &'a VesselClient,
}

impl<'a> LocationService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }
}

/// Declares the single-page and paginated methods of one location endpoint.
macro_rules! location_endpoint {
    (
        $doc:literal,
        $page:ident, $all:ident,
        [$($segment:literal),+],
        $query:ty => $response:ty
    ) => {
        impl LocationService<'_> {
            #[doc = concat!("One page of ", $doc, ".")]
            pub async fn $page(&self, query: &$query) -> Result<$response> {
                self.client.get_json(&["location", $($segment),+], query).await
            }

            #[doc = concat!("Every one of the ", $doc, ".")]
            #[must_use]
            pub fn $all(&self, query: &$query) -> Pager<<$response as PageResponse>::Item> {
                paginate::<_, $response>(self.client, &["location", $($segment),+], query)
            }
        }
    };
}

location_endpoint!(
    "vessel positions inside a bounding box",
    vessels_bounding_box, all_vessels_bounding_box,
    ["vessels", "bounding-box"],
    BoundingBoxQuery => VesselsWithinLocationResponse
);
location_endpoint!(
    "vessel positions within a radius",
    vessels_radius, all_vessels_radius,
    ["vessels", "radius"],
    RadiusQuery => VesselsWithinLocationResponse
);
location_endpoint!(
    "ports inside a bounding box",
    ports_bounding_box, all_ports_bounding_box,
    ["ports", "bounding-box"],
    BoundingBoxQuery => FindPortsResponse
);
location_endpoint!(
    "ports within a radius",
    ports_radius, all_ports_radius,
    ["ports", "radius"],
    RadiusQuery => FindPortsResponse
);
location_endpoint!(
    "DGPS stations inside a bounding box",
    dgps_bounding_box, all_dgps_bounding_box,
    ["dgps", "bounding-box"],
    BoundingBoxQuery => FindDgpsStationsResponse
);
location_endpoint!(
    "DGPS stations within a radius",
    dgps_radius, all_dgps_radius,
    ["dgps", "radius"],
    RadiusQuery => FindDgpsStationsResponse
);
location_endpoint!(
    "light aids inside a bounding box",
    light_aids_bounding_box, all_light_aids_bounding_box,
    ["lightaids", "bounding-box"],
    BoundingBoxQuery => FindLightAidsResponse
);
location_endpoint!(
    "light aids within a radius",
    light_aids_radius, all_light_aids_radius,
    ["lightaids", "radius"],
    RadiusQuery => FindLightAidsResponse
);
location_endpoint!(
    "MODUs inside a bounding box",
    modus_bounding_box, all_modus_bounding_box,
    ["modu", "bounding-box"],
    BoundingBoxQuery => FindModusResponse
);
location_endpoint!(
    "MODUs within a radius",
    modus_radius, all_modus_radius,
    ["modu", "radius"],
    RadiusQuery => FindModusResponse
);
location_endpoint!(
    "radio beacons inside a bounding box",
    radio_beacons_bounding_box, all_radio_beacons_bounding_box,
    ["radiobeacons", "bounding-box"],
    BoundingBoxQuery => FindRadioBeaconsResponse
);
location_endpoint!(
    "radio beacons within a radius",
    radio_beacons_radius, all_radio_beacons_radius,
    ["radiobeacons", "radius"],
    RadiusQuery => FindRadioBeaconsResponse
);
