use vesselapi_core::Pager;

use super::paginate;
use crate::models::{
    DgpsStation, FindDgpsStationsResponse, FindLightAidsResponse, FindModusResponse,
    FindPortsResponse, FindRadioBeaconsResponse, FindVesselsResponse, LightAid, Modu, Port,
    RadioBeacon, Vessel,
};
use crate::params::{NameSearchQuery, SearchPortsQuery, SearchVesselsQuery};
use crate::{Result, VesselClient};

/// Search endpoints, see [`VesselClient::search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchService<'a> {
    client: &'a VesselClient,
}

impl<'a> SearchService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// One page of vessels matching name, flag or type.
    pub async fn vessels(&self, query: &SearchVesselsQuery) -> Result<FindVesselsResponse> {
        self.client.get_json(&["search", "vessels"], query).await
    }

    /// One page of ports matching name, country, type or harbor size.
    pub async fn ports(&self, query: &SearchPortsQuery) -> Result<FindPortsResponse> {
        self.client.get_json(&["search", "ports"], query).await
    }

    /// One page of DGPS stations matching a name.
    pub async fn dgps(&self, query: &NameSearchQuery) -> Result<FindDgpsStationsResponse> {
        self.client.get_json(&["search", "dgps"], query).await
    }

    /// One page of light aids matching a name.
    pub async fn light_aids(&self, query: &NameSearchQuery) -> Result<FindLightAidsResponse> {
        self.client.get_json(&["search", "lightaids"], query).await
    }

    /// One page of MODUs matching a name.
    pub async fn modus(&self, query: &NameSearchQuery) -> Result<FindModusResponse> {
        self.client.get_json(&["search", "modus"], query).await
    }

    /// One page of radio beacons matching a name.
    pub async fn radio_beacons(&self, query: &NameSearchQuery) -> Result<FindRadioBeaconsResponse> {
        self.client.get_json(&["search", "radiobeacons"], query).await
    }

    /// Every vessel matching `query`.
    #[must_use]
    pub fn all_vessels(&self, query: &SearchVesselsQuery) -> Pager<Vessel> {
        paginate::<_, FindVesselsResponse>(self.client, &["search", "vessels"], query)
    }

    /// Every port matching `query`.
    #[must_use]
    pub fn all_ports(&self, query: &SearchPortsQuery) -> Pager<Port> {
        paginate::<_, FindPortsResponse>(self.client, &["search", "ports"], query)
    }

    /// Every DGPS station matching `query`.
    #[must_use]
    pub fn all_dgps(&self, query: &NameSearchQuery) -> Pager<DgpsStation> {
        paginate::<_, FindDgpsStationsResponse>(self.client, &["search", "dgps"], query)
    }

    /// Every light aid matching `query`.
    #[must_use]
    pub fn all_light_aids(&self, query: &NameSearchQuery) -> Pager<LightAid> {
        paginate::<_, FindLightAidsResponse>(self.client, &["search", "lightaids"], query)
    }

    /// Every MODU matching `query`.
    #[must_use]
    pub fn all_modus(&self, query: &NameSearchQuery) -> Pager<Modu> {
        paginate::<_, FindModusResponse>(self.client, &["search", "modus"], query)
    }

    /// Every radio beacon matching `query`.
    #[must_use]
    pub fn all_radio_beacons(&self, query: &NameSearchQuery) -> Pager<RadioBeacon> {
        paginate::<_, FindRadioBeaconsResponse>(self.client, &["search", "radiobeacons"], query)
    }
}
