use vesselapi_core::Pager;

use super::paginate;
use crate::models::{
    ClassificationResponse, InspectionDetailResponse, InspectionsResponse, MarineCasualtiesResponse,
    MarineCasualty, OwnershipResponse, VesselEmission, VesselEmissionsResponse, VesselEtaResponse,
    VesselPosition, VesselPositionResponse, VesselPositionsResponse, VesselResponse,
};
use crate::params::{VesselPageQuery, VesselPositionsQuery, VesselQuery};
use crate::{Result, VesselClient};

/// Vessel endpoints, see [`VesselClient::vessels`].
///
/// `id` is an IMO number or an MMSI, as told by the query's `id_type`.
#[derive(Debug, Clone, Copy)]
pub struct VesselsService<'a> {
    client: &'a VesselClient,
}

impl<'a> VesselsService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// Static particulars of a vessel.
    pub async fn get(&self, id: &str, query: &VesselQuery) -> Result<VesselResponse> {
        self.client.get_json(&["vessel", id], query).await
    }

    /// Latest AIS position of a vessel.
    pub async fn position(&self, id: &str, query: &VesselQuery) -> Result<VesselPositionResponse> {
        self.client.get_json(&["vessel", id, "position"], query).await
    }

    /// One page of marine casualties involving a vessel.
    pub async fn casualties(
        &self,
        id: &str,
        query: &VesselPageQuery,
    ) -> Result<MarineCasualtiesResponse> {
        self.client.get_json(&["vessel", id, "casualties"], query).await
    }

    /// Classification society data of a vessel.
    pub async fn classification(
        &self,
        id: &str,
        query: &VesselQuery,
    ) -> Result<ClassificationResponse> {
        self.client
            .get_json(&["vessel", id, "classification"], query)
            .await
    }

    /// One page of yearly emissions reports of a vessel.
    pub async fn emissions(
        &self,
        id: &str,
        query: &VesselPageQuery,
    ) -> Result<VesselEmissionsResponse> {
        self.client.get_json(&["vessel", id, "emissions"], query).await
    }

    /// Estimated time of arrival of a vessel.
    pub async fn eta(&self, id: &str, query: &VesselQuery) -> Result<VesselEtaResponse> {
        self.client.get_json(&["vessel", id, "eta"], query).await
    }

    /// Port state control inspections of a vessel.
    pub async fn inspections(&self, id: &str, query: &VesselQuery) -> Result<InspectionsResponse> {
        self.client.get_json(&["vessel", id, "inspections"], query).await
    }

    /// Full record of one inspection, `detail_id` coming from [`Self::inspections`].
    pub async fn inspection_detail(
        &self,
        id: &str,
        detail_id: &str,
        query: &VesselQuery,
    ) -> Result<InspectionDetailResponse> {
        self.client
            .get_json(&["vessel", id, "inspections", detail_id], query)
            .await
    }

    /// Ownership and management of a vessel.
    pub async fn ownership(&self, id: &str, query: &VesselQuery) -> Result<OwnershipResponse> {
        self.client.get_json(&["vessel", id, "ownership"], query).await
    }

    /// One page of latest positions for several vessels.
    pub async fn positions(&self, query: &VesselPositionsQuery) -> Result<VesselPositionsResponse> {
        self.client.get_json(&["vessels", "positions"], query).await
    }

    /// Every casualty involving a vessel.
    #[must_use]
    pub fn all_casualties(&self, id: &str, query: &VesselPageQuery) -> Pager<MarineCasualty> {
        paginate::<_, MarineCasualtiesResponse>(self.client, &["vessel", id, "casualties"], query)
    }

    /// Every emissions report of a vessel.
    #[must_use]
    pub fn all_emissions(&self, id: &str, query: &VesselPageQuery) -> Pager<VesselEmission> {
        paginate::<_, VesselEmissionsResponse>(self.client, &["vessel", id, "emissions"], query)
    }

    /// Every position matching `query`.
    #[must_use]
    pub fn all_positions(&self, query: &VesselPositionsQuery) -> Pager<VesselPosition> {
        paginate::<_, VesselPositionsResponse>(self.client, &["vessels", "positions"], query)
    }
}
