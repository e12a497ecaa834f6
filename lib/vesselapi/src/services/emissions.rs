use vesselapi_core::Pager;

use super::paginate;
use crate::models::{VesselEmission, VesselEmissionsResponse};
use crate::params::EmissionsQuery;
use crate::{Result, VesselClient};

/// Fleet-wide emissions endpoints, see [`VesselClient::emissions`].
#[derive(Debug, Clone, Copy)]
pub struct EmissionsService<'a> {
    client: &'a VesselClient,
}

impl<'a> EmissionsService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// One page of emissions reports.
    pub async fn list(&self, query: &EmissionsQuery) -> Result<VesselEmissionsResponse> {
        self.client.get_json(&["emissions"], query).await
    }

    /// Every emissions report matching `query`.
    #[must_use]
    pub fn all(&self, query: &EmissionsQuery) -> Pager<VesselEmission> {
        paginate::<_, VesselEmissionsResponse>(self.client, &["emissions"], query)
    }
}
