use super::NoQuery;
use crate::models::PortResponse;
use crate::{Result, VesselClient};

/// Port endpoints, see [`VesselClient::ports`].
#[derive(Debug, Clone, Copy)]
pub struct PortsService<'a> {
    client: &'a VesselClient,
}

impl<'a> PortsService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// A port by its UN/LOCODE, such as `NLRTM`.
    pub async fn get(&self, unlocode: &str) -> Result<PortResponse> {
        self.client.get_json(&["port", unlocode], &NoQuery {}).await
    }
}
