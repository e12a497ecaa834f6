use vesselapi_core::Pager;

use super::paginate;
use crate::models::{NavtexMessage, NavtexMessagesResponse};
use crate::params::NavtexQuery;
use crate::{Result, VesselClient};

/// NAVTEX endpoints, see [`VesselClient::navtex`].
#[derive(Debug, Clone, Copy)]
pub struct NavtexService<'a> {
    client: &'a VesselClient,
}

impl<'a> NavtexService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// One page of NAVTEX messages.
    pub async fn list(&self, query: &NavtexQuery) -> Result<NavtexMessagesResponse> {
        self.client.get_json(&["navtex"], query).await
    }

    /// Every NAVTEX message matching `query`.
    #[must_use]
    pub fn all(&self, query: &NavtexQuery) -> Pager<NavtexMessage> {
        paginate::<_, NavtexMessagesResponse>(self.client, &["navtex"], query)
    }
}
