use vesselapi_core::Pager;

use super::paginate;
use crate::models::{PortEvent, PortEventResponse, PortEventsResponse};
use crate::params::{
    PortEventsByPortsQuery, PortEventsByVesselQuery, PortEventsByVesselsQuery, PortEventsQuery,
    VesselQuery,
};
use crate::{Result, VesselClient};

/// Port call (arrival and departure) endpoints, see [`VesselClient::port_events`].
#[derive(Debug, Clone, Copy)]
pub struct PortEventsService<'a> {
    client: &'a VesselClient,
}

impl<'a> PortEventsService<'a> {
    pub(crate) const fn new(client: &'a VesselClient) -> Self {
        Self { client }
    }

    /// One page of port events across all ports.
    pub async fn list(&self, query: &PortEventsQuery) -> Result<PortEventsResponse> {
        self.client.get_json(&["portevents"], query).await
    }

    /// One page of events at the port identified by `unlocode`.
    pub async fn by_port(&self, unlocode: &str, query: &PortEventsQuery) -> Result<PortEventsResponse> {
        self.client
            .get_json(&["portevents", "port", unlocode], query)
            .await
    }

    /// One page of events at ports matching a name.
    pub async fn by_ports(&self, query: &PortEventsByPortsQuery) -> Result<PortEventsResponse> {
        self.client.get_json(&["portevents", "ports"], query).await
    }

    /// One page of events of a vessel.
    pub async fn by_vessel(
        &self,
        id: &str,
        query: &PortEventsByVesselQuery,
    ) -> Result<PortEventsResponse> {
        self.client
            .get_json(&["portevents", "vessel", id], query)
            .await
    }

    /// The most recent event of a vessel.
    pub async fn last_by_vessel(&self, id: &str, query: &VesselQuery) -> Result<PortEventResponse> {
        self.client
            .get_json(&["portevents", "vessel", id, "last"], query)
            .await
    }

    /// One page of events of vessels matching a name.
    pub async fn by_vessels(&self, query: &PortEventsByVesselsQuery) -> Result<PortEventsResponse> {
        self.client.get_json(&["portevents", "vessels"], query).await
    }

    /// Every port event matching `query`.
    #[must_use]
    pub fn all(&self, query: &PortEventsQuery) -> Pager<PortEvent> {
        paginate::<_, PortEventsResponse>(self.client, &["portevents"], query)
    }

    /// Every event at the port identified by `unlocode`.
    #[must_use]
    pub fn all_by_port(&self, unlocode: &str, query: &PortEventsQuery) -> Pager<PortEvent> {
        paginate::<_, PortEventsResponse>(self.client, &["portevents", "port", unlocode], query)
    }

    /// Every event at ports matching a name.
    #[must_use]
    pub fn all_by_ports(&self, query: &PortEventsByPortsQuery) -> Pager<PortEvent> {
        paginate::<_, PortEventsResponse>(self.client, &["portevents", "ports"], query)
    }

    /// Every event of a vessel.
    #[must_use]
    pub fn all_by_vessel(&self, id: &str, query: &PortEventsByVesselQuery) -> Pager<PortEvent> {
        paginate::<_, PortEventsResponse>(self.client, &["portevents", "vessel", id], query)
    }

    /// Every event of vessels matching a name.
    #[must_use]
    pub fn all_by_vessels(&self, query: &PortEventsByVesselsQuery) -> Pager<PortEvent> {
        paginate::<_, PortEventsResponse>(self.client, &["portevents", "vessels"], query)
    }
}
