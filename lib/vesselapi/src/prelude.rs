//! Prelude module for convenient imports.
//!
//! ```ignore
//! use vesselapi::prelude::*;
//! ```

pub use crate::params::{
    BoundingBoxQuery, EmissionsQuery, IdType, NameSearchQuery, NavtexQuery,
    PortEventsByPortsQuery, PortEventsByVesselQuery, PortEventsByVesselsQuery, PortEventsQuery,
    RadiusQuery, SearchPortsQuery, SearchVesselsQuery, VesselPageQuery, VesselPositionsQuery,
    VesselQuery,
};
pub use crate::{
    ApiError, CancellationToken, ClientConfig, Error, HttpClient, Pager, Result, VesselClient,
};
