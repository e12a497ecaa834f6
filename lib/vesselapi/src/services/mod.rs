//! Resource services of the Vessel API.
//!
//! Each service borrows the [`VesselClient`] and maps one method to one endpoint. Methods
//! named `all_*` return a [`Pager`] that walks every page of a listing.

mod emissions;
mod location;
mod navtex;
mod port_events;
mod ports;
mod search;
mod vessels;

pub use emissions::EmissionsService;
pub use location::LocationService;
pub use navtex::NavtexService;
pub use port_events::PortEventsService;
pub use ports::PortsService;
pub use search::SearchService;
pub use vessels::VesselsService;

use serde::Serialize;
use serde::de::DeserializeOwned;
use vesselapi_core::Pager;

use crate::VesselClient;
use crate::models::PageResponse;
use crate::params::PageQuery;

/// Query of endpoints without parameters.
#[derive(Serialize)]
struct NoQuery {}

/// Walk every page of a listing.
///
/// The pager owns a copy of `query`; only that copy's cursor moves, the caller's value is
/// never touched.
fn paginate<Q, R>(client: &VesselClient, segments: &[&str], query: &Q) -> Pager<R::Item>
where
    Q: PageQuery,
    R: PageResponse + DeserializeOwned + Send + 'static,
    R::Item: Send + 'static,
{
    let client = client.clone();
    let segments: Vec<String> = segments.iter().map(ToString::to_string).collect();
    let mut query = query.clone();

    Pager::new(move |cursor: Option<String>| {
        // The first page keeps whatever token the caller started from.
        if cursor.is_some() {
            query.set_next_token(cursor);
        }
        let client = client.clone();
        let segments = segments.clone();
        let query = query.clone();
        async move {
            let response: R = client.get_json(&segments, &query).await?;
            Ok(response.into_page())
        }
    })
}
