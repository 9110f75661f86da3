//! Historical-data request contract between a chart and its data source.
//!
//! Transport is the host's business; this module only defines the request
//! shapes and which responses are still wanted.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::bar_series::Bar;
use crate::error::ChartResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Initial or refreshed page at the live edge.
    #[serde(rename = "bars")]
    Bars,
    /// Older page requested when scrolling reaches the first record.
    #[serde(rename = "moreBars")]
    MoreBars,
}

impl RequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bars => "bars",
            Self::MoreBars => "moreBars",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarsRequest {
    pub id: u64,
    pub chart_id: String,
    pub kind: RequestKind,
    /// Number of bars wanted.
    pub count: usize,
    /// Upper bound (exclusive) for older pages, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarsResponse {
    pub request_id: u64,
    /// Chronological bars.
    pub bars: Vec<Bar>,
}

/// Source of historical bars.
pub trait Datafeed {
    fn send(&self, request: BarsRequest) -> impl Future<Output = ChartResult<BarsResponse>> + Send;
}

/// Issues request ids and remembers the latest request per chart and kind.
///
/// A new request supersedes the previous one of the same chart and kind;
/// only the response to the latest issued request is accepted.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next_id: u64,
    in_flight: HashMap<(String, RequestKind), u64>,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(
        &mut self,
        chart_id: &str,
        kind: RequestKind,
        count: usize,
        end_date_ms: Option<i64>,
    ) -> BarsRequest {
        self.next_id += 1;
        let id = self.next_id;
        if let Some(previous) = self.in_flight.insert((chart_id.to_owned(), kind), id) {
            debug!(chart_id, kind = kind.as_str(), previous, id, "request superseded");
        }
        BarsRequest {
            id,
            chart_id: chart_id.to_owned(),
            kind,
            count,
            end_date_ms,
        }
    }

    #[must_use]
    pub fn is_alive(&self, request: &BarsRequest) -> bool {
        self.in_flight
            .get(&(request.chart_id.clone(), request.kind))
            .is_some_and(|id| *id == request.id)
    }

    #[must_use]
    pub fn pending(&self, chart_id: &str, kind: RequestKind) -> Option<u64> {
        self.in_flight.get(&(chart_id.to_owned(), kind)).copied()
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolves `response` against `request`. Returns the request kind when
    /// the response is current; stale or mismatched responses are dropped.
    pub fn complete(&mut self, request: &BarsRequest, response: &BarsResponse) -> Option<RequestKind> {
        if response.request_id != request.id || !self.is_alive(request) {
            warn!(
                chart_id = %request.chart_id,
                request_id = request.id,
                response_id = response.request_id,
                "stale bars response discarded"
            );
            return None;
        }
        self.in_flight.remove(&(request.chart_id.clone(), request.kind));
        Some(request.kind)
    }

    /// Forgets the request; a late response will be discarded.
    pub fn cancel(&mut self, request: &BarsRequest) -> bool {
        if self.is_alive(request) {
            self.in_flight.remove(&(request.chart_id.clone(), request.kind));
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}
