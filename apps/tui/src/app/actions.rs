use crate::api::{ApiClient, ApiError};
use crate::app::page::ViewTicket;
use crate::domain::{
    AnalysisResult, ComplaintRecord, DetectionReport, HotspotRecord, ServerHistoryItem, Timeline,
};
use crate::map::RecommendationTicket;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

/// Result of a background request, delivered to the event loop.
#[derive(Debug)]
pub enum FetchOutcome {
    Dashboard {
        ticket: ViewTicket,
        map: Result<Vec<ComplaintRecord>, ApiError>,
        history: Result<Vec<ServerHistoryItem>, ApiError>,
        timeline: Result<Timeline, ApiError>,
    },
    Hotspots {
        ticket: ViewTicket,
        hotspots: Result<Vec<HotspotRecord>, ApiError>,
    },
    History {
        ticket: ViewTicket,
        items: Result<Vec<ServerHistoryItem>, ApiError>,
    },
    Analysis {
        ticket: ViewTicket,
        question: String,
        result: Result<AnalysisResult, ApiError>,
    },
    Detection {
        ticket: ViewTicket,
        path: PathBuf,
        report: Result<DetectionReport, ApiError>,
    },
    Recommendation {
        ticket: RecommendationTicket,
        result: Result<String, ApiError>,
    },
}

/// Spawns requests against the backend. Every task reports exactly once on
/// the outcome channel; nothing here touches `App`.
#[derive(Debug, Clone)]
pub struct AppActions {
    api: ApiClient,
    outcomes: UnboundedSender<FetchOutcome>,
}

impl AppActions {
    pub fn new(api: ApiClient) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        (Self { api, outcomes }, receiver)
    }

    fn spawn<F, Fut>(&self, job: F) -> AbortHandle
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: std::future::Future<Output = FetchOutcome> + Send + 'static,
    {
        let outcomes = self.outcomes.clone();
        let future = job(self.api.clone());
        tokio::spawn(async move {
            let outcome = future.await;
            if outcomes.send(outcome).is_err() {
                tracing::debug!("event loop gone, dropping fetch outcome");
            }
        })
        .abort_handle()
    }

    pub fn load_dashboard(&self, ticket: ViewTicket) -> AbortHandle {
        self.spawn(move |api| async move {
            let (map, history, timeline) = tokio::join!(
                api.fetch_map_complaints(),
                api.fetch_history(),
                api.fetch_timeline()
            );
            FetchOutcome::Dashboard {
                ticket,
                map,
                history,
                timeline,
            }
        })
    }

    pub fn load_hotspots(&self, ticket: ViewTicket) -> AbortHandle {
        self.spawn(move |api| async move {
            FetchOutcome::Hotspots {
                ticket,
                hotspots: api.fetch_hotspots().await,
            }
        })
    }

    pub fn load_history(&self, ticket: ViewTicket) -> AbortHandle {
        self.spawn(move |api| async move {
            FetchOutcome::History {
                ticket,
                items: api.fetch_history().await,
            }
        })
    }

    pub fn analyze(&self, ticket: ViewTicket, question: String) -> AbortHandle {
        self.spawn(move |api| async move {
            let result = api.analyze(&question).await;
            FetchOutcome::Analysis {
                ticket,
                question,
                result,
            }
        })
    }

    pub fn detect(&self, ticket: ViewTicket, path: PathBuf) -> AbortHandle {
        self.spawn(move |api| async move {
            let report = api.detect(&path).await;
            FetchOutcome::Detection {
                ticket,
                path,
                report,
            }
        })
    }

    pub fn recommend(
        &self,
        ticket: RecommendationTicket,
        area: String,
        sample_text: String,
    ) -> AbortHandle {
        self.spawn(move |api| async move {
            FetchOutcome::Recommendation {
                ticket,
                result: api.recommend(&area, &sample_text).await,
            }
        })
    }
}
