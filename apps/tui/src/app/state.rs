use crate::api::adapter::{complaints_from_entries, complaints_from_server_history, merge_complaints};
use crate::api::ApiError;
use crate::app::actions::{AppActions, FetchOutcome};
use crate::app::page::{LoadEvent, Page, PageLoad, PageViews, ViewTicket};
use crate::domain::{
    ComplaintRecord, Coordinates, DetectionReport, HistoryEntry, HotspotRecord, ServerHistoryItem,
    Timeline, Urgency,
};
use crate::history::HistoryStore;
use crate::map::pulse::{advance_pulse_radius, AnimationMode, PULSE_MIN_RADIUS_M};
use crate::map::{MarkerLayer, RecommendationPopup};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::AbortHandle;

/// Heatmap filter on a hotspot's average urgency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UrgencyFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl UrgencyFilter {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::High,
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::All,
        }
    }

    pub const fn matches(self, urgency: Urgency) -> bool {
        match self {
            Self::All => true,
            Self::High => urgency.is_priority(),
            Self::Medium => matches!(urgency, Urgency::Medium),
            Self::Low => matches!(urgency, Urgency::Low),
        }
    }
}

/// Totals shown beside the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeatmapStats {
    pub high_priority: usize,
    pub total_complaints: u64,
    pub areas: usize,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub page: Page,
    pub show_help: bool,
    pub status_message: String,
    pub animation_counter: f64,
    pub animation_mode: AnimationMode,
    pub pulse_radius_m: f64,
    pub last_frame: Instant,
    pub views: PageViews,
    pub city_center: Coordinates,
    pub history: HistoryStore,
    pub last_analysis: Option<HistoryEntry>,
    pub timeline: Timeline,
    pub complaints: Arc<[ComplaintRecord]>,
    pub complaint_layer: MarkerLayer<ComplaintRecord>,
    pub hotspots: Arc<[HotspotRecord]>,
    pub hotspot_layer: MarkerLayer<HotspotRecord>,
    pub urgency_filter: UrgencyFilter,
    pub selected_hotspot: usize,
    pub popup: RecommendationPopup,
    pub server_history: Vec<ServerHistoryItem>,
    pub filtered_history: Vec<usize>,
    pub selected_history: usize,
    pub search_active: bool,
    pub search_query: String,
    pub editing: bool,
    pub analysis_input: String,
    pub detect_input: String,
    pub detection: Option<(PathBuf, DetectionReport)>,
    live_complaints: Vec<ComplaintRecord>,
    server_complaints: Vec<ComplaintRecord>,
    all_hotspots: Vec<HotspotRecord>,
    pulse_tick: Option<f64>,
    started: Instant,
    in_flight: Option<AbortHandle>,
    actions: AppActions,
}

impl App {
    pub fn new(actions: AppActions, history: HistoryStore, city_center: Coordinates) -> Self {
        let now = Instant::now();
        let mut app = Self {
            running: true,
            page: Page::Dashboard,
            show_help: false,
            status_message: String::new(),
            animation_counter: 0.0,
            animation_mode: AnimationMode::Running,
            pulse_radius_m: PULSE_MIN_RADIUS_M,
            last_frame: now,
            views: PageViews::default(),
            city_center,
            history,
            last_analysis: None,
            timeline: Timeline::default(),
            complaints: Arc::from(Vec::new()),
            complaint_layer: MarkerLayer::default(),
            hotspots: Arc::from(Vec::new()),
            hotspot_layer: MarkerLayer::default(),
            urgency_filter: UrgencyFilter::All,
            selected_hotspot: 0,
            popup: RecommendationPopup::default(),
            server_history: Vec::new(),
            filtered_history: Vec::new(),
            selected_history: 0,
            search_active: false,
            search_query: String::new(),
            editing: false,
            analysis_input: String::new(),
            detect_input: String::new(),
            detection: None,
            live_complaints: Vec::new(),
            server_complaints: Vec::new(),
            all_hotspots: Vec::new(),
            pulse_tick: None,
            started: now,
            in_flight: None,
            actions,
        };
        app.last_analysis = app.history.entries().first().cloned();
        app.rebuild_complaints();
        app.rebuild_hotspots();
        app
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.animation_mode == AnimationMode::Running {
            self.animation_counter += delta.as_secs_f64() * 2.0;
            if self.animation_counter > 2.0 * std::f64::consts::PI {
                self.animation_counter -= 2.0 * std::f64::consts::PI;
            }
        }

        let seconds = now.duration_since(self.started).as_secs_f64();
        let (radius, tick) =
            advance_pulse_radius(self.pulse_radius_m, self.pulse_tick, seconds, self.animation_mode);
        self.pulse_radius_m = radius;
        self.pulse_tick = tick;
    }

    pub fn toggle_animation_pause(&mut self) {
        self.animation_mode = match self.animation_mode {
            AnimationMode::Running => AnimationMode::Paused,
            AnimationMode::Paused => AnimationMode::Running,
        };
    }

    pub fn current_load(&self) -> &PageLoad {
        self.views.load(self.page)
    }

    /// The blocking indicator is up and submissions are ignored.
    pub fn is_busy(&self) -> bool {
        self.current_load().is_loading()
    }

    // Navigation

    pub fn open_page(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        self.leave_page();
        self.page = page;
        tracing::debug!(%page, "page opened");
        self.refresh();
    }

    pub fn next_page(&mut self) {
        let next = (self.page.index() + 1) % Page::ALL.len();
        if let Some(page) = Page::from_index(next) {
            self.open_page(page);
        }
    }

    pub fn previous_page(&mut self) {
        let previous = (self.page.index() + Page::ALL.len() - 1) % Page::ALL.len();
        if let Some(page) = Page::from_index(previous) {
            self.open_page(page);
        }
    }

    fn leave_page(&mut self) {
        self.abort_in_flight();
        self.views.invalidate(self.page);
        self.editing = false;
        if self.page == Page::Heatmap {
            self.popup.close();
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    /// Drops the request the current page is waiting on.
    pub fn cancel_load(&mut self) {
        if !self.is_busy() {
            return;
        }
        self.abort_in_flight();
        self.views.invalidate(self.page);
        self.status_message = "Request cancelled".to_string();
    }

    fn begin_load(&mut self, page: Page) -> Option<ViewTicket> {
        match self.views.load_mut(page).process(&LoadEvent::Start) {
            Ok(_) => Some(self.views.ticket(page)),
            Err(error) => {
                tracing::debug!(%page, %error, "load not started");
                None
            }
        }
    }

    fn finish_load(&mut self, page: Page, outcome: Result<(), String>) {
        self.in_flight = None;
        if let Err(message) = &outcome {
            self.status_message = format!("Error: {message}");
        }
        if let Err(error) = self.views.load_mut(page).finish(outcome) {
            tracing::warn!(%page, %error, "unexpected load outcome");
        }
    }

    /// Re-fetches the data behind the current page.
    pub fn refresh(&mut self) {
        let page = self.page;
        if page == Page::Detect {
            return;
        }
        let Some(ticket) = self.begin_load(page) else {
            return;
        };
        self.status_message = format!("Loading {page}...");
        let task = match page {
            Page::Dashboard => self.actions.load_dashboard(ticket),
            Page::Heatmap => self.actions.load_hotspots(ticket),
            Page::History => self.actions.load_history(ticket),
            Page::Detect => return,
        };
        self.in_flight = Some(task);
    }

    // Submissions

    /// Sends the dashboard text for analysis. Returns `false` when nothing was
    /// sent.
    pub fn submit_analysis(&mut self) -> bool {
        let question = self.analysis_input.trim().to_string();
        if question.is_empty() || self.page != Page::Dashboard {
            return false;
        }
        let Some(ticket) = self.begin_load(Page::Dashboard) else {
            return false;
        };
        self.editing = false;
        self.status_message = "Analyzing complaint...".to_string();
        self.in_flight = Some(self.actions.analyze(ticket, question));
        true
    }

    pub fn submit_detection(&mut self) -> bool {
        let path = self.detect_input.trim();
        if path.is_empty() || self.page != Page::Detect {
            return false;
        }
        let path = PathBuf::from(path);
        let Some(ticket) = self.begin_load(Page::Detect) else {
            return false;
        };
        self.editing = false;
        self.status_message = format!("Uploading {}...", path.display());
        self.in_flight = Some(self.actions.detect(ticket, path));
        true
    }

    /// Opens the popup for the selected hotspot and asks for a
    /// recommendation. A newer request supersedes this one.
    pub fn request_recommendation(&mut self) -> bool {
        let Some(hotspot) = self.selected_hotspot_record() else {
            return false;
        };
        let area = hotspot.area.clone();
        let sample = hotspot.sample_text.clone();

        let ticket = self.popup.begin(area.clone());
        let task = self.actions.recommend(ticket, area, sample);
        self.popup.attach(ticket, task);
        true
    }

    // Outcomes

    /// Applies a finished request. Outcomes addressed to a page incarnation
    /// that no longer exists are dropped.
    pub async fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Dashboard {
                ticket,
                map,
                history,
                timeline,
            } => {
                if !self.accept(ticket) {
                    return;
                }
                let mut failures = Vec::new();
                match map {
                    Ok(records) => self.live_complaints = records,
                    Err(error) => failures.push(error),
                }
                match history {
                    Ok(items) => self.set_server_history(items),
                    Err(error) => failures.push(error),
                }
                match timeline {
                    Ok(timeline) => self.timeline = timeline,
                    Err(error) => failures.push(error),
                }
                for error in &failures {
                    tracing::warn!(%error, "dashboard fetch failed, keeping previous data");
                }
                self.rebuild_complaints();

                let outcome = if failures.len() == 3 {
                    Err(failures
                        .first()
                        .map_or_else(String::new, ToString::to_string))
                } else {
                    self.status_message = format!("{} complaints on the map", self.complaints.len());
                    Ok(())
                };
                self.finish_load(ticket.page, outcome);
            }
            FetchOutcome::Hotspots { ticket, hotspots } => {
                if !self.accept(ticket) {
                    return;
                }
                let outcome = match hotspots {
                    Ok(hotspots) => {
                        self.all_hotspots = hotspots;
                        self.rebuild_hotspots();
                        self.status_message = format!("{} hotspots", self.all_hotspots.len());
                        Ok(())
                    }
                    Err(error) => Err(log_failure(&error)),
                };
                self.finish_load(ticket.page, outcome);
            }
            FetchOutcome::History { ticket, items } => {
                if !self.accept(ticket) {
                    return;
                }
                let outcome = match items {
                    Ok(items) => {
                        self.set_server_history(items);
                        self.rebuild_complaints();
                        self.status_message =
                            format!("{} detections in history", self.server_history.len());
                        Ok(())
                    }
                    Err(error) => Err(log_failure(&error)),
                };
                self.finish_load(ticket.page, outcome);
            }
            FetchOutcome::Analysis {
                ticket,
                question,
                result,
            } => {
                if !self.accept(ticket) {
                    return;
                }
                let outcome = match result {
                    Ok(result) => {
                        self.record_analysis(HistoryEntry::new(question, result)).await;
                        Ok(())
                    }
                    Err(error) => Err(log_failure(&error)),
                };
                self.finish_load(ticket.page, outcome);
            }
            FetchOutcome::Detection {
                ticket,
                path,
                report,
            } => {
                if !self.accept(ticket) {
                    return;
                }
                let outcome = match report {
                    Ok(report) => {
                        self.status_message = format!(
                            "{} objects detected in {}",
                            report.detections.len(),
                            path.display()
                        );
                        self.detection = Some((path, report));
                        Ok(())
                    }
                    Err(error) => Err(log_failure(&error)),
                };
                self.finish_load(ticket.page, outcome);
            }
            FetchOutcome::Recommendation { ticket, result } => {
                let result = result.map_err(|error| log_failure(&error));
                self.popup.resolve(ticket, result);
            }
        }
    }

    fn accept(&self, ticket: ViewTicket) -> bool {
        let live = self.views.is_live(ticket);
        if !live {
            tracing::debug!(page = %ticket.page, epoch = ticket.epoch, "discarding stale response");
        }
        live
    }

    async fn record_analysis(&mut self, entry: HistoryEntry) {
        self.analysis_input.clear();
        let saved = self.history.append(entry).await;
        self.last_analysis = self.history.entries().first().cloned();
        match saved {
            Ok(()) => {
                self.status_message = "Analysis saved to history".to_string();
            }
            Err(error) => {
                tracing::warn!(%error, "analysis kept in memory only");
                self.status_message = format!("Analysis not saved: {error}");
            }
        }
        self.rebuild_complaints();
    }

    fn set_server_history(&mut self, items: Vec<ServerHistoryItem>) {
        self.server_complaints = complaints_from_server_history(&items);
        self.server_history = items;
        self.apply_search_filter();
    }

    // Snapshots

    fn rebuild_complaints(&mut self) {
        let local = complaints_from_entries(self.history.entries(), self.city_center);
        self.complaints = merge_complaints([
            self.live_complaints.as_slice(),
            self.server_complaints.as_slice(),
            local.as_slice(),
        ]);
        self.complaint_layer.sync(&self.complaints);
    }

    fn rebuild_hotspots(&mut self) {
        let filter = self.urgency_filter;
        self.hotspots = self
            .all_hotspots
            .iter()
            .filter(|hotspot| filter.matches(hotspot.avg_urgency))
            .cloned()
            .collect();
        self.selected_hotspot = self
            .selected_hotspot
            .min(self.hotspots.len().saturating_sub(1));
        self.hotspot_layer.sync(&self.hotspots);
    }

    pub fn cycle_urgency_filter(&mut self) {
        self.urgency_filter = self.urgency_filter.next();
        self.popup.close();
        self.rebuild_hotspots();
    }

    pub fn selected_hotspot_record(&self) -> Option<&HotspotRecord> {
        self.hotspots.get(self.selected_hotspot)
    }

    pub fn heatmap_stats(&self) -> HeatmapStats {
        HeatmapStats {
            high_priority: self
                .hotspots
                .iter()
                .filter(|hotspot| hotspot.avg_urgency.is_priority())
                .count(),
            total_complaints: self
                .hotspots
                .iter()
                .map(|hotspot| u64::from(hotspot.count))
                .sum(),
            areas: self.hotspots.len(),
        }
    }

    /// Complaint counts per category, largest first.
    pub fn category_counts(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = Vec::new();
        for record in self.complaints.iter() {
            let label = record.category.label();
            match counts.iter_mut().find(|(name, _)| *name == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    // History search

    pub fn apply_search_filter(&mut self) {
        let query = self.search_query.trim();
        if query.is_empty() {
            self.filtered_history = (0..self.server_history.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(i64, usize)> = self
                .server_history
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    let haystack = format!(
                        "{} {} {} {}",
                        item.category.label(),
                        item.area,
                        item.urgency.map_or("", Urgency::label),
                        item.timestamp
                    );
                    matcher
                        .fuzzy_match(&haystack, query)
                        .map(|score| (score, index))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            self.filtered_history = scored.into_iter().map(|(_, index)| index).collect();
        }
        self.selected_history = self
            .selected_history
            .min(self.filtered_history.len().saturating_sub(1));
    }

    pub fn clear_search(&mut self) {
        self.search_active = false;
        self.search_query.clear();
        self.apply_search_filter();
    }

    pub fn selected_history_item(&self) -> Option<&ServerHistoryItem> {
        self.filtered_history
            .get(self.selected_history)
            .and_then(|index| self.server_history.get(*index))
    }
}

fn log_failure(error: &ApiError) -> String {
    tracing::warn!(%error, "request failed");
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{client_for, spawn_backend};
    use crate::app::page::LoadState;
    use crate::config::DEFAULT_CITY_CENTER;
    use crate::db::queries::tests::setup_test_db;
    use crate::domain::{Category, RecordSource};
    use crate::history::HISTORY_CAPACITY;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn app_for(
        base: &str,
        history: HistoryStore,
    ) -> Result<(App, UnboundedReceiver<FetchOutcome>), ApiError> {
        let (actions, outcomes) = AppActions::new(client_for(base)?);
        Ok((App::new(actions, history, DEFAULT_CITY_CENTER), outcomes))
    }

    async fn next_outcome(
        outcomes: &mut UnboundedReceiver<FetchOutcome>,
    ) -> Result<FetchOutcome, Box<dyn std::error::Error>> {
        outcomes
            .recv()
            .await
            .ok_or_else(|| "outcome channel closed".into())
    }

    fn hotspot(area: &str, count: u32, urgency: Urgency) -> HotspotRecord {
        HotspotRecord {
            area: area.to_string(),
            coordinates: DEFAULT_CITY_CENTER,
            count,
            avg_urgency: urgency,
            avg_urgency_score: None,
            sample_text: format!("complaints around {area}"),
        }
    }

    fn offline_error() -> ApiError {
        ApiError::Io {
            path: PathBuf::from("offline"),
            source: std::io::Error::other("offline"),
        }
    }

    #[tokio::test]
    async fn submitted_analysis_is_recorded_in_history() -> TestResult {
        let router = Router::new().route(
            "/analyze",
            post(|| async {
                Json(json!({
                    "category": "pothole",
                    "urgency": "High",
                    "recommended_action": "Dispatch repair crew",
                }))
            }),
        );
        let base = spawn_backend(router).await?;
        let pool = setup_test_db().await?;
        let store = HistoryStore::load(Some(pool.clone())).await;
        let (mut app, mut outcomes) = app_for(&base, store)?;

        app.analysis_input = "Large pothole on Station Road".to_string();
        assert!(app.submit_analysis());
        assert!(app.is_busy());
        assert!(!app.submit_analysis(), "second submit while loading is ignored");

        let outcome = next_outcome(&mut outcomes).await?;
        app.apply(outcome).await;

        assert!(!app.is_busy());
        assert_eq!(app.history.len(), 1);
        assert_eq!(
            app.history.entries()[0].question,
            "Large pothole on Station Road"
        );
        assert!(app.analysis_input.is_empty());

        let local: Vec<_> = app
            .complaints
            .iter()
            .filter(|record| record.source == RecordSource::LocalHistory)
            .collect();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].category, Category::Pothole);
        assert_eq!(local[0].urgency, Urgency::High);
        assert_eq!(local[0].coordinates, DEFAULT_CITY_CENTER);

        let reloaded = HistoryStore::load(Some(pool)).await;
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.len() <= HISTORY_CAPACITY);
        Ok(())
    }

    #[tokio::test]
    async fn failed_fetch_returns_to_idle_with_empty_data() -> TestResult {
        let base = spawn_backend(Router::new()).await?;
        let (mut app, mut outcomes) = app_for(&base, HistoryStore::in_memory())?;

        app.open_page(Page::Heatmap);
        assert!(app.is_busy());
        let outcome = next_outcome(&mut outcomes).await?;
        app.apply(outcome).await;

        assert_eq!(app.current_load().state(), LoadState::Idle);
        assert!(app.current_load().last_error().is_some());
        assert!(app.hotspots.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn dashboard_degrades_per_endpoint() -> TestResult {
        let router = Router::new().route(
            "/complaints/map",
            get(|| async {
                Json(json!({"data": [
                    {"latitude": 15.36, "longitude": 75.12, "category": "garbage",
                     "urgency": "Low", "area": "Market", "text": "Overflowing bin"},
                    {"latitude": "abc", "longitude": 75.12, "category": "garbage"},
                ]}))
            }),
        );
        let base = spawn_backend(router).await?;
        let (mut app, mut outcomes) = app_for(&base, HistoryStore::in_memory())?;

        app.refresh();
        let outcome = next_outcome(&mut outcomes).await?;
        app.apply(outcome).await;

        assert_eq!(app.current_load().state(), LoadState::Idle);
        assert_eq!(app.current_load().last_error(), None);
        assert_eq!(app.complaints.len(), 1);
        assert_eq!(app.complaint_layer.markers().len(), 1);
        assert!(app.timeline.is_empty());
        assert!(app.server_history.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;

        let ticket = app.views.ticket(Page::Heatmap);
        app.views.invalidate(Page::Heatmap);
        app.apply(FetchOutcome::Hotspots {
            ticket,
            hotspots: Ok(vec![hotspot("Old Hubli", 30, Urgency::High)]),
        })
        .await;
        assert!(app.hotspots.is_empty());

        let ticket = app.views.ticket(Page::Dashboard);
        app.views.invalidate(Page::Dashboard);
        app.apply(FetchOutcome::Analysis {
            ticket,
            question: "Streetlight out".to_string(),
            result: Ok(serde_json::from_value(json!({"category": "electricity"}))?),
        })
        .await;
        assert!(app.history.is_empty());
        assert!(app.last_analysis.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn leaving_a_page_drops_its_late_response() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;

        app.open_page(Page::Heatmap);
        assert!(app.is_busy());
        let late = app.views.ticket(Page::Heatmap);

        app.open_page(Page::Dashboard);
        assert_eq!(app.views.load(Page::Heatmap).state(), LoadState::Idle);
        app.apply(FetchOutcome::Hotspots {
            ticket: late,
            hotspots: Ok(vec![hotspot("Old Hubli", 30, Urgency::High)]),
        })
        .await;
        assert!(app.hotspots.is_empty());
        assert_eq!(app.views.load(Page::Heatmap).state(), LoadState::Idle);

        app.open_page(Page::Heatmap);
        let current = app.views.ticket(Page::Heatmap);
        assert_ne!(current, late);
        app.apply(FetchOutcome::Hotspots {
            ticket: current,
            hotspots: Ok(vec![hotspot("Keshwapur", 13, Urgency::Medium)]),
        })
        .await;
        assert_eq!(app.hotspots.len(), 1);
        assert_eq!(app.hotspots[0].area, "Keshwapur");
        assert!(!app.is_busy());
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_hotspots() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;
        app.page = Page::Heatmap;

        app.views.load_mut(Page::Heatmap).process(&LoadEvent::Start)?;
        app.apply(FetchOutcome::Hotspots {
            ticket: app.views.ticket(Page::Heatmap),
            hotspots: Ok(vec![hotspot("Vidyanagar", 7, Urgency::Medium)]),
        })
        .await;
        assert_eq!(app.hotspots.len(), 1);

        app.views.load_mut(Page::Heatmap).process(&LoadEvent::Start)?;
        app.apply(FetchOutcome::Hotspots {
            ticket: app.views.ticket(Page::Heatmap),
            hotspots: Err(offline_error()),
        })
        .await;
        assert_eq!(app.hotspots.len(), 1);
        assert!(!app.is_busy());
        assert!(app.current_load().last_error().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn only_the_latest_recommendation_is_shown() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;

        let first = app.popup.begin("Old Hubli");
        let second = app.popup.begin("Vidyanagar");
        app.apply(FetchOutcome::Recommendation {
            ticket: first,
            result: Ok("Send a survey team".to_string()),
        })
        .await;
        assert_eq!(app.popup.content(), Some(&crate::map::PopupContent::Loading));

        app.apply(FetchOutcome::Recommendation {
            ticket: second,
            result: Ok("Clear the drains".to_string()),
        })
        .await;
        assert_eq!(
            app.popup.content(),
            Some(&crate::map::PopupContent::Ready("Clear the drains".to_string()))
        );
        assert_eq!(app.popup.subject(), Some("Vidyanagar"));
        Ok(())
    }

    #[tokio::test]
    async fn urgency_filter_rebuilds_the_hotspot_layer() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;
        app.page = Page::Heatmap;
        app.views.load_mut(Page::Heatmap).process(&LoadEvent::Start)?;
        app.apply(FetchOutcome::Hotspots {
            ticket: app.views.ticket(Page::Heatmap),
            hotspots: Ok(vec![
                hotspot("Old Hubli", 30, Urgency::High),
                hotspot("Vidyanagar", 7, Urgency::Medium),
                hotspot("Gokul Road", 2, Urgency::Low),
            ]),
        })
        .await;

        assert_eq!(app.heatmap_stats(), HeatmapStats {
            high_priority: 1,
            total_complaints: 39,
            areas: 3,
        });

        let rebuilds = app.hotspot_layer.rebuilds();
        app.cycle_urgency_filter();
        assert_eq!(app.urgency_filter, UrgencyFilter::High);
        assert_eq!(app.hotspots.len(), 1);
        assert_eq!(app.hotspot_layer.markers().len(), 1);
        assert_eq!(app.hotspot_layer.rebuilds(), rebuilds + 1);
        assert_eq!(app.heatmap_stats().total_complaints, 30);
        Ok(())
    }

    #[tokio::test]
    async fn history_search_is_fuzzy() -> TestResult {
        let (mut app, _outcomes) = app_for("http://127.0.0.1:9", HistoryStore::in_memory())?;
        let item = |id: i64, category: Category, area: &str| ServerHistoryItem {
            id: crate::domain::RecordId::Number(id),
            category,
            urgency: Some(Urgency::Medium),
            area: area.to_string(),
            image: None,
            yolo_boxes: Vec::new(),
            timestamp: "2025-11-17T10:30:00Z".to_string(),
            coordinates: None,
        };
        app.set_server_history(vec![
            item(1, Category::Pothole, "Station Road"),
            item(2, Category::Garbage, "Market"),
        ]);
        assert_eq!(app.filtered_history, vec![0, 1]);

        app.search_query = "grbg".to_string();
        app.apply_search_filter();
        assert_eq!(app.filtered_history, vec![1]);
        assert_eq!(
            app.selected_history_item().map(|item| item.area.as_str()),
            Some("Market")
        );

        app.clear_search();
        assert_eq!(app.filtered_history.len(), 2);
        Ok(())
    }

    #[test]
    fn urgency_filter_cycles_through_every_option() {
        let mut filter = UrgencyFilter::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(filter.label());
            filter = filter.next();
        }
        assert_eq!(seen, ["All", "High", "Medium", "Low"]);
        assert_eq!(filter, UrgencyFilter::All);
        assert!(UrgencyFilter::High.matches(Urgency::Critical));
        assert!(!UrgencyFilter::Low.matches(Urgency::Medium));
    }
}
