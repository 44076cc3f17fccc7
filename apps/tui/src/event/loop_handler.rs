use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::io::Stdout;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::adapter::{complaints_from_entries, complaints_from_server_history, merge_complaints};
use crate::api::{or_empty, ApiClient, Endpoint};
use crate::app::{handle_input, App, FetchOutcome};
use crate::domain::{
    Coordinates, DetectionReport, HistoryEntry, HotspotRecord, ServerHistoryItem, Timeline,
};
use crate::history::HistoryStore;
use crate::map::{hotspot_tier, SeverityTier};
use crate::ui;

const TOP_HOTSPOTS: usize = 5;

/// What a headless run should do besides printing the summary.
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub json: bool,
    pub analyze: Option<String>,
    pub detect: Option<PathBuf>,
}

/// Run the dashboard without a UI: fetch everything, optionally submit an
/// analysis or a detection, print a summary and exit.
pub async fn run_headless(
    api: &ApiClient,
    history: &mut HistoryStore,
    city_center: Coordinates,
    options: &HeadlessOptions,
) -> Result<()> {
    let report = collect_report(api, history, city_center, options).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

async fn collect_report(
    api: &ApiClient,
    history: &mut HistoryStore,
    city_center: Coordinates,
    options: &HeadlessOptions,
) -> HeadlessReport {
    let mut failures = Vec::new();

    let analysis = match &options.analyze {
        Some(text) => match api.analyze(text).await {
            Ok(result) => {
                if let Err(error) = history.append(HistoryEntry::new(text.clone(), result)).await {
                    tracing::warn!(%error, "analysis kept in memory only");
                }
                history.entries().first().cloned()
            }
            Err(error) => {
                tracing::warn!(%error, "analysis failed, continuing with the summary");
                failures.push(error.to_string());
                None
            }
        },
        None => None,
    };

    let detection = match &options.detect {
        Some(path) => match api.detect(path).await {
            Ok(report) => Some(report),
            Err(error) => {
                tracing::warn!(%error, "detection failed, continuing with the summary");
                failures.push(error.to_string());
                None
            }
        },
        None => None,
    };

    let (map, hotspots, server_history, timeline) = tokio::join!(
        api.fetch_map_complaints(),
        api.fetch_hotspots(),
        api.fetch_history(),
        api.fetch_timeline()
    );
    let datasets = Datasets {
        map: or_empty(Endpoint::ComplaintsMap, map),
        hotspots: or_empty(Endpoint::Hotspots, hotspots),
        server_history: or_empty(Endpoint::History, server_history),
        timeline: or_empty(Endpoint::Timeline, timeline),
    };
    tracing::info!(
        map = datasets.map.len(),
        hotspots = datasets.hotspots.len(),
        history = datasets.server_history.len(),
        "headless fetch complete"
    );

    let mut report = build_report(
        &datasets,
        history.entries(),
        city_center,
        analysis,
        detection,
    );
    report.failures = failures;
    report
}

struct Datasets {
    map: Vec<crate::domain::ComplaintRecord>,
    hotspots: Vec<HotspotRecord>,
    server_history: Vec<ServerHistoryItem>,
    timeline: Timeline,
}

fn build_report(
    datasets: &Datasets,
    local: &[HistoryEntry],
    city_center: Coordinates,
    analysis: Option<HistoryEntry>,
    detection: Option<DetectionReport>,
) -> HeadlessReport {
    let server = complaints_from_server_history(&datasets.server_history);
    let local_records = complaints_from_entries(local, city_center);
    let merged = merge_complaints([
        datasets.map.as_slice(),
        server.as_slice(),
        local_records.as_slice(),
    ]);

    let hotspot_tiers = SeverityTier::ALL
        .iter()
        .map(|tier| {
            let count = datasets
                .hotspots
                .iter()
                .filter(|hotspot| hotspot_tier(hotspot.count) == *tier)
                .count();
            (tier.label().to_string(), count)
        })
        .collect();

    let mut ranked: Vec<&HotspotRecord> = datasets.hotspots.iter().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.area.cmp(&b.area)));
    let top_hotspots = ranked
        .into_iter()
        .take(TOP_HOTSPOTS)
        .map(|hotspot| HeadlessHotspot {
            area: hotspot.area.clone(),
            count: hotspot.count,
            urgency: hotspot.avg_urgency.label().to_string(),
            tier: hotspot_tier(hotspot.count).label().to_string(),
        })
        .collect();

    let recent_history = local
        .iter()
        .map(|entry| HeadlessHistory {
            question: entry.question.clone(),
            category: entry.result.category().label(),
            urgency: entry
                .result
                .urgency()
                .map_or_else(|| "(none)".to_string(), |urgency| urgency.label().to_string()),
            timestamp: entry.timestamp.clone(),
        })
        .collect();

    HeadlessReport {
        live_complaints: datasets.map.len(),
        server_history: datasets.server_history.len(),
        local_history: local.len(),
        mapped_complaints: merged.len(),
        high_priority_complaints: merged
            .iter()
            .filter(|record| record.urgency.is_priority())
            .count(),
        hotspots: datasets.hotspots.len(),
        hotspot_tiers,
        top_hotspots,
        timeline_days: datasets.timeline.labels.len(),
        recent_history,
        analysis,
        detection,
        failures: Vec::new(),
    }
}

fn print_report(report: &HeadlessReport) {
    println!("\nCivic Dashboard");
    println!("===============");
    println!("Live complaints: {}", report.live_complaints);
    println!("Server history: {}", report.server_history);
    println!("Local history: {}", report.local_history);
    println!(
        "Mapped complaints: {} ({} high priority)",
        report.mapped_complaints, report.high_priority_complaints
    );
    println!("Timeline days: {}", report.timeline_days);

    println!("\nHotspots by Tier ({} total):", report.hotspots);
    for (tier, count) in &report.hotspot_tiers {
        println!("- {tier}: {count}");
    }

    println!("\nTop Hotspots:");
    for hotspot in &report.top_hotspots {
        println!(
            "- {} | {} complaints | {} | {}",
            hotspot.area, hotspot.count, hotspot.urgency, hotspot.tier
        );
    }

    println!("\nRecent Analyses:");
    for entry in &report.recent_history {
        println!(
            "- {} | {} | {} | {}",
            entry.question, entry.category, entry.urgency, entry.timestamp
        );
    }

    if let Some(entry) = &report.analysis {
        println!("\nAnalysis:");
        println!("Category: {}", entry.result.category().label());
        if let Some(urgency) = entry.result.urgency() {
            println!("Urgency: {urgency}");
        }
        if let Some(action) = &entry.result.recommended_action {
            println!("Recommended action: {action}");
        }
    }

    if let Some(detection) = &report.detection {
        println!("\nDetections:");
        for found in &detection.detections {
            println!("- {} ({:.0}%)", found.class, found.confidence * 100.0);
        }
    }

    if !report.failures.is_empty() {
        println!("\nFailed requests:");
        for failure in &report.failures {
            println!("- {failure}");
        }
    }
}

#[derive(Debug, Serialize)]
struct HeadlessReport {
    live_complaints: usize,
    server_history: usize,
    local_history: usize,
    mapped_complaints: usize,
    high_priority_complaints: usize,
    hotspots: usize,
    hotspot_tiers: Vec<(String, usize)>,
    top_hotspots: Vec<HeadlessHotspot>,
    timeline_days: usize,
    recent_history: Vec<HeadlessHistory>,
    analysis: Option<HistoryEntry>,
    detection: Option<DetectionReport>,
    failures: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HeadlessHotspot {
    area: String,
    count: u32,
    urgency: String,
    tier: String,
}

#[derive(Debug, Serialize)]
struct HeadlessHistory {
    question: String,
    category: String,
    urgency: String,
    timestamp: String,
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    outcomes: &mut UnboundedReceiver<FetchOutcome>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    app.refresh();

    loop {
        app.update();

        // Results are only ever applied here, on the UI task
        while let Ok(outcome) = outcomes.try_recv() {
            app.apply(outcome).await;
        }

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.running = false;
                    } else {
                        handle_input(app, key.code);
                    }
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if let Err(error) = terminal.draw(|f| ui::ui(app, f)) {
                        tracing::debug!(%error, "redraw after resize failed");
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }
    }

    Ok(())
}
