use civic_dash::api::ApiClient;
use civic_dash::app::{App, AppActions};
use civic_dash::cli::CliArgs;
use civic_dash::config::init_app_config;
use civic_dash::db::create_database_pool;
use civic_dash::event::{self, HeadlessOptions};
use civic_dash::history::HistoryStore;
use civic_dash::telemetry::{self, LogTarget};
use civic_dash::terminal;
use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    let headless = args.wants_headless() || !is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&config.log_file)
    };
    telemetry::init(&config.log_level, target)?;
    tracing::info!(endpoints = ?config.endpoints, headless, "starting civic-dash");

    // History falls back to memory if the database cannot be opened
    let pool = match create_database_pool(&config.database_url).await {
        Ok(pool) => Some(pool),
        Err(error) => {
            tracing::warn!(%error, "history database unavailable");
            None
        }
    };
    let mut history = HistoryStore::load(pool).await;
    let api = ApiClient::new(config.endpoints.clone(), config.request_timeout)?;

    if headless {
        let options = HeadlessOptions {
            json: args.json,
            analyze: args.analyze,
            detect: args.detect,
        };
        return event::run_headless(&api, &mut history, config.city_center, &options).await;
    }

    let (actions, mut outcomes) = AppActions::new(api);
    let mut app = App::new(actions, history, config.city_center);

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app, &mut outcomes).await;
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
