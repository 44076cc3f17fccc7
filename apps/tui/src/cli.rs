use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "civic-dash",
    version,
    about = "Terminal dashboard for civic complaints, hotspots and detections"
)]
pub struct CliArgs {
    /// Print a summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Override log file used by the interactive UI
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Base URL of the analysis service
    #[arg(long = "analysis-url", value_name = "URL")]
    pub analysis_url: Option<String>,

    /// Base URL serving /hotspots
    #[arg(long = "hotspots-url", value_name = "URL")]
    pub hotspots_url: Option<String>,

    /// Base URL serving /complaints/map and /timeline
    #[arg(long = "map-url", value_name = "URL")]
    pub map_url: Option<String>,

    /// Base URL of the detection history service
    #[arg(long = "history-url", value_name = "URL")]
    pub history_url: Option<String>,

    /// Base URL of the YOLO detection service
    #[arg(long = "detect-url", value_name = "URL")]
    pub detect_url: Option<String>,

    /// Submit one complaint for analysis (headless)
    #[arg(long, value_name = "TEXT")]
    pub analyze: Option<String>,

    /// Upload an image for detection (headless)
    #[arg(long, value_name = "PATH")]
    pub detect: Option<PathBuf>,
}

impl CliArgs {
    /// Flags win over the environment by overwriting the variables the
    /// configuration is read from.
    pub fn apply_env_overrides(&self) {
        for (key, value) in self.env_overrides() {
            std::env::set_var(key, value);
        }
    }

    pub fn env_overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        let mut push = |key: &'static str, value: &Option<String>| {
            if let Some(value) = value {
                overrides.push((key, value.clone()));
            }
        };
        push("DATABASE_NAME", &self.db);
        push("LOG_FILE", &self.log_file);
        push("ANALYSIS_URL", &self.analysis_url);
        push("HOTSPOTS_URL", &self.hotspots_url);
        push("MAP_URL", &self.map_url);
        push("HISTORY_URL", &self.history_url);
        push("DETECT_URL", &self.detect_url);
        if self.debug {
            overrides.push(("LOG_LEVEL", "debug".to_string()));
        }
        overrides
    }

    /// One-shot actions only make sense without the UI.
    pub const fn wants_headless(&self) -> bool {
        self.headless || self.json || self.analyze.is_some() || self.detect.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_environment_variables() {
        let args = CliArgs::parse_from([
            "civic-dash",
            "--db",
            "/tmp/civic.db",
            "--map-url",
            "http://maps.local:9000",
            "--debug",
        ]);

        let overrides = args.env_overrides();
        assert!(overrides.contains(&("DATABASE_NAME", "/tmp/civic.db".to_string())));
        assert!(overrides.contains(&("MAP_URL", "http://maps.local:9000".to_string())));
        assert!(overrides.contains(&("LOG_LEVEL", "debug".to_string())));
        assert_eq!(overrides.len(), 3);
        assert!(!args.wants_headless());
    }

    #[test]
    fn one_shot_actions_imply_headless() {
        let args = CliArgs::parse_from(["civic-dash", "--analyze", "Water logging near bus stand"]);
        assert!(args.wants_headless());
        assert_eq!(args.analyze.as_deref(), Some("Water logging near bus stand"));
    }
}
