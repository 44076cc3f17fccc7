//! Remote data adapter: HTTP calls to the backend services and the mapping of
//! their payloads into canonical records.

pub mod adapter;
pub mod client;

pub use client::{or_empty, ApiClient};

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Analyze,
    ComplaintsMap,
    Hotspots,
    History,
    Timeline,
    Detect,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Analyze => "/analyze",
            Self::ComplaintsMap => "/complaints/map",
            Self::Hotspots => "/hotspots",
            Self::History => "/history",
            Self::Timeline => "/timeline",
            Self::Detect => "/yolo",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
    },
    #[error("{endpoint} returned an unreadable payload: {source}")]
    Decode {
        endpoint: Endpoint,
        source: serde_json::Error,
    },
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
