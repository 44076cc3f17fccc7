//! Map rendering layer: turns record snapshots into markers and keeps the
//! state of the recommendation popup. Drawing itself lives in
//! `ui::widgets::map`.

pub mod layer;
pub mod pulse;
pub mod recommendation;
pub mod tiers;
pub mod viewport;

pub use layer::{MapFeature, Marker, MarkerLayer};
pub use recommendation::{PopupContent, RecommendationPopup, RecommendationTicket};
pub use tiers::{hotspot_radius, hotspot_tier, urgency_color, SeverityTier};
pub use viewport::Viewport;
