//! State of the popup that shows a recommendation for the selected map
//! feature. Only the most recent request may write into it.

use tokio::task::AbortHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupContent {
    Loading,
    Ready(String),
    Failed(String),
}

/// Proof that a request was the latest one when it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct RecommendationPopup {
    generation: u64,
    subject: Option<String>,
    content: Option<PopupContent>,
    task: Option<AbortHandle>,
}

impl RecommendationPopup {
    /// Opens the popup for `subject`, cancelling any request in flight.
    pub fn begin(&mut self, subject: impl Into<String>) -> RecommendationTicket {
        self.cancel_task();
        self.generation += 1;
        self.subject = Some(subject.into());
        self.content = Some(PopupContent::Loading);
        RecommendationTicket {
            generation: self.generation,
        }
    }

    /// Keeps the task handle so a later selection can abort it. A handle for a
    /// stale ticket is aborted straight away.
    pub fn attach(&mut self, ticket: RecommendationTicket, task: AbortHandle) {
        if self.is_current(ticket) {
            self.task = Some(task);
        } else {
            task.abort();
        }
    }

    pub const fn is_current(&self, ticket: RecommendationTicket) -> bool {
        ticket.generation == self.generation && self.subject.is_some()
    }

    /// Applies a response. Returns `false`, leaving the popup untouched, when
    /// the ticket has been superseded.
    pub fn resolve(&mut self, ticket: RecommendationTicket, result: Result<String, String>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale recommendation"
            );
            return false;
        }

        self.task = None;
        self.content = Some(match result {
            Ok(text) => PopupContent::Ready(text),
            Err(error) => PopupContent::Failed(error),
        });
        true
    }

    pub fn close(&mut self) {
        self.cancel_task();
        self.generation += 1;
        self.subject = None;
        self.content = None;
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub const fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    pub const fn is_open(&self) -> bool {
        self.subject.is_some()
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn last_request_wins() {
        let mut popup = RecommendationPopup::default();
        let first = popup.begin("Old Hubli");
        let second = popup.begin("Keshwapur");

        assert!(!popup.resolve(first, Ok("stale".to_string())));
        assert_eq!(popup.content(), Some(&PopupContent::Loading));

        assert!(popup.resolve(second, Ok("Clear the drains".to_string())));
        assert_eq!(popup.subject(), Some("Keshwapur"));
        assert_eq!(
            popup.content(),
            Some(&PopupContent::Ready("Clear the drains".to_string()))
        );
    }

    #[test]
    fn closed_popup_ignores_late_results() {
        let mut popup = RecommendationPopup::default();
        let ticket = popup.begin("Vidyanagar");
        popup.close();

        assert!(!popup.resolve(ticket, Err("timeout".to_string())));
        assert!(!popup.is_open());
        assert!(popup.content().is_none());
    }

    #[tokio::test]
    async fn new_selection_aborts_pending_task() {
        let mut popup = RecommendationPopup::default();
        let ticket = popup.begin("Old Hubli");
        let pending = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        popup.attach(ticket, pending.abort_handle());

        popup.begin("Keshwapur");
        let outcome = pending.await;
        assert!(outcome.is_err_and(|e| e.is_cancelled()));
    }
}
