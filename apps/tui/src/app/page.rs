use std::convert::TryFrom;
use std::fmt;

/// Top-level views, in tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    Heatmap,
    History,
    Detect,
}

impl Page {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Heatmap, Self::History, Self::Detect];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Heatmap => "Heatmap",
            Self::History => "History",
            Self::Detect => "Detect",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Dashboard => 0,
            Self::Heatmap => 1,
            Self::History => 2,
            Self::Detect => 3,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Dashboard),
            1 => Some(Self::Heatmap),
            2 => Some(Self::History),
            3 => Some(Self::Detect),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadState {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Success => write!(f, "Success"),
            Self::Error => write!(f, "Error"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    Start,
    Succeeded,
    Failed(String),
    /// The view was left or the user cancelled while a request was in flight.
    Abandon,
    Settle,
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Abandon => write!(f, "Abandon"),
            Self::Settle => write!(f, "Settle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionError {
    pub from: LoadState,
    pub event: LoadEvent,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

struct NextState(LoadState);

impl TryFrom<(LoadState, &LoadEvent)> for NextState {
    type Error = StateTransitionError;

    fn try_from(value: (LoadState, &LoadEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;

        match (current, event) {
            (LoadState::Idle, LoadEvent::Start) => Ok(Self(LoadState::Loading)),
            (LoadState::Loading, LoadEvent::Succeeded) => Ok(Self(LoadState::Success)),
            (LoadState::Loading, LoadEvent::Failed(_)) => Ok(Self(LoadState::Error)),
            (LoadState::Loading, LoadEvent::Abandon)
            | (LoadState::Success | LoadState::Error, LoadEvent::Settle) => {
                Ok(Self(LoadState::Idle))
            }
            _ => Err(StateTransitionError {
                from: current,
                event: event.clone(),
            }),
        }
    }
}

/// Load lifecycle of one page: `Idle -> Loading -> (Success | Error) -> Idle`.
///
/// The outcome of the last finished load survives the return to `Idle` so the
/// status line can still report it.
#[derive(Debug, Clone)]
pub struct PageLoad {
    state: LoadState,
    last_error: Option<String>,
}

impl Default for PageLoad {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLoad {
    pub const fn new() -> Self {
        Self {
            state: LoadState::Idle,
            last_error: None,
        }
    }

    pub const fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn process(&mut self, event: &LoadEvent) -> Result<LoadState, StateTransitionError> {
        let NextState(next) = NextState::try_from((self.state, event))?;

        match event {
            LoadEvent::Start | LoadEvent::Succeeded => self.last_error = None,
            LoadEvent::Failed(message) => self.last_error = Some(message.clone()),
            LoadEvent::Abandon | LoadEvent::Settle => {}
        }

        self.state = next;
        Ok(next)
    }

    /// Records the outcome of a load and settles back to `Idle`.
    pub fn finish(&mut self, outcome: Result<(), String>) -> Result<LoadState, StateTransitionError> {
        let event = match outcome {
            Ok(()) => LoadEvent::Succeeded,
            Err(message) => LoadEvent::Failed(message),
        };
        self.process(&event)?;
        self.process(&LoadEvent::Settle)
    }
}

/// Identifies which incarnation of a page issued a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewTicket {
    pub page: Page,
    pub epoch: u64,
}

/// Load state plus liveness epoch for every page.
#[derive(Debug, Default)]
pub struct PageViews {
    loads: [PageLoad; 4],
    epochs: [u64; 4],
}

impl PageViews {
    pub fn load(&self, page: Page) -> &PageLoad {
        &self.loads[page.index()]
    }

    pub fn load_mut(&mut self, page: Page) -> &mut PageLoad {
        &mut self.loads[page.index()]
    }

    pub const fn ticket(&self, page: Page) -> ViewTicket {
        ViewTicket {
            page,
            epoch: self.epochs[page.index()],
        }
    }

    pub fn is_live(&self, ticket: ViewTicket) -> bool {
        self.epochs[ticket.page.index()] == ticket.epoch
    }

    /// Tears the page down: outstanding tickets stop matching and an
    /// in-flight load is abandoned.
    pub fn invalidate(&mut self, page: Page) {
        let index = page.index();
        self.epochs[index] += 1;
        if self.loads[index].is_loading() {
            if let Err(error) = self.loads[index].process(&LoadEvent::Abandon) {
                tracing::warn!(%page, %error, "could not abandon load");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_load_cycle() -> Result<(), StateTransitionError> {
        let mut load = PageLoad::new();
        assert_eq!(load.process(&LoadEvent::Start)?, LoadState::Loading);
        assert_eq!(load.finish(Ok(()))?, LoadState::Idle);
        assert_eq!(load.last_error(), None);

        load.process(&LoadEvent::Start)?;
        assert_eq!(load.finish(Err("timeout".to_string()))?, LoadState::Idle);
        assert_eq!(load.last_error(), Some("timeout"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_transitions() {
        let mut load = PageLoad::new();
        let error = load.process(&LoadEvent::Succeeded).err();
        assert_eq!(
            error,
            Some(StateTransitionError {
                from: LoadState::Idle,
                event: LoadEvent::Succeeded,
            })
        );
        assert_eq!(load.state(), LoadState::Idle);

        assert!(load.process(&LoadEvent::Start).is_ok());
        assert!(load.process(&LoadEvent::Start).is_err());
        assert!(load.process(&LoadEvent::Settle).is_err());
        assert!(load.is_loading());
    }

    #[test]
    fn invalidating_a_page_retires_its_tickets() -> Result<(), StateTransitionError> {
        let mut views = PageViews::default();
        let ticket = views.ticket(Page::Heatmap);
        views.load_mut(Page::Heatmap).process(&LoadEvent::Start)?;
        assert!(views.load(Page::Heatmap).is_loading());

        views.invalidate(Page::Heatmap);

        assert!(!views.is_live(ticket));
        assert!(views.is_live(views.ticket(Page::Heatmap)));
        assert!(views.is_live(views.ticket(Page::Dashboard)));
        assert_eq!(views.load(Page::Heatmap).state(), LoadState::Idle);
        assert!(!views.load(Page::Heatmap).is_loading());
        Ok(())
    }

    #[test]
    fn page_indices_roundtrip() {
        for page in Page::ALL {
            assert_eq!(Page::from_index(page.index()), Some(page));
        }
        assert_eq!(Page::from_index(4), None);
    }
}
