use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::core_service::{OmnisearchService, ServiceError};
use crate::model::SearchResult;
use crate::navigation;

/// Where the controller is between keystrokes and displayed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Pending { timer: u64 },
    Fetching { sequence: u64 },
}

/// A timer the host must arm; firing it means calling
/// [`InputController::on_timer`] with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub timer: u64,
    pub delay: Duration,
}

/// A round that is ready to run against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTicket {
    pub sequence: u64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Displayed,
    Stale,
    Failed,
}

/// Overlay state owned by the controller: input text, displayed list and
/// the selection cursor over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    visible: bool,
    text: String,
    displayed: Vec<SearchResult>,
    selected: usize,
}

impl Session {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn displayed(&self) -> &[SearchResult] {
        &self.displayed
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.displayed.get(self.selected)
    }
}

pub fn next_selection_index(current: usize, len: usize, direction: i32) -> usize {
    if len == 0 {
        return 0;
    }

    let max = len - 1;
    if direction < 0 {
        current.saturating_sub(1)
    } else if direction > 0 {
        (current + 1).min(max)
    } else {
        current.min(max)
    }
}

/// Debounce and round sequencing, free of any clock. Every keystroke
/// supersedes the pending timer; only the most recently dispatched round
/// may replace the displayed list.
#[derive(Debug)]
pub struct InputController {
    session: Session,
    state: ControllerState,
    quiescence: Duration,
    next_timer: u64,
    latest_sequence: u64,
}

impl InputController {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            session: Session::default(),
            state: ControllerState::Idle,
            quiescence,
            next_timer: 0,
            latest_sequence: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn open(&mut self) {
        self.session.visible = true;
    }

    /// Hides the overlay, clears input and results, and makes every
    /// pending timer and in-flight round stale.
    pub fn close(&mut self) {
        self.session = Session::default();
        self.state = ControllerState::Idle;
        self.next_timer += 1;
        self.latest_sequence += 1;
    }

    pub fn on_input(&mut self, text: impl Into<String>) -> TimerRequest {
        self.session.text = text.into();
        self.next_timer += 1;
        self.state = ControllerState::Pending {
            timer: self.next_timer,
        };
        TimerRequest {
            timer: self.next_timer,
            delay: self.quiescence,
        }
    }

    pub fn on_timer(&mut self, timer: u64) -> Option<RoundTicket> {
        if self.state != (ControllerState::Pending { timer }) {
            return None;
        }
        self.latest_sequence += 1;
        self.state = ControllerState::Fetching {
            sequence: self.latest_sequence,
        };
        Some(RoundTicket {
            sequence: self.latest_sequence,
            text: self.session.text.clone(),
        })
    }

    pub fn on_round_complete(
        &mut self,
        sequence: u64,
        outcome: Result<Vec<SearchResult>, ServiceError>,
    ) -> RoundOutcome {
        if !self.settle(sequence) {
            return RoundOutcome::Stale;
        }

        match outcome {
            Ok(results) => {
                self.session.displayed = results;
                self.session.selected = 0;
                RoundOutcome::Displayed
            }
            Err(error) => {
                warn!(sequence, %error, "search round failed; keeping previous results");
                RoundOutcome::Failed
            }
        }
    }

    /// A round whose task died before producing an outcome. The displayed
    /// list is left as it was.
    pub fn on_round_aborted(&mut self, sequence: u64) -> RoundOutcome {
        if !self.settle(sequence) {
            return RoundOutcome::Stale;
        }
        warn!(sequence, "search round aborted; keeping previous results");
        RoundOutcome::Failed
    }

    /// Returns false for a stale round. Otherwise leaves `Fetching`.
    fn settle(&mut self, sequence: u64) -> bool {
        if sequence != self.latest_sequence {
            debug!(sequence, latest = self.latest_sequence, "discarding stale round");
            return false;
        }
        if self.state == (ControllerState::Fetching { sequence }) {
            self.state = ControllerState::Idle;
        }
        true
    }

    pub fn move_selection(&mut self, direction: i32) -> usize {
        self.session.selected =
            next_selection_index(self.session.selected, self.session.displayed.len(), direction);
        self.session.selected
    }

    pub fn activate(&self) -> Option<String> {
        self.session.selected().and_then(navigation::resolve)
    }
}

/// Receives every list the controller decides to display, and the
/// destination of an activated result.
pub trait Renderer {
    fn render(&mut self, results: &[SearchResult]);
    fn navigate(&mut self, destination: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Open,
    Close,
    Text(String),
    MoveSelection(i32),
    Activate,
}

type RoundResult = Result<Vec<SearchResult>, ServiceError>;

/// Runs the controller until `events` closes and all outstanding work has
/// drained. Rounds run as separate tasks so a slow fetch never blocks input.
pub async fn run<R: Renderer>(
    service: Arc<OmnisearchService>,
    quiescence: Duration,
    mut events: mpsc::Receiver<InputEvent>,
    renderer: &mut R,
) -> InputController {
    let mut controller = InputController::new(quiescence);
    let mut rounds: JoinSet<(u64, Result<RoundResult, JoinError>)> = JoinSet::new();
    let mut deadline: Option<(u64, Instant)> = None;
    let mut input_open = true;

    while input_open || deadline.is_some() || !rounds.is_empty() {
        let wake_at = deadline.map(|(_, at)| at).unwrap_or_else(Instant::now);
        tokio::select! {
            event = events.recv(), if input_open => match event {
                Some(InputEvent::Text(text)) => {
                    let request = controller.on_input(text);
                    deadline = Some((request.timer, Instant::now() + request.delay));
                }
                Some(InputEvent::Open) => controller.open(),
                Some(InputEvent::Close) => {
                    controller.close();
                    deadline = None;
                    renderer.render(&[]);
                }
                Some(InputEvent::MoveSelection(direction)) => {
                    controller.move_selection(direction);
                }
                Some(InputEvent::Activate) => {
                    if let Some(destination) = controller.activate() {
                        renderer.navigate(&destination);
                    }
                }
                None => input_open = false,
            },
            _ = sleep_until(wake_at), if deadline.is_some() => {
                let fired = deadline.take().and_then(|(timer, _)| controller.on_timer(timer));
                if let Some(ticket) = fired {
                    info!(sequence = ticket.sequence, text = %ticket.text, "dispatching search round");
                    let service = Arc::clone(&service);
                    // The inner task isolates a panicking round so its sequence still comes back.
                    let round = tokio::spawn(async move { service.search(&ticket.text).await });
                    rounds.spawn(async move { (ticket.sequence, round.await) });
                }
            }
            Some(joined) = rounds.join_next(), if !rounds.is_empty() => {
                let outcome = match joined {
                    Ok((sequence, Ok(outcome))) => controller.on_round_complete(sequence, outcome),
                    Ok((sequence, Err(error))) => {
                        error!(sequence, %error, "search round task failed");
                        controller.on_round_aborted(sequence)
                    }
                    Err(error) => {
                        error!(%error, "search round supervisor failed");
                        RoundOutcome::Failed
                    }
                };
                if outcome == RoundOutcome::Displayed {
                    renderer.render(controller.session().displayed());
                }
            }
        }
    }

    controller
}
