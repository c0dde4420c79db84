use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::backend::{QueryError, WeatherBackend};
use crate::model::WeatherReport;

/// The single observable state of a weather query.
///
/// Exactly one variant holds at any time: a new submission clears the
/// prior result or error before entering `Loading`, and `Loading` always
/// clears when the request settles.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// No query submitted yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last applied request settled with a report.
    Success(WeatherReport),
    /// The last applied request settled with an error message.
    Failure(String),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            Self::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Owns the query lifecycle: validates input, drives the backend call and
/// publishes state transitions.
///
/// Submissions are not cancelled or timed out. When a second submission is
/// issued while an earlier one is still in flight, both requests run to
/// completion, but only the most recently *issued* one may apply its
/// outcome: each request is tagged with a sequence number at submission
/// time and a completion whose tag is no longer the latest is discarded.
#[derive(Debug)]
pub struct WeatherQueryController {
    backend: Box<dyn WeatherBackend>,
    state: watch::Sender<QueryState>,
    latest_seq: AtomicU64,
}

impl WeatherQueryController {
    pub fn new(backend: Box<dyn WeatherBackend>) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);

        Self {
            backend,
            state,
            latest_seq: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    pub fn current_state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Submit a query and drive it until it settles.
    ///
    /// Empty or whitespace-only input fails validation locally: the state
    /// goes straight to `Failure` and no request is issued.
    pub async fn submit(&self, raw_input: &str) {
        let city = raw_input.trim();
        if city.is_empty() {
            self.state
                .send_replace(QueryState::Failure(QueryError::EmptyQuery.to_string()));
            return;
        }

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(QueryState::Loading);
        debug!(seq, city = %city, "query submitted");

        let outcome = self.backend.fetch_weather(city).await;

        if self.latest_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding outcome of superseded request");
            return;
        }

        let next = match outcome {
            Ok(report) => QueryState::Success(report),
            Err(err) => QueryState::Failure(err.to_string()),
        };
        self.state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, DailyForecast};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::{Mutex, mpsc, oneshot};

    type Outcome = Result<WeatherReport, QueryError>;

    /// Backend whose requests are resolved by the test, in any order.
    #[derive(Debug)]
    struct RemoteControlledBackend {
        requests: mpsc::UnboundedSender<(String, oneshot::Sender<Outcome>)>,
    }

    #[async_trait]
    impl WeatherBackend for RemoteControlledBackend {
        async fn fetch_weather(&self, city: &str) -> Outcome {
            let (respond, outcome) = oneshot::channel();
            self.requests
                .send((city.to_string(), respond))
                .expect("test dropped the request receiver");
            outcome.await.expect("test dropped the responder")
        }
    }

    /// Backend that answers every request with a canned outcome.
    #[derive(Debug)]
    struct CannedBackend {
        outcome: Mutex<Option<Outcome>>,
    }

    impl CannedBackend {
        fn new(outcome: Outcome) -> Box<Self> {
            Box::new(Self {
                outcome: Mutex::new(Some(outcome)),
            })
        }
    }

    #[async_trait]
    impl WeatherBackend for CannedBackend {
        async fn fetch_weather(&self, _city: &str) -> Outcome {
            self.outcome
                .lock()
                .await
                .take()
                .expect("canned backend called more than once")
        }
    }

    fn report_for(city: &str) -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                city: city.to_string(),
                country: "GB".to_string(),
                description: "overcast clouds".to_string(),
                icon: "04d".to_string(),
                temperature: 15.0,
                feels_like: 14.0,
                humidity: 70.0,
                wind_speed: 5.0,
                pressure: 1010.0,
                wind_direction: None,
                visibility: None,
                timestamp: None,
            },
            forecast: vec![DailyForecast {
                date: "2024-06-01".to_string(),
                icon: "04d".to_string(),
                description: "overcast clouds".to_string(),
                temp_max: 17.0,
                temp_min: 9.0,
                humidity: None,
                wind_speed: None,
            }],
        }
    }

    fn remote_controlled() -> (
        Arc<WeatherQueryController>,
        mpsc::UnboundedReceiver<(String, oneshot::Sender<Outcome>)>,
    ) {
        let (requests, request_rx) = mpsc::unbounded_channel();
        let controller = Arc::new(WeatherQueryController::new(Box::new(
            RemoteControlledBackend { requests },
        )));
        (controller, request_rx)
    }

    #[tokio::test]
    async fn starts_idle() {
        let (controller, _requests) = remote_controlled();
        assert_eq!(controller.current_state(), QueryState::Idle);
    }

    #[tokio::test]
    async fn empty_input_fails_without_a_request() {
        let (controller, mut requests) = remote_controlled();

        for input in ["", "   ", "\t\n"] {
            controller.submit(input).await;
            assert_eq!(
                controller.current_state(),
                QueryState::Failure("Please enter a city name".to_string()),
            );
        }

        assert!(requests.try_recv().is_err(), "no request may be issued");
    }

    #[tokio::test]
    async fn input_is_trimmed_before_the_request() {
        let (controller, mut requests) = remote_controlled();

        let task = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("  Paris  ").await }
        });

        let (city, respond) = requests.recv().await.expect("one request expected");
        assert_eq!(city, "Paris");
        assert_eq!(controller.current_state(), QueryState::Loading);

        respond.send(Ok(report_for("Paris"))).expect("send outcome");
        task.await.expect("submit task");
    }

    #[tokio::test]
    async fn success_settles_and_clears_loading() {
        let controller =
            WeatherQueryController::new(CannedBackend::new(Ok(report_for("London"))));

        controller.submit("London").await;

        let state = controller.current_state();
        assert!(!state.is_loading());
        assert_eq!(state, QueryState::Success(report_for("London")));
    }

    #[tokio::test]
    async fn failure_settles_and_clears_loading() {
        let controller = WeatherQueryController::new(CannedBackend::new(Err(
            QueryError::Backend("city not found".to_string()),
        )));

        controller.submit("Nowhereville").await;

        let state = controller.current_state();
        assert!(!state.is_loading());
        assert_eq!(state, QueryState::Failure("city not found".to_string()));
    }

    #[tokio::test]
    async fn resubmission_replaces_a_terminal_state_with_loading() {
        let (controller, mut requests) = remote_controlled();

        controller.submit("").await;
        assert!(controller.current_state().error_message().is_some());

        let task = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("Kyiv").await }
        });

        let (_, respond) = requests.recv().await.expect("one request expected");
        assert_eq!(controller.current_state(), QueryState::Loading);

        respond.send(Ok(report_for("Kyiv"))).expect("send outcome");
        task.await.expect("submit task");
        assert!(controller.current_state().report().is_some());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (controller, mut requests) = remote_controlled();

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("London").await }
        });
        let (_, respond_first) = requests.recv().await.expect("first request");

        let second = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("Paris").await }
        });
        let (_, respond_second) = requests.recv().await.expect("second request");

        // Newest submission settles first.
        respond_second
            .send(Ok(report_for("Paris")))
            .expect("send outcome");
        second.await.expect("submit task");
        assert_eq!(controller.current_state(), QueryState::Success(report_for("Paris")));

        // The superseded request lands afterwards and must not apply.
        respond_first
            .send(Ok(report_for("London")))
            .expect("send outcome");
        first.await.expect("submit task");
        assert_eq!(controller.current_state(), QueryState::Success(report_for("Paris")));
    }

    #[tokio::test]
    async fn latest_submission_wins_in_completion_order_too() {
        let (controller, mut requests) = remote_controlled();

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("London").await }
        });
        let (_, respond_first) = requests.recv().await.expect("first request");

        let second = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("Paris").await }
        });
        let (_, respond_second) = requests.recv().await.expect("second request");

        respond_first
            .send(Ok(report_for("London")))
            .expect("send outcome");
        first.await.expect("submit task");

        respond_second
            .send(Ok(report_for("Paris")))
            .expect("send outcome");
        second.await.expect("submit task");

        assert_eq!(controller.current_state(), QueryState::Success(report_for("Paris")));
    }

    #[tokio::test]
    async fn subscribers_observe_the_transition_sequence() {
        let (controller, mut requests) = remote_controlled();
        let mut states = controller.subscribe();
        assert_eq!(*states.borrow_and_update(), QueryState::Idle);

        let task = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit("Lviv").await }
        });

        let (_, respond) = requests.recv().await.expect("one request expected");
        states.changed().await.expect("loading transition");
        assert_eq!(*states.borrow_and_update(), QueryState::Loading);

        respond.send(Ok(report_for("Lviv"))).expect("send outcome");
        task.await.expect("submit task");
        states.changed().await.expect("settled transition");
        assert!(states.borrow_and_update().report().is_some());
    }
}
