use crate::core::{
    request_builder::RequestBuilder, transformer, validator, NamedSeries, ProjectionRequest,
    ProjectionState, RawProjectionParams, Transport,
};
use crate::utils::error::{ProjectionError, Result, TransportFailureKind};
use tokio::sync::watch;

pub const DATA_PATH: &str = "/data";

/// Owns the published projection state and drives the fetch pipeline.
///
/// Consumers read through [`ProjectionStore::subscribe`] or
/// [`ProjectionStore::snapshot`]; only the fetch actions write. Actions never
/// return an error: failures end up in `ProjectionState::error`.
///
/// Overlapping fetches are not serialized. Each publishes when its own
/// response arrives, so the response that lands last determines the state.
pub struct ProjectionStore<T: Transport> {
    transport: T,
    builder: RequestBuilder,
    state: watch::Sender<ProjectionState>,
}

impl<T: Transport> ProjectionStore<T> {
    pub fn new(transport: T) -> Self {
        Self::with_builder(transport, RequestBuilder::default())
    }

    pub fn with_builder(transport: T, builder: RequestBuilder) -> Self {
        let (state, _) = watch::channel(ProjectionState::default());
        Self {
            transport,
            builder,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProjectionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProjectionState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn has_error(&self) -> bool {
        self.state.borrow().has_error()
    }

    /// Fetches the projection for the baseline parameters.
    pub async fn fetch_default(&self) {
        self.begin_loading();
        let outcome = match self.builder.build_default() {
            Ok(request) => self.post_projection(&request).await,
            Err(e) => Err(e),
        };
        self.finish("default projection", outcome);
    }

    pub async fn fetch_with_params(&self, params: &RawProjectionParams) {
        self.begin_loading();
        let outcome = match self.builder.build(params) {
            Ok(request) => self.post_projection(&request).await,
            Err(e) => {
                tracing::warn!("Rejected projection parameters: {:?}", params);
                Err(e)
            }
        };
        self.finish("projection", outcome);
    }

    /// `GET /data` variant: no parameters, one unnamed series.
    pub async fn fetch_legacy(&self) {
        self.begin_loading();
        let outcome = self.get_legacy().await;
        self.finish("legacy series", outcome);
    }

    async fn post_projection(&self, request: &ProjectionRequest) -> Result<Vec<NamedSeries>> {
        let body = serde_json::to_value(request)
            .map_err(|e| ProjectionError::transport(TransportFailureKind::Setup, e.to_string()))?;
        tracing::debug!("POST {} with {}", DATA_PATH, body);

        let raw = self.transport.post_json(DATA_PATH, &body).await?;
        let metadata = validator::validate_envelope(&raw)?;
        tracing::debug!("Envelope carries {} series", metadata.len());
        transformer::transform(metadata)
    }

    async fn get_legacy(&self) -> Result<Vec<NamedSeries>> {
        tracing::debug!("GET {}", DATA_PATH);
        let raw = self.transport.get_json(DATA_PATH).await?;
        let points = validator::validate_legacy_envelope(&raw)?;
        transformer::transform_unlabeled(points).map(|series| vec![series])
    }

    fn begin_loading(&self) {
        self.state.send_replace(ProjectionState::loading());
    }

    fn finish(&self, what: &str, outcome: Result<Vec<NamedSeries>>) {
        let next = match outcome {
            Ok(series) => {
                tracing::info!("Loaded {} with {} series", what, series.len());
                ProjectionState::loaded(series)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to fetch {}: {} (Category: {:?})",
                    what,
                    e,
                    e.category()
                );
                ProjectionState::errored(e.to_string())
            }
        };
        self.state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Phase, Point};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get(String),
        Post(String, Value),
    }

    #[derive(Clone, Default)]
    struct MockTransport {
        calls: Arc<Mutex<Vec<Call>>>,
        responses: Arc<Mutex<VecDeque<Result<Value>>>>,
    }

    impl MockTransport {
        fn with_responses(responses: Vec<Result<Value>>) -> Self {
            Self {
                calls: Arc::default(),
                responses: Arc::new(Mutex::new(responses.into())),
            }
        }

        async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }

        async fn next(&self) -> Result<Value> {
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ProjectionError::transport(
                        TransportFailureKind::NoResponse,
                        "No response from server",
                    ))
                })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get_json(&self, path: &str) -> Result<Value> {
            self.calls.lock().await.push(Call::Get(path.to_string()));
            self.next().await
        }

        async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
            self.calls
                .lock()
                .await
                .push(Call::Post(path.to_string(), body.clone()));
            self.next().await
        }
    }

    fn two_series_response() -> Value {
        json!({
            "series": [
                {"identifier": "investment_value", "points": [{"x": 110000, "y": 1}, {"x": 100000, "y": 0}]},
                {"identifier": "realestatepricegrowth", "points": [{"x": 515000, "y": 1}, {"x": 500000, "y": 0}]}
            ]
        })
    }

    fn assert_exclusive(state: &ProjectionState) {
        assert!(!(state.data_loaded && state.error.is_some()));
        assert!(state.data_loaded || state.error.is_some());
    }

    #[test]
    fn test_initial_state_is_idle() {
        let store = ProjectionStore::new(MockTransport::default());
        let state = store.snapshot();

        assert_eq!(state.phase, Phase::Idle);
        assert!(state.series.is_empty());
        assert!(!state.data_loaded);
        assert_eq!(state.error, None);
        assert!(store.is_loading());
        assert!(!store.has_error());
    }

    #[tokio::test]
    async fn test_fetch_default_loads_series() {
        let transport = MockTransport::with_responses(vec![Ok(two_series_response())]);
        let store = ProjectionStore::new(transport.clone());

        store.fetch_default().await;

        let state = store.snapshot();
        assert_exclusive(&state);
        assert!(state.data_loaded);
        assert_eq!(state.phase, Phase::Loaded);
        assert_eq!(state.series.len(), 2);
        assert_eq!(state.series[0].name, "Investment Growth");
        assert_eq!(state.series[1].name, "Real Estate Price Growth");
        assert_eq!(
            state.series[0].data,
            vec![Point::new(0.0, 100000.0), Point::new(1.0, 110000.0)]
        );

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 1);
        let Call::Post(path, body) = &calls[0] else {
            panic!("expected a POST, got {:?}", calls[0]);
        };
        assert_eq!(path, DATA_PATH);
        assert_eq!(body["investmentInput"]["investmentRate"], 0.1);
        assert_eq!(body["mortgageInput"]["downPaymentPercentage"], 0.2);
    }

    #[tokio::test]
    async fn test_missing_params_never_hit_network() {
        let transport = MockTransport::with_responses(vec![Ok(two_series_response())]);
        let store = ProjectionStore::new(transport.clone());

        let mut params = RequestBuilder::baseline_params();
        if let Some(mortgage) = params.mortgage_input.as_mut() {
            mortgage.growth_rate = None;
        }
        store.fetch_with_params(&params).await;

        let state = store.snapshot();
        assert_exclusive(&state);
        assert_eq!(state.error.as_deref(), Some("Missing required parameters"));
        assert!(!state.data_loaded);
        assert_eq!(state.phase, Phase::Errored);
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_server_reported_error() {
        let transport = MockTransport::with_responses(vec![Ok(
            json!({"series": [], "error": "calculation failed"}),
        )]);
        let store = ProjectionStore::new(transport);

        store.fetch_default().await;

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("calculation failed"));
        assert!(state.series.is_empty());
        assert!(store.has_error());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_state() {
        let transport = MockTransport::with_responses(vec![Err(ProjectionError::transport(
            TransportFailureKind::Responded,
            "Server error",
        ))]);
        let store = ProjectionStore::new(transport);

        store.fetch_default().await;

        let state = store.snapshot();
        assert_exclusive(&state);
        assert_eq!(state.error.as_deref(), Some("Server error"));
    }

    #[tokio::test]
    async fn test_error_then_success_clears_error() {
        let transport = MockTransport::with_responses(vec![
            Ok(json!({"nope": true})),
            Ok(two_series_response()),
        ]);
        let store = ProjectionStore::new(transport);

        store.fetch_default().await;
        assert_eq!(
            store.snapshot().error.as_deref(),
            Some("Invalid response format: missing or invalid series data")
        );

        store.fetch_default().await;
        let state = store.snapshot();
        assert_exclusive(&state);
        assert!(state.data_loaded);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_subscriber_sees_loading_then_loaded() {
        let transport = MockTransport::with_responses(vec![Ok(two_series_response())]);
        let store = ProjectionStore::new(transport);
        let mut rx = store.subscribe();

        let observer = async {
            rx.changed().await.unwrap();
            rx.borrow_and_update().clone()
        };
        let (first, _) = tokio::join!(observer, store.fetch_default());

        // Wake-up may coalesce both transitions.
        assert!(first.phase == Phase::Loading || first.phase == Phase::Loaded);
        assert_eq!(rx.borrow().phase, Phase::Loaded);
    }

    #[tokio::test]
    async fn test_legacy_fetch_uses_get() {
        let transport = MockTransport::with_responses(vec![Ok(json!({
            "series": [{"x": 2, "y": 9}, {"x": 1, "y": 4}]
        }))]);
        let store = ProjectionStore::new(transport.clone());

        store.fetch_legacy().await;

        let state = store.snapshot();
        assert!(state.data_loaded);
        assert_eq!(state.series.len(), 1);
        assert_eq!(state.series[0].name, "");
        assert_eq!(
            state.series[0].data,
            vec![Point::new(1.0, 4.0), Point::new(2.0, 9.0)]
        );
        assert_eq!(transport.calls().await, vec![Call::Get(DATA_PATH.to_string())]);
    }

    #[test]
    fn test_actions_run_without_runtime_macro() {
        let transport = MockTransport::with_responses(vec![Ok(two_series_response())]);
        let store = ProjectionStore::new(transport);

        tokio_test::block_on(store.fetch_default());

        assert!(store.snapshot().data_loaded);
    }

    /// Responses are released by the test, keyed on the request's initial sum.
    #[derive(Clone, Default)]
    struct GatedTransport {
        gates: Arc<Mutex<Vec<(f64, tokio::sync::oneshot::Receiver<Value>)>>>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn get_json(&self, _path: &str) -> Result<Value> {
            Err(ProjectionError::transport(TransportFailureKind::Setup, "unused"))
        }

        async fn post_json(&self, _path: &str, body: &Value) -> Result<Value> {
            let sum = body["investmentInput"]["initialSum"].as_f64().unwrap();
            let gate = {
                let mut gates = self.gates.lock().await;
                let index = gates.iter().position(|(s, _)| *s == sum).unwrap();
                gates.remove(index).1
            };
            gate.await.map_err(|_| {
                ProjectionError::transport(TransportFailureKind::NoResponse, "No response from server")
            })
        }
    }

    #[tokio::test]
    async fn test_refetch_resets_to_loading_before_response() {
        let (loaded_tx, loaded_rx) = tokio::sync::oneshot::channel();
        let (pending_tx, pending_rx) = tokio::sync::oneshot::channel();
        let transport = GatedTransport::default();
        transport
            .gates
            .lock()
            .await
            .extend([(100000.0, loaded_rx), (100000.0, pending_rx)]);
        let store = ProjectionStore::new(transport);

        loaded_tx.send(two_series_response()).unwrap();
        store.fetch_default().await;
        let state = store.snapshot();
        assert_eq!(state.phase, Phase::Loaded);
        assert_eq!(state.series.len(), 2);

        let check_and_release = async {
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            let state = store.snapshot();
            assert_eq!(state.phase, Phase::Loading);
            assert!(state.series.is_empty());
            assert_eq!(state.error, None);
            assert!(!state.data_loaded);
            assert!(store.is_loading());
            assert!(!store.has_error());

            pending_tx
                .send(json!({"series": [], "error": "calculation failed"}))
                .unwrap();
        };
        tokio::join!(store.fetch_default(), check_and_release);

        let state = store.snapshot();
        assert_eq!(state.phase, Phase::Errored);
        assert_eq!(state.error.as_deref(), Some("calculation failed"));
    }

    #[tokio::test]
    async fn test_last_response_to_arrive_wins() {
        let (first_tx, first_rx) = tokio::sync::oneshot::channel();
        let (second_tx, second_rx) = tokio::sync::oneshot::channel();
        let transport = GatedTransport::default();
        transport
            .gates
            .lock()
            .await
            .extend([(1000.0, first_rx), (2000.0, second_rx)]);
        let store = ProjectionStore::new(transport);

        let mut first_params = RequestBuilder::baseline_params();
        first_params.investment_input.as_mut().unwrap().initial_sum = Some(json!(1000));
        let mut second_params = RequestBuilder::baseline_params();
        second_params.investment_input.as_mut().unwrap().initial_sum = Some(json!(2000));

        let release = async {
            // Let both requests reach the transport, then answer the newer one first.
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            second_tx
                .send(json!({"series": [{"identifier": "second", "points": [{"x": 1, "y": 1}]}]}))
                .unwrap();
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
            first_tx
                .send(json!({"series": [{"identifier": "first", "points": [{"x": 1, "y": 1}]}]}))
                .unwrap();
        };

        tokio::join!(
            store.fetch_with_params(&first_params),
            store.fetch_with_params(&second_params),
            release
        );

        let state = store.snapshot();
        assert!(state.data_loaded);
        assert_eq!(state.series[0].name, "First");
    }
}
