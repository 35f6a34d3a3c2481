#[cfg(test)]
mod tests {
    use crate::error::FetchError;
    use crate::fetcher::*;
    use crate::models::{OrderId, SalesOrder};
    use geohosting_common::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot, Mutex};

    type Reply = Result<SalesOrder, FetchError>;

    /// Each request blocks until the test releases it.
    struct GatedSource {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
        started: mpsc::UnboundedSender<String>,
    }

    impl OrderSource for GatedSource {
        fn fetch_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, SalesOrder, FetchError> {
            Box::pin(async move {
                let gate = self.gates.lock().await.remove(id.as_str());
                let _ = self.started.send(id.to_string());
                match gate {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".into()))),
                    None => Err(FetchError::Network("unexpected request".into())),
                }
            })
        }
    }

    fn order(id: &str) -> SalesOrder {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "order_status": "Waiting Payment",
            "app_name": ""
        }))
        .unwrap()
    }

    fn gated(
        ids: &[&str],
    ) -> (
        Arc<OrderDetailFetcher<GatedSource>>,
        HashMap<String, oneshot::Sender<Reply>>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let mut senders = HashMap::new();
        let mut gates = HashMap::new();
        for id in ids {
            let (tx, rx) = oneshot::channel();
            senders.insert(id.to_string(), tx);
            gates.insert(id.to_string(), rx);
        }
        let (started, started_rx) = mpsc::unbounded_channel();
        let source = GatedSource {
            gates: Mutex::new(gates),
            started,
        };
        (Arc::new(OrderDetailFetcher::new(source)), senders, started_rx)
    }

    #[tokio::test]
    async fn test_last_request_wins_when_older_resolves_late() {
        let (fetcher, mut senders, mut started) = gated(&["7", "8"]);

        let f = fetcher.clone();
        let first = tokio::spawn(async move { f.fetch(&OrderId::from("7")).await });
        assert_eq!(started.recv().await.as_deref(), Some("7"));

        let f = fetcher.clone();
        let second = tokio::spawn(async move { f.fetch(&OrderId::from("8")).await });
        assert_eq!(started.recv().await.as_deref(), Some("8"));

        senders.remove("8").unwrap().send(Ok(order("8"))).unwrap();
        assert_eq!(second.await.unwrap(), FetchOutcome::Loaded(order("8")));

        senders.remove("7").unwrap().send(Ok(order("7"))).unwrap();
        assert_eq!(first.await.unwrap(), FetchOutcome::Superseded);

        let state = fetcher.state().await;
        assert_eq!(state.data, Some(order("8")));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_last_request_wins_when_older_resolves_first() {
        let (fetcher, mut senders, mut started) = gated(&["7", "8"]);

        let f = fetcher.clone();
        let first = tokio::spawn(async move { f.fetch(&OrderId::from("7")).await });
        started.recv().await;
        let f = fetcher.clone();
        let second = tokio::spawn(async move { f.fetch(&OrderId::from("8")).await });
        started.recv().await;

        senders.remove("7").unwrap().send(Ok(order("7"))).unwrap();
        assert_eq!(first.await.unwrap(), FetchOutcome::Superseded);
        assert!(fetcher.state().await.loading);

        senders.remove("8").unwrap().send(Ok(order("8"))).unwrap();
        second.await.unwrap();
        assert_eq!(fetcher.state().await.data, Some(order("8")));
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_keeps_previous_data() {
        let (fetcher, mut senders, _started) = gated(&["1", "2"]);

        senders.remove("1").unwrap().send(Ok(order("1"))).unwrap();
        fetcher.fetch(&OrderId::from("1")).await;

        let err = FetchError::Status {
            status: 404,
            message: "Not found.".into(),
        };
        senders.remove("2").unwrap().send(Err(err.clone())).unwrap();
        assert_eq!(
            fetcher.fetch(&OrderId::from("2")).await,
            FetchOutcome::Failed(err.clone())
        );

        let state = fetcher.state().await;
        assert_eq!(state.error, Some(err));
        assert_eq!(state.data, Some(order("1")));
    }

    #[tokio::test]
    async fn test_closed_fetcher_ignores_late_response() {
        let (fetcher, mut senders, mut started) = gated(&["5"]);

        let f = fetcher.clone();
        let pending = tokio::spawn(async move { f.fetch(&OrderId::from("5")).await });
        started.recv().await;
        fetcher.close();
        senders.remove("5").unwrap().send(Ok(order("5"))).unwrap();

        assert_eq!(pending.await.unwrap(), FetchOutcome::Superseded);
        assert_eq!(fetcher.state().await.data, None);
        assert_eq!(
            fetcher.fetch(&OrderId::from("5")).await,
            FetchOutcome::Superseded
        );
    }
}
