//! # Scheduling Flows
//!
//! End-to-end happy paths through the assembled service: a requester
//! dispatches a `TimeoutRequest` to the input handler, the sweep loop picks
//! the stored record up once due, and the reply lands in the requester's
//! mailbox.
//!
//! ## Flow Tested
//!
//! ```text
//! requester ──TimeoutRequest──→ handler ──record──→ store
//!                                                     │ due
//! requester ←───TimeoutReply──── gateway ←── sweeper ─┘
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use tokio::time::timeout;

    use timebus_engine::adapters::{InMemoryBusGateway, InMemoryTimeoutStore};
    use timebus_engine::ports::MessageHandler;
    use timebus_engine::{PayloadCodec, ServiceConfig, TimeoutService};
    use timebus_messages::{Endpoint, TimeoutData, TimeoutRequest, TransportEnvelope};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const RECV_WINDOW: Duration = Duration::from_secs(3);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct OrderCompleted {
        order_id: u64,
        message: String,
    }

    impl TimeoutData for OrderCompleted {
        const TYPE_TAG: &'static str = "order-completed/1";
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Service wired to in-memory adapters with a fast sweep interval.
    fn build_service(codec: PayloadCodec) -> (TimeoutService, Arc<InMemoryBusGateway>) {
        init_tracing();
        let store = Arc::new(InMemoryTimeoutStore::new());
        let gateway = Arc::new(InMemoryBusGateway::new());
        let service = TimeoutService::new(
            ServiceConfig::for_testing(),
            store,
            gateway.clone(),
            codec,
        );
        (service, gateway)
    }

    fn plain_request(endpoint: &str, corr: &str, delay: Duration) -> TransportEnvelope {
        TransportEnvelope::request(Endpoint::from(endpoint), TimeoutRequest::new(delay, corr))
    }

    // =============================================================================
    // INTEGRATION TESTS: REQUEST -> REPLY
    // =============================================================================

    /// The reply honors the requested delay: never early, and carrying the
    /// originally computed due time so lateness stays measurable.
    #[tokio::test]
    async fn test_reply_arrives_no_earlier_than_the_requested_delay() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let mut inbox = gateway.register(Endpoint::from("client.replies"));
        service.start();

        let requested_at = Utc::now();
        service
            .handler()
            .dispatch(plain_request(
                "client.replies",
                "delayed",
                Duration::from_millis(150),
            ))
            .await
            .unwrap();

        let reply = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("reply within the test window")
            .expect("mailbox open");
        let received_at = Utc::now();

        assert_eq!(reply.correlation_id, "delayed");
        assert!(received_at >= reply.due_time, "reply arrived before due");
        assert!(
            reply.due_time >= requested_at + chrono::Duration::milliseconds(150),
            "due time does not honor the requested delay"
        );

        service.stop().await;
    }

    /// A zero delay is legal: the reply comes on the next sweep.
    #[tokio::test]
    async fn test_zero_delay_replies_on_the_next_sweep() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let mut inbox = gateway.register(Endpoint::from("client.replies"));
        service.start();

        service
            .handler()
            .dispatch(plain_request("client.replies", "right-away", Duration::ZERO))
            .await
            .unwrap();

        let reply = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("prompt reply")
            .expect("mailbox open");
        assert_eq!(reply.correlation_id, "right-away");

        service.stop().await;
    }

    /// Custom payload data comes back typed, byte-for-byte equal.
    #[tokio::test]
    async fn test_payload_data_round_trips_to_the_reply() {
        let mut codec = PayloadCodec::new();
        codec.register::<OrderCompleted>();
        let (service, gateway) = build_service(codec);
        let mut inbox = gateway.register(Endpoint::from("orders.replies"));
        service.start();

        let sent = OrderCompleted {
            order_id: 8731,
            message: "Times up".to_string(),
        };
        let request = TimeoutRequest::with_payload(
            Duration::from_millis(30),
            "order-8731",
            &sent,
        )
        .unwrap();
        service
            .handler()
            .dispatch(TransportEnvelope::request(
                Endpoint::from("orders.replies"),
                request,
            ))
            .await
            .unwrap();

        let reply = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("reply within the test window")
            .expect("mailbox open");

        let restored = reply
            .payload_as::<OrderCompleted>()
            .expect("payload decodes")
            .expect("payload present");
        assert_eq!(restored, sent);

        service.stop().await;
    }

    /// The correlation token is opaque: echoed verbatim, whatever it holds.
    #[tokio::test]
    async fn test_correlation_token_is_echoed_verbatim() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let mut inbox = gateway.register(Endpoint::from("client.replies"));
        service.start();

        let token = "saga/afe1b2?phase=\"settle\" 42";
        service
            .handler()
            .dispatch(plain_request("client.replies", token, Duration::from_millis(20)))
            .await
            .unwrap();

        let reply = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("reply within the test window")
            .expect("mailbox open");
        assert_eq!(reply.correlation_id, token);
        assert!(reply.payload.is_none());

        service.stop().await;
    }

    /// Replies go to the endpoint each request arrived with; two requesters
    /// never see each other's replies.
    #[tokio::test]
    async fn test_replies_are_isolated_per_return_address() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let mut alpha_inbox = gateway.register(Endpoint::from("alpha.replies"));
        let mut beta_inbox = gateway.register(Endpoint::from("beta.replies"));
        service.start();

        service
            .handler()
            .dispatch(plain_request("alpha.replies", "for-alpha", Duration::from_millis(20)))
            .await
            .unwrap();
        service
            .handler()
            .dispatch(plain_request("beta.replies", "for-beta", Duration::from_millis(20)))
            .await
            .unwrap();

        let alpha_reply = timeout(RECV_WINDOW, alpha_inbox.recv())
            .await
            .expect("alpha reply")
            .expect("mailbox open");
        let beta_reply = timeout(RECV_WINDOW, beta_inbox.recv())
            .await
            .expect("beta reply")
            .expect("mailbox open");

        assert_eq!(alpha_reply.correlation_id, "for-alpha");
        assert_eq!(beta_reply.correlation_id, "for-beta");

        // No cross-delivery left behind.
        service.stop().await;
        assert!(alpha_inbox.try_recv().is_err());
        assert!(beta_inbox.try_recv().is_err());
    }

    /// Within one mailbox, replies come oldest obligation first.
    #[tokio::test]
    async fn test_replies_arrive_in_due_order() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let mut inbox = gateway.register(Endpoint::from("client.replies"));
        service.start();

        service
            .handler()
            .dispatch(plain_request("client.replies", "first", Duration::from_millis(10)))
            .await
            .unwrap();
        service
            .handler()
            .dispatch(plain_request("client.replies", "second", Duration::from_millis(40)))
            .await
            .unwrap();

        let first = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("first reply")
            .expect("mailbox open");
        let second = timeout(RECV_WINDOW, inbox.recv())
            .await
            .expect("second reply")
            .expect("mailbox open");

        assert_eq!(first.correlation_id, "first");
        assert_eq!(second.correlation_id, "second");

        service.stop().await;
    }

    /// Stopping lets the in-progress sweep finish: nothing is left checked
    /// out, and pending records survive for a later run.
    #[tokio::test]
    async fn test_stop_leaves_no_batch_in_flight() {
        let (service, gateway) = build_service(PayloadCodec::new());
        let _inbox = gateway.register(Endpoint::from("client.replies"));
        service.start();

        service
            .handler()
            .dispatch(plain_request("client.replies", "maybe-later", Duration::from_secs(60)))
            .await
            .unwrap();

        service.stop().await;

        let status = service.status().await.unwrap();
        assert_eq!(status.in_flight, 0);
        assert_eq!(status.pending, 1);
    }
}
