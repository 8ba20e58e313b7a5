//! # Integration Test Flows
//!
//! Init/Handle/Query choreography through the full gateway stack: sealed
//! request in, plan execution against the store, sealed canonical response
//! out.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shroud_gateway::prelude::*;

    #[tokio::test]
    async fn test_full_token_lifecycle() {
        let (gateway, _store) = build_gateway();

        // Bootstrap
        let init = gateway
            .init(SealedRequest::new(sealed_call(
                "init",
                serde_json::json!({"amount": 1000}),
            )))
            .await
            .unwrap();
        assert!(open_return(&init.sealed_return).ok);

        // Two debits through different classes
        gateway
            .handle(SealedRequest::new(sealed_call(
                "send",
                serde_json::json!({"amount": 250}),
            )))
            .await
            .unwrap();
        gateway
            .handle(SealedRequest::new(sealed_call(
                "transfer",
                serde_json::json!({"amount": 150}),
            )))
            .await
            .unwrap();

        // Token-gated balance query
        let peek = gateway
            .query(SealedRequest::with_token(
                sealed_call("peek", serde_json::json!({})),
                CapabilityToken::from(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(open_return(&peek.sealed_return).payload, b"600");
    }

    #[tokio::test]
    async fn test_query_capability_gating() {
        let (gateway, _store) = build_gateway();
        gateway
            .init(SealedRequest::new(sealed_call(
                "init",
                serde_json::json!({"amount": 10}),
            )))
            .await
            .unwrap();

        let no_token = gateway
            .query(SealedRequest::new(sealed_call(
                "peek",
                serde_json::json!({}),
            )))
            .await;
        assert!(matches!(no_token, Err(GatewayError::Unauthorized)));

        let bad_token = gateway
            .query(SealedRequest::with_token(
                sealed_call("peek", serde_json::json!({})),
                CapabilityToken::from("not-the-key"),
            ))
            .await;
        assert!(matches!(bad_token, Err(GatewayError::Unauthorized)));

        let good = gateway
            .query(SealedRequest::with_token(
                sealed_call("peek", serde_json::json!({})),
                CapabilityToken::from(TOKEN),
            ))
            .await;
        assert!(good.is_ok());
    }

    #[tokio::test]
    async fn test_transfer_message_reaches_recipient() {
        let (gateway, _store) = build_gateway();
        gateway
            .init(SealedRequest::new(sealed_call(
                "init",
                serde_json::json!({"amount": 100}),
            )))
            .await
            .unwrap();

        let transfer = gateway
            .handle(SealedRequest::new(sealed_call(
                "transfer",
                serde_json::json!({"amount": 42}),
            )))
            .await
            .unwrap();

        assert_eq!(transfer.sealed_messages.len(), 1);
        let output = open_output(&transfer.sealed_messages[0]);
        assert!(output.real);
        assert_eq!(output.payload, b"credit:42");
    }

    #[tokio::test]
    async fn test_unknown_class_is_rejected_preplan() {
        let (gateway, store) = build_gateway();

        let result = gateway
            .handle(SealedRequest::new(sealed_call(
                "burn",
                serde_json::json!({"amount": 1}),
            )))
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::Shape(ShapeError::UnknownClass(_)))
        ));
        // Nothing touched the store
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_invocations_are_isolated() {
        let (gateway, _store) = build_gateway();
        gateway
            .init(SealedRequest::new(sealed_call(
                "init",
                serde_json::json!({"amount": 1000}),
            )))
            .await
            .unwrap();

        // Ten debits of 10; the store must reflect all of them, in order,
        // with no interleaving anomalies.
        for _ in 0..10 {
            gateway
                .handle(SealedRequest::new(sealed_call(
                    "send",
                    serde_json::json!({"amount": 10}),
                )))
                .await
                .unwrap();
        }

        let peek = gateway
            .query(SealedRequest::with_token(
                sealed_call("peek", serde_json::json!({})),
                CapabilityToken::from(TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(open_return(&peek.sealed_return).payload, b"900");

        let stats = gateway.stats().await;
        assert_eq!(stats.completed, 12);
        assert_eq!(stats.uniform_failures, 0);
    }
}
