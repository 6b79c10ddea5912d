//! # Verification, Deduplication and Routing Flows
//!
//! Properties that span GR-01 through GR-03:
//!
//! 1. **Quorum**: a VAA verifies iff it carries at least `floor(2N/3) + 1`
//!    valid, uniquely-indexed signatures, for every N up to 19.
//! 2. **Exclusive routing**: each verified VAA reaches exactly one handler.
//! 3. **At-most-once**: concurrent deliveries of one message run the
//!    downstream push once; a failed push is retried by the next delivery.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use bytes::Bytes;
    use futures::future::join_all;

    use gr_01_guardian_verification::test_helpers::{
        guardian_keys, guardian_set, sign_vaa, signed_vaa, unsigned_vaa,
    };
    use gr_01_guardian_verification::{
        quorum, GuardianSetHistory, GuardianSetVerifier, VaaVerifier, VerificationError,
    };
    use gr_02_deduplication::Deduplicator;
    use gr_03_message_routing::{push_fn, MessageRouter, PushError, RouteTable, RouterError};
    use shared_types::{ChainId, Context, Vaa};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn counting_push(
        counter: Arc<AtomicUsize>,
    ) -> Arc<dyn gr_03_message_routing::VaaPush> {
        Arc::new(push_fn(move |_ctx: Context, _vaa: Vaa, _raw: Bytes| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }))
    }

    struct Routed {
        router: MessageRouter,
        keys: Vec<gr_01_guardian_verification::test_helpers::GuardianKey>,
        oracle: Arc<AtomicUsize>,
        generic: Arc<AtomicUsize>,
    }

    fn routed(guardians: usize) -> Routed {
        let keys = guardian_keys(guardians);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap();
        let oracle = Arc::new(AtomicUsize::new(0));
        let generic = Arc::new(AtomicUsize::new(0));
        let router = MessageRouter::new(
            Arc::new(GuardianSetVerifier::new(Arc::new(history))),
            Arc::new(Deduplicator::default()),
            RouteTable::price_oracle_split(
                counting_push(Arc::clone(&oracle)),
                counting_push(Arc::clone(&generic)),
            ),
        );
        Routed {
            router,
            keys,
            oracle,
            generic,
        }
    }

    // =========================================================================
    // QUORUM
    // =========================================================================

    #[test]
    fn test_quorum_table_up_to_nineteen_guardians() {
        let all_keys = guardian_keys(19);

        for n in 1..=19usize {
            let keys = &all_keys[..n];
            let verifier = GuardianSetVerifier::new(Arc::new(
                GuardianSetHistory::from_sets([guardian_set(0, keys)]).unwrap(),
            ));
            let q = quorum(n);

            let enough = signed_vaa(0, keys, q, ChainId::SOLANA, n as u64, b"q");
            assert_eq!(verifier.verify(&enough), Ok(()), "n={n} with {q} signatures");

            if q > 1 {
                let short = signed_vaa(0, keys, q - 1, ChainId::SOLANA, n as u64, b"q");
                assert!(
                    matches!(
                        verifier.verify(&short),
                        Err(VerificationError::QuorumNotMet { .. })
                    ),
                    "n={n} with {} signatures",
                    q - 1
                );
            }
        }
    }

    #[test]
    fn test_repeated_signer_never_reaches_quorum() {
        let keys = guardian_keys(4);
        let verifier = GuardianSetVerifier::new(Arc::new(
            GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap(),
        ));

        // Guardian 0 three times would be "3 of 4" if repeats counted.
        let mut vaa = unsigned_vaa(0, ChainId::ETHEREUM, 1, b"dup");
        sign_vaa(&mut vaa, &keys, &[0, 0, 0]);
        assert!(matches!(
            verifier.verify(&vaa),
            Err(VerificationError::DuplicateSigner { .. })
        ));
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    #[tokio::test]
    async fn test_each_category_reaches_exactly_one_handler() {
        let r = routed(7);
        let ctx = Context::new();

        let chains = [
            ChainId::PYTHNET,
            ChainId::SOLANA,
            ChainId::ETHEREUM,
            ChainId::PYTHNET,
            ChainId::WORMCHAIN,
        ];
        for (seq, chain) in chains.iter().enumerate() {
            let vaa = signed_vaa(0, &r.keys, 5, *chain, seq as u64, b"route");
            r.router.push(&ctx, &vaa, &vaa.encode().unwrap()).await.unwrap();
        }

        assert_eq!(r.oracle.load(Ordering::SeqCst), 2);
        assert_eq!(r.generic.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unverified_vaa_reaches_no_handler() {
        let r = routed(7);
        let vaa = signed_vaa(0, &r.keys, 4, ChainId::PYTHNET, 1, b"short");

        let err = r
            .router
            .push(&Context::new(), &vaa, &vaa.encode().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Verification(_)));
        assert_eq!(r.oracle.load(Ordering::SeqCst), 0);
        assert_eq!(r.generic.load(Ordering::SeqCst), 0);
    }

    // =========================================================================
    // AT-MOST-ONCE
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deliveries_push_once() {
        let r = Arc::new(routed(4));
        let vaa = signed_vaa(0, &r.keys, 3, ChainId::ETHEREUM, 42, b"race");
        let raw = vaa.encode().unwrap();

        let deliveries = (0..16).map(|_| {
            let r = Arc::clone(&r);
            let vaa = vaa.clone();
            let raw = raw.clone();
            tokio::spawn(async move { r.router.push(&Context::new(), &vaa, &raw).await })
        });
        for outcome in join_all(deliveries).await {
            outcome.unwrap().unwrap();
        }

        assert_eq!(r.generic.load(Ordering::SeqCst), 1);
        assert!(r.router.dedup().is_done(vaa.message_id().as_str()));
    }

    #[tokio::test]
    async fn test_failed_push_runs_again_on_next_delivery() {
        let keys = guardian_keys(4);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap();
        let attempts = Arc::new(AtomicUsize::new(0));
        let handler = {
            let attempts = Arc::clone(&attempts);
            Arc::new(push_fn(move |_: Context, _: Vaa, _: Bytes| {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(PushError::Unavailable("queue down".into()))
                    } else {
                        Ok(())
                    }
                }
            }))
        };
        let router = MessageRouter::new(
            Arc::new(GuardianSetVerifier::new(Arc::new(history))),
            Arc::new(Deduplicator::default()),
            RouteTable::new().fallback(handler),
        );
        let vaa = signed_vaa(0, &keys, 3, ChainId::SOLANA, 9, b"retry");
        let ctx = Context::new();

        assert!(matches!(
            router.push(&ctx, &vaa, &vaa.encode().unwrap()).await,
            Err(RouterError::Downstream(PushError::Unavailable(_)))
        ));
        router.push(&ctx, &vaa, &vaa.encode().unwrap()).await.unwrap();
        router.push(&ctx, &vaa, &vaa.encode().unwrap()).await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
