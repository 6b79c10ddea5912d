//! # Message Router
//!
//! Verifies a VAA, then dispatches it to exactly one downstream handler at
//! most once per MessageID.

use crate::domain::errors::RouterError;
use crate::domain::route_table::RouteTable;
use gr_01_guardian_verification::VaaVerifier;
use gr_02_deduplication::Deduplicator;
use shared_types::{Context, Vaa};
use std::sync::Arc;
use tracing::{debug, error};

pub struct MessageRouter {
    verifier: Arc<dyn VaaVerifier>,
    dedup: Arc<Deduplicator>,
    routes: RouteTable,
}

impl MessageRouter {
    pub fn new(verifier: Arc<dyn VaaVerifier>, dedup: Arc<Deduplicator>, routes: RouteTable) -> Self {
        Self {
            verifier,
            dedup,
            routes,
        }
    }

    /// Verify `vaa` and hand it to its route's handler.
    ///
    /// Verification and routing failures are terminal. Handler failures come
    /// back unchanged in `RouterError::Downstream` and are not remembered by
    /// the deduplicator, so a redelivery tries again.
    pub async fn push(&self, ctx: &Context, vaa: &Vaa, raw: &[u8]) -> Result<(), RouterError> {
        let message_id = vaa.message_id();

        if let Err(e) = self.verifier.verify(vaa) {
            error!(
                message_id = %message_id,
                guardian_set_index = vaa.guardian_set_index,
                error = %e,
                "Received invalid VAA"
            );
            return Err(e.into());
        }

        let route = self
            .routes
            .select(vaa)
            .ok_or_else(|| RouterError::NoRoute(message_id.clone()))?;

        self.dedup
            .apply(message_id.as_str(), || async {
                debug!(message_id = %message_id, route = %route.name, "Dispatching VAA");
                route.handler.push(ctx, vaa, raw).await?;
                route.record_dispatch();
                Ok(())
            })
            .await
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn dedup(&self) -> &Arc<Deduplicator> {
        &self.dedup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::closure::push_fn;
    use crate::domain::errors::PushError;
    use crate::ports::outbound::VaaPush;
    use gr_01_guardian_verification::test_helpers::{
        guardian_keys, guardian_set, signed_vaa, GuardianKey,
    };
    use gr_01_guardian_verification::{GuardianSetHistory, GuardianSetVerifier, VerificationError};
    use shared_types::{ChainId, Classify};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl Counting {
        fn new(fail_first: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl VaaPush for Counting {
        async fn push(&self, _: &Context, _: &Vaa, _: &[u8]) -> Result<(), PushError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(PushError::Unavailable("down".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        router: MessageRouter,
        oracle: Arc<Counting>,
        generic: Arc<Counting>,
        keys: Vec<GuardianKey>,
    }

    fn fixture(generic_fail_first: usize) -> Fixture {
        let keys = guardian_keys(7);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap();
        let verifier = Arc::new(GuardianSetVerifier::new(Arc::new(history)));
        let oracle = Counting::new(0);
        let generic = Counting::new(generic_fail_first);
        let routes = RouteTable::price_oracle_split(oracle.clone(), generic.clone());
        Fixture {
            router: MessageRouter::new(verifier, Arc::new(Deduplicator::default()), routes),
            oracle,
            generic,
            keys,
        }
    }

    #[tokio::test]
    async fn test_pythnet_goes_to_oracle_only() {
        let f = fixture(0);
        let vaa = signed_vaa(0, &f.keys, 5, ChainId::PYTHNET, 1, b"price");

        f.router.push(&Context::new(), &vaa, &vaa.encode().unwrap()).await.unwrap();

        assert_eq!((f.oracle.calls(), f.generic.calls()), (1, 0));
    }

    #[tokio::test]
    async fn test_other_chains_go_to_generic_only() {
        let f = fixture(0);
        for (seq, chain) in [ChainId::ETHEREUM, ChainId::SOLANA, ChainId::BASE]
            .into_iter()
            .enumerate()
        {
            let vaa = signed_vaa(0, &f.keys, 5, chain, seq as u64, b"transfer");
            f.router.push(&Context::new(), &vaa, &vaa.encode().unwrap()).await.unwrap();
        }

        assert_eq!((f.oracle.calls(), f.generic.calls()), (0, 3));
        assert_eq!(
            f.router.routes().dispatch_counts(),
            vec![("price-oracle".to_string(), 0), ("fallback".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_delivery_pushed_once() {
        let f = fixture(0);
        let vaa = signed_vaa(0, &f.keys, 5, ChainId::ETHEREUM, 9, b"x");
        let raw = vaa.encode().unwrap();

        for _ in 0..3 {
            f.router.push(&Context::new(), &vaa, &raw).await.unwrap();
        }
        assert_eq!(f.generic.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_vaa_never_reaches_handler() {
        let f = fixture(0);
        let vaa = signed_vaa(0, &f.keys, 4, ChainId::PYTHNET, 1, b"price");

        let err = f
            .router
            .push(&Context::new(), &vaa, &vaa.encode().unwrap())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RouterError::Verification(VerificationError::QuorumNotMet { have: 4, need: 5 })
        );
        assert!(!err.disposition().is_retryable());
        assert_eq!(f.oracle.calls(), 0);
        assert!(!f.router.dedup().is_done(vaa.message_id().as_str()));
    }

    #[tokio::test]
    async fn test_downstream_failure_retried_on_redelivery() {
        let f = fixture(1);
        let vaa = signed_vaa(0, &f.keys, 5, ChainId::ETHEREUM, 3, b"x");
        let raw = vaa.encode().unwrap();

        let first = f.router.push(&Context::new(), &vaa, &raw).await.unwrap_err();
        assert!(matches!(first, RouterError::Downstream(PushError::Unavailable(_))));
        assert!(first.disposition().is_retryable());

        f.router.push(&Context::new(), &vaa, &raw).await.unwrap();
        assert_eq!(f.generic.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_route_is_terminal() {
        let keys = guardian_keys(4);
        let history = GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap();
        let routes = RouteTable::new().route(
            "solana",
            |v: &Vaa| v.emitter_chain == ChainId::SOLANA,
            Arc::new(push_fn(|_, _, _| async { Ok(()) })),
        );
        let router = MessageRouter::new(
            Arc::new(GuardianSetVerifier::new(Arc::new(history))),
            Arc::new(Deduplicator::default()),
            routes,
        );
        let vaa = signed_vaa(0, &keys, 3, ChainId::ETHEREUM, 1, b"x");

        let err = router.push(&Context::new(), &vaa, &vaa.encode().unwrap()).await.unwrap_err();
        assert!(matches!(err, RouterError::NoRoute(_)));
        assert!(!err.disposition().is_retryable());
    }
}
