//! Integration tests for resuming a failed deployment from persisted state.

use std::sync::Arc;

use alloy_primitives::Address;
use fuse_deploy::{
    state_key, DeploymentConfig, DeploymentController, DeploymentError, DeploymentState,
    FileStore, PoolDraft, SimulatedChain, StageKind, StateStore, PUBLIC_MASTER_PRICE_ORACLE,
};

const DEPLOYER: Address = Address::repeat_byte(0x42);

fn controller(chain: Arc<SimulatedChain>) -> DeploymentController {
    DeploymentController::new(chain, DEPLOYER, DeploymentConfig::default())
}

#[tokio::test]
async fn pool_failure_resumes_in_a_later_session() {
    let dir = tempfile::tempdir().unwrap();
    let draft = PoolDraft::new("Blue Chips");
    let key = state_key(&draft.name);

    // First session: oracle deploys, pool reverts, state is saved.
    let chain = Arc::new(SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE));
    chain.fail_next_pool_deploys(1);
    let store = FileStore::new(dir.path());
    let mut state = store.load(&key).await.unwrap().unwrap_or_default();

    let err = controller(chain.clone())
        .execute(&draft, &mut state)
        .await
        .unwrap_err();
    assert!(matches!(err, DeploymentError::PoolDeployFailed(_)));
    store.save(&key, &state).await.unwrap();
    let oracle = state.price_oracle_address().unwrap();

    // Second session: same chain, fresh controller and store handle.
    let store = FileStore::new(dir.path());
    let mut state = store.load(&key).await.unwrap().unwrap();
    assert_eq!(state.kind(), StageKind::AwaitingPool);
    assert!(state.needs_retry());

    let outcome = controller(chain.clone())
        .execute(&draft, &mut state)
        .await
        .unwrap();
    store.discard(&key).await.unwrap();

    assert_eq!(outcome.price_oracle, oracle);
    assert_eq!(chain.oracle_deploy_calls(), 1);
    assert_eq!(chain.pool_deploy_calls(), 2);
    assert!(store.load(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn abandoning_starts_over() {
    let chain = Arc::new(SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE));
    let controller = controller(chain.clone());
    let draft = PoolDraft::new("Abandoned");
    let mut state = DeploymentState::new();

    chain.fail_next_pool_deploys(1);
    assert!(controller.execute(&draft, &mut state).await.is_err());

    state.reset();
    controller.execute(&draft, &mut state).await.unwrap();

    assert_eq!(chain.oracle_deploy_calls(), 2);
    assert!(state.is_done());
}
