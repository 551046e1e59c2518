//! Implementation of the `fuse pool` commands.
//!
//! Deployments run against the in-memory simulated chain. Whatever an
//! attempt accomplished is kept in the state directory, keyed by pool name,
//! so running `fuse pool deploy` again continues from the failed step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::Address;
use fuse_deploy::{
    state_key, DeploymentController, DeploymentError, DeploymentOutcome, DeploymentState,
    FileStore, FuseError, PoolDraft, SimulatedChain, StageKind, StateStore, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::CliConfig;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to read draft {}: {source}", path.display())]
    DraftRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse draft {}: {source}", path.display())]
    DraftParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid pool configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("no deployer account. Set chain.deployer in fuse.toml or pass --from")]
    NoDeployer,

    #[error("{0}. Run the same command again to retry")]
    Deployment(DeploymentError),

    #[error(transparent)]
    Store(#[from] FuseError),
}

/// Arguments for `fuse pool deploy`.
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    /// Draft file.
    pub draft: PathBuf,

    /// Account to deploy from, overriding the configured deployer.
    pub from: Option<Address>,

    /// Number of oracle deployments the simulated chain should reject.
    pub fail_oracle: u32,

    /// Number of pool deployments the simulated chain should reject.
    pub fail_pool: u32,
}

/// Read and parse a draft file.
pub async fn load_draft(path: &Path) -> Result<PoolDraft, PoolError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PoolError::DraftRead {
            path: path.to_owned(),
            source,
        })?;

    toml::from_str(&contents).map_err(|source| PoolError::DraftParse {
        path: path.to_owned(),
        source,
    })
}

pub async fn validate(draft_path: &Path) -> Result<(), PoolError> {
    let draft = load_draft(draft_path).await?;
    draft.validate()?;

    println!("{} is ready to deploy", draft.name);
    println!("  close factor:          {}", draft.close_factor);
    println!("  liquidation incentive: {}", draft.liquidation_incentive);
    if draft.is_whitelisted {
        println!("  whitelist:             {} addresses", draft.whitelist.len());
    }
    Ok(())
}

/// Run one deployment attempt, resuming any pending state for the draft.
pub async fn deploy(config: &CliConfig, args: DeployArgs) -> Result<DeploymentOutcome, PoolError> {
    let draft = load_draft(&args.draft).await?;
    draft.validate()?;

    let deployer = args
        .from
        .or(config.chain.deployer)
        .ok_or(PoolError::NoDeployer)?;

    let store = FileStore::from_config(&config.store);
    let key = state_key(&draft.name);
    let mut state = store.load(&key).await?.unwrap_or_default();

    if state.attempts() > 0 {
        println!(
            "Resuming {} at step \"{}\" (attempt {})",
            draft.name,
            state.kind().label(),
            state.attempts() + 1
        );
    }

    // Each attempt spends at most two nonces.
    let spent_nonces = u64::from(state.attempts()) * 2;
    let chain = SimulatedChain::new(config.chain.public_price_oracle)
        .with_start_block(config.chain.start_block)
        .with_existing_pools(config.chain.existing_pools)
        .with_nonce(deployer, spent_nonces);
    chain.fail_next_oracle_deploys(args.fail_oracle);
    chain.fail_next_pool_deploys(args.fail_pool);

    let controller =
        DeploymentController::new(Arc::new(chain), deployer, config.deployment.clone());

    let mut progress = controller.progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let step = *progress.borrow_and_update();
            if step != StageKind::Done {
                println!("  {}", step.label());
            }
        }
    });

    let result = controller.execute(&draft, &mut state).await;
    drop(controller);
    if let Err(e) = reporter.await {
        debug!(error = %e, "progress reporter stopped");
    }

    match result {
        Ok(outcome) => {
            store.discard(&key).await?;
            info!(pool = %draft.name, address = %outcome.pool_address, "pool deployed");

            println!("Deployed {} at {}", draft.name, outcome.pool_address);
            println!("  price oracle: {}", outcome.price_oracle);
            match outcome.pool_id {
                Some(id) => println!("  pool id:      {id}"),
                None => println!("  pool id:      unknown"),
            }
            println!("Open {}", outcome.redirect_path());
            Ok(outcome)
        }
        Err(DeploymentError::Validation(e)) => Err(PoolError::Invalid(e)),
        Err(e) => {
            store.save(&key, &state).await?;
            Err(PoolError::Deployment(e))
        }
    }
}

/// Pending state for the draft, if any.
pub async fn pending_state(
    config: &CliConfig,
    draft_path: &Path,
) -> Result<(PoolDraft, Option<DeploymentState>), PoolError> {
    let draft = load_draft(draft_path).await?;
    let store = FileStore::from_config(&config.store);
    let state = store.load(&state_key(&draft.name)).await?;
    Ok((draft, state))
}

pub async fn status(config: &CliConfig, draft_path: &Path) -> Result<(), PoolError> {
    let (draft, state) = pending_state(config, draft_path).await?;

    let Some(state) = state else {
        println!("No pending deployment for {}", draft.name);
        return Ok(());
    };

    println!("Pending deployment for {}", draft.name);
    println!("  step:         {}", state.kind().label());
    println!("  attempts:     {}", state.attempts());
    if let Some(oracle) = state.price_oracle_address() {
        println!("  price oracle: {oracle}");
    }
    if let Some(error) = state.last_error() {
        println!("  last error:   {error}");
    }
    println!("  updated:      {}", state.updated_at().to_rfc3339());
    Ok(())
}

pub async fn abandon(config: &CliConfig, draft_path: &Path) -> Result<(), PoolError> {
    let draft = load_draft(draft_path).await?;
    let store = FileStore::from_config(&config.store);
    store.discard(&state_key(&draft.name)).await?;

    info!(pool = %draft.name, "pending deployment abandoned");
    println!("Abandoned pending deployment for {}", draft.name);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fuse_deploy::OracleChoice;
    use tempfile::TempDir;

    use super::*;

    const DEPLOYER: Address = Address::repeat_byte(0x11);

    struct Workspace {
        dir: TempDir,
        config: CliConfig,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = CliConfig::default();
            config.store.state_dir = dir.path().join("state");
            config.chain.deployer = Some(DEPLOYER);
            config.chain.existing_pools = 12;
            Self { dir, config }
        }

        fn draft(&self, contents: &str) -> PathBuf {
            let path = self.dir.path().join("draft.toml");
            std::fs::write(&path, contents).unwrap();
            path
        }

        fn args(&self, draft: PathBuf) -> DeployArgs {
            DeployArgs {
                draft,
                ..DeployArgs::default()
            }
        }
    }

    const DRAFT: &str = r#"
name = "Blue Chips"
close_factor = 40
liquidation_incentive = 10
"#;

    #[tokio::test]
    async fn draft_file_is_parsed() {
        let ws = Workspace::new();
        let path = ws.draft(
            r#"
name = "Gated"
is_whitelisted = true
whitelist = [
    "0x1111111111111111111111111111111111111111",
    "0x2222222222222222222222222222222222222222",
]
oracle = { custom = "0x3333333333333333333333333333333333333333" }
"#,
        );

        let draft = load_draft(&path).await.unwrap();
        assert_eq!(draft.name, "Gated");
        assert_eq!(draft.whitelist.len(), 2);
        assert_eq!(
            draft.oracle,
            OracleChoice::Custom("0x3333333333333333333333333333333333333333".to_owned())
        );
        assert_eq!(draft.close_factor.percent(), 50);
    }

    #[tokio::test]
    async fn missing_draft_is_reported() {
        let ws = Workspace::new();
        let err = load_draft(&ws.dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::DraftRead { .. }));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_deploying() {
        let ws = Workspace::new();
        let path = ws.draft("name = \"Gated\"\nis_whitelisted = true\n");

        let err = deploy(&ws.config, ws.args(path.clone())).await.unwrap_err();
        assert!(matches!(
            err,
            PoolError::Invalid(ValidationError::WhitelistTooSmall)
        ));

        let (_, state) = pending_state(&ws.config, &path).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn successful_deploy_leaves_no_state() {
        let ws = Workspace::new();
        let path = ws.draft(DRAFT);

        let outcome = deploy(&ws.config, ws.args(path.clone())).await.unwrap();
        assert_eq!(outcome.pool_id.map(|id| id.get()), Some(12));
        assert_eq!(outcome.redirect_path(), "/fuse/pool/12/edit");

        let (_, state) = pending_state(&ws.config, &path).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn failed_pool_step_resumes_on_next_run() {
        let ws = Workspace::new();
        let path = ws.draft(DRAFT);

        let err = deploy(
            &ws.config,
            DeployArgs {
                fail_pool: 1,
                ..ws.args(path.clone())
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PoolError::Deployment(DeploymentError::PoolDeployFailed(_))
        ));

        let (_, state) = pending_state(&ws.config, &path).await.unwrap();
        let state = state.unwrap();
        assert_eq!(state.kind(), StageKind::AwaitingPool);
        assert!(state.needs_retry());
        let oracle = state.price_oracle_address().unwrap();

        let outcome = deploy(&ws.config, ws.args(path.clone())).await.unwrap();
        assert_eq!(outcome.price_oracle, oracle);
        assert_ne!(outcome.pool_address, oracle);

        let (_, state) = pending_state(&ws.config, &path).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn similar_names_keep_separate_state() {
        let ws = Workspace::new();
        let path = ws.draft("name = \"Blue Chips\"\n");
        let other = ws.dir.path().join("other.toml");
        std::fs::write(&other, "name = \"blue-chips!\"\n").unwrap();

        deploy(
            &ws.config,
            DeployArgs {
                fail_pool: 1,
                ..ws.args(path.clone())
            },
        )
        .await
        .unwrap_err();

        assert!(pending_state(&ws.config, &path).await.unwrap().1.is_some());
        assert!(pending_state(&ws.config, &other).await.unwrap().1.is_none());
    }

    #[tokio::test]
    async fn deployer_is_required() {
        let mut ws = Workspace::new();
        ws.config.chain.deployer = None;
        let path = ws.draft(DRAFT);

        let err = deploy(&ws.config, ws.args(path.clone())).await.unwrap_err();
        assert!(matches!(err, PoolError::NoDeployer));

        let outcome = deploy(
            &ws.config,
            DeployArgs {
                from: Some(DEPLOYER),
                ..ws.args(path)
            },
        )
        .await
        .unwrap();
        assert!(outcome.pool_id.is_some());
    }

    #[tokio::test]
    async fn abandon_discards_pending_state() {
        let ws = Workspace::new();
        let path = ws.draft(DRAFT);

        deploy(
            &ws.config,
            DeployArgs {
                fail_oracle: 1,
                ..ws.args(path.clone())
            },
        )
        .await
        .unwrap_err();
        assert!(pending_state(&ws.config, &path).await.unwrap().1.is_some());

        abandon(&ws.config, &path).await.unwrap();
        assert!(pending_state(&ws.config, &path).await.unwrap().1.is_none());
    }
}
