use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};

use crate::{
    config::{Config, PolicyConfig},
    mind::{
        adapters::HttpAdvisoryOracle,
        advisory::AdvisoryPolicy,
        facade::AgentMind,
        policy::{DecisionPolicy, HeuristicPolicy},
        types::Pose,
    },
    world::GridWorld,
};

/// Builds the decision policy for one agent. Every agent gets its own instance, so advisory
/// calls never share a runtime.
pub fn build_policy(policy: &PolicyConfig) -> Result<Box<dyn DecisionPolicy>> {
    match policy {
        PolicyConfig::Heuristic => Ok(Box::new(HeuristicPolicy)),
        PolicyConfig::Advisory {
            endpoint,
            model,
            api_key_env,
            timeout_ms,
        } => {
            let oracle = HttpAdvisoryOracle::from_env(endpoint, model, api_key_env.as_deref())
                .context("failed to construct advisory oracle")?;
            let policy = AdvisoryPolicy::new(Arc::new(oracle), Duration::from_millis(*timeout_ms))
                .context("failed to construct advisory policy")?;
            Ok(Box::new(policy))
        }
    }
}

pub fn build_world(config: &Config) -> Result<GridWorld> {
    let mut world = GridWorld::new(config.world.width, config.world.height)
        .context("failed to create grid world")?;

    for dirt in &config.world.dirt {
        world
            .add_dirt(dirt.coordinate(), dirt.category)
            .with_context(|| format!("failed to place dirt at {}", dirt.coordinate()))?;
    }

    for agent in &config.agents {
        let policy = build_policy(&config.policy)
            .with_context(|| format!("failed to build policy for agent '{}'", agent.id))?;
        let mind = AgentMind::new(agent.role, policy, config.mind.coverage);
        let pose = Pose::new(agent.coordinate(), agent.orientation);
        world
            .add_agent(agent.id.clone(), pose, mind)
            .with_context(|| format!("failed to place agent '{}'", agent.id))?;
    }

    tracing::info!(
        target: "world",
        width = config.world.width,
        height = config.world.height,
        agents = config.agents.len(),
        dirt = config.world.dirt.len(),
        "world_built"
    );
    Ok(world)
}
