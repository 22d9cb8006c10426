//! Process-wide configuration (§6 Configuration table).
//!
//! Loaded from environment variables (via `dotenv` at process start, then `std::env`),
//! in the style of the teacher's config/summary module: one struct per concern, printed
//! as `[section] k=v ...` when verbose rather than via a generic config-file parser.

use std::time::Duration;

/// Background worker pool sizing (§5, §6 `agent.executor.*`).
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    pub core_pool: usize,
    pub max_pool: usize,
    pub queue: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            core_pool: 5,
            max_pool: 10,
            queue: 100,
        }
    }
}

/// Agent Loop tunables (§6 `agent.max_tool_iterations`, `selector.temperature`).
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub max_tool_iterations: u32,
    pub selector_temperature: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: 10,
            selector_temperature: 0.0,
        }
    }
}

/// Process-wide application config assembled from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub workspace_dir: String,
    pub agent: AgentConfig,
    pub executor: ExecutorConfig,
    pub indexing_poll_interval: Duration,
    pub shutdown_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace_dir: "/tmp/ai-orchestrator-workspace".to_string(),
            agent: AgentConfig::default(),
            executor: ExecutorConfig::default(),
            indexing_poll_interval: Duration::from_millis(500),
            shutdown_grace: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Builds config from environment variables, falling back to spec defaults (§6) for
    /// anything unset or unparsable. Call `dotenv::dotenv().ok()` before this in `main`
    /// so a `.env` file (if present) populates `std::env` first.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workspace_dir: std::env::var("WORKSPACE_DIR").unwrap_or(defaults.workspace_dir),
            agent: AgentConfig {
                max_tool_iterations: env_u32(
                    "AGENT_MAX_TOOL_ITERATIONS",
                    defaults.agent.max_tool_iterations,
                ),
                selector_temperature: env_f32(
                    "SELECTOR_TEMPERATURE",
                    defaults.agent.selector_temperature,
                ),
            },
            executor: ExecutorConfig {
                core_pool: env_usize("AGENT_EXECUTOR_CORE_POOL", defaults.executor.core_pool),
                max_pool: env_usize("AGENT_EXECUTOR_MAX_POOL", defaults.executor.max_pool),
                queue: env_usize("AGENT_EXECUTOR_QUEUE", defaults.executor.queue),
            },
            indexing_poll_interval: Duration::from_millis(env_u64(
                "INDEXING_POLL_INTERVAL_MS",
                defaults.indexing_poll_interval.as_millis() as u64,
            )),
            shutdown_grace: defaults.shutdown_grace,
        }
    }

    /// `[section] k=v ...` lines for startup logging, mirroring the teacher's
    /// `ConfigSection::print_to_stderr` format but routed through `tracing::info!`.
    pub fn log_summary(&self) {
        tracing::info!(
            workspace_dir = %self.workspace_dir,
            max_tool_iterations = self.agent.max_tool_iterations,
            selector_temperature = self.agent.selector_temperature,
            core_pool = self.executor.core_pool,
            max_pool = self.executor.max_pool,
            queue = self.executor.queue,
            "agent config loaded"
        );
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.workspace_dir, "/tmp/ai-orchestrator-workspace");
        assert_eq!(cfg.agent.max_tool_iterations, 10);
        assert_eq!(cfg.executor.core_pool, 5);
        assert_eq!(cfg.executor.max_pool, 10);
        assert_eq!(cfg.executor.queue, 100);
        assert_eq!(cfg.indexing_poll_interval, Duration::from_millis(500));
    }
}
