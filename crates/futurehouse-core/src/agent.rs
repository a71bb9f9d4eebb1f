//! Agent runtime configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CoreError;

/// Default agent type used by the platform.
pub const DEFAULT_AGENT_TYPE: &str = "SimpleAgent";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Default reasoning step budget.
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Override of the runtime parameters an agent runs with.
///
/// Built through [`AgentConfig::builder`], which applies the platform
/// defaults to unset fields and rejects out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent implementation tag (e.g., "SimpleAgent").
    pub agent_type: String,

    /// Model identifier (e.g., "gpt-4o").
    pub model: String,

    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f64,

    /// Maximum number of reasoning steps, at least 1.
    pub max_steps: u32,

    /// Extra agent keyword parameters, forwarded as-is.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub agent_kwargs: Map<String, Value>,
}

impl AgentConfig {
    /// Start building a config from the platform defaults.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Agent keyword arguments as sent to the platform.
    ///
    /// `model` and `temperature` are written first, then the extra kwargs
    /// on top, so a same-named extra kwarg replaces the typed value.
    pub fn merged_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("model".to_string(), Value::String(self.model.clone()));
        kwargs.insert("temperature".to_string(), json!(self.temperature));
        kwargs.extend(self.agent_kwargs.clone());
        kwargs
    }

    /// The `runtime_config` object of a task submission.
    pub fn to_runtime_config(&self) -> Value {
        json!({
            "agent": {
                "agent_type": self.agent_type,
                "agent_kwargs": self.merged_kwargs(),
            },
            "max_steps": self.max_steps,
        })
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_type: DEFAULT_AGENT_TYPE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_steps: DEFAULT_MAX_STEPS,
            agent_kwargs: Map::new(),
        }
    }
}

/// Builder for [`AgentConfig`]. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    agent_type: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_steps: Option<i64>,
    agent_kwargs: Map<String, Value>,
}

impl AgentConfigBuilder {
    /// Set the agent type.
    pub fn agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    /// Set the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the step budget. Signed so that non-positive input can be
    /// reported instead of silently wrapping.
    pub fn max_steps(mut self, max_steps: i64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Add one extra keyword parameter.
    pub fn kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.agent_kwargs.insert(key.into(), value);
        self
    }

    /// Add several extra keyword parameters.
    pub fn kwargs<I, K>(mut self, kwargs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.agent_kwargs
            .extend(kwargs.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Apply the optional fields that are set, leaving the rest alone.
    pub fn apply(
        mut self,
        agent_type: Option<String>,
        model: Option<String>,
        temperature: Option<f64>,
        max_steps: Option<i64>,
    ) -> Self {
        if agent_type.is_some() {
            self.agent_type = agent_type;
        }
        if model.is_some() {
            self.model = model;
        }
        if temperature.is_some() {
            self.temperature = temperature;
        }
        if max_steps.is_some() {
            self.max_steps = max_steps;
        }
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<AgentConfig, CoreError> {
        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !temperature.is_finite() || !(0.0..=1.0).contains(&temperature) {
            return Err(CoreError::InvalidConfig(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                temperature
            )));
        }

        let max_steps = match self.max_steps {
            None => DEFAULT_MAX_STEPS,
            Some(n) if n >= 1 => u32::try_from(n).map_err(|_| {
                CoreError::InvalidConfig(format!("max_steps is too large: {}", n))
            })?,
            Some(n) => {
                return Err(CoreError::InvalidConfig(format!(
                    "max_steps must be a positive integer, got {}",
                    n
                )));
            }
        };

        let agent_type = non_blank("agent_type", self.agent_type, DEFAULT_AGENT_TYPE)?;
        let model = non_blank("model", self.model, DEFAULT_MODEL)?;

        Ok(AgentConfig {
            agent_type,
            model,
            temperature,
            max_steps,
            agent_kwargs: self.agent_kwargs,
        })
    }
}

fn non_blank(field: &str, value: Option<String>, default: &str) -> Result<String, CoreError> {
    match value {
        None => Ok(default.to_string()),
        Some(v) if v.trim().is_empty() => Err(CoreError::InvalidConfig(format!(
            "{} must not be empty",
            field
        ))),
        Some(v) => Ok(v),
    }
}
