use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::Chart;
use super::chart_state::ChartState;

pub const CHART_STATE_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStateJsonContractV1 {
    pub schema_version: u32,
    pub state: ChartState,
}

impl ChartState {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart state: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartStateJsonContractV1 {
            schema_version: CHART_STATE_JSON_SCHEMA_V1,
            state: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart state contract v1: {e}"))
        })
    }

    /// Accepts the bare state as well as the versioned contract.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(state) = serde_json::from_str::<ChartState>(input) {
            return Ok(state);
        }
        let payload: ChartStateJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart state json payload: {e}"))
        })?;
        if payload.schema_version != CHART_STATE_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported chart state schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.state)
    }
}

impl<R: Renderer> Chart<R> {
    pub fn state_json_contract_v1_pretty(&self) -> ChartResult<String> {
        self.save_state()?.to_json_contract_v1_pretty()
    }

    pub fn load_state_json(&mut self, input: &str) -> ChartResult<()> {
        let state = ChartState::from_json_compat_str(input)?;
        self.load_state(&state)
    }
}
