//! Cost Calculator Tool
//!
//! Exact summation of daily costs, so the model never adds numbers itself.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use agent_core::{tool::parse_arguments, AgentError, ParameterSchema, Result as CoreResult, Tool, ToolSchema};

use crate::money::parse_amount;

pub const CALCULATOR_TOOL: &str = "calculator";

#[derive(Deserialize)]
struct CalculatorInput {
    #[serde(alias = "values")]
    daily_costs: Vec<Value>,
    operation: String,
}

/// Tool for summing trip costs
#[derive(Default)]
pub struct CostCalculatorTool;

impl CostCalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CostCalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: CALCULATOR_TOOL.into(),
            description: "Calculate travel costs. Returns the exact total of the given daily costs.".into(),
            parameters: vec![
                ParameterSchema::required("daily_costs", "array", "List of daily costs (numbers)"),
                ParameterSchema::required("operation", "string", "Operation to apply; only 'sum' is supported"),
            ],
            example: Some(r#"{"daily_costs": [1200, 850.5, 990], "operation": "sum"}"#.into()),
        }
    }

    async fn invoke(&self, arguments: &str) -> CoreResult<String> {
        let input: CalculatorInput = parse_arguments(CALCULATOR_TOOL, arguments)?;

        if !input.operation.trim().eq_ignore_ascii_case("sum") {
            return Err(AgentError::ToolValidation(format!(
                "Unsupported operation '{}'; only 'sum' is supported",
                input.operation
            )));
        }

        let mut total = Decimal::ZERO;
        for (index, value) in input.daily_costs.iter().enumerate() {
            let amount = parse_amount(value)
                .map_err(|e| AgentError::ToolValidation(format!("daily_costs[{}]: {}", index, e)))?;
            total = total
                .checked_add(amount)
                .ok_or_else(|| AgentError::ToolValidation("daily_costs sum overflows".into()))?;
        }

        Ok(total.normalize().to_string())
    }
}
