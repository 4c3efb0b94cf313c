//! Plan Synthesis Pipeline
//!
//! ```text
//! PlanRequest ─▶ Agent (gateway + tools) ─▶ free text
//!             ─▶ ResponseExtractor ─▶ raw document ─▶ finalize ─▶ Plan
//! ```

use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, ChatGateway, ToolRegistry};

use crate::aggregate::finalize;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::extract::ResponseExtractor;
use crate::model::{Plan, PlanRequest};
use crate::prompt::{build_request_prompt, TRAVEL_PLANNER_PROMPT};

/// Turns planning requests into validated plans
pub struct TravelPlanner {
    agent: Agent,
    extractor: ResponseExtractor,
}

impl TravelPlanner {
    pub fn new(gateway: Arc<ChatGateway>, tools: ToolRegistry, config: &PlannerConfig) -> Result<Self> {
        let agent = AgentBuilder::new()
            .gateway(gateway)
            .tools(tools)
            .system_prompt(TRAVEL_PLANNER_PROMPT)
            .max_iterations(config.max_iterations)
            .tool_timeout(config.tool_timeout)
            .build()?;

        Ok(Self {
            agent,
            extractor: ResponseExtractor::default(),
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Run one synthesis. Fails only with an extraction or schema error.
    pub async fn plan(&self, request: &PlanRequest) -> Result<Plan> {
        let outcome = self.agent.ask(&build_request_prompt(request)).await;

        if !outcome.is_done() {
            tracing::warn!(
                iterations = outcome.iterations,
                "Planning loop hit its ceiling; using best partial answer"
            );
        }
        tracing::debug!(answer = %outcome.answer, "Raw planner answer");

        let (raw, strategy) = self.extractor.extract_with_strategy(&outcome.answer)?;
        let mut plan = finalize(&raw, request.budget)?;
        fill_from_request(&mut plan, request);

        tracing::info!(
            origin = %plan.origin,
            destination = %plan.destination,
            days = plan.daily_plans.len(),
            total_cost = %plan.total_cost,
            budget = %plan.budget,
            tool_calls = outcome.invocations.len(),
            strategy = strategy.name(),
            "Travel plan synthesized"
        );
        if plan.is_over_budget() {
            tracing::warn!(
                overrun = ?plan.remaining_budget().map(|left| -left),
                "Plan exceeds the requested budget"
            );
        }

        Ok(plan)
    }
}

/// Fill descriptive fields the model left blank
fn fill_from_request(plan: &mut Plan, request: &PlanRequest) {
    if plan.origin.is_empty() {
        plan.origin = request.origin.trim().to_string();
    }
    if plan.destination.is_empty() {
        plan.destination = request.destination.trim().to_string();
    }
    if plan.style_tags.is_empty() {
        plan.style_tags = vec![
            request.travel_style().to_string(),
            request.accommodation_level().to_string(),
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use agent_core::mock::{MockProvider, MockReply};
    use agent_core::{GatewayConfig, ProviderKind, ProviderProfile};
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::error::PlannerError;
    use crate::svckit::travel_tools;
    use crate::train::StaticTrainService;
    use crate::weather::StaticWeatherService;

    fn request() -> PlanRequest {
        serde_json::from_value(json!({
            "origin": "Hangzhou",
            "destination": "Beijing",
            "start_date": "2025-03-01",
            "end_date": "2025-03-02",
            "travelers": 1,
            "budget": 3000
        }))
        .unwrap()
    }

    fn profile(name: &str, priority: u32) -> ProviderProfile {
        ProviderProfile::new(name, ProviderKind::OpenAiCompatible, "http://mock", "mock-model", priority)
    }

    fn planner(providers: Vec<Arc<MockProvider>>, max_iterations: usize) -> TravelPlanner {
        let mut gateway = ChatGateway::new(GatewayConfig {
            attempt_timeout: Duration::from_millis(50),
        });
        for (priority, provider) in providers.into_iter().enumerate() {
            let name = format!("mock-{}", priority);
            gateway.add_provider(profile(&name, u32::try_from(priority).unwrap()), provider);
        }

        let tools = travel_tools(
            Arc::new(StaticWeatherService::new().with_city("Beijing", "2025-03-01: sunny, 2-12°C")),
            Arc::new(StaticTrainService::new()),
        );
        let config = PlannerConfig {
            max_iterations,
            tool_timeout: Duration::from_millis(200),
            ..PlannerConfig::default()
        };
        TravelPlanner::new(Arc::new(gateway), tools, &config).unwrap()
    }

    fn beijing_answer() -> String {
        let document = json!({
            "origin": "Hangzhou",
            "destination": "Beijing",
            "duration_days": 2,
            "budget": 50000,
            "total_cost": 9999,
            "daily_plans": [
                {
                    "date": "2025-03-01",
                    "weather": "sunny",
                    "daily_cost": 100,
                    "activities": [
                        {"time": "08:00", "category": "transport", "name": "G20 to Beijing", "cost": 1947},
                        {"time": "12:00", "category": "dining", "name": "Roast duck", "cost": 450},
                        {"time": "15:00", "category": "attraction", "name": "Tiananmen Square", "cost": 0},
                        {"time": "21:00", "category": "lodging", "name": "Hotel", "cost": 498}
                    ]
                },
                {
                    "date": "2025-03-02",
                    "weather": "sunny",
                    "activities": [
                        {"time": "09:00", "category": "attraction", "name": "Forbidden City", "cost": 200},
                        {"time": "16:00", "category": "transport", "name": "Return train", "cost": 733}
                    ]
                }
            ],
            "summary": "Beijing in two days"
        });
        format!("Here is your itinerary:\n```json\n{:#}\n```\nHave a great trip!", document)
    }

    #[tokio::test]
    async fn test_hangzhou_to_beijing() {
        let provider = Arc::new(
            MockProvider::new("primary")
                .reply("```tool\n{\"tool\": \"weather_service\", \"arguments\": {\"city\": \"Beijing\", \"days\": 2}}\n```")
                .reply("```tool\n{\"tool\": \"calculator\", \"arguments\": {\"daily_costs\": [1947, 450, 0, 498], \"operation\": \"sum\"}}\n```")
                .reply(beijing_answer()),
        );

        let plan = planner(vec![provider.clone()], 10).plan(&request()).await.unwrap();

        assert_eq!(plan.daily_plans[0].daily_cost, dec!(2895));
        assert_eq!(plan.daily_plans[1].daily_cost, dec!(933));
        assert_eq!(plan.total_cost, dec!(3828));
        assert_eq!(plan.budget, dec!(3000));
        assert!(plan.is_consistent());
        assert!(plan.is_over_budget());
        assert_eq!(plan.remaining_budget(), Some(dec!(-828)));
        assert_eq!(plan.style_tags, vec!["leisure", "guesthouse"]);

        assert_eq!(provider.calls(), 3);
        let seen = provider.seen_messages().await;
        assert!(seen[1].iter().any(|m| m.contains("2025-03-01: sunny, 2-12°C")));
        assert!(seen[2].iter().any(|m| m.contains("2895")));
    }

    #[tokio::test]
    async fn test_secondary_provider_answers_after_timeout() {
        let primary = Arc::new(MockProvider::new("primary").always(MockReply::Hang));
        let secondary = Arc::new(MockProvider::new("secondary").reply(beijing_answer()));

        let plan = planner(vec![primary, secondary.clone()], 10)
            .plan(&request())
            .await
            .unwrap();

        assert_eq!(plan.total_cost, dec!(3828));
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_providers_time_out() {
        let primary = Arc::new(MockProvider::new("primary").always(MockReply::Hang));
        let secondary = Arc::new(MockProvider::new("secondary").always(MockReply::Hang));

        let err = planner(vec![primary, secondary], 10)
            .plan(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Extraction(_)));
        assert!(err.is_synthesis_failure());
    }

    #[tokio::test]
    async fn test_schema_error_is_terminal() {
        let provider = Arc::new(MockProvider::new("primary").reply(
            r#"{"daily_plans": [{"activities": [{"category": "dining", "name": "Lunch", "cost": "a lot"}]}]}"#,
        ));

        let err = planner(vec![provider], 10).plan(&request()).await.unwrap_err();
        match err {
            PlannerError::Schema { ref path, .. } => {
                assert_eq!(path, "daily_plans[0].activities[0].cost");
            }
            ref other => panic!("expected schema error, got {:?}", other),
        }
        assert!(err.is_synthesis_failure());
    }

    #[tokio::test]
    async fn test_iteration_ceiling_bounds_provider_calls() {
        let directive = "```tool\n{\"tool\": \"calculator\", \"arguments\": {\"daily_costs\": [1], \"operation\": \"sum\"}}\n```";
        let provider = Arc::new(MockProvider::new("primary").always(MockReply::Text(directive.into())));

        let err = planner(vec![provider.clone()], 3).plan(&request()).await.unwrap_err();

        assert_eq!(provider.calls(), 3);
        assert!(err.is_synthesis_failure());
    }
}
