//! Planner Prompts

use std::fmt::Write;

use crate::model::PlanRequest;

/// System persona for the planning agent
pub const TRAVEL_PLANNER_PROMPT: &str = r#"You are a professional travel planner for trips within China.

## While planning

- Use `weather_service` to check the destination forecast before scheduling outdoor activities
- Use `train_ticket_search` to look up outbound and return trains, their times and fares
- Use `calculator` for every sum; never add costs by hand
- Account for travel time and ticket prices on the departure and return days

## Cost rules

1. Every activity has a concrete numeric `cost` (0 when free)
2. A day's `daily_cost` is the calculator sum of that day's activity costs, e.g.
   `{"daily_costs": [1947, 450, 0, 498], "operation": "sum"}` returns 2895
3. `total_cost` is the calculator sum of all `daily_cost` values, e.g.
   `{"daily_costs": [2895, 933], "operation": "sum"}` returns 3828

## Descriptions

Each activity description mentions the weather and gives advice that fits it:
leave early in the rain, enjoy outdoor sights when it is sunny, choose a warming
meal when it is cold.

## Output

When you are done, reply with the plan as a single JSON object and nothing else."#;

const PLAN_STRUCTURE: &str = r#"{
  "origin": "departure city",
  "destination": "destination city",
  "duration_days": 2,
  "budget": 3000,
  "total_cost": 0,
  "daily_plans": [
    {
      "date": "YYYY-MM-DD",
      "weather": "weather for the day",
      "activities": [
        {
          "time": "HH:MM",
          "category": "attraction | dining | transport | lodging",
          "name": "activity name",
          "description": "what happens, with weather-aware advice",
          "weather_note": "short weather reminder",
          "cost": 0
        }
      ],
      "daily_cost": 0
    }
  ],
  "style_tags": ["travel style", "accommodation level"],
  "summary": "catchy social-media style summary: title, 3-5 emoji highlights, practical tips, who the trip suits"
}"#;

/// User message describing one planning request
pub fn build_request_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::from("Create a travel plan for the following trip.\n\n");

    let _ = writeln!(prompt, "- Origin: {}", request.origin.trim());
    let _ = writeln!(prompt, "- Destination: {}", request.destination.trim());
    let _ = writeln!(
        prompt,
        "- Dates: {} to {} ({} days)",
        request.start_date,
        request.end_date,
        request.day_count()
    );
    let _ = writeln!(prompt, "- Travelers: {}", request.travelers);
    let _ = writeln!(prompt, "- Total budget: {} CNY", request.budget.normalize());
    let _ = writeln!(prompt, "- Travel style: {}", request.travel_style());
    let _ = writeln!(prompt, "- Accommodation: {}", request.accommodation_level());

    prompt.push_str("\nCheck the weather first, then plan around it. ");
    prompt.push_str("Return only a JSON object with this structure:\n\n");
    prompt.push_str(PLAN_STRUCTURE);
    prompt
}
