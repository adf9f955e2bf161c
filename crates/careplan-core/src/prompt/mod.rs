//! Prompt construction for the planning agent.
//!
//! Builds the persona (role, rules, backstory) and the goal-specific task
//! description that are sent to the model. This module is pure string
//! templating: no I/O and no failure path.

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the agent needs to produce a plan for one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    /// Short role title for the agent.
    pub role: String,
    /// Standing instructions: the rules the agent must follow.
    pub agent_goal: String,
    /// Persona background that shapes the style of the plan.
    pub backstory: String,
    /// The goal-specific task description.
    pub description: String,
    /// Hint describing the shape of the expected answer.
    pub expected_output: String,
}

impl PromptSpec {
    /// Text for the system message: role, rules and backstory.
    pub fn system_message(&self) -> String {
        format!(
            "You are {role}.\n\n{goal}\n\n{backstory}",
            role = self.role,
            goal = self.agent_goal,
            backstory = self.backstory,
        )
    }

    /// Text for the user message: the task plus the expected-output hint.
    pub fn user_message(&self) -> String {
        format!(
            "{description}\n\nExpected output: {expected}",
            description = self.description,
            expected = self.expected_output,
        )
    }
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Role title of the planning agent.
pub const AGENT_ROLE: &str = "Clinical Healthcare Planner Agent";

/// Expected-output hint passed alongside every task.
pub const EXPECTED_OUTPUT: &str = "A disease-specific clinical execution plan";

const AGENT_GOAL: &str = r#"You are a clinical planning assistant.

IMPORTANT RULES:
1. Always focus ONLY on the user's given healthcare goal.
2. Never change the disease or condition.
3. Never introduce unrelated illnesses.
4. Base every step strictly on the input goal.

Your task is to:
- Analyze the given condition.
- Break it into medical steps.
- Include diagnosis, treatment, monitoring, and follow-up.
- Identify dependencies.
- Create a timeline."#;

const AGENT_BACKSTORY: &str = "You are an expert healthcare operations planner. \
You decompose high-level medical goals into dependent tasks. \
For each step, mention which previous step it depends on. \
You generate optimized healthcare schedules.";

/// Aspects every generated plan must cover.
const PLAN_ASPECTS: &[&str] = &[
    "Symptoms assessment",
    "Diagnosis",
    "Treatment",
    "Medication",
    "Monitoring",
    "Follow-up",
];

/// Number of `Step N:` placeholders shown in the output format.
const FORMAT_STEPS: usize = 5;

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build the prompt for a goal.
///
/// The goal is embedded verbatim twice: once as the stated target and once
/// in the closing instruction. The repetition keeps the model anchored on
/// the requested condition.
pub fn build_prompt(goal: &str) -> PromptSpec {
    PromptSpec {
        role: AGENT_ROLE.to_string(),
        agent_goal: AGENT_GOAL.to_string(),
        backstory: AGENT_BACKSTORY.to_string(),
        description: build_description(goal),
        expected_output: EXPECTED_OUTPUT.to_string(),
    }
}

fn build_description(goal: &str) -> String {
    let mut description = String::with_capacity(1024);

    description.push_str("You are given this healthcare goal:\n\n");
    description.push_str(&format!("\"{goal}\"\n\n"));

    description.push_str("Your job is to:\n\n");
    description.push_str("1. First identify the main medical condition from the goal.\n");
    description.push_str("2. Focus ONLY on that condition.\n");
    description.push_str("3. Generate a clinical plan specific to it.\n");
    description.push_str("4. Include:\n");
    for aspect in PLAN_ASPECTS {
        description.push_str(&format!("   - {aspect}\n"));
    }
    description.push_str("5. Avoid generic healthcare workflows.\n");
    description.push_str("6. Do NOT include unrelated diseases.\n\n");

    description.push_str("Output format:\n\n");
    for n in 1..=FORMAT_STEPS {
        description.push_str(&format!("Step {n}: ...\n"));
    }
    description.push('\n');

    description.push_str(&format!("Make sure every step relates to \"{goal}\"."));

    description
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_appears_at_least_twice() {
        let goal = "hypertension management plan";
        let spec = build_prompt(goal);
        assert!(
            spec.description.matches(goal).count() >= 2,
            "goal should be repeated, got: {}",
            spec.description
        );
    }

    #[test]
    fn description_opens_and_closes_with_goal() {
        let spec = build_prompt("type 2 diabetes");
        assert!(spec.description.contains("this healthcare goal:\n\n\"type 2 diabetes\""));
        assert!(
            spec.description
                .ends_with("Make sure every step relates to \"type 2 diabetes\".")
        );
    }

    #[test]
    fn description_requests_step_format() {
        let spec = build_prompt("asthma");
        for n in 1..=5 {
            assert!(spec.description.contains(&format!("Step {n}: ...")));
        }
        assert!(!spec.description.contains("Step 6:"));
    }

    #[test]
    fn description_lists_plan_aspects() {
        let spec = build_prompt("asthma");
        for aspect in PLAN_ASPECTS {
            assert!(spec.description.contains(aspect), "missing aspect {aspect}");
        }
    }

    #[test]
    fn persona_constants() {
        let spec = build_prompt("asthma");
        assert_eq!(spec.role, "Clinical Healthcare Planner Agent");
        assert_eq!(
            spec.expected_output,
            "A disease-specific clinical execution plan"
        );
        assert!(spec.agent_goal.contains("IMPORTANT RULES"));
        assert!(spec.backstory.contains("depends on"));
    }

    #[test]
    fn goal_is_embedded_verbatim() {
        let goal = "  Post-op *knee* rehab: 6 weeks  ";
        let spec = build_prompt(goal);
        assert_eq!(spec.description.matches(goal).count(), 2);
    }

    #[test]
    fn messages_split_persona_and_task() {
        let spec = build_prompt("migraine");
        let system = spec.system_message();
        let user = spec.user_message();

        assert!(system.starts_with("You are Clinical Healthcare Planner Agent."));
        assert!(system.contains("Never introduce unrelated illnesses"));
        assert!(!system.contains("migraine"));

        assert!(user.contains("\"migraine\""));
        assert!(user.ends_with("Expected output: A disease-specific clinical execution plan"));
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(build_prompt("copd"), build_prompt("copd"));
    }
}
