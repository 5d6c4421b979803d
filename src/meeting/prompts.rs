//! Fixed prompt text for each kind of meeting.

use crate::registry::{MeetingKind, MeetingType};

pub const CONTEXT_HEADER: &str = "## Current Context";
pub const PRIOR_DISCUSSION_HEADER: &str = "## Prior Discussion in This Meeting";

pub fn standup() -> String {
    "Please provide your standup update in the following format:

**Done:** What you've completed recently
**Doing:** What you're currently working on
**Blocked:** Any blockers or issues (or \"None\" if no blockers)

Be specific and concise. Reference actual projects or initiatives where relevant."
        .to_string()
}

pub fn discussion(meeting_name: &str, topic: &str) -> String {
    format!(
        "We are having a {} to discuss:

**{}**

Please share your perspective on this topic from your role. Consider:
- Key points relevant to your expertise
- Potential concerns or risks
- Recommendations or suggestions
- Questions that need to be addressed

Be specific and actionable in your response.",
        meeting_name.to_lowercase(),
        topic
    )
}

pub fn idea_review(summary: &str, proposal: &str) -> String {
    format!(
        "We are reviewing a new idea/proposal for potential development.

**Idea Summary:**
{}

**Full Proposal:**
{}

Please evaluate this idea from your role's perspective. Consider:
- Feasibility and complexity in your area
- Potential risks and concerns
- Resource and timeline implications
- Key questions that need answers
- Your recommendation (proceed, modify, or pass)

Be specific and provide clear rationale for your assessment.",
        summary, proposal
    )
}

pub fn retrospective(project: &str) -> String {
    format!(
        "We are running a retrospective for the project: **{}**

Please reflect on this project from your role's perspective and share:

**What went well:**
- Things that worked effectively
- Successes worth celebrating

**What didn't go well:**
- Challenges and pain points
- Things that should have been done differently

**Lessons learned:**
- Key takeaways for future projects
- Process improvements to implement

**Action items:**
- Specific things to change going forward

Be honest and constructive. The goal is continuous improvement.",
        project
    )
}

pub fn synthesis(topic: &str) -> String {
    format!(
        "As the facilitator of this meeting, please synthesize the discussion.

**Meeting Topic:** {}

Please provide:

## Summary
A brief summary of the key points discussed.

## Decisions
List any decisions that were made or need to be made. Format as:
- **Decision:** [What was decided]
  - **Rationale:** [Why]
  - **Owner:** [Who is responsible]

## Action Items
List specific action items. Format as:
- [ ] @[Owner]: [Action item description]

## Next Steps
Any follow-up meetings or activities needed.

Be specific and ensure all action items have clear owners.",
        topic
    )
}

/// The turn prompt used when the caller does not supply one.
///
/// Idea reviews and retrospectives use the topic as the proposal summary and
/// project name; callers with a separate proposal body build the prompt with
/// [`idea_review`] themselves.
pub fn default_for(meeting_type: &MeetingType, topic: &str) -> String {
    match meeting_type.kind {
        MeetingKind::Standup => standup(),
        MeetingKind::Discussion => discussion(&meeting_type.name, topic),
        MeetingKind::IdeaReview => idea_review(topic, topic),
        MeetingKind::Retrospective => retrospective(topic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn test_discussion_lowercases_meeting_name() {
        let prompt = discussion("Strategy Session", "Pricing");
        assert!(prompt.starts_with("We are having a strategy session to discuss:\n\n**Pricing**"));
    }

    #[test]
    fn test_synthesis_asks_for_decision_format() {
        let prompt = synthesis("Pricing");
        assert!(prompt.contains("**Meeting Topic:** Pricing"));
        assert!(prompt.contains("- **Decision:** [What was decided]"));
        assert!(prompt.contains("## Action Items"));
    }

    #[test]
    fn test_default_prompt_follows_kind() {
        let registry = Registry::builtin();
        let standup_type = registry.meeting_type("standup").unwrap();
        let retro_type = registry.meeting_type("retro").unwrap();

        assert!(default_for(standup_type, "ignored").contains("**Done:**"));
        assert!(default_for(retro_type, "Atlas").contains("project: **Atlas**"));
    }
}
