//! Agent descriptors for the adventure game.
//!
//! Each agent is a passive (name, instructions, tools, handoffs) descriptor
//! consumed by the runner. The set is built once at startup and shared
//! read-only across every turn; routing between them is decided by the model,
//! not by any keyword matching in this crate.

use std::sync::Arc;

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde_json::json;

use crate::tools::ToolKind;

pub const NARRATOR_INSTRUCTIONS: &str = r#"
You are the main narrator of a fantasy adventure game.
Guide the player through a story using rich descriptions.
Always ask what they'd like to do next.
"#;

pub const MONSTER_INSTRUCTIONS: &str = r#"
You control monster encounters during combat.
Ask the player to choose an action (attack, defend, run).
Roll a 20-sided dice to determine the outcome.
Describe the result using the dice roll.
"#;

pub const ITEM_INSTRUCTIONS: &str = r#"
You manage item discovery and rewards.
When the player explores a forest, dungeon, or village,
use the event generator tool to describe what they find.
"#;

pub const TRIAGE_INSTRUCTIONS: &str = r#"
You are the adventure game master.
Based on the player's message, decide which expert to hand off to:

- If the player mentions monsters, battle, attack, or combat → hand off to MonsterAgent
- If they mention chests, loot, items, or rewards → hand off to ItemAgent
- Otherwise, continue the main narration yourself

Always briefly explain any handoff before routing the message.
"#;

/// A named persona: instruction text, owned tools and handoff targets.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: &'static str,
    pub instructions: &'static str,
    pub tools: Vec<ToolKind>,
    pub handoffs: Vec<Arc<Agent>>,
}

impl Agent {
    /// The pseudo-tool name under which this agent is advertised as a
    /// handoff target.
    pub fn transfer_tool_name(&self) -> String {
        format!("transfer_to_{}", self.name)
    }

    pub fn find_tool(&self, name: &str) -> Option<ToolKind> {
        self.tools.iter().copied().find(|t| t.name() == name)
    }

    /// Resolve a tool-call name against this agent's handoff targets.
    pub fn find_handoff(&self, tool_name: &str) -> Option<&Arc<Agent>> {
        self.handoffs
            .iter()
            .find(|h| h.transfer_tool_name() == tool_name)
    }

    /// Everything advertised to the model while this agent is active: its
    /// own tools, plus one transfer pseudo-tool per handoff target.
    pub fn declarations(&self) -> Vec<ChatCompletionTool> {
        let mut tools: Vec<ChatCompletionTool> =
            self.tools.iter().map(ToolKind::declaration).collect();
        tools.extend(self.handoffs.iter().map(|h| transfer_declaration(h)));
        tools
    }
}

/// Declaration for the transfer pseudo-tool of a handoff target. The runner
/// intercepts calls to it; it is never executed as a real tool.
fn transfer_declaration(target: &Agent) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: target.transfer_tool_name(),
            description: Some(format!(
                "Hand the conversation off to {} for the rest of this turn.",
                target.name
            )),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Brief reason for the handoff."
                    }
                },
                "required": []
            })),
            strict: None,
        },
    }
}

/// The full cast, with the triage agent as the per-turn entry point.
#[derive(Debug, Clone)]
pub struct Roster {
    pub narrator: Arc<Agent>,
    pub monster: Arc<Agent>,
    pub item: Arc<Agent>,
    pub triage: Arc<Agent>,
}

/// Build the game's agents. Called once at startup; the descriptors are
/// immutable afterwards.
pub fn roster() -> Roster {
    let narrator = Arc::new(Agent {
        name: "NarratorAgent",
        instructions: NARRATOR_INSTRUCTIONS,
        tools: Vec::new(),
        handoffs: Vec::new(),
    });

    let monster = Arc::new(Agent {
        name: "MonsterAgent",
        instructions: MONSTER_INSTRUCTIONS,
        tools: vec![ToolKind::RollDice],
        handoffs: Vec::new(),
    });

    let item = Arc::new(Agent {
        name: "ItemAgent",
        instructions: ITEM_INSTRUCTIONS,
        tools: vec![ToolKind::GenerateEvent],
        handoffs: Vec::new(),
    });

    let triage = Arc::new(Agent {
        name: "GameTriageAgent",
        instructions: TRIAGE_INSTRUCTIONS,
        tools: Vec::new(),
        handoffs: vec![Arc::clone(&monster), Arc::clone(&item)],
    });

    Roster {
        narrator,
        monster,
        item,
        triage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_hands_off_to_both_specialists() {
        let roster = roster();
        assert_eq!(roster.triage.handoffs.len(), 2);
        assert!(roster.triage.tools.is_empty());
        assert!(
            roster
                .triage
                .find_handoff("transfer_to_MonsterAgent")
                .is_some()
        );
        assert!(
            roster
                .triage
                .find_handoff("transfer_to_ItemAgent")
                .is_some()
        );
        assert!(
            roster
                .triage
                .find_handoff("transfer_to_NarratorAgent")
                .is_none()
        );
    }

    #[test]
    fn specialists_own_their_tools() {
        let roster = roster();
        assert_eq!(roster.monster.tools, vec![ToolKind::RollDice]);
        assert_eq!(roster.item.tools, vec![ToolKind::GenerateEvent]);
        assert!(roster.narrator.tools.is_empty());
        assert!(roster.monster.find_tool("roll_dice").is_some());
        assert!(roster.monster.find_tool("generate_event").is_none());
    }

    #[test]
    fn triage_advertises_only_transfer_tools() {
        let roster = roster();
        let names: Vec<String> = roster
            .triage
            .declarations()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(
            names,
            vec!["transfer_to_MonsterAgent", "transfer_to_ItemAgent"]
        );
    }

    #[test]
    fn monster_advertises_its_dice() {
        let roster = roster();
        let names: Vec<String> = roster
            .monster
            .declarations()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(names, vec!["roll_dice"]);
    }
}
