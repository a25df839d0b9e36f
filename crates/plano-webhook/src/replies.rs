//! Canned texts and renderers for the message router. Everything user-facing
//! that the webhook path can say lives here.

use plano_core::time::format_local_date;
use plano_core::types::{DocumentMatch, Plan};

pub const ONBOARDING: &str = "👋 **Hello! I'm your planning assistant!**

I can help you:
✅ Build your weekly plan
✅ Remind you of daily goals
✅ Search your saved notes
✅ Track your progress

**How to use:**
Send me a goal, for example:
\"I want to learn Python in 2 weeks\"

Or use the commands:
/help - detailed guide
/plan - see your current plans";

pub const HELP: &str = "📖 **How To Use**

**1️⃣ Create a plan:**
Send me a goal, for example:
- \"I want to learn Python in 2 weeks\"
- \"Help me exercise regularly\"

**2️⃣ Search your notes:**
Ask about any topic and I'll look through your saved notes.

**3️⃣ Review plans:**
Type /plan to see your current plans

**4️⃣ Automation:**
- New weekly plan: Sunday 9am
- Daily reminders: 4 times (6am, 12pm, 6pm, 9pm)
- Backends are kept warm automatically

Start by sending me a goal! 🚀";

pub const UNKNOWN_COMMAND: &str = "❓ **Unknown command**

Available commands:
/start - get started
/help - how to use
/plan - see your plans

Or just send me a regular message to chat!";

pub const PLAN_EMPTY: &str = "📋 **You have no plans yet**

Send me a goal and I'll build a plan for it!

For example:
- \"I want to learn programming\"
- \"Help me lose weight in a month\"
- \"How do I improve my English?\"";

pub const PLAN_FETCH_ERROR: &str =
    "Sorry, something went wrong while fetching your plans. Please try again.";

pub const APOLOGY: &str =
    "Sorry, I'm having technical trouble right now. Please try again later.";

/// Recognized slash commands. Anything else starting with `/` is Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Plan,
    Unknown,
}

impl Command {
    /// Parse a command from message text. Returns None for non-command text.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            return None;
        }
        Some(match trimmed {
            "/start" => Self::Start,
            "/help" => Self::Help,
            "/plan" => Self::Plan,
            _ => Self::Unknown,
        })
    }
}

/// Render the `/plan` listing: numbered, status glyph, localized date.
pub fn render_plan_list(plans: &[Plan], tz_offset: i32) -> String {
    let mut out = String::from("📋 **Your Plans:**\n\n");
    for (i, plan) in plans.iter().enumerate() {
        let glyph = if plan.is_completed() { "✅" } else { "🔄" };
        let date = format_local_date(plan.created_at, tz_offset);
        out.push_str(&format!("{glyph} **{}. {}**\n", i + 1, plan.goal));
        out.push_str(&format!("   📅 {date} | Status: {}\n\n", plan.status));
    }
    out
}

/// Join retrieved snippets into the prompt context block. Empty input
/// produces an empty string, never a placeholder.
pub fn build_context(matches: &[DocumentMatch]) -> String {
    matches
        .iter()
        .map(|doc| format!("- {}", doc.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the generation prompt from the user message and note context.
/// The context section is always present, even when empty.
pub fn build_prompt(user_message: &str, context: &str) -> String {
    format!(
        "You are a planning assistant that helps the user with their goals and plans.

Context from saved notes:
{context}

User message: {user_message}

Reply concisely and helpfully. If the user states a goal:
1. Confirm the goal
2. Suggest concrete steps
3. Encourage them"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(goal: &str, status: &str, created_at: i64) -> Plan {
        Plan {
            id: "p1".to_string(),
            chat_id: "123".to_string(),
            goal: goal.to_string(),
            status: status.to_string(),
            created_at,
        }
    }

    #[test]
    fn parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/plan"), Some(Command::Plan));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(Command::parse("/frobnicate"), Some(Command::Unknown));
        assert_eq!(Command::parse("/plans"), Some(Command::Unknown));
    }

    #[test]
    fn parse_free_text_is_none() {
        assert_eq!(Command::parse("I want to learn Rust"), None);
        assert_eq!(Command::parse("what about /plan?"), None);
    }

    #[test]
    fn plan_list_numbers_and_glyphs() {
        let plans = vec![
            plan("learn Rust", "completed", 86400),
            plan("run 5k", "approved", 86400 * 2),
        ];
        let out = render_plan_list(&plans, 0);
        assert!(out.contains("✅ **1. learn Rust**"));
        assert!(out.contains("🔄 **2. run 5k**"));
        assert!(out.contains("02/01/1970"));
        assert!(out.contains("Status: approved"));
    }

    #[test]
    fn context_from_no_matches_is_empty_string() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn context_uses_list_markers() {
        let matches = vec![
            DocumentMatch {
                content: "first note".to_string(),
                similarity: 0.9,
            },
            DocumentMatch {
                content: "second note".to_string(),
                similarity: 0.5,
            },
        ];
        assert_eq!(build_context(&matches), "- first note\n\n- second note");
    }

    #[test]
    fn prompt_always_carries_context_section() {
        let prompt = build_prompt("hello", "");
        assert!(prompt.contains("Context from saved notes:\n\n"));
        assert!(prompt.contains("User message: hello"));
    }
}
