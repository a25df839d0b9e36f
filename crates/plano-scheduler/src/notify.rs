//! Canned texts and per-user message decisions for the timed jobs.

use plano_core::time::truncate_chars;
use plano_core::types::{Plan, UserProfile};

/// Max characters of error detail carried in a keep-alive alert.
const ALERT_DETAIL_MAX: usize = 200;

pub const WEEKLY_NO_PLANS: &str = "📅 **New Week Plan**

Good Sunday morning! 🌅

You have no plans for this week yet. Send me a goal and I'll help you build a plan!

For example:
- \"I want to learn Python basics\"
- \"Help me exercise regularly\"
- \"Improve my communication skills\"

Start the new week with a clear goal! 💪";

pub const MORNING_NO_PLANS: &str = "☀️ **Good Morning!**

You have no plans yet. Start your day by setting a goal!

Send me one and I'll help you build a plan. 💪";

pub const ALL_OPERATIONAL: &str = "🔄 **Systems Check**

✅ Database: connected
✅ Vector store: connected
✅ Gemini API: active

All services are running normally! 💚";

/// Weekly digest body: pending goals if any, otherwise the nudge to plan.
pub fn weekly_message(plans: &[Plan]) -> String {
    if plans.is_empty() {
        return WEEKLY_NO_PLANS.to_string();
    }

    let mut out = String::from("📋 **This Week's Plans:**\n\n");
    for (i, plan) in plans.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, plan.goal));
    }
    out.push_str("\n💡 **Tips:**\n");
    out.push_str("• Break goals into small steps\n");
    out.push_str("• Work on them a little every day\n");
    out.push_str("• Track progress and adjust early\n\n");
    out.push_str("Have a successful week! 🚀");
    out
}

/// Greeting keyed by the local hour, generic fallback for unmapped hours.
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        6 => "☀️ **Good Morning!**",
        12 => "🌤️ **Lunch Break!**",
        18 => "🌆 **Good Evening!**",
        21 => "🌙 **Good Night!**",
        _ => "⏰ **Reminder**",
    }
}

/// Decide the daily-reminder message for one user.
///
/// With no active plans, only the 6 o'clock run prompts the user to start the
/// day; every other hour stays silent. This asymmetry is deliberate.
pub fn daily_message(hour: u32, plans: &[Plan]) -> Option<String> {
    if plans.is_empty() {
        if hour == 6 {
            return Some(MORNING_NO_PLANS.to_string());
        }
        return None;
    }

    let mut out = String::from(greeting_for_hour(hour));
    out.push_str("\n\n📋 **Today's Goals:**\n\n");
    for (i, plan) in plans.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, plan.goal));
    }
    out.push_str("\n💪 Keep going!");
    Some(out)
}

/// Whether this run's hour is one of the user's reminder slots.
pub fn should_remind(profile: &UserProfile, hour: u32) -> bool {
    let slot = format!("{hour:02}:00");
    profile.reminder_slots().iter().any(|s| s == &slot)
}

/// Alert body for a failed keep-alive probe, detail capped at 200 chars.
pub fn keepalive_alert(detail: &str) -> String {
    format!(
        "⚠️ **Keep-Alive Error**

A backend probe failed:
{}

Please check the system!",
        truncate_chars(detail, ALERT_DETAIL_MAX)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(goal: &str) -> Plan {
        Plan {
            id: "p".to_string(),
            chat_id: "123".to_string(),
            goal: goal.to_string(),
            status: "approved".to_string(),
            created_at: 0,
        }
    }

    fn profile(reminder_times: Option<Vec<&str>>) -> UserProfile {
        UserProfile {
            chat_id: "123".to_string(),
            reminder_times: reminder_times
                .map(|v| v.into_iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn weekly_with_no_plans_is_the_nudge() {
        assert_eq!(weekly_message(&[]), WEEKLY_NO_PLANS);
    }

    #[test]
    fn weekly_lists_goals_in_order() {
        let out = weekly_message(&[plan("read a book"), plan("run 5k")]);
        assert!(out.contains("1. read a book\n"));
        assert!(out.contains("2. run 5k\n"));
        assert!(out.contains("💡 **Tips:**"));
    }

    #[test]
    fn no_plans_at_six_prompts_the_user() {
        assert_eq!(daily_message(6, &[]), Some(MORNING_NO_PLANS.to_string()));
    }

    #[test]
    fn no_plans_at_other_hours_stays_silent() {
        assert_eq!(daily_message(12, &[]), None);
        assert_eq!(daily_message(18, &[]), None);
        assert_eq!(daily_message(21, &[]), None);
    }

    #[test]
    fn reminder_with_plans_uses_hour_greeting() {
        let out = daily_message(12, &[plan("run 5k")]).unwrap();
        assert!(out.starts_with("🌤️ **Lunch Break!**"));
        assert!(out.contains("1. run 5k\n"));
        assert!(out.ends_with("💪 Keep going!"));
    }

    #[test]
    fn unmapped_hour_gets_generic_greeting() {
        let out = daily_message(9, &[plan("run 5k")]).unwrap();
        assert!(out.starts_with("⏰ **Reminder**"));
    }

    #[test]
    fn default_slots_match_the_canonical_hours() {
        let user = profile(None);
        assert!(should_remind(&user, 6));
        assert!(should_remind(&user, 12));
        assert!(should_remind(&user, 18));
        assert!(should_remind(&user, 21));
        assert!(!should_remind(&user, 9));
    }

    #[test]
    fn custom_slots_override_the_defaults() {
        let user = profile(Some(vec!["09:00"]));
        assert!(should_remind(&user, 9));
        assert!(!should_remind(&user, 6));
    }

    #[test]
    fn alert_detail_is_capped_at_200_chars() {
        let detail = "x".repeat(500);
        let alert = keepalive_alert(&detail);
        assert!(alert.contains(&"x".repeat(200)));
        assert!(!alert.contains(&"x".repeat(201)));
    }
}
