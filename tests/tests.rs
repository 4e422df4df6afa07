use questweaver::*;

use questweaver::error::ERROR_PREFIX;
use questweaver::tools::{
    DEFAULT_DICE_SIDES, FALLBACK_EVENT, events_for_context, generate_event, roll_dice,
};

#[test]
fn test_dice_rolls_stay_in_range() {
    for _ in 0..200 {
        let roll = roll_dice(DEFAULT_DICE_SIDES);
        assert!((1..=DEFAULT_DICE_SIDES).contains(&roll));
    }
    for _ in 0..50 {
        assert_eq!(roll_dice(1), 1);
    }
}

#[test]
fn test_events_come_from_the_matching_table() {
    for context in ["forest", "dungeon", "village", "Forest", "DUNGEON"] {
        let table = events_for_context(context).expect("known context");
        let event = generate_event(context);
        assert!(table.contains(&event.as_str()), "unexpected event: {event}");
    }
}

#[test]
fn test_unknown_context_falls_back() {
    assert_eq!(generate_event("swamp"), FALLBACK_EVENT);
    assert_eq!(generate_event(""), FALLBACK_EVENT);
}

#[test]
fn test_triage_routes_to_both_specialists() {
    let roster = roster();

    let monster_transfer = roster.monster.transfer_tool_name();
    let item_transfer = roster.item.transfer_tool_name();
    assert_eq!(monster_transfer, "transfer_to_MonsterAgent");
    assert_eq!(item_transfer, "transfer_to_ItemAgent");

    assert!(roster.triage.find_handoff(&monster_transfer).is_some());
    assert!(roster.triage.find_handoff(&item_transfer).is_some());
    assert!(
        roster
            .triage
            .find_handoff(&roster.narrator.transfer_tool_name())
            .is_none()
    );
}

#[test]
fn test_specialists_own_their_single_tool() {
    let roster = roster();

    assert!(roster.monster.find_tool("roll_dice").is_some());
    assert!(roster.monster.find_tool("generate_event").is_none());
    assert!(roster.item.find_tool("generate_event").is_some());
    assert!(roster.item.find_tool("roll_dice").is_none());
    assert!(roster.narrator.find_tool("roll_dice").is_none());
    assert!(roster.triage.find_tool("roll_dice").is_none());
}

#[test]
fn test_tool_declarations_carry_valid_schemas() {
    let roster = roster();

    for agent in [&roster.monster, &roster.item, &roster.triage] {
        for declaration in agent.declarations() {
            assert!(!declaration.function.name.is_empty());
            let parameters = declaration
                .function
                .parameters
                .as_ref()
                .expect("schema present");
            assert_eq!(parameters["type"], "object");
        }
    }
}

#[test]
fn test_session_history_alternates_over_turns() {
    let mut session = Session::new();

    for turn in 0..5 {
        session.push_user(format!("action {turn}"));
        session.push_assistant(format!("narration {turn}"));
    }

    assert_eq!(session.len(), 10);
    for (i, message) in session.history().iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(message.role, expected);
    }
    assert_eq!(session.history()[0].content, "action 0");
    assert_eq!(session.history()[9].content, "narration 4");
}

#[test]
fn test_user_visible_errors_keep_the_prefix() {
    let rendered = error::user_visible_error("model unavailable");
    assert_eq!(rendered, format!("{ERROR_PREFIX}model unavailable"));
}

#[test]
fn test_config_requires_an_api_key() {
    // This is the only test touching these variables, so no cross-test races.
    unsafe {
        std::env::remove_var(config::API_KEY_VAR);
    }
    assert!(matches!(
        GameConfig::from_env(),
        Err(AppError::MissingApiKey)
    ));

    unsafe {
        std::env::set_var(config::API_KEY_VAR, "integration-test-key");
        std::env::remove_var(config::API_BASE_VAR);
        std::env::remove_var(config::MODEL_VAR);
    }
    let config = GameConfig::from_env().expect("key is set");
    assert_eq!(config.model, config::DEFAULT_MODEL);
    assert_eq!(config.api_base, config::DEFAULT_API_BASE);
    unsafe {
        std::env::remove_var(config::API_KEY_VAR);
    }
}
