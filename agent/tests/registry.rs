use pokestate_agent::{
    AgentError, BattleRegistry, EngineConfig, Order, SessionConfig, SessionEnd, Singles,
};
use tokio::sync::mpsc;

fn template() -> SessionConfig {
    SessionConfig {
        engine: EngineConfig {
            username: Some("Alice".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn opening(room: &str, rqid: u64) -> String {
    let request = format!(
        r#"{{"rqid": {rqid}, "active": [{{"moves": [{{"move": "Tackle", "id": "tackle", "pp": 35, "maxpp": 35, "target": "normal"}}]}}], "side": {{"name": "Alice", "id": "p1", "pokemon": [{{"ident": "p1: Eevee", "details": "Eevee", "condition": "100/100", "active": true}}]}}}}"#
    );
    format!(
        ">{room}\n|player|p1|Alice|1\n|player|p2|Bob|2\n|start\n|switch|p1a: Eevee|Eevee|100/100\n|switch|p2a: Ditto|Ditto|100/100\n|request|{request}\n|turn|1\n"
    )
}

#[tokio::test]
async fn test_battles_are_independent() {
    let (outgoing, mut commands) = mpsc::unbounded_channel();
    let mut registry = BattleRegistry::new(template(), outgoing);

    let mut first = registry.open::<Singles>("battle-gen9ou-1").unwrap();
    let mut second = registry.open::<Singles>("battle-gen9ou-2").unwrap();
    assert!(registry.open::<Singles>("battle-gen9ou-1").is_err());
    assert_eq!(registry.len(), 2);

    assert!(registry.route(&opening("battle-gen9ou-1", 11)).await);
    assert!(registry.route(&opening("battle-gen9ou-2", 21)).await);
    assert!(!registry.route(">lobby\n|c|someone|hi").await);

    assert_eq!(first.next_decision().await.unwrap().rqid, Some(11));
    assert_eq!(second.next_decision().await.unwrap().rqid, Some(21));

    // Abandoning one battle leaves the other running
    assert!(registry.abandon("battle-gen9ou-1"));
    assert_eq!(first.submit(Order::move_to(1)).await, Err(AgentError::Cancelled));

    second.submit(Order::move_to(1)).await.unwrap();
    let command = commands.recv().await.unwrap();
    assert_eq!(command.to_wire_format(), "battle-gen9ou-2|/choose move 1|21");

    // The session may stop before the end of this frame reaches it
    registry.route(">battle-gen9ou-2\n|win|Alice").await;
    assert_eq!(second.next_decision().await.unwrap_err(), AgentError::Cancelled);

    // The agent wakes before the task has fully returned
    let mut ended = registry.reap().await;
    while ended.is_empty() {
        tokio::task::yield_now().await;
        ended = registry.reap().await;
    }
    assert_eq!(ended, vec![("battle-gen9ou-2".to_string(), SessionEnd::Finished)]);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_shutdown_cancels_everything() {
    let (outgoing, _commands) = mpsc::unbounded_channel();
    let mut registry = BattleRegistry::new(template(), outgoing);
    let mut agent = registry.open::<Singles>("battle-gen9ou-3").unwrap();

    let ended = registry.shutdown().await;
    assert_eq!(ended, vec![("battle-gen9ou-3".to_string(), SessionEnd::Abandoned)]);
    assert_eq!(agent.next_decision().await.unwrap_err(), AgentError::Cancelled);
}
