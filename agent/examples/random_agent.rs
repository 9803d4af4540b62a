//! Random Agent Example
//!
//! Plays a scripted singles battle through a registry with an agent that picks a
//! random legal order at every decision point. Outgoing commands are printed instead
//! of being sent to a server.
//!
//! Run with `RUST_LOG=debug` to see the engine's tracing output.

use anyhow::Result;
use pokestate_agent::{AgentHandle, BattleRegistry, EngineConfig, SessionConfig, Singles};
use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const ROOM: &str = "battle-gen9randombattle-1";

const FRAMES: &[&str] = &[
    ">battle-gen9randombattle-1
|player|p1|Alice|1
|player|p2|Bob|2
|teamsize|p1|2
|teamsize|p2|2
|gametype|singles
|gen|9
|tier|[Gen 9] Random Battle
|start
|switch|p1a: Pikachu|Pikachu, L88|100/100
|switch|p2a: Snorlax|Snorlax, L84|100/100
|request|{\"rqid\": 1, \"active\": [{\"moves\": [{\"move\": \"Thunderbolt\", \"id\": \"thunderbolt\", \"pp\": 24, \"maxpp\": 24, \"target\": \"normal\"}, {\"move\": \"Protect\", \"id\": \"protect\", \"pp\": 16, \"maxpp\": 16, \"target\": \"self\"}]}], \"side\": {\"name\": \"Alice\", \"id\": \"p1\", \"pokemon\": [{\"ident\": \"p1: Pikachu\", \"details\": \"Pikachu, L88\", \"condition\": \"100/100\", \"active\": true}, {\"ident\": \"p1: Gyarados\", \"details\": \"Gyarados, L80\", \"condition\": \"100/100\", \"active\": false}]}}
|turn|1",
    ">battle-gen9randombattle-1
|move|p2a: Snorlax|Body Slam|p1a: Pikachu
|-damage|p1a: Pikachu|35/100
|move|p1a: Pikachu|Thunderbolt|p2a: Snorlax
|-damage|p2a: Snorlax|70/100
|upkeep
|request|{\"rqid\": 2, \"active\": [{\"moves\": [{\"move\": \"Thunderbolt\", \"id\": \"thunderbolt\", \"pp\": 23, \"maxpp\": 24, \"target\": \"normal\"}, {\"move\": \"Protect\", \"id\": \"protect\", \"pp\": 16, \"maxpp\": 16, \"target\": \"self\"}]}], \"side\": {\"name\": \"Alice\", \"id\": \"p1\", \"pokemon\": [{\"ident\": \"p1: Pikachu\", \"details\": \"Pikachu, L88\", \"condition\": \"35/100\", \"active\": true}, {\"ident\": \"p1: Gyarados\", \"details\": \"Gyarados, L80\", \"condition\": \"100/100\", \"active\": false}]}}
|turn|2",
    ">battle-gen9randombattle-1
|-message|Bob forfeited.
|win|Alice",
];

async fn play(mut agent: AgentHandle<Singles>) {
    while let Ok(point) = agent.next_decision().await {
        println!("{}", point.snapshot.summary());
        let order = point.actions.orders().choose(&mut rand::thread_rng()).cloned();
        let Some(order) = order else { continue };
        println!("Choosing: {order}");
        if let Err(e) = agent.submit(order).await {
            println!("Order failed: {e}");
        }
    }
    println!("Battle over");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (outgoing, mut commands) = mpsc::unbounded_channel();
    let template = SessionConfig {
        engine: EngineConfig {
            username: Some("Alice".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut registry = BattleRegistry::new(template, outgoing);

    let agent = registry.open::<Singles>(ROOM)?;
    let agent_task = tokio::spawn(play(agent));

    for frame in FRAMES {
        registry.route(frame).await;
        if !frame.contains("|turn|") {
            continue;
        }
        // Stand-in for the server waiting on our choice
        if let Some(command) = commands.recv().await {
            println!(">> {}", command.to_wire_format());
        }
    }

    agent_task.await?;
    for (room, end) in registry.shutdown().await {
        println!("{room}: {end:?}");
    }
    Ok(())
}
