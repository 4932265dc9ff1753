//! Record a session, store it as an LZMA replay file, and replay it.
//!
//! One recorded seed byte is corrupted on purpose, so the replay reports
//! a single desync. Run with `RUST_LOG=debug` to see every command.
//!
//! ```sh
//! cargo run -p cmlog --example replay_log
//! ```

use cmlog::prelude::*;
use cmlog_test_utils::fixtures::recorded_session;
use cmlog_test_utils::MockSimulation;
use tracing_subscriber::EnvFilter;

const PRODUCER: u32 = 0x0E02_0001;
const SEED: u64 = 2024;
const COMMANDS: usize = 200;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Record.
    let mut events = recorded_session(SEED, COMMANDS, &[3, 7]);
    events[COMMANDS / 2].seed_byte ^= 0x5A;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.cmlog");
    let config = ReplayConfig::for_producer(PRODUCER);
    let mut writer = StreamWriter::new(&StreamHeader::new(PRODUCER))?;
    writer.extend(&events)?;
    LzmaFileStore::new(&path, &config).write_bytes(&writer.finish())?;
    tracing::info!(path = %path.display(), commands = COMMANDS, "recorded session");

    // Replay.
    let mut engine = ReplayEngine::new(config)?;
    let mut sink = |message: &str| println!("  {message}");
    let report = engine.load_file(&path, &mut sink)?;
    println!("loaded {} commands", report.records);

    let mut sim = MockSimulation::new(SEED);
    sim.fail_command(CommandId(3), Some("site is blocked"));
    sim.fail_command(CommandId(7), Some("not enough money"));
    sim.set_name(CommandId(3), "build_rail");
    sim.set_name(CommandId(7), "buy_vehicle");

    let mut tick = 1;
    while engine.is_replaying() {
        let step = engine.step(TickCounter(tick), &mut sim, None);
        for diagnostic in &step.diagnostics {
            println!("tick {tick}: {diagnostic}");
        }
        tick += 1;
    }

    let stats = engine.stats();
    println!(
        "executed {}, divergences {}, desyncs {} (first at {:?})",
        stats.executed(),
        stats.divergences(),
        stats.desyncs(),
        stats.first_desync()
    );
    for (command, tally) in stats.per_command() {
        println!("  command {command}: {} executed", tally.executed);
    }
    Ok(())
}
