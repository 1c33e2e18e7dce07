//! Run scripted episodes end to end and print what the agent saw.
//!
//! ```text
//! RUST_LOG=delve_engine=debug cargo run -p delve-bench --example scripted_episode
//! ```

use delve_bench::episode_profile;
use delve_meta::{GlyphKind, GlyphLayout};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let layout = GlyphLayout::NETHACK_3_6;
    let mut session = episode_profile(25)?;

    for episode in 1..=3 {
        session.reset()?;
        let mut steps = 0;
        while !session.done() {
            session.step(steps % 8)?;
            steps += 1;
        }
        let obs = session.observation();
        let monsters = obs
            .glyphs()
            .unwrap_or_default()
            .iter()
            .filter(|&&g| layout.classify(i32::from(g)) == Some(GlyphKind::Monster))
            .count();
        println!(
            "episode {episode}: {steps} steps, {:?}, {monsters} monster glyph(s) on the last frame",
            session.how_done()
        );
    }

    session.close();
    Ok(())
}
