//! Offline Old Maid table for watching the engine react.
//!
//! Plays a simplified two-hand game against a random player and prints
//! every line the opponent would say. Canned lines only, unless the config
//! names an `[llm]` provider.
//!
//! # Usage
//!
//! ```bash
//! deadpan-sim --seed 42 --turns 30
//! deadpan-sim --config deadpan.toml --json
//! RUST_LOG=deadpan_core=debug deadpan-sim
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deadpan_core::{DeadpanConfig, DrawContext, GestureKind};
use deadpan_engine::{ChannelSink, Presentation, ReactionEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file. Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for both the table and the engine.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Stop after this many draws even if nobody is out.
    #[arg(long, default_value_t = 40)]
    turns: u32,

    /// Print presented lines as JSON, one per line.
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Hand sizes after the opening discard. The Joker starts with the AI.
struct Table {
    player: u32,
    ai: u32,
    joker_with_ai: bool,
}

impl Table {
    fn new() -> Self {
        Self {
            player: 11,
            ai: 12,
            joker_with_ai: true,
        }
    }

    fn finished(&self) -> bool {
        self.player == 0 || self.ai == 0
    }

    /// The player draws one card from the AI's hand.
    fn player_draws<R: Rng>(&mut self, rng: &mut R) -> DrawContext {
        let drew_joker = self.joker_with_ai && rng.gen_range(0..self.ai) == 0;
        self.ai -= 1;
        if drew_joker {
            self.player += 1;
            self.joker_with_ai = false;
            return DrawContext::new(true, true, false, self.player, self.ai, false);
        }
        // Every other card matches one the drawer already holds.
        self.player -= 1;
        let player_holds_joker = !self.joker_with_ai;
        DrawContext::new(true, false, true, self.player, self.ai, self.joker_with_ai)
            .with_pair_empties_hand(self.player == 0)
            .with_pair_leaves_only_joker(self.player == 1 && player_holds_joker)
    }

    /// The AI draws one card from the player's hand.
    fn ai_draws<R: Rng>(&mut self, rng: &mut R) -> DrawContext {
        let drew_joker = !self.joker_with_ai && rng.gen_range(0..self.player) == 0;
        self.player -= 1;
        if drew_joker {
            self.ai += 1;
            self.joker_with_ai = true;
            return DrawContext::new(false, true, false, self.ai, self.player, true);
        }
        self.ai -= 1;
        DrawContext::new(false, false, true, self.ai, self.player, self.joker_with_ai)
            .with_pair_empties_hand(self.ai == 0)
            .with_pair_leaves_only_joker(self.ai == 1 && self.joker_with_ai)
    }
}

fn print_lines(rx: &mut UnboundedReceiver<Presentation>, json: bool) -> Result<()> {
    while let Ok(line) = rx.try_recv() {
        if json {
            println!("{}", serde_json::to_string(&line).context("serializing presentation")?);
        } else {
            println!("  [{:?}] ({}) {}", line.kind, line.emotion, line.text);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            DeadpanConfig::from_file(path).with_context(|| format!("loading config from {}", path.display()))?
        }
        None => DeadpanConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.general.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (sink, mut rx) = ChannelSink::new();
    let mut engine = ReactionEngine::builder()
        .config(config)
        .seed(args.seed)
        .sink(Arc::new(sink))
        .llm_from_config()
        .context("configuring text generation")?
        .build();

    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
    let mut table = Table::new();
    let mut player_turn = true;
    let mut draws = 0;

    info!(seed = args.seed, turns = args.turns, "table dealt");

    while draws < args.turns && !table.finished() {
        let ctx = if player_turn {
            let expectation = engine.determine_expectation();
            if !args.json {
                println!("turn {}: player to draw, opponent braces for {expectation}", engine.turn_count());
            }

            let hand = table.ai as usize;
            let position = rng.gen_range(0..hand);
            let hover: f32 = rng.gen_range(0.2..3.5);
            let decision = hover + rng.gen_range(0.1..1.5);
            let hover_count = rng.gen_range(1..5);

            engine.tick(f64::from(decision));
            if hover > 2.0 {
                let _ = engine.hover_dialogue().await;
            }
            if rng.gen_bool(0.2) {
                let kind = GestureKind::ALL[rng.gen_range(0..GestureKind::ALL.len())];
                engine.record_gesture(kind, Some(position));
                let _ = engine.react_to_gesture(kind);
            }
            engine.record_player_action(position, hover, decision, hand, hover_count);
            table.player_draws(&mut rng)
        } else {
            if !args.json {
                println!("opponent draws");
            }
            engine.tick(1.0);
            table.ai_draws(&mut rng)
        };

        engine.evaluate_reaction(&ctx).await;
        engine.request_commentary(&ctx);
        engine.drain_commentary();
        print_lines(&mut rx, args.json)?;

        player_turn = !player_turn;
        draws += 1;
    }

    let summary = engine.session_summary();
    let loser = if table.player == 0 {
        "the opponent"
    } else if table.ai == 0 {
        "the player"
    } else {
        "nobody yet"
    };
    info!(draws, loser, stats = ?engine.stats(), "table closed");
    if !args.json {
        println!();
        println!("Old Maid: {loser}");
        println!("{}", summary.narrative());
    }
    Ok(())
}
