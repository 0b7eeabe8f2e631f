use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dice_crawl::input::{Command, HELP, parse_command};
use dice_crawl::{ContentTables, GameSession, GameSettings, Phase};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "dice-crawl", version, about = "Dice-driven spiral dungeon crawl")]
struct Cli {
    /// 内容数据目录（缺省使用内置数据）
    #[arg(long)]
    content: Option<PathBuf>,

    /// 设置文件（JSON）
    #[arg(long)]
    settings: Option<PathBuf>,

    /// 每名玩家的职业，可重复；覆盖设置文件
    #[arg(long = "job")]
    jobs: Vec<String>,

    #[arg(long)]
    rounds: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// 敌方反击前的停顿（毫秒）
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let content = match &cli.content {
        Some(dir) => ContentTables::load_dir(dir)
            .with_context(|| format!("Failed to load content from {}", dir.display()))?,
        None => ContentTables::builtin().context("Failed to load built-in content")?,
    };

    let mut settings = match &cli.settings {
        Some(path) => GameSettings::load(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?,
        None => GameSettings::default(),
    };
    if !cli.jobs.is_empty() {
        settings.jobs = cli.jobs.clone();
    }
    if let Some(rounds) = cli.rounds {
        settings.round_limit = rounds;
    }
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }
    if let Some(delay) = cli.delay_ms {
        settings.result_delay_ms = delay;
    }

    let mut session = GameSession::new(Arc::new(content), settings).context("Failed to start the game")?;
    run(&mut session)
}

fn run(session: &mut GameSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut seen = 0;

    seen = print_new_log(session, seen);
    print_status(session);

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let accepted = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::State => {
                let snapshot = session.snapshot(20);
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                continue;
            }
            Command::Roll => session.roll_move(),
            Command::Move(steps) => session.move_steps(steps),
            Command::Battle(action) => session.battle_action(action),
            Command::Grow(choice) => session.allocate_growth(choice),
            Command::Choose(index) => session.choose(index),
            Command::Discard(id) => session.discard_skill(&id),
            Command::Next => session.continue_turn(),
            Command::Equip(index) => session.equip_from_bag(index),
            Command::Unequip(slot) => session.unequip(slot),
            Command::Abandon => session.request_abandon(),
        };
        if !accepted {
            warn!(phase = %session.phase(), "command not available right now");
        }

        seen = print_new_log(session, seen);
        while let Some(delay_ms) = session.scheduled().map(|s| s.delay_ms) {
            thread::sleep(Duration::from_millis(delay_ms));
            session.run_scheduled();
            seen = print_new_log(session, seen);
        }
        print_status(session);
        stdout.flush()?;

        if matches!(session.phase(), Phase::GameOver | Phase::Abandoned) {
            break;
        }
    }

    info!("bye");
    Ok(())
}

fn print_new_log(session: &GameSession, seen: u64) -> u64 {
    for line in session.log().since(seen) {
        println!("{line}");
    }
    session.log().total()
}

fn print_status(session: &GameSession) {
    let player = session.current_player();
    println!(
        "[{} | Round {}] {} HP {}/{} MP {}/{} pos {} depth {} bag {}G bank {}G",
        session.phase(),
        session.round(),
        player.id,
        player.hp,
        player.hp_max,
        player.mp,
        player.mp_max,
        player.pos,
        player.depth,
        player.bag_value(),
        player.bank_gold,
    );
    if !session.battle_info().is_empty() {
        println!("{}", session.battle_info());
    }
    if !session.action_info().is_empty() {
        println!("{}", session.action_info());
    }
    if let Some(choice) = session.pending_choice() {
        for (i, label) in choice.labels().iter().enumerate() {
            println!("  {}) {label}", i + 1);
        }
    }
    if let Some(pick) = session.pending_skill_choice() {
        println!("  discard one of: {}", pick.options.join(", "));
    }
    if let Some(label) = session.continue_label() {
        println!("  [next] {label}");
    }
}
