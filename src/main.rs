use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use rewired::assessment::scoring::format_score;
use rewired::assessment::task::format_clock;
use rewired::assessment::{AssessmentController, Stage};
use rewired::config::InstallerConfig;
use rewired::dialogue::{DialogueDriver, forward_batch, spawn_pacer};
use rewired::navigation::{Navigator, Route};
use rewired::routes::baseline_routes;
use rewired::session::SessionContext;
use rewired::store::{LibSqlBackend, Storage};

/// Forwards redirects to the main loop.
struct CliNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "Redirect requested");
        if self.tx.send(route).is_err() {
            tracing::warn!(route = %route, "Redirect dropped, main loop has exited");
        }
    }
}

/// Spawn a stdin reader; each line arrives trimmed. The channel closes on EOF.
fn spawn_stdin() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Next line of input, or `None` on EOF or `/quit`.
async fn read_line(lines: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
    eprint!("> ");
    let line = lines.recv().await?;
    if line == "/quit" { None } else { Some(line) }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = InstallerConfig::from_env();

    eprintln!("🧠 REwired Installer v{}", env!("CARGO_PKG_VERSION"));

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn Storage> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── HTTP API ─────────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = baseline_routes(Arc::clone(&store));
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind HTTP port {}", port))?;
        eprintln!("   Baseline API: http://0.0.0.0:{}/api/baseline", port);
        tokio::spawn(async move {
            tracing::info!(port, "Baseline API started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Baseline API stopped: {}", e);
            }
        });
    }

    eprintln!("   Type /quit to exit.\n");

    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let ctx = SessionContext::new(
        Arc::clone(&store),
        Arc::new(CliNavigator { tx: nav_tx }),
        config,
    );
    let mut lines = spawn_stdin();

    let initialized = rewired::assessment::result::is_initialized(store.as_ref())
        .await
        .unwrap_or(false);
    let mut route = if initialized {
        Route::Dialogue
    } else {
        Route::Assessment
    };

    loop {
        let finished = match route {
            Route::Assessment => !run_assessment(&ctx, &mut lines).await,
            Route::Dialogue => !run_dialogue(&ctx, &mut lines).await,
        };
        if finished {
            break;
        }
        match nav_rx.try_recv() {
            Ok(next) => route = next,
            Err(_) => break,
        }
    }

    Ok(())
}

/// Walk the user through the assessment. Returns `false` when they quit.
async fn run_assessment(
    ctx: &SessionContext,
    lines: &mut mpsc::UnboundedReceiver<String>,
) -> bool {
    let controller = AssessmentController::new(ctx.clone());

    println!(
        "\nWelcome to your baseline diagnostic.\n\n\
         You'll answer four short sections, then complete a {}-minute attention task.\n\
         Answer each statement with a number from 0 to 4.\n\n\
         Press Enter to begin.",
        ctx.config.task.duration_secs / 60
    );
    if read_line(lines).await.is_none() {
        return false;
    }
    if let Err(e) = controller.begin().await {
        eprintln!("Error: {}", e);
        return false;
    }

    // ── Questionnaire ────────────────────────────────────────────────────
    let mut last_section = usize::MAX;
    while let Some(view) = controller.current_question().await {
        if view.section_index != last_section {
            last_section = view.section_index;
            println!(
                "\nSection {} of {}: {}\n{}",
                view.section_index + 1,
                view.section_count,
                view.section.name,
                view.section.description
            );
        }
        let overall = controller
            .progress()
            .await
            .map(|p| p.overall_percent)
            .unwrap_or(0.0);
        println!(
            "\n[{:.0}%] {}. {}",
            overall,
            view.question_index + 1,
            view.question.text
        );
        for (value, label) in view.section.scale_labels.iter().enumerate() {
            println!("   {} = {}", value, label);
        }

        let Some(answer) = read_line(lines).await else {
            return false;
        };
        let Ok(value) = answer.parse::<u8>() else {
            println!("Please answer with a number from 0 to 4.");
            continue;
        };
        if let Err(e) = controller.select(value).await {
            println!("{}", e);
            continue;
        }
        if let Err(e) = controller.advance().await {
            println!("{}", e);
        }
    }

    // ── Attention task ───────────────────────────────────────────────────
    println!(
        "\nBreath Counting Task\n\n\
         Breathe naturally. Count each exhale from 1 to 8, then start again.\n\
         Commands: b = next breath, c = complete cycle (at 8), l = lost count.\n\n\
         Press Enter to start the timer."
    );
    if read_line(lines).await.is_none() {
        return false;
    }
    if let Err(e) = controller.start_task().await {
        eprintln!("Error: {}", e);
        return false;
    }

    let mut stage_rx = controller.subscribe();
    let mut clock = tokio::time::interval(Duration::from_secs(15));
    clock.tick().await;
    eprint!("> ");
    while *stage_rx.borrow() == Stage::BctActive {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { return false };
                let result = match line.as_str() {
                    "/quit" => return false,
                    "b" => controller.next_breath().await.map(|_| ()),
                    "c" => controller.complete_cycle().await.map(|_| ()),
                    "l" => controller.lost_count().await.map(|_| ()),
                    _ => {
                        println!("Use b, c or l.");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    println!("{}", e);
                }
                if let Some(task) = controller.task_snapshot().await {
                    if !task.is_finished() {
                        println!(
                            "Breath {}/8 • cycles {} • {}",
                            task.breaths(),
                            task.cycles(),
                            format_clock(task.remaining_secs())
                        );
                        eprint!("> ");
                    }
                }
            }
            _ = clock.tick() => {
                if let Some(task) = controller.task_snapshot().await {
                    println!("{} remaining", format_clock(task.remaining_secs()));
                }
            }
            changed = stage_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    // ── Results ──────────────────────────────────────────────────────────
    let Some(completion) = controller.completion().await else {
        eprintln!("Error: attention task ended without a result");
        return false;
    };
    let record = &completion.record;
    println!("\n{}", completion.outcome.reason);
    println!(
        "Held count for {} ({} cycles)\n",
        format_clock(completion.outcome.elapsed_secs),
        completion.outcome.cycles_completed
    );
    println!("REwired Index: {}/100", record.rewired_index);
    println!("Status: {}\n", record.tier);
    for domain in rewired::assessment::Domain::ALL {
        println!(
            "   {:<11} {}/5.0",
            domain.to_string(),
            format_score(record.domain_scores.get(domain))
        );
    }
    if !completion.persisted {
        println!("\nWarning: your baseline could not be saved.");
    }
    println!("\nPress Enter to continue.");

    if read_line(lines).await.is_none() {
        return false;
    }
    if let Err(e) = controller.continue_to_dialogue().await {
        eprintln!("Error: {}", e);
        return false;
    }
    true
}

/// Run the onboarding conversation. Returns `false` when the user quits,
/// `true` when redirected elsewhere.
async fn run_dialogue(ctx: &SessionContext, lines: &mut mpsc::UnboundedReceiver<String>) -> bool {
    let mut driver = match DialogueDriver::initialize(ctx).await {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("{}", e);
            return true;
        }
    };

    let (pace_tx, pace_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let pacer = spawn_pacer(pace_rx, out_tx);

    println!("\n── {} ──\n{}\n", driver.header(), driver.baseline().tier);
    forward_batch(&pace_tx, driver.take_outbox());

    loop {
        tokio::select! {
            Some(message) = out_rx.recv() => {
                println!("\n{}\n", message.content);
                eprint!("> ");
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                if line == "/quit" {
                    break;
                }
                driver.handle_user_message(&line);
                forward_batch(&pace_tx, driver.take_outbox());
            }
        }
    }

    tracing::info!(state = %driver.state(), "Dialogue closed");
    pacer.abort();
    false
}
