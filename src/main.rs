//! Diagnostic CLI for the qzman backend: watch a quiz's live channel, drive
//! phase changes, or poke the REST API.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qzman_client::channel::GameChannelClient;
use qzman_client::config::ClientConfig;
use qzman_client::protocol::{OutboundIntent, QuestionPayload};
use qzman_client::{ApiClient, SendOutcome};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to a quiz's live channel and print every state change.
    Watch {
        /// Quiz id.
        #[arg(short, long)]
        quiz: i64,
    },
    /// Send a controller intent on a quiz's live channel.
    Control {
        #[arg(short, long)]
        quiz: i64,
        #[command(subcommand)]
        action: ControlAction,
    },
    /// Submit an answer as a team.
    Answer {
        #[arg(short, long)]
        quiz: i64,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        team_name: String,
        answer: String,
    },
    /// Hit the buzzer as a team.
    Buzz {
        #[arg(short, long)]
        quiz: i64,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        team_name: String,
    },
    /// List quizzes known to the backend.
    Quizzes,
    /// Join a quiz by access code.
    Join {
        #[arg(short, long)]
        quiz: i64,
        #[arg(long)]
        code: String,
        #[arg(long)]
        team: String,
    },
}

#[derive(Subcommand, Debug)]
enum ControlAction {
    /// Advance to the question at the given index.
    Next {
        #[arg(long)]
        index: usize,
    },
    /// Reveal the current answer.
    Reveal,
    /// Show the leaderboard.
    Leaderboard,
    /// End the quiz.
    End,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_env();

    if let Err(e) = run(args.command, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Watch { quiz } => watch(config, quiz).await,
        Command::Control { quiz, action } => {
            let intent = match action {
                ControlAction::Next { index } => {
                    let api = ApiClient::new(config.clone())?;
                    let question = lookup_question(&api, quiz, index).await?;
                    OutboundIntent::AdvanceQuestion {
                        question_index: index,
                        question,
                    }
                }
                ControlAction::Reveal => OutboundIntent::RevealAnswer,
                ControlAction::Leaderboard => OutboundIntent::ShowLeaderboard,
                ControlAction::End => OutboundIntent::EndQuiz,
            };
            send_one(config, quiz, intent).await
        }
        Command::Answer {
            quiz,
            team_id,
            team_name,
            answer,
        } => {
            send_one(
                config,
                quiz,
                OutboundIntent::SubmitAnswer {
                    answer,
                    team_id,
                    team_name,
                },
            )
            .await
        }
        Command::Buzz {
            quiz,
            team_id,
            team_name,
        } => send_one(config, quiz, OutboundIntent::Buzz { team_id, team_name }).await,
        Command::Quizzes => {
            let api = ApiClient::new(config)?;
            for quiz in api.list_quizzes().await? {
                println!(
                    "#{} {} (code {}, {} rounds, {} teams)",
                    quiz.id,
                    quiz.title,
                    quiz.code,
                    quiz.rounds.len(),
                    quiz.teams.len()
                );
            }
            Ok(())
        }
        Command::Join { quiz, code, team } => {
            let api = ApiClient::new(config)?;
            let joined = api.join_quiz(quiz, &code, &team).await?;
            println!("Joined as team #{} {}", joined.id, joined.name);
            Ok(())
        }
    }
}

/// Stream live events to stdout until interrupted.
async fn watch(config: ClientConfig, quiz: i64) -> Result<(), Box<dyn std::error::Error>> {
    let client = GameChannelClient::new(config);
    let mut handle = client.connect(quiz).await;
    println!("[{}] {}", handle.connection_id(), handle.status().await);

    handle
        .on_phase_change(|phase| {
            let text = phase
                .question
                .as_ref()
                .map(|q| q.text.as_str())
                .unwrap_or("-");
            println!(
                "phase={:?} index={:?} question={}",
                phase.phase, phase.question_index, text
            );
        })
        .await;
    handle
        .on_score_update(|scores| {
            for team in &scores.teams {
                println!(
                    "  {} {} ({} / {} correct, {} buzzes, avg {})",
                    team.name, team.score, team.correct, team.total, team.buzzes, team.avg_time
                );
            }
        })
        .await;
    handle
        .on_buzzer_update(|buzzer| {
            println!(
                "buzzer active={} holder={:?} time={:?}",
                buzzer.active, buzzer.holder, buzzer.response_time
            );
        })
        .await;
    handle
        .on_timer_update(|timer| println!("timer {}s", timer.remaining))
        .await;

    tokio::signal::ctrl_c().await?;
    handle.close().await;
    Ok(())
}

/// Connect, send a single intent, and release the channel.
async fn send_one(
    config: ClientConfig,
    quiz: i64,
    intent: OutboundIntent,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GameChannelClient::new(config);
    let mut handle = client.connect(quiz).await;

    match handle.send(intent).await {
        SendOutcome::Sent => {
            // Queued, not yet flushed; give the writer task a moment.
            tokio::time::sleep(Duration::from_millis(200)).await;
            println!("sent");
        }
        SendOutcome::Dropped => {
            eprintln!("dropped: {}", handle.status().await);
        }
    }

    handle.close().await;
    Ok(())
}

/// Resolve the question payload at a flattened index of the quiz.
async fn lookup_question(
    api: &ApiClient,
    quiz_id: i64,
    index: usize,
) -> Result<QuestionPayload, Box<dyn std::error::Error>> {
    let quiz = api.get_quiz(quiz_id).await?;
    let all = quiz.all_questions();
    let link = all
        .get(index)
        .ok_or_else(|| format!("quiz {} has no question at index {}", quiz_id, index))?;
    let details = link
        .question_details
        .as_ref()
        .ok_or("question link has no details")?;
    Ok(QuestionPayload {
        text: details.text.clone(),
        category: details.category.clone(),
        difficulty: details.difficulty,
        kind: details.kind,
        options: if details.options.is_empty() {
            None
        } else {
            Some(details.options.clone())
        },
    })
}
