//! Chat with the portfolio assistant from the terminal.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use folio_chat_client::{ConversationClientBuilder, HttpTransport};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum ClientEvent {
    Idle,
    Reply(String, Vec<String>),
    Notification(String),
}

const BAR_CHAR: &str = "▎";
const DEFAULT_URL: &str = "http://127.0.0.1:3000/api/chat";
const GREETING: &str = "👋 Hi! I'm HDO's AI assistant. Ask me about his projects, skills or experience.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = env::var("FOLIO_CHAT_URL").unwrap_or_else(|_| DEFAULT_URL.to_owned());
    debug!("chatting with {url}");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let client = ConversationClientBuilder::with_transport(HttpTransport::new(&url))
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(ClientEvent::Idle).ok();
            }
        })
        .on_reply({
            let event_tx = event_tx.clone();
            move |reply, suggestions| {
                event_tx
                    .send(ClientEvent::Reply(
                        reply.content.clone(),
                        suggestions.to_vec(),
                    ))
                    .ok();
            }
        })
        .on_notification({
            let event_tx = event_tx.clone();
            move |text| {
                event_tx
                    .send(ClientEvent::Notification(text.to_owned()))
                    .ok();
            }
        })
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!("{}🤖 {}", BAR_CHAR.bright_cyan(), GREETING.bright_white());
    let mut suggestions: Vec<String> = Vec::new();

    'outer: loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // A number picks one of the suggested questions.
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| suggestions.get(idx));
        match picked {
            Some(question) => {
                println!("{}", question.dimmed());
                client.submit(question);
            }
            None => client.submit(line),
        }

        let mut progress_bar = None;

        loop {
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("🤔 Thinking...");
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                ClientEvent::Reply(reply, new_suggestions) => {
                    println!(
                        "{}🤖 {}",
                        BAR_CHAR.bright_cyan(),
                        reply.bright_white()
                    );
                    for (idx, suggestion) in new_suggestions.iter().enumerate() {
                        println!(
                            "{}{} {}",
                            BAR_CHAR.bright_black(),
                            format!("[{}]", idx + 1).bright_black(),
                            suggestion
                        );
                    }
                    suggestions = new_suggestions;
                }
                ClientEvent::Notification(text) => {
                    println!("{}⚠️  {}", BAR_CHAR.bright_yellow(), text);
                }
                ClientEvent::Idle => {
                    break;
                }
            }
        }
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
