// src/main.rs

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kindred::config::CONFIG;
use kindred::memory::SqliteMemoryStore;
use kindred::state::create_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let level: Level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Kindred companion core");
    info!("Local model: {}", CONFIG.local_model);

    let pool = SqlitePoolOptions::new()
        .max_connections(CONFIG.sqlite_max_connections)
        .connect(&CONFIG.database_url)
        .await?;
    SqliteMemoryStore::run_migrations(&pool).await?;

    let state = create_app_state(Arc::new(SqliteMemoryStore::new(pool)));

    let conversation_id = uuid::Uuid::new_v4().to_string();
    let user_id = std::env::var("KINDRED_USER").unwrap_or_else(|_| "friend".to_string());
    info!("Conversation {} for user {}", conversation_id, user_id);

    println!("Kindred is ready. Type a message, or 'quit' to leave.");
    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let turn = state.pipeline.process(&conversation_id, &user_id, line).await;
        println!(
            "kindred [{} {:.0}ms]> {}",
            turn.emotion,
            turn.processing_time.as_millis(),
            turn.reply
        );
    }

    state.pipeline.end_conversation(&conversation_id);
    info!("Goodbye");
    Ok(())
}
