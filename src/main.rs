use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod api;
mod config;
mod db;
mod memory;
mod models;
mod report;
mod risk;
mod sentiment;

use config::{DatabaseArgs, ServeArgs};
use db::{PgStudentStore, StudentStore};
use memory::MemoryStudentStore;
use models::StudentInput;
use sentiment::LexiconAnalyzer;

#[derive(Parser)]
#[command(name = "dropout-risk")]
#[command(about = "Student dropout and wellbeing risk scoring service", long_about = None)]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Create or upgrade the database schema
    InitDb,
    /// Insert the sample assessments
    Seed,
    /// Score and store assessments from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score a single assessment without storing it
    Score {
        #[arg(long)]
        attendance: f64,
        #[arg(long)]
        grades: f64,
        #[arg(long)]
        assignments: f64,
        #[arg(long)]
        mood: String,
    },
    /// Generate a markdown report of stored assessments
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn pg_store(database: &DatabaseArgs) -> anyhow::Result<PgStudentStore> {
    let pool = db::connect(database).await?;
    Ok(PgStudentStore::new(pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing();
    let cli = Cli::parse();
    let analyzer = LexiconAnalyzer::new();

    match cli.command {
        Commands::Serve(serve) => {
            let store: Arc<dyn StudentStore> = if serve.in_memory {
                tracing::warn!("using in-memory store; records are lost on exit");
                Arc::new(MemoryStudentStore::new())
            } else {
                let pool = db::connect(&cli.database).await?;
                db::init_db(&pool).await?;
                Arc::new(PgStudentStore::new(pool))
            };

            let app = api::router(api::AppState::new(store, Arc::new(analyzer)));
            let listener = tokio::net::TcpListener::bind(serve.bind)
                .await
                .with_context(|| format!("failed to bind {}", serve.bind))?;
            tracing::info!(addr = %serve.bind, "listening");
            axum::serve(listener, app).await?;
        }
        Commands::InitDb => {
            let pool = db::connect(&cli.database).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let store = pg_store(&cli.database).await?;
            let inserted = db::seed(&store, &analyzer).await?;
            println!("Inserted {} sample assessments.", inserted.len());
        }
        Commands::Import { csv } => {
            let store = pg_store(&cli.database).await?;
            let inserted = db::import_csv(&store, &analyzer, &csv).await?;
            println!("Scored and stored {inserted} assessments from {}.", csv.display());
        }
        Commands::Score {
            attendance,
            grades,
            assignments,
            mood,
        } => {
            let input = StudentInput {
                attendance,
                grades,
                assignments,
                mood,
            };
            let breakdown = risk::score_with_breakdown(&input, &analyzer);
            println!(
                "Risk {}% ({})",
                breakdown.result.risk_percentage, breakdown.result.risk_level
            );
            println!("- academic risk: {}", breakdown.academic_risk);
            println!(
                "- mental risk: {} (polarity {:.2}, crisis language: {})",
                breakdown.mental_risk,
                breakdown.polarity,
                if breakdown.crisis_detected { "yes" } else { "no" }
            );
        }
        Commands::Report { out } => {
            let store = pg_store(&cli.database).await?;
            let records = store.find_all().await?;
            let report = report::build_report(chrono::Utc::now().date_naive(), &records);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
