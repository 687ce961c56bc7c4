//! fittrack - Local-first workout tracker

use anyhow::Result;
use clap::{Parser, Subcommand};

use fittrack::db::{Workout, WorkoutStore};
use fittrack::grouping::DayIndex;
use fittrack::lookup::LookupClient;
use fittrack::tui::{App, parse_form_date};

const DB_PATH: &str = "fittrack.db";

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(author, version, about = "Local-first workout tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the terminal UI (login gate first)
    Tui,

    /// Log a workout
    Add {
        /// Workout type (e.g., "Squat", "Bench Press")
        #[arg(short = 't', long = "type")]
        workout_type: Option<String>,

        /// Number of sets
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(i32).range(0..))]
        sets: i32,

        /// Number of reps per set
        #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(i32).range(0..))]
        reps: i32,

        /// Workout date, YYYY-MM-DD (omit for unscheduled)
        #[arg(short, long)]
        date: Option<String>,

        /// Optional notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List workouts grouped by day, most recent first
    List,

    /// Delete a workout by id
    Delete { id: i64 },

    /// Find gyms near a location
    Gyms { location: String },

    /// Search exercise tutorial videos
    Videos {
        query: String,

        /// YouTube Data API key (or set YOUTUBE_API_KEY env var)
        #[arg(short, long, env = "YOUTUBE_API_KEY")]
        api_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Add { workout_type, sets, reps, date, notes }) => {
            let store = WorkoutStore::open(DB_PATH)?;
            let date = parse_form_date(date.as_deref().unwrap_or(""))?;
            let workout = Workout {
                id: None,
                workout_type,
                sets,
                reps,
                date,
                notes,
            };
            let saved = store.add(&workout)?;
            println!(
                "Logged: {} - {}x{} (id: {})",
                saved.workout_type.as_deref().unwrap_or("Unknown Type"),
                saved.sets,
                saved.reps,
                saved.id.unwrap_or_default()
            );
        }

        Some(Commands::List) => {
            let store = WorkoutStore::open(DB_PATH)?;
            let workouts = store.list()?;
            let index = DayIndex::build(&workouts);

            for day in index.days() {
                println!("{day}");
                println!("{:-<60}", "");
                for w in index.bucket(&day) {
                    println!(
                        "  [{}] {:20} | {}x{} | {}",
                        w.id.unwrap_or_default(),
                        w.workout_type.as_deref().unwrap_or("Unknown Type"),
                        w.sets,
                        w.reps,
                        w.notes.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Some(Commands::Delete { id }) => {
            let store = WorkoutStore::open(DB_PATH)?;
            store.delete(id)?;
            println!("Deleted workout {id}");
        }

        Some(Commands::Gyms { location }) => {
            let client = LookupClient::new()?;
            let places = client.find_gyms(&location).await?;
            if places.is_empty() {
                println!("No gyms found near {location}");
            }
            for place in places {
                println!("{}\n  {}", place.name, place.address);
            }
        }

        Some(Commands::Videos { query, api_key }) => {
            let client = LookupClient::new()?;
            let videos = client.search_videos(&query, &api_key).await?;
            for video in videos {
                println!("{}\n  {}\n  {}", video.title, video.description, video.watch_url());
            }
        }

        Some(Commands::Tui) | None => {
            let store = WorkoutStore::open(DB_PATH)?;
            let mut app = App::new(store);
            app.run()?;
        }
    }

    Ok(())
}
