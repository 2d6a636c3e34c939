use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use impact_rank::config::Config;
use impact_rank::entities::Entity;
use impact_rank::scoring::{AggregatorState, VoteAggregator};
use impact_rank::state::PersistedState;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID_VOTE: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List entities ranked by overall impact score (default if no subcommand)
    Rank {
        /// Entity data file (YAML or JSON); defaults to `entities` in config
        #[arg(short, long)]
        entities: Option<PathBuf>,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
        /// Show at most this many entities
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show one entity's score breakdown under the current weights
    Show {
        /// Entity id as it appears in the data file
        id: String,
        #[arg(short, long)]
        entities: Option<PathBuf>,
    },
    /// Submit a weight vote, e.g. `vote social=60 cultural=40`
    Vote {
        /// CATEGORY=WEIGHT pairs; omitted categories count as 0
        #[arg(required = true)]
        weights: Vec<String>,
    },
    /// Submit a batch of votes from a YAML or JSON file
    Ingest {
        file: PathBuf,
    },
    /// Show the current canonical weights
    Weights,
    /// Discard all votes and restore the default weights
    Reset,
}

#[derive(Parser, Debug)]
#[command(name = "impact-rank")]
#[command(about = "Rank public figures by crowd-weighted impact score", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/impact-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let command = cli.command.unwrap_or(Commands::Rank {
        entities: None,
        tsv: false,
        limit: None,
    });

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match impact_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.effective_scoring();
    if let Err(errors) = impact_rank::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let policy = match scoring.policy() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let initial_weights = match scoring.initial_weights() {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let state_path = match config.state_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Resume the canonical weighting (or start from defaults)
    let state = match impact_rank::state::load_state(&state_path) {
        Ok(Some(persisted)) => match persisted.resume(policy) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("State error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
        Ok(None) => AggregatorState::new(initial_weights, policy),
        Err(e) => {
            eprintln!("State error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    tracing::debug!(
        path = %state_path.display(),
        policy = %state.policy,
        votes_folded = state.votes_folded,
        "loaded canonical weights"
    );

    let aggregator = Arc::new(VoteAggregator::new(state));
    let use_colors = impact_rank::output::should_use_colors();

    match command {
        Commands::Rank {
            entities,
            tsv,
            limit,
        } => {
            let entities = load_entities_or_exit(entities, &config);
            let outcome = impact_rank::scoring::rank_entities(&entities, &aggregator.weights());

            let by_id: HashMap<&str, &Entity> =
                entities.iter().map(|e| (e.id.as_str(), e)).collect();
            let rows: Vec<impact_rank::output::RankedRow> = outcome
                .ranked
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .filter_map(|ranked| {
                    by_id
                        .get(ranked.id.as_str())
                        .copied()
                        .map(|entity| impact_rank::output::RankedRow { ranked, entity })
                })
                .collect();

            if tsv {
                println!("{}", impact_rank::output::format_tsv(&rows));
            } else {
                println!(
                    "{}",
                    impact_rank::output::format_ranked_table(&rows, use_colors)
                );
            }

            if !outcome.skipped.is_empty() {
                eprintln!("{}", impact_rank::output::format_skipped(&outcome.skipped));
            }
        }
        Commands::Show { id, entities } => {
            let entities = load_entities_or_exit(entities, &config);
            let weights = aggregator.weights();

            let Some(entity) = entities.iter().find(|e| e.id == id) else {
                eprintln!("No entity with id '{}'", id);
                std::process::exit(EXIT_DATA);
            };

            let result = match impact_rank::scoring::calculate_score(&entity.scores, &weights) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Cannot score {}: {}", entity.id, e);
                    std::process::exit(EXIT_DATA);
                }
            };

            let outcome = impact_rank::scoring::rank_entities(&entities, &weights);
            let rank = outcome
                .ranked
                .iter()
                .find(|r| r.id == entity.id)
                .map(|r| r.rank);

            println!(
                "{}",
                impact_rank::output::format_entity_detail(entity, rank, &result, use_colors)
            );
        }
        Commands::Vote { weights } => {
            let raw = match impact_rank::scoring::RawVoteSubmission::parse_args(&weights) {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("Invalid vote: {}", e);
                    std::process::exit(EXIT_INVALID_VOTE);
                }
            };

            let snapshot = match aggregator.submit(&raw) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Invalid vote: {}", e);
                    std::process::exit(EXIT_INVALID_VOTE);
                }
            };

            save_or_exit(&state_path, &snapshot);
            println!("Vote recorded ({} total).", snapshot.votes_folded);
            print_weights(&snapshot, use_colors);
        }
        Commands::Ingest { file } => {
            let votes = match impact_rank::ingest::load_votes(&file) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Vote file error: {:#}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            let submitted = votes.len();

            let report = match impact_rank::ingest::ingest_votes(Arc::clone(&aggregator), votes).await {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Ingest failed: {:#}", e);
                    std::process::exit(EXIT_DATA);
                }
            };

            if report.accepted > 0 {
                save_or_exit(&state_path, &report.state);
            }

            for (index, error) in &report.rejected {
                eprintln!("Vote {} rejected: {}", index + 1, error);
            }
            println!(
                "Accepted {} of {} votes ({} total).",
                report.accepted, submitted, report.state.votes_folded
            );
            print_weights(&report.state, use_colors);

            if !report.rejected.is_empty() {
                std::process::exit(EXIT_INVALID_VOTE);
            }
        }
        Commands::Weights => {
            print_weights(&aggregator.snapshot(), use_colors);
        }
        Commands::Reset => {
            let snapshot = aggregator.reset(initial_weights);
            save_or_exit(&state_path, &snapshot);
            println!("Weights reset to defaults.");
            print_weights(&snapshot, use_colors);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn load_entities_or_exit(flag: Option<PathBuf>, config: &Config) -> Vec<Entity> {
    let Some(path) = flag.or_else(|| config.entities_path()) else {
        eprintln!("No entity data configured.");
        eprintln!("Pass --entities <file> or add to ~/.config/impact-rank/config.yaml:");
        eprintln!("  entities: ~/data/entities.yaml");
        std::process::exit(EXIT_CONFIG);
    };

    match impact_rank::entities::load_entities(&path) {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Entity data error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    }
}

fn save_or_exit(path: &Path, state: &AggregatorState) {
    if let Err(e) = impact_rank::state::save_state(path, &PersistedState::from(state)) {
        eprintln!("State error: {:#}", e);
        std::process::exit(EXIT_DATA);
    }
}

fn print_weights(state: &AggregatorState, use_colors: bool) {
    println!(
        "{}",
        impact_rank::output::format_weights(state, chrono::Utc::now(), use_colors)
    );
}
