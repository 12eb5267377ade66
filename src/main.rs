//! Team trends CLI
//!
//! Imports game feeds, prints threshold-gated betting trends for a team,
//! rates teams with Elo, and serves the same reports over HTTP.

use clap::{Parser, Subcommand};
use trends::report::OutputFormat;
use trends::{Config, Result, Sport};

#[derive(Parser)]
#[command(name = "trends")]
#[command(about = "Betting trends for football and basketball teams", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Print trends for a team
    Trends {
        /// Team abbreviation (e.g. KC)
        team: String,
        /// Number of most recent games to analyze
        #[arg(long)]
        games: Option<usize>,
        /// Only games from this season
        #[arg(long)]
        season: Option<u16>,
        /// Only games through this week
        #[arg(long)]
        week: Option<u8>,
        /// Minimum occurrences for a trend to be shown
        #[arg(long)]
        min: Option<usize>,
        /// Sport rule tables to use
        #[arg(long)]
        sport: Option<Sport>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Elo ratings and implied spreads
    Elo {
        /// Only rate games from this season
        #[arg(long)]
        season: Option<u16>,
        /// Show only the top N teams
        #[arg(long)]
        top: Option<usize>,
        /// Implied spread for HOME vs AWAY
        #[arg(long, num_args = 2, value_names = ["HOME", "AWAY"])]
        matchup: Option<Vec<String>>,
    },
    /// Serve trends over HTTP
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import a JSON game feed
    Import {
        /// Feed file with `games` and `odds` arrays
        file: String,
    },
    /// Show database status
    Status,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Import { file } => commands::data_import(&config, &file),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Trends {
            team,
            games,
            season,
            week,
            min,
            sport,
            format,
        } => commands::trends(&config, &team, games, season, week, min, sport, format),
        Commands::Elo {
            season,
            top,
            matchup,
        } => commands::elo(&config, season, top, matchup),
        Commands::Serve { bind } => commands::serve(&config, bind),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use trends::api::{self, ApiState};
    use trends::data::{Database, GameFeed, GameFilter};
    use trends::ratings::EloRatings;
    use trends::report;
    use trends::trends::TrendAggregator;
    use trends::{TeamCode, TrendsError};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'trends data import feed.json' to load games and lines");
        println!("  3. Run 'trends trends KC' to print a team's trends");
        println!("  4. Run 'trends serve' to expose the reports over HTTP");

        Ok(())
    }

    pub fn data_import(config: &Config, file: &str) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;

        println!("Importing {}...", file);
        let feed = GameFeed::load(file)?;
        let summary = feed.import(&db)?;

        println!("Stored {} games and {} lines", summary.games, summary.odds);
        if summary.orphaned_odds > 0 {
            println!(
                "Dropped {} lines for games not in the database",
                summary.orphaned_odds
            );
        }

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;
        let teams = db.teams()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Teams:    {}", stats.team_count);
        println!("  Games:    {}", stats.game_count);
        println!("  Lines:    {}", stats.odds_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_game, stats.latest_game) {
            println!("  Range:    {} to {}", earliest, latest);
        }
        if !teams.is_empty() {
            let codes: Vec<&str> = teams.iter().map(|t| t.as_str()).collect();
            println!("  Codes:    {}", codes.join(", "));
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn trends(
        config: &Config,
        team: &str,
        games: Option<usize>,
        season: Option<u16>,
        week: Option<u8>,
        min: Option<usize>,
        sport: Option<Sport>,
        format: OutputFormat,
    ) -> Result<()> {
        let mut trends_config = config.trends.clone();
        if let Some(g) = games {
            trends_config.games = g;
        }
        if let Some(m) = min {
            trends_config.min_occurrences = m;
        }
        if let Some(s) = sport {
            trends_config.sport = s;
        }
        if trends_config.games == 0 || trends_config.min_occurrences == 0 {
            return Err(TrendsError::Config(
                "--games and --min must be at least 1".to_string(),
            ));
        }

        let db = Database::open(&config.data.database_path)?;
        let aggregator = TrendAggregator::from_config(team, &trends_config);
        let filter = GameFilter {
            season,
            week,
            limit: trends_config.games,
        };

        let report = report::team_report(&db, &aggregator, &filter)?;
        print!("{}", report::render(&report, format)?);
        if format == OutputFormat::Json {
            println!();
        }

        Ok(())
    }

    pub fn elo(
        config: &Config,
        season: Option<u16>,
        top: Option<usize>,
        matchup: Option<Vec<String>>,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let games = db.all_games(season)?;

        if games.is_empty() {
            return Err(TrendsError::Config(
                "No games in database. Run 'trends data import' first.".to_string(),
            ));
        }

        let ratings = EloRatings::from_games(config.elo.clone(), &games);
        println!("Rated {} games", ratings.games_rated());

        if let Some(teams) = matchup {
            let [home, away] = teams.as_slice() else {
                return Err(TrendsError::Config(
                    "--matchup takes HOME and AWAY".to_string(),
                ));
            };
            let (home, away) = (TeamCode::new(home), TeamCode::new(away));
            let spread = ratings.hypothetical_spread(&home, &away);
            let home_prob = ratings.expected_score(&home, &away);

            println!();
            println!("┌─────────────────────────────────────────────────┐");
            println!("│  {} vs {}", home, away);
            println!("├─────────────────────────────────────────────────┤");
            println!("│  Ratings:          {:.0} / {:.0}", ratings.rating(&home), ratings.rating(&away));
            println!("│  Home win chance:  {:.1}%", home_prob * 100.0);
            println!("│  Implied spread:   {} {:+.1}", home, spread);
            println!("└─────────────────────────────────────────────────┘");
            return Ok(());
        }

        let standings = ratings.standings();
        let shown = top.unwrap_or(standings.len());
        println!();
        println!("  #  Team   Rating");
        println!("───────────────────────────────");
        for (i, (team, rating)) in standings.iter().take(shown).enumerate() {
            println!("{:>3}  {:<5} {:>7.1}", i + 1, team, rating);
        }

        Ok(())
    }

    pub fn serve(config: &Config, bind: Option<String>) -> Result<()> {
        let bind = bind.unwrap_or_else(|| config.server.bind.clone());
        let db = Database::open(&config.data.database_path)?;
        let state = ApiState::new(db, config.trends.clone(), config.elo.clone());

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(api::serve(&bind, state))
    }
}
