//! Wallpaper Rater CLI entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wallpaper_rater::{reachable_scores, Rater};
use wallpaper_rater_cli::config::load_effective_config;
use wallpaper_rater_cli::render;

#[derive(Parser)]
#[command(
    name = "wallpaper-rater",
    about = "Rate wallpapers by sharpness, brightness, color, and resolution",
    version
)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Rating preset (canonical, strict, laplacian). Overrides the config file's policy.
    #[arg(short, long, global = true)]
    preset: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate one or more image files.
    Rate {
        /// Image files (jpg, jpeg, png, ...).
        #[arg(required = true)]
        files: Vec<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,

        /// Also print the measurements behind each rating.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the caption table, marking scores the policy can produce.
    Captions,

    /// Print the effective rating policy as JSON.
    Policy,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   wallpaper-rater completions bash > ~/.local/share/bash-completion/completions/wallpaper-rater
    ///   wallpaper-rater completions zsh > ~/.zfunc/_wallpaper-rater
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode (default).
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone();
    let preset = cli.preset.clone();
    let build_rater = move || -> anyhow::Result<Rater> {
        let config = load_effective_config(config_path.as_deref(), preset.as_deref())?;
        Ok(config.build_rater()?)
    };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Rate {
            files,
            json,
            verbose,
        } => {
            let rater = build_rater()?;
            let mut results = Vec::new();
            let mut failures = 0usize;

            for file in &files {
                match rater.rate_file(file) {
                    Ok(assessment) => {
                        if json {
                            results.push(render::assessment_json(&assessment));
                        } else {
                            if files.len() > 1 {
                                println!("{file}");
                            }
                            println!("{}", render::rating_line(&assessment.rating));
                            if verbose {
                                for line in render::metrics_lines(&assessment.metrics) {
                                    println!("  {line}");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        failures += 1;
                        tracing::error!("Failed to rate {file}: {e}");
                        if json {
                            results.push(serde_json::json!({
                                "source": file,
                                "error": e.to_string(),
                            }));
                        } else {
                            eprintln!("{file}: {e}");
                        }
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            if failures > 0 {
                std::process::exit(1);
            }
        }

        Commands::Captions => {
            let rater = build_rater()?;
            let reachable = reachable_scores(rater.policy());
            for line in render::caption_listing(rater.captions(), &reachable) {
                println!("{line}");
            }
        }

        Commands::Policy => {
            let rater = build_rater()?;
            println!("{}", serde_json::to_string_pretty(rater.policy())?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "wallpaper-rater", &mut std::io::stdout());
        }

        Commands::Repl => {
            wallpaper_rater_cli::repl::run(build_rater()?)?;
        }
    }

    Ok(())
}
