mod cli;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use mb_av::ToolRegistry;
use mb_core::config::Config;
use mb_core::MediaRoot;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            root,
            host,
            port,
            static_dir,
            log_file,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref());

            // CLI flags override the config file.
            if let Some(root) = root {
                config.media.root = root;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = static_dir {
                config.server.static_dir = Some(dir);
            }
            if let Some(file) = log_file {
                config.logging.file = file;
            }

            init_logging(cli.verbose, Some(&config.logging.file))?;

            // Refuse to start before binding anything.
            MediaRoot::new(config.media.root.clone())
                .with_context(|| format!("invalid media root {}", config.media.root.display()))?;

            tracing::info!("Starting mediabay {}", env!("CARGO_PKG_VERSION"));
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(mb_server::start(config))?;
            Ok(())
        }
        Commands::CheckTools { json } => {
            init_logging(cli.verbose, None)?;
            check_tools(cli.config.as_deref(), json)
        }
        Commands::Validate {
            config: config_path,
        } => {
            init_logging(cli.verbose, None)?;
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediabay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Install the global subscriber. With `log_file` set, output is appended
/// to that file; otherwise it goes to stderr.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "mediabay=trace,mb_server=trace,mb_pipeline=trace,mb_av=debug,mb_core=debug,tower_http=debug"
                .to_string()
        } else {
            "mediabay=info,mb_server=info,mb_pipeline=info,mb_av=info,mb_core=info,tower_http=info"
                .to_string()
        }
    });

    let builder = tracing_subscriber::fmt().with_env_filter(&env_filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools).check_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Checking external tools...\n");
    let mut all_ok = true;
    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Browsing works, but video edits will fail.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Media root: {}", config.media.root.display());
    match config.server.static_dir {
        Some(ref dir) => println!("  Static dir: {}", dir.display()),
        None => println!("  Static dir: (none)"),
    }
    println!("  Log file: {}", config.logging.file.display());

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    }

    Ok(())
}
