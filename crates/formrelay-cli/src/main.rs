//! formrelay — entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use formrelay_cli::commands::{self, submit::SubmitArgs};

#[derive(Parser)]
#[command(
    name = "formrelay",
    about = "formrelay — submit page forms without a reload and report what the user would see",
    version,
    after_help = "Environment: FORMRELAY_TIMEOUT_MS, FORMRELAY_FORM_CLASS, FORMRELAY_BASE_URL.\nFlags override environment values."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress alert output on stderr
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a form from an HTML page and submit it
    Submit {
        /// HTML page containing the form
        page: PathBuf,
        /// URL the page is served from (resolves relative form actions)
        #[arg(long)]
        base_url: Option<String>,
        /// Form index in document order
        #[arg(long, conflicts_with = "id")]
        form: Option<usize>,
        /// Form id attribute
        #[arg(long)]
        id: Option<String>,
        /// Set a field value (NAME=VALUE). Can be repeated.
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
        /// Check a checkbox or radio (NAME=VALUE). Can be repeated.
        #[arg(long = "check", value_name = "NAME=VALUE")]
        check: Vec<String>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Class that marks a form as relayed
        #[arg(long)]
        form_class: Option<String>,
    },
    /// List the forms on a page
    Forms {
        /// HTML page to inspect
        page: PathBuf,
        /// URL the page is served from
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Submit {
            page,
            base_url,
            form,
            id,
            set,
            check,
            timeout,
            form_class,
        } => {
            let args = SubmitArgs {
                page,
                base_url,
                form,
                id,
                set,
                check,
                timeout_ms: timeout,
                form_class,
                quiet: cli.quiet || cli.json,
            };
            commands::submit::run(args, cli.json).await
        }
        Commands::Forms { page, base_url } => {
            commands::forms::run(&page, base_url.as_deref(), cli.json).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "formrelay", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "error": true, "message": format!("{e:#}") })
            );
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
