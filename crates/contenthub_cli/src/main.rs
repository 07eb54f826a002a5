//! Command-line front end for the content hub core.
//!
//! # Responsibility
//! - Wire configuration, logging and the document store.
//! - Map subcommands onto core request handlers and print their envelope.

use clap::{Parser, Subcommand};
use contenthub_core::api::{self, ApiResponse, RequestParams};
use contenthub_core::db::open_db;
use contenthub_core::{core_version, default_log_level, init_logging};
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "contenthub")]
#[command(version)]
#[command(about = "Register users and read projected content documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite document store path.
    #[arg(long, global = true, env = "CONTENTHUB_DB", default_value = "contenthub.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults by build mode.
    #[arg(long, global = true, env = "CONTENTHUB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "CONTENTHUB_LOG_DIR")]
    log_dir: Option<String>,

    /// Pretty-print the response envelope.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user.
    Register {
        #[arg(long)]
        number: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        /// `男` or `女`.
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        city: Option<String>,
        /// Comma-separated tags.
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        income: Option<String>,
    },
    /// Check a nickname/password pair.
    SignIn {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        password: String,
    },
    /// Print one document projected by field selectors.
    Show {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        id: String,
        /// Comma-separated selectors, e.g. `title,publisher_name:author` or
        /// `-content,+publisher.name:author`. Plain selectors override `+`/`-`
        /// ones; a leading `-` is accepted as `--fields -content` or
        /// `--fields=-content`.
        #[arg(long, allow_hyphen_values = true)]
        fields: Option<String>,
    },
    /// Print the core version.
    Version,
}

enum Handler {
    Register,
    SignIn,
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let (handler, params) = match cli.command {
        Commands::Version => {
            println!("contenthub_core version={}", core_version());
            return ExitCode::SUCCESS;
        }
        Commands::Register {
            number,
            password,
            name,
            nickname,
            sex,
            area,
            city,
            tag,
            income,
        } => (
            Handler::Register,
            params_from([
                ("number", Some(number)),
                ("password", password),
                ("name", name),
                ("nickname", nickname),
                ("sex", sex),
                ("area", area),
                ("city", city),
                ("tag", tag),
                ("income", income),
            ]),
        ),
        Commands::SignIn { nickname, password } => (
            Handler::SignIn,
            params_from([("nickname", Some(nickname)), ("password", Some(password))]),
        ),
        Commands::Show {
            collection,
            id,
            fields,
        } => (
            Handler::Show,
            params_from([
                ("collection", Some(collection)),
                ("id", Some(id)),
                ("fields", fields),
            ]),
        ),
    };

    let conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };

    let response = match handler {
        Handler::Register => api::register(&conn, &params),
        Handler::SignIn => api::sign_in(&conn, &params),
        Handler::Show => api::show(&conn, &params),
    };

    print_response(&response, cli.pretty)
}

fn params_from<const N: usize>(pairs: [(&str, Option<String>); N]) -> RequestParams {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
}

fn print_response(response: &ApiResponse, pretty: bool) -> ExitCode {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("failed to render response: {err}");
            return ExitCode::FAILURE;
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        warn!(
            "event=cli_command module=cli status=error code={}",
            response.code
        );
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    fn show_fields(args: &[&str]) -> Option<String> {
        let mut argv = vec!["contenthub", "show", "--collection", "article", "--id", "x"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Show { fields, .. } => fields,
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn fields_accept_leading_removal_selector() {
        assert_eq!(
            show_fields(&["--fields", "-content,+publisher.name:author"]).as_deref(),
            Some("-content,+publisher.name:author")
        );
        assert_eq!(
            show_fields(&["--fields=-content"]).as_deref(),
            Some("-content")
        );
        assert_eq!(show_fields(&[]), None);
    }
}
