//! # parcel CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parcel_cli::account::{
    run_login, run_logout, run_recover, run_register, run_reset_password, run_whoami, LoginArgs,
    RecoverArgs, RegisterArgs, ResetPasswordArgs,
};
use parcel_cli::declare::{run_categories, run_declare, run_verify, DeclareArgs, VerifyArgs};
use parcel_cli::settings::GlobalOpts;

/// Parcel declaration client.
///
/// Declare incoming parcels to the collection service and track whether the
/// declaration has been recorded.
#[derive(Parser, Debug)]
#[command(name = "parcel", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and save the session.
    Login(LoginArgs),

    /// Create an account.
    Register(RegisterArgs),

    /// Request a temporary password by email.
    Recover(RecoverArgs),

    /// Replace a temporary password for the logged-in account.
    ResetPassword(ResetPasswordArgs),

    /// Forget the saved session.
    Logout,

    /// Show the logged-in account.
    Whoami,

    /// List item categories. Starred ones need proof of purchase.
    Categories,

    /// Declare a parcel and wait for the backend to confirm it.
    Declare(DeclareArgs),

    /// Check once whether a declaration has been recorded.
    Verify(VerifyArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let opts = &cli.opts;
    let result = match &cli.command {
        Commands::Login(args) => run_login(args, opts).await,
        Commands::Register(args) => run_register(args, opts).await,
        Commands::Recover(args) => run_recover(args, opts).await,
        Commands::ResetPassword(args) => run_reset_password(args, opts).await,
        Commands::Logout => run_logout(opts),
        Commands::Whoami => run_whoami(opts),
        Commands::Categories => run_categories(opts),
        Commands::Declare(args) => run_declare(args, opts).await,
        Commands::Verify(args) => run_verify(args, opts).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins; otherwise verbosity picks the level, `warn` by default.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_login() {
        let cli = Cli::try_parse_from([
            "parcel",
            "login",
            "--phone",
            "0123456789",
            "--password",
            "Secret12",
        ])
        .unwrap();
        if let Commands::Login(args) = cli.command {
            assert_eq!(args.phone, "0123456789");
            assert_eq!(args.password, "Secret12");
        } else {
            panic!("expected login");
        }
    }

    #[test]
    fn cli_parse_declare_with_repeated_attachments() {
        let cli = Cli::try_parse_from([
            "parcel",
            "declare",
            "--tracking-number",
            "SPX123456",
            "--item-description",
            "Phone case",
            "--quantity",
            "1",
            "--price",
            "25",
            "--collection-point",
            "Gadong",
            "--category",
            "Mobile Phones",
            "--attach",
            "a.pdf",
            "--attach",
            "b.png",
        ])
        .unwrap();
        if let Commands::Declare(args) = cli.command {
            assert_eq!(args.category, "Mobile Phones");
            assert!(args.phone.is_none());
            assert_eq!(
                args.attachments,
                vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]
            );
        } else {
            panic!("expected declare");
        }
    }

    #[test]
    fn cli_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "parcel",
            "verify",
            "SPX123456",
            "--endpoint",
            "https://backend.example/exec",
            "--session-file",
            "/tmp/s.json",
            "--log-json",
            "-vv",
        ])
        .unwrap();
        assert!(cli.log_json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.opts.endpoint.as_deref(),
            Some("https://backend.example/exec")
        );
        assert_eq!(cli.opts.session_file, Some(PathBuf::from("/tmp/s.json")));
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.tracking_number, "SPX123456");
        } else {
            panic!("expected verify");
        }
    }

    #[test]
    fn cli_parse_reset_password_subcommand_name() {
        let cli =
            Cli::try_parse_from(["parcel", "reset-password", "--new-password", "N3wSecret"])
                .unwrap();
        assert!(matches!(cli.command, Commands::ResetPassword(_)));
    }

    #[test]
    fn cli_declare_requires_tracking_number() {
        assert!(Cli::try_parse_from([
            "parcel",
            "declare",
            "--item-description",
            "x",
            "--quantity",
            "1",
            "--price",
            "1",
            "--collection-point",
            "Gadong",
            "--category",
            "Clothing",
        ])
        .is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
