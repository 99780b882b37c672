//! # Account Subcommands
//!
//! - `login`: Log in and save the session.
//! - `register`: Create an account.
//! - `recover`: Ask for a temporary password by email.
//! - `reset-password`: Replace a temporary password for the logged-in user.
//! - `logout`: Forget the saved session.
//! - `whoami`: Show the saved session.

use anyhow::{Context, Result};
use clap::Args;
use parcel_client::AuthError;

use crate::settings::GlobalOpts;

/// Arguments for `parcel login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account phone number.
    #[arg(long)]
    pub phone: String,
    /// Account password.
    #[arg(long, env = "PARCEL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `parcel register`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Phone number for the new account.
    #[arg(long)]
    pub phone: String,
    /// Password: at least 6 characters with an uppercase letter and a digit.
    #[arg(long, env = "PARCEL_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Email address for password recovery.
    #[arg(long)]
    pub email: String,
}

/// Arguments for `parcel recover`.
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Account phone number.
    #[arg(long)]
    pub phone: String,
    /// Email address registered with the account.
    #[arg(long)]
    pub email: String,
}

/// Arguments for `parcel reset-password`.
#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// The new password.
    #[arg(long, env = "PARCEL_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: String,
}

/// Log in and persist the session.
pub async fn run_login(args: &LoginArgs, opts: &GlobalOpts) -> Result<u8> {
    let auth = opts.client()?.auth(opts.validators()?);
    let session = match auth.login(&args.phone, &args.password).await {
        Ok(session) => session,
        Err(e) => return refused(e),
    };

    let store = opts.session_store()?;
    store.save(&session)?;
    println!("Logged in as {}.", session.subject_id());
    if session.temporary {
        eprintln!(
            "You logged in with a temporary password. Choose a new one with `parcel reset-password --new-password <PASSWORD>`."
        );
    }
    Ok(0)
}

/// Register a new account.
pub async fn run_register(args: &RegisterArgs, opts: &GlobalOpts) -> Result<u8> {
    let auth = opts.client()?.auth(opts.validators()?);
    match auth
        .create_account(&args.phone, &args.password, &args.email)
        .await
    {
        Ok(reply) => {
            println!(
                "{}",
                reply
                    .message
                    .unwrap_or_else(|| "Account created. You can now log in.".into())
            );
            Ok(0)
        }
        Err(e) => refused(e),
    }
}

/// Start password recovery.
pub async fn run_recover(args: &RecoverArgs, opts: &GlobalOpts) -> Result<u8> {
    let auth = opts.client()?.auth(opts.validators()?);
    match auth.initiate_password_reset(&args.phone, &args.email).await {
        Ok(reply) => {
            println!(
                "{}",
                reply
                    .message
                    .unwrap_or_else(|| "A temporary password has been sent to your email.".into())
            );
            Ok(0)
        }
        Err(e) => refused(e),
    }
}

/// Replace the logged-in user's temporary password.
pub async fn run_reset_password(args: &ResetPasswordArgs, opts: &GlobalOpts) -> Result<u8> {
    let store = opts.session_store()?;
    let mut session = store
        .load()?
        .context("not logged in; run `parcel login` first")?;

    let auth = opts.client()?.auth(opts.validators()?);
    match auth.force_password_reset(&session, &args.new_password).await {
        Ok(_) => {
            session.temporary = false;
            store.save(&session)?;
            println!("Password updated.");
            Ok(0)
        }
        Err(e) => refused(e),
    }
}

/// Forget the saved session.
pub fn run_logout(opts: &GlobalOpts) -> Result<u8> {
    if opts.session_store()?.clear()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(0)
}

/// Show the saved session.
pub fn run_whoami(opts: &GlobalOpts) -> Result<u8> {
    match opts.session_store()?.load()? {
        Some(session) => {
            match &session.secondary_id {
                Some(email) => println!("{} <{email}>", session.subject_id()),
                None => println!("{}", session.subject_id()),
            }
            if session.temporary {
                println!("(temporary password: reset required)");
            }
            Ok(0)
        }
        None => {
            println!("Not logged in.");
            Ok(1)
        }
    }
}

/// Report an account-action failure. Validation problems and backend
/// refusals are user errors with exit code 1; transport failures propagate.
fn refused(err: AuthError) -> Result<u8> {
    match err {
        AuthError::Invalid(e) => {
            eprintln!("error: {e}");
            Ok(1)
        }
        AuthError::Refused { message, .. } => {
            eprintln!("error: {message}");
            Ok(1)
        }
        other => Err(other.into()),
    }
}
