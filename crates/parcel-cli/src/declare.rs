//! # Declaration Subcommands
//!
//! - `declare`: Validate, submit and confirm a parcel declaration.
//! - `verify`: Ask once whether a declaration has been recorded.
//! - `categories`: List the item catalogue.
//!
//! `declare` exits 0 when the declaration is confirmed or pending, and 1
//! when it is rejected (locally or by the backend).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use parcel_client::Gateway;
use parcel_core::{AttachmentSource, SubmissionOutcome, CATALOGUE};
use parcel_state::{
    Field, PollPolicy, SubmissionContext, SubmissionCoordinator, SubmissionState,
};

use crate::settings::GlobalOpts;

/// Arguments for `parcel declare`.
#[derive(Args, Debug)]
pub struct DeclareArgs {
    /// Parcel tracking number (letters, digits and hyphens).
    #[arg(long)]
    pub tracking_number: String,
    /// What the parcel contains.
    #[arg(long)]
    pub item_description: String,
    /// Number of items.
    #[arg(long)]
    pub quantity: String,
    /// Declared value.
    #[arg(long)]
    pub price: String,
    /// Where the parcel will be collected.
    #[arg(long)]
    pub collection_point: String,
    /// Item category; see `parcel categories`.
    #[arg(long)]
    pub category: String,
    /// Contact phone. Defaults to the logged-in account.
    #[arg(long)]
    pub phone: Option<String>,
    /// Proof-of-purchase file. Repeat for several files.
    #[arg(long = "attach", value_name = "FILE")]
    pub attachments: Vec<PathBuf>,
}

/// Arguments for `parcel verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Tracking number to look up.
    pub tracking_number: String,
}

/// Run one declaration attempt.
pub async fn run_declare(args: &DeclareArgs, opts: &GlobalOpts) -> Result<u8> {
    let validators = opts.validators()?;
    let session = opts.session_store()?.load()?;

    let mut files = Vec::with_capacity(args.attachments.len());
    for path in &args.attachments {
        let file = AttachmentSource::from_path(path)
            .await
            .with_context(|| format!("cannot attach {}", path.display()))?;
        files.push(file);
    }

    let phone = args
        .phone
        .clone()
        .or_else(|| session.as_ref().map(|s| s.subject_id().to_string()))
        .unwrap_or_default();

    let mut form = SubmissionState::new(Arc::clone(&validators));
    form.update(Field::TrackingNumber, args.tracking_number.as_str());
    form.update(Field::Phone, phone);
    form.update(Field::ItemDescription, args.item_description.as_str());
    form.update(Field::Quantity, args.quantity.as_str());
    form.update(Field::Price, args.price.as_str());
    form.update(Field::CollectionPoint, args.collection_point.as_str());
    form.update(Field::ItemCategory, args.category.as_str());
    form.set_attachments(files);

    if !form.is_submittable() {
        for (field, message) in form.invalid_fields() {
            eprintln!("  {field}: {message}");
        }
        if let Some(message) = &form.attachment_verdict().message {
            eprintln!("  attachments: {message}");
        }
        eprintln!("Declaration not submitted.");
        return Ok(1);
    }

    let client = opts.client()?;
    let context = SubmissionContext {
        validators,
        poll: PollPolicy::from(client.config()),
        session: session.clone(),
    };
    let gateway: Arc<dyn Gateway> = Arc::new(client.declarations(session));
    let mut coordinator = SubmissionCoordinator::new(gateway, context);
    let outcome = coordinator.run(&form.to_form()).await?;

    Ok(report(&outcome))
}

/// Print the outcome and return the exit code.
pub fn report(outcome: &SubmissionOutcome) -> u8 {
    match outcome {
        SubmissionOutcome::Confirmed(tn) => {
            println!("Declaration {tn} confirmed.");
            0
        }
        SubmissionOutcome::Pending(tn) => {
            println!(
                "Declaration {tn} submitted; confirmation is still pending. Check later with `parcel verify {tn}`."
            );
            0
        }
        SubmissionOutcome::Rejected(reason) => {
            eprintln!("Declaration rejected: {reason}");
            1
        }
    }
}

/// Poll once for a tracking number.
pub async fn run_verify(args: &VerifyArgs, opts: &GlobalOpts) -> Result<u8> {
    let validators = opts.validators()?;
    let tracking_number = match validators.parse_tracking_number(&args.tracking_number) {
        Ok(tn) => tn,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };

    let reply = opts.client()?.declarations(None).poll(&tracking_number).await;
    if let Some(error) = &reply.error {
        tracing::warn!(%tracking_number, %error, "verification reported a problem");
    }
    match (reply.exists, reply.confirmed) {
        (_, true) => {
            println!("{tracking_number}: confirmed");
            Ok(0)
        }
        (true, false) => {
            println!("{tracking_number}: received, not yet confirmed");
            Ok(1)
        }
        (false, false) => {
            println!("{tracking_number}: not found");
            Ok(1)
        }
    }
}

/// List the catalogue. Starred categories need proof of purchase.
pub fn run_categories(opts: &GlobalOpts) -> Result<u8> {
    let max = opts.validators()?.rules().max_attachments;
    for category in CATALOGUE {
        let mark = if category.starred { "*" } else { " " };
        println!("{mark} {}", category.label);
    }
    println!();
    println!("* requires 1 to {max} proof-of-purchase attachments");
    Ok(0)
}
