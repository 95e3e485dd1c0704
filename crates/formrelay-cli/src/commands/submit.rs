//! `formrelay submit <page>` — fill in a form and submit it through the relay.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use formrelay::{
    Document, EventBus, HttpTransport, Outcome, RelayConfig, RelayEvent, SubmissionInterceptor,
    SubmissionTarget,
};

use crate::notifier::TerminalNotifier;
use crate::output::{parse_assignment, print_json};

/// Options for a single submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub page: PathBuf,
    /// URL the page is considered to be loaded from.
    pub base_url: Option<String>,
    /// Form index in document order. Defaults to the first form.
    pub form: Option<usize>,
    /// Form `id`; takes precedence over `form`.
    pub id: Option<String>,
    /// `NAME=VALUE` pairs typed into the form.
    pub set: Vec<String>,
    /// `NAME=VALUE` checkboxes or radios to check.
    pub check: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub form_class: Option<String>,
    pub quiet: bool,
}

/// Everything that happened during one submission.
#[derive(Debug, Serialize)]
pub struct SubmitReport {
    pub form: usize,
    pub action: String,
    /// False when the form did not match and a browser would navigate.
    pub relayed: bool,
    pub outcomes: Vec<Outcome>,
    pub content: String,
    pub alerts: Vec<String>,
    pub events: Vec<RelayEvent>,
}

impl SubmitReport {
    pub fn accepted(&self) -> bool {
        self.relayed && self.outcomes.iter().all(Outcome::is_accepted)
    }
}

/// Resolve configuration: defaults, then environment, then flags.
pub fn resolve_config(args: &SubmitArgs) -> Result<RelayConfig> {
    let mut config = RelayConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(class) = &args.form_class {
        config.form_class = class.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Submit the selected form and report the result.
pub async fn execute(args: &SubmitArgs) -> Result<SubmitReport> {
    let config = resolve_config(args)?;
    let page = super::load_page(&args.page, &config).await?;

    let form = match &args.id {
        Some(id) => page.form_by_id(id)?,
        None => page.form(args.form.unwrap_or(0))?,
    };

    for raw in &args.set {
        let (name, value) = parse_assignment(raw)?;
        form.set_field(&name, &value)
            .with_context(|| format!("cannot set {name}"))?;
    }
    for raw in &args.check {
        let (name, value) = parse_assignment(raw)?;
        form.set_checked(&name, &value, true)
            .with_context(|| format!("cannot check {name}"))?;
    }

    let notifier = Arc::new(TerminalNotifier::new(args.quiet));
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let interceptor = SubmissionInterceptor::from_config(
        &config,
        Arc::new(HttpTransport::from_config(&config)),
        notifier.clone(),
    )?
    .with_event_bus(bus);

    let document = Arc::new(Document::new());
    let registration = Arc::new(interceptor).start(&document);

    tracing::debug!("Submitting form {} to {}", form.index(), form.action_url());
    let dispatched = document.dispatch_submit(form.clone());
    let relayed = dispatched.default_prevented;
    let outcomes = dispatched.join().await?;
    registration.stop();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    Ok(SubmitReport {
        form: form.index(),
        action: form.action_url(),
        relayed,
        outcomes,
        content: form.content(),
        alerts: notifier.shown(),
        events,
    })
}

/// Run the submit command. A rejected submission exits with an error unless
/// JSON output was requested.
pub async fn run(args: SubmitArgs, json: bool) -> Result<()> {
    let report = execute(&args).await?;

    if json {
        // The report carries the outcome; rejections are not an error here.
        return print_json(&report);
    }

    if !report.relayed {
        println!(
            "Form {} is not relayed; a browser would submit it natively to {}",
            report.form, report.action
        );
    } else {
        for outcome in &report.outcomes {
            match outcome {
                Outcome::Accepted { status } => {
                    println!("Accepted ({status}) by {}", report.action);
                    println!("\n{}", report.content);
                }
                Outcome::Rejected { .. } => {
                    println!("Rejected by {}", report.action);
                }
            }
        }
    }

    if report.relayed && !report.accepted() {
        bail!("submission to {} was rejected", report.action);
    }
    Ok(())
}
