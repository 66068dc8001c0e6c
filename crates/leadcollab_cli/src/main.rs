//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `leadcollab_core` linkage.
//! - Replay a short collaboration walkthrough over the demo directory and
//!   print the resulting ledger and inboxes as JSON.
//!
//! Usage: `leadcollab_cli [config.json]`

use leadcollab_core::{
    demo_directory, init_logging_from_config, Actor, CollabConfig, CollabService, LeadDraft,
    LeadPatch, UserDirectory,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("leadcollab_core ping={}", leadcollab_core::ping());
    println!("leadcollab_core version={}", leadcollab_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => CollabConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CollabConfig::default(),
    };
    if let Some(logging) = &config.logging {
        init_logging_from_config(logging)?;
    }

    let service = CollabService::with_config(demo_directory(), config)?;
    let admin = actor_for(&service, "admin")?;
    let mohan = actor_for(&service, "mohan")?;

    let lead = service.create_lead(
        &admin,
        LeadDraft::new("Acme Corp", "buyer@acme.test").with_phone("555-0100"),
    )?;
    service.add_watcher(&admin, lead.id, mohan.user_id)?;
    service.update_lead(&admin, lead.id, &LeadPatch::status("Converted"))?;
    let outcome = service.add_note(&mohan, lead.id, "Great lead, @admin please review")?;
    service.mark_note_read(&admin, lead.id, outcome.note.id)?;
    info!(
        "event=cli_walkthrough module=cli status=ok lead_id={} note_id={}",
        lead.id, outcome.note.id
    );

    println!("activities:");
    println!("{}", serde_json::to_string_pretty(&service.list_activities(lead.id)?)?);
    for user in service.list_users() {
        println!(
            "notifications for {} (unread={}):",
            user.username,
            service.unread_count(user.id)?
        );
        println!("{}", serde_json::to_string_pretty(&service.list_notifications(user.id)?)?);
    }
    println!("read receipts:");
    println!(
        "{}",
        serde_json::to_string_pretty(&service.list_read_receipts(lead.id, outcome.note.id)?)?
    );
    Ok(())
}

fn actor_for<D: UserDirectory>(
    service: &CollabService<D>,
    handle: &str,
) -> Result<Actor, Box<dyn Error>> {
    service
        .directory()
        .resolve_handle(handle)
        .map(|user| Actor::from(&user))
        .ok_or_else(|| format!("demo user `{handle}` missing").into())
}
