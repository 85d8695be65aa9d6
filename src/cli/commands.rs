//! Command handlers
//!
//! Every data command resolves the session through the auth guard first; an
//! absent session fails with [`AppError::NotAuthenticated`] before any request.

use std::sync::Arc;

use casemind_core::guard::HOME_PATH;
use casemind_core::services;
use casemind_core::types::TariffInsightParams;
use casemind_core::{
    ApiError, AuthGuard, FeedbackForm, FilterController, FilterField, LoginForm, MemoryHistory,
    QueryState,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::output::Output;
use super::render;
use super::{ClaimsArgs, Commands, ReportCommands, TariffArgs};
use crate::types::{AppError, Result};
use crate::App;

/// Run one parsed subcommand.
pub async fn execute(app: &App, out: &Output, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => login(app, out, email, password).await,
        Commands::Logout => logout(app, out).await,
        Commands::Whoami => whoami(app, out).await,
        Commands::Claims(args) => claims(app, out, args).await,
        Commands::Claim { id, refresh } => claim(app, out, &id, refresh).await,
        Commands::Chat { id, message } => chat(app, out, &id, message.as_deref()).await,
        Commands::Feedback {
            id,
            decision,
            ratio,
            notes,
        } => feedback(app, out, &id, decision, ratio, notes).await,
        Commands::Reports(report) => reports(app, out, report).await,
        Commands::Config => {
            show_config(app, out);
            Ok(())
        }
    }
}

/// Data of a settled query, or its error.
fn into_data<T>(state: QueryState<T>) -> Result<Arc<T>> {
    if let Some(err) = state.error {
        return Err(err.into());
    }
    state
        .data
        .ok_or_else(|| ApiError::Internal("query settled without data".to_string()).into())
}

fn prompt_error(err: dialoguer::Error) -> AppError {
    AppError::Prompt(err.to_string())
}

async fn login(
    app: &App,
    out: &Output,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    app.session.hydrate().await;
    if AuthGuard::login_redirect(&app.session) == Some(HOME_PATH) {
        if let Some(user) = app.session.user() {
            out.info(&format!("Already signed in as {}", user.display_name()));
            out.hint("Run `casemind logout` to switch accounts.");
            return Ok(());
        }
    }

    let email = match email {
        Some(email) => email,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_error)?,
    };
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_error)?,
    };

    let form = LoginForm::new(email, password);
    let record = services::sign_in(app.hooks.gateway(), &form)
        .await
        .map_err(|err| match services::sign_in_failure(&err) {
            Some(message) => AppError::LoginFailed(message),
            None => AppError::Api(err),
        })?;

    out.success(&format!("Signed in as {}", record.user.display_name()));
    out.kv("Role", &record.user.role);
    out.kv("Session expires", &record.expires_at);
    Ok(())
}

async fn logout(app: &App, out: &Output) -> Result<()> {
    app.session.hydrate().await;
    if !app.session.is_authenticated() {
        out.info("Not signed in.");
        return Ok(());
    }
    app.session.logout().await?;
    app.hooks.cache().clear();
    out.success("Signed out");
    Ok(())
}

async fn whoami(app: &App, out: &Output) -> Result<()> {
    let record = app.require_session().await?;

    out.header("Session");
    out.kv("Name", record.user.display_name());
    out.kv("Email", &record.user.email);
    out.kv("Role", &record.user.role);
    out.kv("Expires", &record.expires_at);
    out.kv("API", app.hooks.gateway().base_url());

    if let Ok(expires) = DateTime::parse_from_rfc3339(&record.expires_at) {
        if expires.with_timezone(&Utc) <= Utc::now() {
            out.warning("The session has expired; the next request will sign you out.");
        }
    }
    Ok(())
}

/// Build the filter controller from `--query`, `--reset` and the flags.
pub fn claims_controller(args: &ClaimsArgs) -> FilterController {
    let controller = FilterController::from_url(
        HOME_PATH,
        args.query.as_deref().unwrap_or_default(),
        Arc::new(MemoryHistory::new()),
    );
    if args.reset {
        controller.reset();
    }
    for (field, value) in args.field_updates() {
        controller.set_field(field, &value);
    }
    if let Some(id) = args.select.as_deref() {
        controller.select_claim(id);
    }
    controller
}

async fn claims(app: &App, out: &Output, args: ClaimsArgs) -> Result<()> {
    app.require_session().await?;
    let controller = claims_controller(&args);
    let filters = controller.filters();

    let query = app.hooks.high_risk_claims(&filters);
    let state = if args.refresh {
        query.refetch().await
    } else {
        query.load().await
    };
    let response = into_data(state)?;

    out.header("High-risk claims");
    let active = filters.non_default_pairs();
    if !active.is_empty() {
        let summary = active
            .iter()
            .filter(|(field, _)| *field != FilterField::Page)
            .map(|(field, value)| format!("{}={}", field, value))
            .collect::<Vec<_>>();
        if !summary.is_empty() {
            out.kv("Filters", &summary.join(", "));
        }
    }
    render::print_claims(out, &response.data, &response.meta);
    out.kv("Share", &controller.shareable_url());

    if let Some(selected) = controller.selected() {
        let summary = app.hooks.claim_summary(Some(&selected));
        let state = if args.refresh {
            summary.refetch().await
        } else {
            summary.load().await
        };
        render::print_summary(out, &*into_data(state)?);
    }
    Ok(())
}

async fn claim(app: &App, out: &Output, id: &str, refresh: bool) -> Result<()> {
    app.require_session().await?;
    let query = app.hooks.claim_summary(Some(id));
    if !query.is_enabled() {
        return Err(AppError::InvalidInput("claim id must not be empty".to_string()));
    }
    let state = if refresh {
        query.refetch().await
    } else {
        query.load().await
    };
    render::print_summary(out, &*into_data(state)?);
    Ok(())
}

async fn chat(app: &App, out: &Output, id: &str, message: Option<&str>) -> Result<()> {
    app.require_session().await?;
    let chat = app.hooks.claim_chat(Some(id));

    if let Some(message) = message {
        let exchange = chat.send_message(message).await?;
        if exchange.bot_message.is_none() {
            out.info("Message sent. The copilot has not answered yet.");
        }
    }

    let transcript = into_data(chat.query.load().await)?;
    out.header(&format!("Chat - claim {}", id.trim()));
    render::print_chat(out, &transcript);

    if message.is_none() {
        let summary = app.hooks.claim_summary(Some(id)).load().await;
        match summary.data {
            Some(summary) if !summary.follow_up_questions.is_empty() => {
                out.subheader("Suggested questions");
                for question in &summary.follow_up_questions {
                    out.list_item(question);
                }
                out.hint("Ask one with:");
                out.command(&format!("casemind chat {} \"<question>\"", id.trim()));
            }
            Some(_) => {}
            None => debug!("No summary available for suggested questions"),
        }
    }
    Ok(())
}

async fn feedback(
    app: &App,
    out: &Output,
    id: &str,
    decision: String,
    ratio: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    app.require_session().await?;
    let form = FeedbackForm::new(decision)
        .with_correction_ratio(ratio.unwrap_or_default())
        .with_notes(notes.unwrap_or_default());

    let record = app.hooks.claim_feedback(Some(id)).submit(&form).await?;

    out.success(&format!(
        "Feedback recorded for {}: {}",
        record.claim_id, record.decision
    ));
    if let Some(ratio) = record.correction_ratio {
        out.kv("Correction ratio", &ratio.to_string());
    }
    if let Some(notes) = record.notes.as_deref() {
        out.kv("Notes", notes);
    }
    Ok(())
}

/// Tariff flags as report parameters.
pub fn tariff_params(args: &TariffArgs) -> TariffInsightParams {
    TariffInsightParams {
        province: args.province.clone(),
        facility_id: args.facility_id.clone(),
        severity: args.severity.clone(),
        service_type: args.service_type.clone(),
        dx_group: args.dx_group.clone(),
        limit: args.limit,
    }
}

async fn reports(app: &App, out: &Output, report: ReportCommands) -> Result<()> {
    app.require_session().await?;
    match report {
        ReportCommands::Severity { limit } => {
            let rows = into_data(app.hooks.severity_mismatch(limit).load().await)?;
            out.header("Severity mismatch");
            if rows.is_empty() {
                out.info("No severity mismatches found.");
            } else {
                let rows: Vec<Vec<String>> = rows.iter().map(render::severity_row).collect();
                out.table(&render::SEVERITY_HEADERS, &rows);
            }
        }
        ReportCommands::Duplicates { limit } => {
            let rows = into_data(app.hooks.duplicate_claims(limit).load().await)?;
            out.header("Possible duplicate claims");
            if rows.is_empty() {
                out.info("No duplicate patterns found.");
            } else {
                let rows: Vec<Vec<String>> = rows.iter().map(render::duplicate_row).collect();
                out.table(&render::DUPLICATE_HEADERS, &rows);
            }
        }
        ReportCommands::Tariff(args) => {
            let params = tariff_params(&args);
            let query = app.hooks.tariff_insight(Some(&params));
            if !query.is_enabled() {
                return Err(AppError::InvalidInput(
                    "tariff insight needs --province or --facility-id".to_string(),
                ));
            }
            let rows = into_data(query.load().await)?;
            out.header("Tariff insight");
            if rows.is_empty() {
                out.info("No tariff data for this scope.");
            } else {
                let rows: Vec<Vec<String>> = rows.iter().map(render::tariff_row).collect();
                out.table(&render::TARIFF_HEADERS, &rows);
            }
        }
    }
    Ok(())
}

fn show_config(app: &App, out: &Output) {
    out.header("Configuration");
    out.paragraph(app.config.to_toml().trim_end());
    match app.config.session_dir() {
        Ok(dir) => out.kv("Session directory", &dir.display().to_string()),
        Err(err) => out.warning(&err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn claims_args(argv: &[&str]) -> ClaimsArgs {
        let mut full = vec!["casemind", "claims"];
        full.extend_from_slice(argv);
        match super::super::Cli::try_parse_from(full).unwrap().command {
            Some(Commands::Claims(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_give_bare_link() {
        let controller = claims_controller(&claims_args(&[]));
        assert_eq!(controller.shareable_url(), "/");
    }

    #[test]
    fn test_query_then_flags() {
        let controller = claims_controller(&claims_args(&[
            "--query",
            "severity=berat&page=4&province=ACEH",
            "--dx",
            "a09",
        ]));
        let filters = controller.filters();
        assert_eq!(filters.severity.as_deref(), Some("berat"));
        assert_eq!(filters.province.as_deref(), Some("ACEH"));
        // Changing a filter returns to the first page.
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_page_flag_applies_last() {
        let controller = claims_controller(&claims_args(&["--severity", "berat", "--page", "3"]));
        assert_eq!(controller.filters().page, 3);
        assert_eq!(
            controller.shareable_url(),
            "/?page=3&severity=berat"
        );
    }

    #[test]
    fn test_reset_drops_query_but_keeps_flags() {
        let controller = claims_controller(&claims_args(&[
            "--query",
            "province=ACEH&selected=C-1",
            "--reset",
            "--min-risk-score",
            "0.7",
        ]));
        let filters = controller.filters();
        assert!(filters.province.is_none());
        assert_eq!(filters.min_risk_score, Some(0.7));
        assert!(controller.selected().is_none());
    }

    #[test]
    fn test_select_adds_to_link() {
        let controller = claims_controller(&claims_args(&["--select", "C-77"]));
        assert_eq!(controller.selected().as_deref(), Some("C-77"));
        assert_eq!(controller.shareable_url(), "/?selected=C-77");
    }

    #[test]
    fn test_tariff_params_scope() {
        let params = tariff_params(&TariffArgs {
            province: Some("ACEH".to_string()),
            ..TariffArgs::default()
        });
        assert!(params.is_scoped());
        assert!(!tariff_params(&TariffArgs::default()).is_scoped());
    }

    #[test]
    fn test_into_data_prefers_error() {
        let state: QueryState<u32> = QueryState {
            data: Some(Arc::new(1)),
            error: Some(ApiError::Network("down".to_string())),
            ..QueryState::default()
        };
        assert!(matches!(
            into_data(state),
            Err(AppError::Api(ApiError::Network(_)))
        ));
    }
}
