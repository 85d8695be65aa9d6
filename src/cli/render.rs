//! Terminal views for claims, summaries, chat and reports.
//!
//! Row builders are pure so the tables can be tested without a terminal.

use casemind_core::format::{
    format_currency, format_date, format_number, format_optional_currency, humanize_flag, EMPTY,
};
use casemind_core::types::{
    ClaimChatMessage, ClaimSummary, DuplicateClaimRow, FeedbackSnapshot, HighRiskClaim,
    HighRiskMeta, SeverityMismatchRow, TariffInsightRow,
};

use super::output::Output;

/// Columns of the claims table.
pub const CLAIM_HEADERS: [&str; 9] = [
    "Claim", "Facility", "Province", "Dx", "Severity", "Claimed", "Gap", "Risk", "Flags",
];

/// Columns of the severity mismatch report.
pub const SEVERITY_HEADERS: [&str; 8] = [
    "Claim", "Dx", "Province", "Class", "LOS", "Claimed", "Peer P90", "Delta",
];

/// Columns of the duplicate claims report.
pub const DUPLICATE_HEADERS: [&str; 5] = ["Claim", "Matched", "Dx", "Procedure", "Gap (days)"];

/// Columns of the tariff insight report.
pub const TARIFF_HEADERS: [&str; 8] = [
    "Facility", "Province", "District", "Dx group", "Claims", "Claimed", "Gap", "Avg gap",
];

fn text(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY)
        .to_string()
}

fn score(value: f64) -> String {
    format_number(value, 2)
}

fn optional_number(value: Option<f64>, digits: usize) -> String {
    value
        .map(|v| format_number(v, digits))
        .unwrap_or_else(|| EMPTY.to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}%", format_number(v, 1)))
        .unwrap_or_else(|| EMPTY.to_string())
}

/// One claims table row, in [`CLAIM_HEADERS`] order.
pub fn claim_row(claim: &HighRiskClaim) -> Vec<String> {
    let mut flags = claim
        .flags
        .iter()
        .map(|f| humanize_flag(f))
        .collect::<Vec<_>>();
    if claim.duplicate_pattern {
        flags.push("duplicate pattern".to_string());
    }

    vec![
        claim.claim_id.clone(),
        text(claim.facility_name.as_deref()),
        text(claim.province_name.as_deref()),
        text(claim.dx_primary_code.as_deref()),
        text(claim.severity_group.as_deref()),
        format_currency(claim.amount_claimed),
        format_currency(claim.amount_gap),
        score(claim.risk_score),
        if flags.is_empty() {
            EMPTY.to_string()
        } else {
            flags.join(", ")
        },
    ]
}

/// `Showing 41-60 of 137`, or a plain notice when the page is empty.
pub fn pagination_line(meta: &HighRiskMeta, rows_on_page: usize) -> String {
    if rows_on_page == 0 || meta.total == 0 {
        return format!("No claims on page {} of {}", meta.page, meta.total_pages());
    }
    let first = meta.first_row();
    let last = first + rows_on_page as u64 - 1;
    format!(
        "Showing {}-{} of {} (page {} of {})",
        first,
        last,
        format_number(meta.total as f64, 0),
        meta.page,
        meta.total_pages()
    )
}

/// One severity mismatch row.
pub fn severity_row(row: &SeverityMismatchRow) -> Vec<String> {
    vec![
        row.claim_id.clone(),
        text(row.dx_primary.as_deref()),
        text(row.province.as_deref()),
        text(row.facility_class.as_deref()),
        optional_number(row.los, 0),
        format_optional_currency(row.claimed),
        format_optional_currency(row.peer_p90),
        percent(row.delta_pct),
    ]
}

/// One duplicate claims row.
pub fn duplicate_row(row: &DuplicateClaimRow) -> Vec<String> {
    vec![
        row.claim_id.clone(),
        text(row.matched_claim_id.as_deref()),
        text(row.dx_primary.as_deref()),
        text(row.procedure_code.as_deref()),
        optional_number(row.episode_gap_days, 0),
    ]
}

/// One tariff insight row.
pub fn tariff_row(row: &TariffInsightRow) -> Vec<String> {
    vec![
        text(Some(row.facility_name.as_str())),
        text(Some(row.province_name.as_str())),
        text(Some(row.district_name.as_str())),
        text(row.dx_primary_group.as_deref()),
        format_number(row.claim_count as f64, 0),
        format_currency(row.total_claimed),
        format_currency(row.total_gap),
        format_currency(row.avg_gap),
    ]
}

/// One line describing the most recent auditor decision.
pub fn feedback_line(feedback: &FeedbackSnapshot) -> Option<String> {
    let decision = feedback.decision.as_deref()?;
    let mut line = decision.to_string();
    if let Some(ratio) = feedback.correction_ratio {
        line.push_str(&format!(" (ratio {})", format_number(ratio, 2)));
    }
    if let Some(notes) = feedback.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        line.push_str(&format!(" - {}", notes));
    }
    Some(line)
}

/// Claims table followed by the pagination footer.
pub fn print_claims(out: &Output, claims: &[HighRiskClaim], meta: &HighRiskMeta) {
    if claims.is_empty() {
        out.info("No claims match the current filters.");
        return;
    }
    let rows: Vec<Vec<String>> = claims.iter().map(claim_row).collect();
    out.table(&CLAIM_HEADERS, &rows);
    out.newline();
    out.info(&pagination_line(meta, claims.len()));
    if !meta.model_version.is_empty() || !meta.ruleset_version.is_empty() {
        out.kv(
            "Model / ruleset",
            &format!(
                "{} / {}",
                text(Some(meta.model_version.as_str())),
                text(Some(meta.ruleset_version.as_str()))
            ),
        );
    }
}

/// Claim detail: scores, costs, peer comparison and generated sections.
pub fn print_summary(out: &Output, summary: &ClaimSummary) {
    out.header(&format!("Claim {}", summary.claim_id));

    let claim = &summary.claim;
    out.kv(
        "Diagnosis",
        &format!(
            "{} {}",
            text(claim.dx_primary_code.as_deref()),
            claim.dx_primary_label.as_deref().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
    );
    out.kv("Severity", &text(claim.severity_group.as_deref()));
    out.kv("Service type", &text(claim.service_type.as_deref()));
    out.kv("Facility class", &text(claim.facility_class.as_deref()));
    out.kv("Province", &text(claim.province_name.as_deref()));
    out.kv("Length of stay", &optional_number(claim.los, 0));
    out.kv("Claimed", &format_optional_currency(claim.amount_claimed));
    out.kv("Paid", &format_optional_currency(claim.amount_paid));
    out.kv("Gap", &format_optional_currency(claim.amount_gap));

    out.subheader("Scores");
    out.kv("Risk", &score(summary.risk_score));
    out.kv("Rule", &optional_number(summary.rule_score, 2));
    out.kv("ML", &optional_number(summary.ml_score, 2));
    out.kv("ML (normalized)", &optional_number(summary.ml_score_normalized, 2));
    out.kv("Payment ratio", &optional_number(summary.bpjs_payment_ratio, 2));
    out.kv("Peer P90", &format_optional_currency(summary.peer.p90));
    out.kv("Cost z-score", &optional_number(summary.peer.cost_zscore, 2));

    if !summary.flags.is_empty() {
        out.subheader("Flags");
        for flag in &summary.flags {
            out.list_item(&humanize_flag(flag));
        }
    }

    for section in &summary.sections {
        out.subheader(&section.title);
        out.paragraph(&section.content);
    }

    if let Some(generated) = summary
        .generative_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        out.subheader("Copilot summary");
        out.paragraph(generated);
    } else if !summary.narrative.trim().is_empty() {
        out.subheader("Narrative");
        out.paragraph(&summary.narrative);
    }

    out.subheader("Latest feedback");
    match summary.latest_feedback.as_ref().and_then(feedback_line) {
        Some(line) => out.info(&line),
        None => out.info("No feedback recorded yet."),
    }

    out.newline();
    out.kv("Generated", &format_date(summary.generated_at.as_deref()));
    out.kv(
        "Model / ruleset",
        &format!(
            "{} / {}",
            text(Some(summary.model_version.as_str())),
            text(Some(summary.ruleset_version.as_str()))
        ),
    );
}

/// Chat transcript, oldest first.
pub fn print_chat(out: &Output, messages: &[ClaimChatMessage]) {
    if messages.is_empty() {
        out.info("No messages yet.");
        return;
    }
    for message in messages {
        let speaker = if message.is_assistant() {
            "Copilot"
        } else {
            "You"
        };
        out.chat_line(speaker, message.is_assistant(), &message.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim() -> HighRiskClaim {
        serde_json::from_value(json!({
            "claim_id": "C-1",
            "facility_name": "RSUD Banda Aceh",
            "province_name": "ACEH",
            "dx_primary_code": "A09",
            "severity_group": "sedang",
            "amount_claimed": 1500000.0,
            "amount_gap": 250000.0,
            "risk_score": 0.876,
            "flags": ["short_stay_high_cost"],
            "duplicate_pattern": true
        }))
        .unwrap()
    }

    fn meta(total: u64, page: u32) -> HighRiskMeta {
        HighRiskMeta {
            total,
            page,
            page_size: 20,
            model_version: String::new(),
            ruleset_version: String::new(),
            filters: None,
        }
    }

    #[test]
    fn test_claim_row() {
        let row = claim_row(&claim());
        assert_eq!(row.len(), CLAIM_HEADERS.len());
        assert_eq!(row[1], "RSUD Banda Aceh");
        assert_eq!(row[5], "Rp 1.500.000");
        assert_eq!(row[7], "0,88");
        assert_eq!(row[8], "short stay high cost, duplicate pattern");
    }

    #[test]
    fn test_missing_text_uses_placeholder() {
        let mut claim = claim();
        claim.facility_name = None;
        claim.province_name = Some("  ".to_string());
        let row = claim_row(&claim);
        assert_eq!(row[1], "-");
        assert_eq!(row[2], "-");
    }

    #[test]
    fn test_pagination_line() {
        assert_eq!(
            pagination_line(&meta(137, 3), 20),
            "Showing 41-60 of 137 (page 3 of 7)"
        );
        assert_eq!(
            pagination_line(&meta(1500, 1), 20),
            "Showing 1-20 of 1.500 (page 1 of 75)"
        );
        assert_eq!(pagination_line(&meta(0, 1), 0), "No claims on page 1 of 1");
    }

    #[test]
    fn test_feedback_line() {
        let feedback = FeedbackSnapshot {
            decision: Some("partial".to_string()),
            correction_ratio: Some(0.6),
            notes: Some("LOS tidak sesuai".to_string()),
            ..FeedbackSnapshot::default()
        };
        assert_eq!(
            feedback_line(&feedback).as_deref(),
            Some("partial (ratio 0,6) - LOS tidak sesuai")
        );
        assert_eq!(feedback_line(&FeedbackSnapshot::default()), None);
    }

    #[test]
    fn test_severity_row_percent() {
        let row: SeverityMismatchRow = serde_json::from_value(json!({
            "claim_id": "C-2",
            "claimed": 9000000.0,
            "peer_p90": 4000000.0,
            "delta_pct": 125.0
        }))
        .unwrap();
        let cells = severity_row(&row);
        assert_eq!(cells[5], "Rp 9.000.000");
        assert_eq!(cells[7], "125%");
        assert_eq!(cells[4], "-");
    }
}
