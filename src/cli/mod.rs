//! CLI module for Casemind
//!
//! Provides command-line interface parsing and handling for the casemind binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

/// Subcommand handlers.
pub mod commands;
/// Terminal styling.
pub mod output;
/// Table rows and detail views.
pub mod render;

use casemind_core::FilterField;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Casemind AI - review high-risk health-insurance claims from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "casemind",
    author = "Casemind <build@casemind.ai>",
    version,
    about = "Casemind AI - high-risk claims review",
    long_about = "Terminal client for the Casemind claims API.\n\n\
                  Sign in once with 'login'; the session is stored locally and reused by\n\
                  every other command until you 'logout' or the API rejects it.",
    after_help = "EXAMPLES:\n    \
                  casemind login --email auditor@rs.id        # Sign in (prompts for the password)\n    \
                  casemind claims --severity berat --page 2   # Filtered, paginated claims list\n    \
                  casemind claims --query 'province=ACEH'     # Open a shared dashboard link\n    \
                  casemind claim C-1001                       # Summary and latest feedback\n    \
                  casemind chat C-1001 'Kenapa skor tinggi?'  # Ask the copilot about a claim\n    \
                  casemind feedback C-1001 --decision partial --ratio 0.6\n    \
                  casemind reports tariff --province 'DKI JAKARTA'"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./casemind.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "CASEMIND_API_BASE_URL")]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session locally
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(short, long, env = "CASEMIND_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Show the signed-in user and session expiry
    Whoami,

    /// List high-risk claims
    Claims(ClaimsArgs),

    /// Show the summary of one claim
    Claim {
        /// Claim identifier
        id: String,

        /// Bypass the cached summary
        #[arg(long)]
        refresh: bool,
    },

    /// Read or extend the copilot conversation for a claim
    ///
    /// Without a message the transcript is printed along with the
    /// follow-up questions suggested by the claim summary.
    Chat {
        /// Claim identifier
        id: String,

        /// Message to send
        message: Option<String>,
    },

    /// Record an auditor decision on a claim
    Feedback {
        /// approved, partial or rejected
        #[arg(short, long)]
        decision: String,

        /// Correction ratio between 0 and 1
        #[arg(short, long)]
        ratio: Option<String>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Claim identifier
        id: String,
    },

    /// Aggregate audit reports
    #[command(subcommand)]
    Reports(ReportCommands),

    /// Show the effective configuration
    Config,
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Low-severity claims priced above the peer P90
    Severity {
        /// Maximum number of rows
        #[arg(short, long, default_value_t = casemind_core::services::DEFAULT_REPORT_LIMIT)]
        limit: u32,
    },

    /// Claims that look like repeated episodes
    Duplicates {
        /// Maximum number of rows
        #[arg(short, long, default_value_t = casemind_core::services::DEFAULT_REPORT_LIMIT)]
        limit: u32,
    },

    /// Tariff gap per facility; needs --province or --facility-id
    Tariff(TariffArgs),
}

#[derive(Args, Debug, Default)]
pub struct TariffArgs {
    /// Province name, e.g. 'ACEH'
    #[arg(long)]
    pub province: Option<String>,

    /// Facility identifier
    #[arg(long)]
    pub facility_id: Option<String>,

    /// Severity group (ringan, sedang, berat)
    #[arg(long)]
    pub severity: Option<String>,

    /// Service type (RITL, RJTL)
    #[arg(long)]
    pub service_type: Option<String>,

    /// Diagnosis group
    #[arg(long)]
    pub dx_group: Option<String>,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Filters for the claims list. Flags are applied after `--query` and `--reset`.
#[derive(Args, Debug, Default)]
pub struct ClaimsArgs {
    /// Start from a shared query string, e.g. 'severity=berat&page=2'
    #[arg(short, long)]
    pub query: Option<String>,

    /// Drop every filter back to its default before applying flags
    #[arg(long)]
    pub reset: bool,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<String>,

    /// Rows per page: 20, 50 or 100
    #[arg(long)]
    pub page_size: Option<String>,

    /// Severity group (ringan, sedang, berat); empty to clear
    #[arg(long)]
    pub severity: Option<String>,

    /// Service type (RITL, RJTL); empty to clear
    #[arg(long)]
    pub service_type: Option<String>,

    /// Facility class, e.g. 'RS Kelas B'
    #[arg(long)]
    pub facility_class: Option<String>,

    /// Province name
    #[arg(long)]
    pub province: Option<String>,

    /// Primary diagnosis code
    #[arg(long)]
    pub dx: Option<String>,

    /// Lowest combined risk score
    #[arg(long)]
    pub min_risk_score: Option<String>,

    /// Highest combined risk score
    #[arg(long)]
    pub max_risk_score: Option<String>,

    /// Lowest model score
    #[arg(long)]
    pub min_ml_score: Option<String>,

    /// Admission date lower bound (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Admission date upper bound (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Discharge date lower bound (YYYY-MM-DD)
    #[arg(long)]
    pub discharge_start: Option<String>,

    /// Discharge date upper bound (YYYY-MM-DD)
    #[arg(long)]
    pub discharge_end: Option<String>,

    /// Ask the API to recompute instead of serving its cache
    #[arg(long)]
    pub refresh_cache: bool,

    /// Open the detail view for one claim
    #[arg(short, long)]
    pub select: Option<String>,

    /// Bypass the client cache
    #[arg(long)]
    pub refresh: bool,
}

impl ClaimsArgs {
    /// Filter flags that were given, in field order. `page` always comes last
    /// because changing any other filter resets it.
    pub fn field_updates(&self) -> Vec<(FilterField, String)> {
        let flags = [
            (FilterField::PageSize, &self.page_size),
            (FilterField::Severity, &self.severity),
            (FilterField::ServiceType, &self.service_type),
            (FilterField::FacilityClass, &self.facility_class),
            (FilterField::Province, &self.province),
            (FilterField::Dx, &self.dx),
            (FilterField::MinRiskScore, &self.min_risk_score),
            (FilterField::MaxRiskScore, &self.max_risk_score),
            (FilterField::MinMlScore, &self.min_ml_score),
            (FilterField::StartDate, &self.start_date),
            (FilterField::EndDate, &self.end_date),
            (FilterField::DischargeStart, &self.discharge_start),
            (FilterField::DischargeEnd, &self.discharge_end),
        ];

        let mut updates: Vec<(FilterField, String)> = flags
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
            .collect();
        if self.refresh_cache {
            updates.push((FilterField::RefreshCache, "true".to_string()));
        }
        if let Some(page) = &self.page {
            updates.push((FilterField::Page, page.clone()));
        }
        updates
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_claims_flags() {
        let cli = Cli::try_parse_from([
            "casemind",
            "claims",
            "--severity",
            "berat",
            "--page",
            "3",
            "--province",
            "ACEH",
        ])
        .unwrap();

        let Some(Commands::Claims(args)) = cli.command else {
            panic!("expected claims command");
        };
        assert_eq!(
            args.field_updates(),
            vec![
                (FilterField::Severity, "berat".to_string()),
                (FilterField::Province, "ACEH".to_string()),
                (FilterField::Page, "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_flag_is_kept_to_clear_a_default() {
        let cli = Cli::try_parse_from(["casemind", "claims", "--severity", ""]).unwrap();
        let Some(Commands::Claims(args)) = cli.command else {
            panic!("expected claims command");
        };
        assert_eq!(
            args.field_updates(),
            vec![(FilterField::Severity, String::new())]
        );
    }

    #[test]
    fn test_parse_feedback() {
        let cli = Cli::try_parse_from([
            "casemind",
            "feedback",
            "C-9",
            "--decision",
            "partial",
            "--ratio",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Feedback {
                id,
                decision,
                ratio,
                notes,
            }) => {
                assert_eq!(id, "C-9");
                assert_eq!(decision, "partial");
                assert_eq!(ratio.as_deref(), Some("0.5"));
                assert!(notes.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[rstest]
    #[case(&["casemind", "reports", "duplicates"], 20)]
    #[case(&["casemind", "reports", "duplicates", "--limit", "50"], 50)]
    #[case(&["casemind", "reports", "severity", "-l", "100"], 100)]
    #[case(&["casemind", "reports", "severity"], 20)]
    fn test_report_limit(#[case] argv: &[&str], #[case] expected: u32) {
        let cli = Cli::try_parse_from(argv).unwrap();
        let limit = match cli.command {
            Some(Commands::Reports(ReportCommands::Duplicates { limit }))
            | Some(Commands::Reports(ReportCommands::Severity { limit })) => limit,
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(limit, expected);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["casemind", "whoami", "--no-color", "-v"]).unwrap();
        assert!(cli.no_color);
        assert!(cli.verbose);
    }
}
