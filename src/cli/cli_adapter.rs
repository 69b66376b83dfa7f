use std::io::Write;

use error_stack::{report, ResultExt};
use thiserror::Error;
use tracing::instrument;

use crate::{
    adapters::sheets::auth::authorization_guidance,
    application::sheet_fetcher::SheetFetcher,
    config::app_config::AppConfig,
    domain::sheets::{a1_notation::A1Notation, row::ToPyLiteral},
};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Missing required argument SHEET_ID")]
    Usage,
    #[error("Failed to fetch sheet data")]
    Fetch,
    #[error("Failed to write output")]
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch { sheet_id: String, range: A1Notation },
    Usage,
}

/// `args[0]` is the program name; arguments after the range are ignored.
pub fn parse_args(args: &[String]) -> Command {
    match args.get(1) {
        Some(sheet_id) => Command::Fetch {
            sheet_id: sheet_id.clone(),
            range: args
                .get(2)
                .map(|range| A1Notation::from(range.as_str()))
                .unwrap_or_default(),
        },
        None => Command::Usage,
    }
}

pub fn usage(config: &AppConfig) -> String {
    format!(
        "\nUsage: sheet-reader 'GOOGLE_SHEET_ID' [GOOGLE_SHEET_RANGE]\n\
         Outputs contents of specified range of specified Google spreadsheet.\n\
         {}\n\
         First time usage opens browser with downloaded credentials to authorize.\n",
        authorization_guidance(&config.credentials_path())
    )
}

pub struct CliAdapter {
    config: AppConfig,
    fetcher: SheetFetcher,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

impl CliAdapter {
    pub fn new(config: AppConfig, fetcher: SheetFetcher) -> Self {
        CliAdapter { config, fetcher }
    }

    /// Prints usage to stderr for [`Command::Usage`]; otherwise writes one
    /// Python-literal line per row to `out`.
    #[instrument(skip(self, out))]
    pub async fn run<W: Write>(
        &self,
        args: &[String],
        out: &mut W,
    ) -> error_stack::Result<(), CliError> {
        let (sheet_id, range) = match parse_args(args) {
            Command::Fetch { sheet_id, range } => (sheet_id, range),
            Command::Usage => {
                eprint!("{}", usage(&self.config));
                return Err(report!(CliError::Usage));
            }
        };

        let rows = self
            .fetcher
            .get_sheet_data(&sheet_id, &range, None)
            .await
            .change_context(CliError::Fetch)?;

        for row in rows {
            writeln!(out, "{}", row.to_py_literal()).change_context(CliError::Output)?;
        }
        out.flush().change_context(CliError::Output)?;

        Ok(())
    }
}
