//! Report generation state
//!
//! `Idle → Loading → Success | Empty | Failed`. There is no retry and no
//! cancellation: each generation takes a ticket, and the last response to
//! arrive is the one shown even when a newer generation has started since.
//! Such out-of-order completions are logged.

use serde::Serialize;
use tracing::{error, warn};

use crate::error::Result;
use crate::filter::ReportFilter;
use crate::reports::{generate_kind, ReportKind, ReportView};
use crate::source::RecordSource;

/// Message shown for any fetch failure
pub const FETCH_FAILED_MESSAGE: &str = "Échec de la récupération des données";

/// Message shown when a report has no records
pub const NO_RECORDS_MESSAGE: &str = "Aucune donnée trouvée pour la période sélectionnée";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReportState {
    Idle,
    Loading { generation: u64 },
    Success { view: Box<ReportView> },
    Empty { view: Box<ReportView> },
    Failed { message: String },
}

impl ReportState {
    pub fn name(&self) -> &'static str {
        match self {
            ReportState::Idle => "idle",
            ReportState::Loading { .. } => "loading",
            ReportState::Success { .. } => "success",
            ReportState::Empty { .. } => "empty",
            ReportState::Failed { .. } => "failed",
        }
    }

    /// The rendered view, for both populated and empty reports
    pub fn view(&self) -> Option<&ReportView> {
        match self {
            ReportState::Success { view } | ReportState::Empty { view } => Some(view),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReportState::Loading { .. })
    }
}

/// Identifies one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
}

#[derive(Debug)]
pub struct ReportRunner {
    kind: ReportKind,
    state: ReportState,
    generation: u64,
}

impl ReportRunner {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            state: ReportState::Idle,
            generation: 0,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn state(&self) -> &ReportState {
        &self.state
    }

    /// Validate the filter and enter `Loading`
    ///
    /// A rejected filter leaves the state untouched and no ticket is issued.
    pub fn begin(&mut self, filter: &ReportFilter) -> Result<Ticket> {
        self.kind.validate(filter)?;
        self.generation += 1;
        self.state = ReportState::Loading {
            generation: self.generation,
        };
        Ok(Ticket {
            generation: self.generation,
        })
    }

    /// Apply the outcome of a generation
    pub fn complete(&mut self, ticket: Ticket, result: Result<ReportView>) -> &ReportState {
        if ticket.generation < self.generation {
            warn!(
                "{}: applying response of generation {} after generation {} started",
                self.kind, ticket.generation, self.generation
            );
        }

        self.state = match result {
            Ok(view) if view.is_empty() => ReportState::Empty {
                view: Box::new(view),
            },
            Ok(view) => ReportState::Success {
                view: Box::new(view),
            },
            Err(e) => {
                error!("{}: report generation failed: {}", self.kind, e);
                ReportState::Failed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        };
        &self.state
    }

    /// Run one generation to completion
    ///
    /// Filter errors are returned before any request; fetch errors end in
    /// the `Failed` state.
    pub async fn generate<S>(&mut self, source: &S, filter: &ReportFilter) -> Result<&ReportState>
    where
        S: RecordSource + ?Sized,
    {
        let ticket = self.begin(filter)?;
        let result = generate_kind(source, self.kind, filter).await;
        Ok(self.complete(ticket, result))
    }
}
