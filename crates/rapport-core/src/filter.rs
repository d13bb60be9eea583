//! Report filter parameters
//!
//! A date range is mandatory; everything else is an optional named query
//! parameter. Validation happens here so that a malformed filter never
//! reaches the backend.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::format::format_date;

/// Query parameter names a report endpoint uses for its date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParams {
    pub from: &'static str,
    pub to: &'static str,
}

impl DateParams {
    /// `?debut=..&fin=..` (payments, stock, consumption endpoints)
    pub const DEBUT_FIN: DateParams = DateParams {
        from: "debut",
        to: "fin",
    };

    /// `?dateFrom=..&dateTo=..` (savings endpoints)
    pub const DATE_FROM_TO: DateParams = DateParams {
        from: "dateFrom",
        to: "dateTo",
    };

    /// `?dateDebut=..&dateFin=..` (invoice endpoints)
    pub const DATE_DEBUT_FIN: DateParams = DateParams {
        from: "dateDebut",
        to: "dateFin",
    };
}

/// A secondary filter: query parameter name, display label and value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterParam {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFilter {
    from: NaiveDate,
    to: NaiveDate,
    params: Vec<FilterParam>,
}

impl ReportFilter {
    /// Create a filter for an inclusive date range
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidFilter(format!(
                "start date {} is after end date {}",
                from, to
            )));
        }
        Ok(Self {
            from,
            to,
            params: Vec::new(),
        })
    }

    /// Create a filter from possibly-missing dates (form input)
    pub fn from_options(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to),
            (None, _) => Err(Error::InvalidFilter("start date is required".into())),
            (_, None) => Err(Error::InvalidFilter("end date is required".into())),
        }
    }

    /// Parse `YYYY-MM-DD` strings
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let parse = |s: &str, which: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                Error::InvalidFilter(format!("invalid {} date '{}' (use YYYY-MM-DD)", which, s))
            })
        };
        Self::new(parse(from, "start")?, parse(to, "end")?)
    }

    /// Add a secondary filter; blank values are ignored
    pub fn with(mut self, name: &str, label: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        self.params.retain(|p| p.name != name);
        self.params.push(FilterParam {
            name: name.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Add a secondary filter when present
    pub fn with_opt<T: ToString>(self, name: &str, label: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(name, label, v),
            None => self,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn params(&self) -> &[FilterParam] {
        &self.params
    }

    /// Value of a secondary filter by query parameter name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Whether a day falls inside the inclusive range
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Query string pairs: date range first, then secondary filters in
    /// insertion order
    pub fn query(&self, dates: DateParams) -> Vec<(String, String)> {
        let mut query = vec![
            (dates.from.to_string(), self.from.format("%Y-%m-%d").to_string()),
            (dates.to.to_string(), self.to.format("%Y-%m-%d").to_string()),
        ];
        query.extend(
            self.params
                .iter()
                .map(|p| (p.name.clone(), p.value.clone())),
        );
        query
    }

    /// `Période du dd/mm/yyyy au dd/mm/yyyy`
    pub fn period_label(&self) -> String {
        format!(
            "Période du {} au {}",
            format_date(self.from),
            format_date(self.to)
        )
    }

    /// File-name friendly period, e.g. `20250101-20250131`
    pub fn period_slug(&self) -> String {
        format!(
            "{}-{}",
            self.from.format("%Y%m%d"),
            self.to.format("%Y%m%d")
        )
    }
}
