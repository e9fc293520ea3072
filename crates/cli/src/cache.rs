//! Memoised statistic queries.
//!
//! The series store never changes after loading, so every answer is a pure
//! function of its query and can be kept for the life of the process.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;

use contagion_analysis::SeriesManager;
use contagion_core::PriceStream;

/// One statistic request, keyed by its exact parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    Global {
        stream: PriceStream,
        max_shift: usize,
        instrument: String,
        region: String,
    },
    Local {
        stream: PriceStream,
        max_gap: usize,
        instrument: String,
        region: String,
    },
    Weekly {
        stream: PriceStream,
        shift: usize,
        instrument: String,
        region: String,
    },
}

/// Parses `<kind> <stream> <number> <instrument> <region>`, where the number
/// is the max shift, max gap or shift depending on the kind.
impl FromStr for Query {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [kind, stream, number, instrument, region] = parts.as_slice() else {
            bail!("expected '<kind> <stream> <number> <instrument> <region>', got '{line}'");
        };

        let stream: PriceStream = stream.parse()?;
        let number: usize = number
            .parse()
            .with_context(|| format!("invalid number '{number}'"))?;
        let instrument = instrument.to_string();
        let region = region.to_string();

        match kind.to_lowercase().as_str() {
            "global" => Ok(Query::Global {
                stream,
                max_shift: number,
                instrument,
                region,
            }),
            "local" => Ok(Query::Local {
                stream,
                max_gap: number,
                instrument,
                region,
            }),
            "weekly" => Ok(Query::Weekly {
                stream,
                shift: number,
                instrument,
                region,
            }),
            other => Err(anyhow!(
                "Unknown query kind: '{}'. Valid kinds: global, local, weekly",
                other
            )),
        }
    }
}

/// Result of a query: a coefficient sequence or a single coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Series(Vec<f64>),
    Coefficient(f64),
}

/// Query cache in front of a [`SeriesManager`].
///
/// Only successful answers are stored; a failing query is recomputed (and
/// fails again) on every request.
pub struct StatisticsCache<'a> {
    manager: &'a SeriesManager,
    entries: HashMap<Query, Answer>,
    hits: usize,
    misses: usize,
}

impl<'a> StatisticsCache<'a> {
    pub fn new(manager: &'a SeriesManager) -> Self {
        Self {
            manager,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Answers `query`, computing it only on first request.
    ///
    /// # Errors
    /// Propagates the manager's error for the query unchanged.
    pub fn get(&mut self, query: &Query) -> contagion_core::Result<Answer> {
        if let Some(answer) = self.entries.get(query) {
            self.hits += 1;
            return Ok(answer.clone());
        }

        self.misses += 1;
        let answer = self.compute(query)?;
        self.entries.insert(query.clone(), answer.clone());
        Ok(answer)
    }

    fn compute(&self, query: &Query) -> contagion_core::Result<Answer> {
        match query {
            Query::Global {
                stream,
                max_shift,
                instrument,
                region,
            } => self
                .manager
                .global_statistics(*stream, *max_shift, instrument, region)
                .map(Answer::Series),
            Query::Local {
                stream,
                max_gap,
                instrument,
                region,
            } => self
                .manager
                .local_statistics(*stream, instrument, region, *max_gap)
                .map(Answer::Coefficient),
            Query::Weekly {
                stream,
                shift,
                instrument,
                region,
            } => self
                .manager
                .weekly_statistics(*stream, *shift, instrument, region)
                .map(Answer::Series),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
