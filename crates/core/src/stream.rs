use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One of the four daily price streams of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStream {
    Open,
    High,
    Low,
    Close,
}

impl PriceStream {
    /// All streams, in storage order.
    pub const ALL: [PriceStream; 4] = [Self::Open, Self::High, Self::Low, Self::Close];

    /// Position of the stream in `ALL`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Open => 0,
            Self::High => 1,
            Self::Low => 2,
            Self::Close => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
        }
    }
}

impl std::str::FromStr for PriceStream {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "o" => Ok(Self::Open),
            "high" | "h" => Ok(Self::High),
            "low" | "l" => Ok(Self::Low),
            "close" | "c" => Ok(Self::Close),
            _ => Err(AnalysisError::InvalidInput(format!(
                "invalid price stream: '{s}'. Valid values: open, high, low, close"
            ))),
        }
    }
}

impl std::fmt::Display for PriceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily OHLC levels of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    #[must_use]
    pub const fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Level of the given stream.
    #[must_use]
    pub const fn level(&self, stream: PriceStream) -> f64 {
        match stream {
            PriceStream::Open => self.open,
            PriceStream::High => self.high,
            PriceStream::Low => self.low,
            PriceStream::Close => self.close,
        }
    }
}
