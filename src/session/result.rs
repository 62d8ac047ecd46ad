use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::lesson::Stream;

/// Outcome of a finished lesson, handed to the owner with the completion signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonSummary {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    /// Symbols typed right on the first attempt.
    pub correct: usize,
    /// Wrong attempts across the whole lesson.
    pub incorrect: usize,
    pub total_symbols: usize,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub per_symbol: Vec<SymbolTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolTime {
    pub symbol: char,
    pub time_ms: f64,
    pub first_try: bool,
    pub attempts: usize,
}

impl LessonSummary {
    pub fn from_stream(stream: &Stream, elapsed: Duration) -> Self {
        let per_symbol: Vec<SymbolTime> = stream
            .symbols()
            .iter()
            .filter(|s| s.is_passed())
            .map(|s| {
                let attempts = s.attempts();
                let time_ms = match (attempts.first(), attempts.last()) {
                    (Some(first), Some(last)) => {
                        last.ended_at
                            .saturating_duration_since(first.started_at)
                            .as_secs_f64()
                            * 1000.0
                    }
                    _ => 0.0,
                };
                SymbolTime {
                    symbol: s.target.symbol,
                    time_ms,
                    first_try: s.first_try(),
                    attempts: attempts.len(),
                }
            })
            .collect();

        let total_symbols = stream.len();
        let correct = per_symbol.iter().filter(|t| t.first_try).count();
        let accuracy = if total_symbols > 0 {
            (correct as f64 / total_symbols as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let elapsed_secs = elapsed.as_secs_f64();
        let cpm = if elapsed_secs < 0.1 {
            0.0
        } else {
            total_symbols as f64 / (elapsed_secs / 60.0)
        };

        Self {
            wpm: cpm / 5.0,
            cpm,
            accuracy,
            correct,
            incorrect: stream.error_count(),
            total_symbols,
            elapsed_secs,
            timestamp: Utc::now(),
            per_symbol,
        }
    }
}
