use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::log::{MetconFormat, MetconScoreEntry};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+):([0-5]\d)\s*$").expect("valid time regex"));
static ROUNDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*(?:\+\s*(\d+))?\s*$").expect("valid rounds regex"));
static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").expect("valid total regex"));

/// A metcon result reduced to something comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParsedScore {
    /// Finished in this many seconds. Lower is better.
    Time { seconds: u32 },
    /// Full rounds plus extra reps. Higher is better.
    #[serde(rename_all = "camelCase")]
    Rounds { rounds: u32, extra_reps: u32 },
    /// Plain total (calories, reps). Higher is better.
    Total { hundredths: u64 },
}

pub fn parse_score(format: MetconFormat, score: &str) -> Option<ParsedScore> {
    match format {
        MetconFormat::ForTime => {
            let caps = TIME_RE.captures(score)?;
            let minutes: u32 = caps[1].parse().ok()?;
            let seconds: u32 = caps[2].parse().ok()?;
            Some(ParsedScore::Time {
                seconds: minutes * 60 + seconds,
            })
        }
        MetconFormat::Amrap => {
            let caps = ROUNDS_RE.captures(score)?;
            let rounds = caps[1].parse().ok()?;
            let extra_reps = caps
                .get(2)
                .map(|m| m.as_str().parse())
                .transpose()
                .ok()?
                .unwrap_or(0);
            Some(ParsedScore::Rounds { rounds, extra_reps })
        }
        MetconFormat::Intervals => {
            let caps = TOTAL_RE.captures(score)?;
            let total: f64 = caps[1].parse().ok()?;
            Some(ParsedScore::Total {
                hundredths: (total * 100.0).round() as u64,
            })
        }
    }
}

/// `Ordering::Greater` when `a` is the better result.
fn compare(a: ParsedScore, b: ParsedScore) -> Ordering {
    match (a, b) {
        (ParsedScore::Time { seconds: a }, ParsedScore::Time { seconds: b }) => b.cmp(&a),
        (
            ParsedScore::Rounds {
                rounds: ra,
                extra_reps: ea,
            },
            ParsedScore::Rounds {
                rounds: rb,
                extra_reps: eb,
            },
        ) => (ra, ea).cmp(&(rb, eb)),
        (ParsedScore::Total { hundredths: a }, ParsedScore::Total { hundredths: b }) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Best entry for a workout. Unparseable scores are skipped; ties keep the earliest.
pub fn best_score(entries: &[MetconScoreEntry]) -> Option<&MetconScoreEntry> {
    entries
        .iter()
        .filter_map(|entry| parse_score(entry.format, &entry.score).map(|parsed| (entry, parsed)))
        .fold(
            None::<(&MetconScoreEntry, ParsedScore)>,
            |best, (entry, parsed)| match best {
                Some((_, best_parsed)) if compare(parsed, best_parsed) != Ordering::Greater => best,
                _ => Some((entry, parsed)),
            },
        )
        .map(|(entry, _)| entry)
}
