//! crates/biblia_core/src/plan.rs
//!
//! The chronological reading-plan generator: a pure function that partitions
//! an ordered list of chapter blocks into day-sized buckets and collapses each
//! day's chapters into human-readable range labels. Computed once per process
//! from static data; never persisted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::canon::{Book, ReadingBlock};

/// Default plan length in days.
pub const DEFAULT_TOTAL_DAYS: u32 = 365;

/// Where tapping a reading item should navigate to: the first chapter of the
/// collapsed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTarget {
    pub book: Book,
    pub chapter: u32,
}

/// One collapsed run of same-book chapters inside a day,
/// e.g. `"Gênesis 1-3"` or `"Obadias 1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingItem {
    pub description: String,
    pub target: ReadingTarget,
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlanEntry {
    pub day: u32,
    pub era: String,
    pub readings: Vec<ReadingItem>,
}

/// A run of consecutive days sharing the same era label, with completion
/// counts for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EraSection {
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub days: Vec<DayPlanEntry>,
}

/// The set of day numbers the user has checked off. The only persisted plan
/// artifact: serialized as a plain JSON array of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedDays(BTreeSet<u32>);

impl CompletedDays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, day: u32) -> bool {
        self.0.contains(&day)
    }

    /// Flips one day and reports whether it is now completed. Toggling the
    /// same day twice restores the previous state.
    pub fn toggle(&mut self, day: u32) -> bool {
        if self.0.remove(&day) {
            false
        } else {
            self.0.insert(day);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

struct FlatChapter {
    book: Book,
    chapter: u32,
    era: &'static str,
}

fn flatten(blocks: &[ReadingBlock]) -> Vec<FlatChapter> {
    let mut chapters = Vec::new();
    for block in blocks {
        for chapter in block.start_chapter..=block.end_chapter {
            chapters.push(FlatChapter {
                book: block.book,
                chapter,
                era: block.era,
            });
        }
    }
    chapters
}

/// Collapses one day's chapters into range-labelled reading items. A new item
/// starts on every book change and on every chapter gap, so a day straddling
/// the split psalter (…89 then 91…) yields two accurate ranges rather than a
/// label spanning a chapter the day does not contain.
fn collapse_readings(chapters: &[&FlatChapter]) -> Vec<ReadingItem> {
    let mut readings = Vec::new();
    let mut run: Option<(Book, u32, u32)> = None;

    for flat in chapters {
        match &mut run {
            Some((book, _, end)) if *book == flat.book && flat.chapter == *end + 1 => {
                *end = flat.chapter
            }
            _ => {
                if let Some(done) = run.take() {
                    readings.push(range_item(done));
                }
                run = Some((flat.book, flat.chapter, flat.chapter));
            }
        }
    }
    if let Some(done) = run {
        readings.push(range_item(done));
    }
    readings
}

fn range_item((book, start, end): (Book, u32, u32)) -> ReadingItem {
    let description = if end > start {
        format!("{} {}-{}", book.name(), start, end)
    } else {
        format!("{} {}", book.name(), start)
    };
    ReadingItem {
        description,
        target: ReadingTarget {
            book,
            chapter: start,
        },
    }
}

/// Partitions `blocks` into at most `total_days` day entries.
///
/// The pacing target is cumulative: day `d` ends once `round(d * ratio)`
/// chapters have been consumed overall, where `ratio` is total chapters over
/// total days (~3.26 for the full canon over 365 days). Rounding the
/// cumulative target makes individual days fluctuate between 3 and 4 chapters
/// while the long-run average stays on the ratio; that fluctuation is the
/// intended output, not drift to be corrected. Days that consume no chapters
/// are omitted, and the last day absorbs whatever rounding leaves over.
///
/// Total over its inputs: empty blocks or zero days yield an empty plan.
pub fn generate_plan(blocks: &[ReadingBlock], total_days: u32) -> Vec<DayPlanEntry> {
    let chapters = flatten(blocks);
    if chapters.is_empty() || total_days == 0 {
        return Vec::new();
    }

    let chapters_per_day = chapters.len() as f64 / total_days as f64;
    let mut plan = Vec::new();
    let mut cursor = 0usize;
    let mut consumed = 0usize;

    for day in 1..=total_days {
        if cursor >= chapters.len() {
            break;
        }

        let target = (day as f64 * chapters_per_day).round() as usize;
        let mut today: Vec<&FlatChapter> = Vec::new();
        while consumed < target && cursor < chapters.len() {
            today.push(&chapters[cursor]);
            cursor += 1;
            consumed += 1;
        }

        if today.is_empty() {
            continue;
        }

        plan.push(DayPlanEntry {
            day,
            era: today[0].era.to_string(),
            readings: collapse_readings(&today),
        });
    }

    plan
}

/// Groups consecutive same-era days into display sections and counts how many
/// days of each section are already checked off.
pub fn group_into_eras(days: &[DayPlanEntry], completed: &CompletedDays) -> Vec<EraSection> {
    let mut sections: Vec<EraSection> = Vec::new();

    for entry in days {
        match sections.last_mut() {
            Some(section) if section.title == entry.era => section.days.push(entry.clone()),
            _ => sections.push(EraSection {
                title: entry.era.clone(),
                completed: 0,
                total: 0,
                days: vec![entry.clone()],
            }),
        }
    }

    for section in &mut sections {
        section.total = section.days.len();
        section.completed = section
            .days
            .iter()
            .filter(|d| completed.contains(d.day))
            .count();
    }

    sections
}
