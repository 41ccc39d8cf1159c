use biblia_core::canon::{Book, ReadingBlock, CANON_CHAPTER_COUNT, CHRONOLOGICAL_BLOCKS};
use biblia_core::plan::{
    generate_plan, group_into_eras, CompletedDays, DayPlanEntry, ReadingItem, DEFAULT_TOTAL_DAYS,
};

fn flatten_blocks(blocks: &[ReadingBlock]) -> Vec<(Book, u32)> {
    blocks
        .iter()
        .flat_map(|b| (b.start_chapter..=b.end_chapter).map(move |c| (b.book, c)))
        .collect()
}

/// Recovers the chapter range a collapsed reading item covers from its label,
/// e.g. "1 Samuel 5-8" -> (5, 8) and "Salmos 90" -> (90, 90).
fn label_range(item: &ReadingItem) -> (u32, u32) {
    let last = item.description.rsplit(' ').next().unwrap();
    match last.split_once('-') {
        Some((start, end)) => (start.parse().unwrap(), end.parse().unwrap()),
        None => (last.parse().unwrap(), last.parse().unwrap()),
    }
}

/// Expands a plan back into the chapter sequence it consumed, asserting along
/// the way that each item's target points at the first chapter of its range.
fn consumed_sequence(plan: &[DayPlanEntry]) -> Vec<(Book, u32)> {
    let mut sequence = Vec::new();
    for day in plan {
        for item in &day.readings {
            let (start, end) = label_range(item);
            assert_eq!(item.target.chapter, start, "target must open the range");
            for chapter in start..=end {
                sequence.push((item.target.book, chapter));
            }
        }
    }
    sequence
}

#[test]
fn full_canon_plan_reproduces_the_block_sequence_exactly() {
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);
    let expected = flatten_blocks(CHRONOLOGICAL_BLOCKS);

    assert_eq!(expected.len() as u32, CANON_CHAPTER_COUNT);
    assert_eq!(consumed_sequence(&plan), expected);
    assert!(plan.len() as u32 <= DEFAULT_TOTAL_DAYS);
    assert!(plan.last().unwrap().day <= DEFAULT_TOTAL_DAYS);
}

#[test]
fn full_canon_days_carry_three_or_four_chapters() {
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);
    for day in &plan {
        let count: u32 = day
            .readings
            .iter()
            .map(|r| {
                let (start, end) = label_range(r);
                end - start + 1
            })
            .sum();
        assert!(
            (3..=4).contains(&count),
            "day {} consumed {count} chapters",
            day.day
        );
    }
}

#[test]
fn full_canon_plan_opens_as_published() {
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);
    assert_eq!(plan[0].day, 1);
    assert_eq!(plan[0].era, "1. Criação e Queda");
    assert_eq!(plan[0].readings[0].description, "Gênesis 1-3");
    assert_eq!(plan[1].readings[0].description, "Gênesis 4-7");
}

#[test]
fn same_book_ranges_within_a_day_stay_disjoint_and_ascending() {
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);
    for day in &plan {
        for pair in day.readings.windows(2) {
            if pair[0].target.book == pair[1].target.book {
                let (_, first_end) = label_range(&pair[0]);
                let (second_start, _) = label_range(&pair[1]);
                assert!(
                    second_start > first_end,
                    "day {} has overlapping ranges for {}",
                    day.day,
                    pair[0].target.book.name()
                );
            }
        }
    }
}

#[test]
fn split_psalter_never_merges_across_its_gap() {
    // Salmos 90 is read back in the wilderness era, so the later psalm runs
    // jump from 89 straight to 91. A day spanning that jump must keep two
    // separate items; no label may span the missing chapter.
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);
    for day in &plan {
        for item in &day.readings {
            if item.target.book == Book::Salmos {
                let (start, end) = label_range(item);
                if start <= 90 && 90 <= end {
                    assert_eq!((start, end), (90, 90), "day {} spans the gap", day.day);
                }
            }
        }
    }
}

#[test]
fn day_boundary_crossing_books_splits_into_two_items() {
    // Two chapters of one book followed by three of another, over two days:
    // the crossover lands inside day one, which must list both books.
    let blocks = [
        ReadingBlock {
            book: Book::Genesis,
            start_chapter: 1,
            end_chapter: 2,
            era: "Era A",
        },
        ReadingBlock {
            book: Book::Exodo,
            start_chapter: 1,
            end_chapter: 3,
            era: "Era B",
        },
    ];

    let plan = generate_plan(&blocks, 2);
    assert_eq!(plan.len(), 2);

    // 5 chapters / 2 days rounds the first cumulative target up to 3.
    let day1 = &plan[0];
    assert_eq!(day1.era, "Era A");
    assert_eq!(
        day1.readings
            .iter()
            .map(|r| r.description.as_str())
            .collect::<Vec<_>>(),
        vec!["Gênesis 1-2", "Êxodo 1"]
    );

    let day2 = &plan[1];
    assert_eq!(day2.era, "Era B");
    assert_eq!(day2.readings.len(), 1);
    assert_eq!(day2.readings[0].description, "Êxodo 2-3");
    assert_eq!(day2.readings[0].target.book, Book::Exodo);
    assert_eq!(day2.readings[0].target.chapter, 2);
}

#[test]
fn uneven_totals_terminate_without_losing_chapters() {
    let blocks = [ReadingBlock {
        book: Book::Jonas,
        start_chapter: 1,
        end_chapter: 4,
        era: "Era",
    }];

    // 4 chapters over 3 days: rounding cannot divide evenly, the plan must
    // still consume everything within the allotted days.
    let plan = generate_plan(&blocks, 3);
    assert!(plan.len() <= 3);
    let consumed = consumed_sequence(&plan);
    assert_eq!(consumed.len(), 4);
    assert_eq!(consumed, flatten_blocks(&blocks));
}

#[test]
fn more_days_than_chapters_omits_empty_days() {
    let blocks = [ReadingBlock {
        book: Book::Joel,
        start_chapter: 1,
        end_chapter: 3,
        era: "Era",
    }];

    let plan = generate_plan(&blocks, 10);
    assert_eq!(plan.len(), 3, "each chapter lands on its own day");
    for day in &plan {
        assert_eq!(day.readings.len(), 1);
    }
    // Day numbers keep counting through the omitted empty days.
    let days: Vec<u32> = plan.iter().map(|d| d.day).collect();
    assert!(days.windows(2).all(|w| w[0] < w[1]));
    assert!(days.last().unwrap() <= &10);
}

#[test]
fn degenerate_inputs_yield_empty_plans() {
    assert!(generate_plan(&[], DEFAULT_TOTAL_DAYS).is_empty());
    assert!(generate_plan(CHRONOLOGICAL_BLOCKS, 0).is_empty());
}

#[test]
fn era_sections_group_consecutive_days_and_count_progress() {
    let plan = generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS);

    let mut completed = CompletedDays::new();
    completed.toggle(1);
    completed.toggle(2);

    let sections = group_into_eras(&plan, &completed);
    assert_eq!(sections[0].title, "1. Criação e Queda");
    assert_eq!(sections[0].completed, 2);
    assert!(sections[0].total >= sections[0].completed);

    // Sections partition the plan without reordering.
    let total_days: usize = sections.iter().map(|s| s.days.len()).sum();
    assert_eq!(total_days, plan.len());
    let flattened: Vec<u32> = sections
        .iter()
        .flat_map(|s| s.days.iter().map(|d| d.day))
        .collect();
    let original: Vec<u32> = plan.iter().map(|d| d.day).collect();
    assert_eq!(flattened, original);

    // An era interrupted by another (the minor prophets around Isaías)
    // produces separate sections with the same title, never one merged bucket.
    let minor_prophets = sections
        .iter()
        .filter(|s| s.title == "16. Profetas Menores")
        .count();
    assert!(minor_prophets >= 2);

    // Adjacent sections always differ in title.
    for pair in sections.windows(2) {
        assert_ne!(pair[0].title, pair[1].title);
    }
}
