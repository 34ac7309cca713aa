//! Property-based checks over generated product rows.

use nutri_score::nutrition::{
    annotate, NutriGrade, NutriScore, OutputColumns, DEFAULT_GROUP_FIELD,
};
use nutri_score::Record;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

const GROUPS: [&str; 6] = [
    "Cheese",
    "Fats",
    "Sweetened beverages",
    "Fruit nectars",
    "Vegetables",
    "Biscuits and cakes",
];

const NUTRIENTS: [&str; 9] = [
    "energy_100g",
    "sugars_100g",
    "saturated-fat_100g",
    "monounsaturated-fat_100g",
    "polyunsaturated-fat_100g",
    "sodium_100g",
    "fiber_100g",
    "proteins_100g",
    "fruits-vegetables-nuts_100g",
];

fn product() -> impl Strategy<Value = Record> {
    (
        option::of(0..GROUPS.len()),
        vec(option::of(0.0f64..4000.0), NUTRIENTS.len()),
    )
        .prop_map(|(group, values)| {
            let mut record = Record::new();
            if let Some(index) = group {
                record.set(DEFAULT_GROUP_FIELD, GROUPS[index]);
            }
            for (field, value) in NUTRIENTS.iter().zip(values) {
                record.set(*field, value);
            }
            record
        })
}

proptest! {
    /// Parallel scoring matches the sequential pass row for row.
    #[test]
    fn parallel_scoring_matches_sequential(records in vec(product(), 0..40)) {
        let scorer = NutriScore::standard().expect("standard scorer");
        prop_assert_eq!(
            scorer.compute(&records, None),
            scorer.compute_parallel(&records, None)
        );
    }

    /// Scores stay within the reachable range and only unclassified rows are unscored.
    #[test]
    fn scores_are_bounded(record in product()) {
        let scorer = NutriScore::standard().expect("standard scorer");
        match scorer.breakdown(&record, None) {
            Some(breakdown) => {
                prop_assert!(breakdown.negative_points <= 40);
                prop_assert!(breakdown.positive_points <= 21);
                prop_assert_eq!(
                    breakdown.score,
                    breakdown.negative_points as i32 - breakdown.positive_points as i32
                );
            }
            None => prop_assert!(record.is_missing(DEFAULT_GROUP_FIELD)),
        }
    }

    /// Re-annotating an annotated batch changes nothing.
    #[test]
    fn annotation_is_idempotent(records in vec(product(), 1..20)) {
        let scorer = NutriScore::standard().expect("standard scorer");
        let columns = OutputColumns::default();

        let mut once = records.clone();
        let first = annotate(&scorer, &mut once, &columns, false);
        let mut twice = once.clone();
        let second = annotate(&scorer, &mut twice, &columns, false);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(first, second);
    }

    /// Grades only ever come from the documented score bands.
    #[test]
    fn grades_follow_score_bands(score in -30i32..60) {
        let grade = NutriGrade::from_score(f64::from(score));
        let expected = match score {
            -15..=-1 => Some(NutriGrade::A),
            i32::MIN..=-16 => Some(NutriGrade::B),
            0..=10 => Some(NutriGrade::C),
            11..=18 => Some(NutriGrade::D),
            19..=40 => Some(NutriGrade::E),
            _ => None,
        };
        prop_assert_eq!(grade, expected);
    }
}
