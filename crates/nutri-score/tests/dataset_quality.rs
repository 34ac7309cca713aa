use nutri_score::dataset::{
    col_completeness, empty_columns, full_columns, remove_duplicates, Completeness, DatasetError,
    FillFilter, FillStat, Table,
};
use nutri_score::nutrition::{NutriScore, DEFAULT_GROUP_FIELD};
use nutri_score::Record;

fn export() -> Table {
    let columns = ["code", "product_name", DEFAULT_GROUP_FIELD, "energy_100g", "fiber_100g"]
        .into_iter()
        .map(String::from)
        .collect();
    Table::new(
        columns,
        vec![
            Record::new()
                .with("code", "001")
                .with("product_name", "Lentils")
                .with(DEFAULT_GROUP_FIELD, "Legumes")
                .with("fiber_100g", 8.0),
            Record::new()
                .with("code", "002")
                .with("product_name", "Cola")
                .with(DEFAULT_GROUP_FIELD, "Sweetened beverages")
                .with("energy_100g", 180.0),
            Record::new()
                .with("code", "001")
                .with(DEFAULT_GROUP_FIELD, "Legumes")
                .with("energy_100g", 1400.0),
            Record::new().with("product_name", "Unlabelled"),
        ],
    )
}

#[test]
fn duplicates_collapse_before_scoring() {
    let mut table = export();

    let groups = remove_duplicates(&mut table, "code", true).expect("code column exists");

    assert_eq!(groups.len(), 1);
    let lentils = &groups[0];
    assert_eq!(lentils.key, "001");
    assert_eq!(lentils.kept_row, 0, "first row has more filled cells");
    assert_eq!(lentils.removed_rows, vec![2]);
    assert_eq!(lentils.changed_columns, vec!["energy_100g".to_string()]);
    assert_eq!(table.shape(), (3, 5), "rows without a code are kept");

    let scorer = NutriScore::standard().expect("standard scorer");
    assert_eq!(
        scorer.compute(table.rows(), None),
        vec![Some(-1), Some(6), None]
    );
}

#[test]
fn completeness_reports_after_cleanup() {
    let mut table = export();
    remove_duplicates(&mut table, "code", true).expect("code column exists");

    let full = col_completeness(&table, FillFilter::AtLeast(1.0), FillStat::Names)
        .expect("valid filter");
    assert_eq!(full, Completeness::Names(vec!["product_name".to_string()]));
    assert_eq!(full_columns(&table), vec!["product_name".to_string()]);
    assert!(empty_columns(&table).is_empty());

    let partial = col_completeness(
        &table,
        FillFilter::Between(0.5, 0.7),
        FillStat::Ratio { digits: Some(2) },
    )
    .expect("valid filter");
    assert_eq!(
        partial,
        Completeness::Ratios(vec![
            ("code".to_string(), 0.67),
            (DEFAULT_GROUP_FIELD.to_string(), 0.67),
            ("energy_100g".to_string(), 0.67),
        ])
    );

    let counts = col_completeness(&table, FillFilter::AtMost(0.4), FillStat::Count)
        .expect("valid filter");
    assert_eq!(
        counts,
        Completeness::Counts(vec![("fiber_100g".to_string(), 1)])
    );
}

#[test]
fn invalid_requests_are_rejected() {
    let mut table = export();

    assert_eq!(
        remove_duplicates(&mut table, "barcode", true),
        Err(DatasetError::UnknownColumn("barcode".to_string()))
    );
    assert_eq!(
        col_completeness(&table, FillFilter::Between(0.8, 0.2), FillStat::Names),
        Err(DatasetError::InvertedRange {
            low: 0.8,
            high: 0.2
        })
    );
    assert!(matches!(
        table.select(Some(&["code", "brand"][..]), None),
        Err(DatasetError::UnknownColumn(column)) if column == "brand"
    ));

    let subset = table
        .select(Some(&["code", "energy_100g"][..]), Some(&[1, 2][..]))
        .expect("known columns and rows");
    assert_eq!(subset.shape(), (2, 2));
    assert_eq!(subset.rows()[1].number("energy_100g"), Some(1400.0));
}
