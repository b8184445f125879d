//! Integration tests for estimator-core

use estimator_core::prelude::*;
use estimator_core::metrics::{r_squared, rmse};
use proptest::prelude::*;

fn houses() -> (Matrix, Vec<f64>) {
    // size, rooms -> price
    let rows: Vec<Vec<f64>> = (0..60)
        .map(|i| {
            let size = 40.0 + i as f64 * 2.5;
            let rooms = 1.0 + (i % 5) as f64;
            vec![size, rooms]
        })
        .collect();
    let y = rows
        .iter()
        .enumerate()
        .map(|(i, r)| 1.5 * r[0] + 8.0 * r[1] + 20.0 + ((i * 13) % 7) as f64 * 0.5)
        .collect();
    (Matrix::from_rows(&rows).unwrap(), y)
}

#[test]
fn test_baseline_roster_fits_and_predicts() {
    let (x, y) = houses();
    for kind in ModelKind::BASELINE {
        let mut model = build(kind, DEFAULT_SEED).unwrap();
        model.fit(&x, &y).unwrap();
        let predicted = model.predict(&x).unwrap();
        assert_eq!(predicted.len(), y.len(), "{kind}");
        assert!(predicted.iter().all(|v| v.is_finite()), "{kind}");
    }
}

#[test]
fn test_linear_family_recovers_plane() {
    let (x, y) = houses();
    for kind in [ModelKind::Linear, ModelKind::Ridge, ModelKind::Bayesian, ModelKind::Huber] {
        let mut model = build(kind, DEFAULT_SEED).unwrap();
        model.fit(&x, &y).unwrap();
        let r2 = r_squared(&y, &model.predict(&x).unwrap());
        assert!(r2 > 0.99, "{kind}: r2 = {r2}");
    }
}

#[test]
fn test_random_forest_is_reproducible() {
    let (x, y) = houses();
    let mut a = build(ModelKind::RandomForest, DEFAULT_SEED).unwrap();
    let mut b = build(ModelKind::RandomForest, DEFAULT_SEED).unwrap();
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();
    assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
}

#[test]
fn test_tiny_input_still_fits_searched_models() {
    let x = Matrix::column_vector(&[1.0, 2.0, 3.0]);
    let y = vec![2.0, 4.0, 6.0];
    for kind in [ModelKind::DecisionTree, ModelKind::Svr, ModelKind::Elastic] {
        let mut model = build(kind, DEFAULT_SEED).unwrap();
        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted(), "{kind}");
    }
}

#[test]
fn test_single_row_search_falls_back_to_plain_fit() {
    // too few rows to cross-validate: the first candidate that fits wins
    let x = Matrix::column_vector(&[1.0]);
    let mut model = build(ModelKind::Knn, DEFAULT_SEED).unwrap();
    model.fit(&x, &[3.0]).unwrap();
    assert_eq!(model.predict(&x).unwrap(), vec![3.0]);
}

#[test]
fn test_stacking_over_registry_members() {
    let (x, y) = houses();
    let members = vec![
        build(ModelKind::Elastic, DEFAULT_SEED).unwrap(),
        Box::new(DecisionTreeRegressor::new(TreeParams::default().with_seed(DEFAULT_SEED)).unwrap())
            as Box<dyn Regressor>,
    ];
    let mut stack = StackingRegressor::new(
        members,
        Box::new(GradientBoostingRegressor::new(100, 0.1, 3, DEFAULT_SEED).unwrap()),
        Some(5),
    )
    .unwrap();
    stack.fit(&x, &y).unwrap();
    assert!(rmse(&y, &stack.predict(&x).unwrap()) < 25.0);
}

proptest! {
    #[test]
    fn prop_kfold_test_sets_partition_rows(n in 0usize..200, folds in 2usize..12) {
        let splits = KFold::new(folds).split(n);
        if n < 2 {
            prop_assert!(splits.is_empty());
        } else {
            prop_assert_eq!(splits.len(), folds.min(n));
            let mut seen: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
            for (train, test) in &splits {
                prop_assert_eq!(train.len() + test.len(), n);
            }
        }
    }

    #[test]
    fn prop_perfect_prediction_scores(values in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
        prop_assert_eq!(r_squared(&values, &values), 1.0);
        prop_assert_eq!(rmse(&values, &values), 0.0);
    }
}
