use std::sync::Arc;

use olap_column_engine::array_set::merge;
use olap_column_engine::bitset::BitSet;
use olap_column_engine::column::{ArrayColumn, ConstColumn};
use olap_column_engine::column_indices::ColumnIndices;
use olap_column_engine::definedness::{AndLots, Map2, OrLots, Union};
use olap_column_engine::remap::{Concat, NConcat, Remap, RemapIndices, Sparsen};
use olap_column_engine::{AnyColumn, CType, CValue, Column, Defined, TypedColumn};
use pretty_assertions::assert_eq;

fn longs(values: &[i64]) -> ArrayColumn<i64> {
    ArrayColumn::dense(CType::Long, values.to_vec())
}

#[test]
fn concat_boundary_row_comes_from_second_column() {
    let c1 = longs(&[10, 11, 12, 13, 14, 15, 16]);
    let c2 = longs(&[20, 21]);
    let concat = Concat::new(5, c1, c2);
    assert_eq!(concat.value(5), 20);
    assert_eq!(concat.cvalue(5), CValue::Long(20));
    assert!(!concat.is_defined_at(-5));
}

#[test]
fn array_set_precedence_at_shared_row() {
    let a = AnyColumn::Str(Arc::new(ArrayColumn::from_options(
        CType::Str,
        vec![None, None, None, Some("first".to_string())],
    )));
    let b = AnyColumn::Str(Arc::new(ArrayColumn::from_options(
        CType::Str,
        vec![Some("b0".to_string()), None, None, Some("second".to_string())],
    )));
    let merged = merge(&CType::Str, vec![a, b]).unwrap();
    assert_eq!(merged.as_str().unwrap().value(3), "first");
    assert_eq!(merged.str_value(3), "first");
    assert_eq!(merged.json_value(3), serde_json::json!("first"));
    assert_eq!(merged.str_value(0), "b0");
}

#[test]
fn and_or_lots_with_single_defined_input() {
    let a = ArrayColumn::from_options(CType::Bool, vec![Some(false), None]);
    let b = ArrayColumn::from_options(CType::Bool, vec![None, Some(false)]);
    let and = AndLots::new(vec![a.clone(), b.clone()]);
    let or  = OrLots::new(vec![a, b]);
    for row in 0..2 {
        assert!(!and.value(row));
        assert!(!or.value(row));
    }
}

#[test]
fn column_indices_examples() {
    let idx = ColumnIndices::from_paths(["b", "a", "a"]);
    assert_eq!(idx.paths().to_vec(), vec!["a", "a", "b"]);
    assert_eq!(idx.position("a"), Some(1));
    assert_eq!(ColumnIndices::default().header(), "");
    assert_eq!(ColumnIndices::from_paths(["x", "y"]).header(), "x,y\r\n");
}

#[test]
fn views_compose_over_shared_delegates() {
    // 同一个委托被多个组合子共享
    let base: Arc<ArrayColumn<i64>> = Arc::new(ArrayColumn::new(
        CType::Long,
        vec![1, 2, 3, 4],
        BitSet::from_bools(&[true, false, true, true]),
    ).unwrap());

    let reversed = Remap::new(Arc::clone(&base), |row| 3 - row);
    let picked   = RemapIndices::new(Arc::clone(&base), vec![3, 1, 0]);
    let sparse   = Sparsen::new(Arc::clone(&base), &[4, 0, 2, 6], 8).unwrap();
    let combined = Map2::new(reversed, picked, CType::Long, |x, y| x * 10 + y);

    assert_eq!(combined.value(0), 44);
    assert!(!combined.is_defined_at(1));
    assert!(!combined.is_defined_at(2));
    assert!(!combined.is_defined_at(3));
    assert_eq!(sparse.value(4), 1);
    assert!(!sparse.is_defined_at(0));
    assert_eq!(sparse.value(6), 4);

    let fallback = Union::new(sparse, ConstColumn::infinite(CType::Long, -1i64));
    assert_eq!(fallback.value(4), 1);
    assert_eq!(fallback.value(1), -1);
    assert_eq!(Arc::strong_count(&base), 4);
}

#[test]
fn nconcat_over_type_erased_columns() {
    let parts: Vec<olap_column_engine::TypedRef<i64>> = vec![
        Arc::new(longs(&[0, 1, 2])),
        Arc::new(ConstColumn::ranged(CType::Long, 5i64, 0..4)),
        Arc::new(longs(&[7])),
    ];
    let n = NConcat::new(vec![0, 3, 7], parts).unwrap();
    let got: Vec<Option<i64>> = (0..9).map(|r| n.checked_value(r).ok()).collect();
    assert_eq!(
        got,
        vec![Some(0), Some(1), Some(2), Some(5), Some(5), Some(5), Some(5), Some(7), None]
    );
    assert_eq!(n.ctype(), CType::Long);
}
