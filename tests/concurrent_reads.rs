use std::sync::Arc;
use std::thread;

use olap_column_engine::column::ArrayColumn;
use olap_column_engine::remap::NConcat;
use olap_column_engine::{CType, Defined, TypedColumn};

/// 多个线程共享同一个 NConcat 并交错访问不同段；段缓存被反复改写，
/// 但每次读取的结果都必须正确。
#[test]
fn shared_nconcat_stays_correct_under_contention() {
    let offsets: Vec<i64> = (0..16).map(|i| i * 10).collect();
    let columns: Vec<ArrayColumn<i64>> = (0..16)
        .map(|seg| ArrayColumn::dense(CType::Long, (0..10).map(|j| seg * 1000 + j).collect()))
        .collect();
    let n = Arc::new(NConcat::new(offsets, columns).unwrap());

    thread::scope(|scope| {
        for worker in 0..8i64 {
            let n = Arc::clone(&n);
            scope.spawn(move || {
                for step in 0..5_000i64 {
                    let row = (step * 37 + worker * 11) % 170;
                    let seg = row / 10;
                    if seg < 16 {
                        assert!(n.is_defined_at(row));
                        assert_eq!(n.value(row), seg * 1000 + row % 10);
                    } else {
                        // 最后一段之后：落在最后一段，但局部行越界
                        assert!(!n.is_defined_at(row));
                    }
                }
            });
        }
    });
}
