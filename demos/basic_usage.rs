//! # olap-column-engine 使用案例
//!
//! 1. 构造叶子列（值 + 定义性位图）
//! 2. 定义性组合子：Map2 / AndLots
//! 3. 行变换：Concat / NConcat / Sparsen
//! 4. ArraySetColumn 合并（首个定义者胜）
//! 5. ColumnIndices 表头与切片配置
//! 6. Scanner 顺序折叠

use std::sync::Arc;

use olap_column_engine::{
    array_set::merge,
    bitset::BitSet,
    column::ArrayColumn,
    column_indices::ColumnIndices,
    config::ColumnarTableModuleConfig,
    definedness::{AndLots, Map2},
    remap::{Concat, NConcat, Sparsen},
    scanner::{scan_ranges, ColumnKey, ColumnMap, RunningSum},
    AnyColumn, CType, Column, Defined, TypedColumn,
};

fn show<C: Column>(name: &str, col: &C, rows: std::ops::Range<i64>) {
    let cells: Vec<String> = rows
        .map(|r| if col.is_defined_at(r) { col.str_value(r) } else { "·".into() })
        .collect();
    println!("    {name:<10} [{}]", cells.join(", "));
}

fn main() -> olap_column_engine::Result<()> {
    println!("═══════════════════════════════════════════════════════════");
    println!("   olap-column-engine 演示                                 ");
    println!("═══════════════════════════════════════════════════════════\n");

    // =========================================================================
    // 1. 叶子列
    // =========================================================================
    println!("【1】叶子列 ...");
    let price = Arc::new(ArrayColumn::new(
        CType::Long,
        vec![100i64, 200, 0, 400, 500],
        BitSet::from_bools(&[true, true, false, true, true]),
    )?);
    let qty = Arc::new(ArrayColumn::from_options(
        CType::Long,
        vec![Some(1i64), None, Some(3), Some(4), Some(5)],
    ));
    show("price", &price, 0..5);
    show("qty", &qty, 0..5);
    println!();

    // =========================================================================
    // 2. 定义性组合子
    // =========================================================================
    println!("【2】Map2（AND 门）与 AndLots ...");
    let total = Map2::new(Arc::clone(&price), Arc::clone(&qty), CType::Long, |p, q| p * q);
    show("total", &total, 0..5);

    let in_stock = ArrayColumn::from_options(CType::Bool, vec![Some(true), None, Some(false)]);
    let on_sale  = ArrayColumn::from_options(CType::Bool, vec![None, Some(true), Some(true)]);
    let both     = AndLots::new(vec![in_stock, on_sale]);
    show("and_lots", &both, 0..3);
    println!();

    // =========================================================================
    // 3. 行变换
    // =========================================================================
    println!("【3】Concat / NConcat / Sparsen ...");
    let tail   = Arc::new(ArrayColumn::dense(CType::Long, vec![900i64, 901]));
    let concat = Concat::new(5, Arc::clone(&price), Arc::clone(&tail));
    show("concat", &concat, 0..8);

    let nconcat = NConcat::new(vec![0, 5], vec![Arc::clone(&qty), Arc::clone(&qty)])?;
    show("nconcat", &nconcat, 0..10);

    let sparse = Sparsen::new(Arc::clone(&price), &[2, 2, 5], 6)?;
    println!("    remap      {:?}", sparse.remap());
    show("sparse", &sparse, 0..6);
    println!();

    // =========================================================================
    // 4. ArraySetColumn
    // =========================================================================
    println!("【4】merge(Long, [qty, price]) ...");
    let merged = merge(&CType::Long, vec![AnyColumn::Long(qty.clone()), AnyColumn::Long(price.clone())])?;
    show("merged", &merged, 0..5);
    if let Some(longs) = merged.as_long() {
        println!("    row 1 → {}（qty 未定义，回落到 price）", longs.value(1));
    }
    println!();

    // =========================================================================
    // 5. 表头与配置
    // =========================================================================
    println!("【5】ColumnIndices / ColumnarTableModuleConfig ...");
    let indices = ColumnIndices::from_paths(["qty", "price", "total"]);
    print!("    header     {}", indices.header());
    let config = ColumnarTableModuleConfig::from_json(r#"{"max_slice_size": 10000}"#)?;
    println!("    config     {config:?}\n");

    // =========================================================================
    // 6. Scanner
    // =========================================================================
    println!("【6】RunningSum over [0,2) [2,5) ...");
    let mut columns = ColumnMap::new();
    columns.insert(ColumnKey::new("price", CType::Long), AnyColumn::Long(price));
    let (sum, columns) = scan_ranges(&RunningSum::new("price", "price_sum"), columns, vec![0..2, 2..5])?;
    println!("    final sum  {sum}");
    if let Some(derived) = columns.get(&ColumnKey::new("price_sum", CType::Long)) {
        show("price_sum", derived, 0..5);
    }

    println!("\n✓ done");
    Ok(())
}
