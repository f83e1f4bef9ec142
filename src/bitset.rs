//! 定义性位图（presence mask）
//!
//! 位以小端方式存放在 `u64` 字中：第 i 行对应 `words[i / 64]` 的第 `i % 64` 位。
//! 越界读取一律返回 false，与"负行号 / 越界行号即未定义"的列语义一致。

use crate::column::Defined;
use crate::common::RowId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
    len:   usize,
}

impl BitSet {
    /// 长度为 `len`、全部为 0 的位图
    pub fn new(len: usize) -> Self {
        Self { words: vec![0u64; len.div_ceil(64)], len }
    }

    /// 长度为 `len`、全部为 1 的位图
    pub fn all_set(len: usize) -> Self {
        let mut bits = Self { words: vec![u64::MAX; len.div_ceil(64)], len };
        bits.clear_tail();
        bits
    }

    pub fn from_bools(bools: &[bool]) -> Self {
        let mut bits = Self::new(bools.len());
        for (i, &b) in bools.iter().enumerate() {
            if b { bits.set(i, true); }
        }
        bits
    }

    /// 将任意列在 `[0, len)` 上的定义性物化为位图
    pub fn materialize<D: Defined + ?Sized>(column: &D, len: usize) -> Self {
        let mut bits = Self::new(len);
        for i in 0..len {
            if column.is_defined_at(i as RowId) { bits.set(i, true); }
        }
        bits
    }

    pub fn len(&self)      -> usize { self.len }
    pub fn is_empty(&self) -> bool  { self.len == 0 }

    pub fn get(&self, index: usize) -> bool {
        if index >= self.len { return false; }
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// 按行号读取；负行号为 false
    pub fn contains(&self, row: RowId) -> bool {
        row >= 0 && self.get(row as usize)
    }

    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "BitSet index {index} out of bounds (len {})", self.len);
        let mask = 1u64 << (index % 64);
        if value {
            self.words[index / 64] |= mask;
        } else {
            self.words[index / 64] &= !mask;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// 就地 AND；较短一侧之外的位视为 0
    pub fn intersect_with(&mut self, other: &BitSet) {
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= other.words.get(i).copied().unwrap_or(0);
        }
    }

    /// 就地 OR；结果长度取两者较大者
    pub fn union_with(&mut self, other: &BitSet) {
        if other.len > self.len {
            self.words.resize(other.words.len(), 0);
            self.len = other.len;
        }
        for (i, w) in other.words.iter().enumerate() {
            self.words[i] |= w;
        }
    }

    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.get(i))
    }

    fn clear_tail(&mut self) {
        let rem = self.len % 64;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl Defined for BitSet {
    fn is_defined_at(&self, row: RowId) -> bool { self.contains(row) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_unset() {
        let bits = BitSet::all_set(70);
        assert!(bits.get(69));
        assert!(!bits.get(70));
        assert!(!bits.contains(-1));
        assert_eq!(bits.count_ones(), 70);
    }

    #[test]
    fn and_or_algebra() {
        let mut a = BitSet::from_bools(&[true, true, false, false]);
        let b     = BitSet::from_bools(&[true, false, true, false]);

        let mut and = a.clone();
        and.intersect_with(&b);
        assert_eq!(and.iter_ones().collect::<Vec<_>>(), vec![0]);

        a.union_with(&b);
        assert_eq!(a.iter_ones().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn union_grows_to_longer_operand() {
        let mut a = BitSet::from_bools(&[true]);
        let mut b = BitSet::new(100);
        b.set(99, true);
        a.union_with(&b);
        assert_eq!(a.len(), 100);
        assert!(a.get(0) && a.get(99));
    }

    #[test]
    fn materialize_snapshots_combinator_definedness() {
        use crate::column::ArrayColumn;
        use crate::definedness::Union;
        use crate::field_type::CType;
        use crate::remap::Sparsen;

        let a = ArrayColumn::from_options(CType::Long, vec![Some(1i64), None, None, Some(4)]);
        let b = ArrayColumn::from_options(CType::Long, vec![None, None, Some(3i64)]);
        let union = Union::new(a, b);
        let bits = BitSet::materialize(&union, 6);
        assert_eq!(bits.len(), 6);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 2, 3]);
        for row in 0..6 {
            assert_eq!(bits.contains(row), union.is_defined_at(row));
        }

        let sparse = Sparsen::new(ArrayColumn::dense(CType::Long, vec![7i64, 8]), &[4, 1], 5).unwrap();
        assert_eq!(BitSet::materialize(&sparse, 5).iter_ones().collect::<Vec<_>>(), vec![1, 4]);
    }
}
