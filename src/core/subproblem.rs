//! 子问题位集模块
//!
//! `Subproblem` 用一个 `u64` 位集表示一个查询中参与连接的关系子集，
//! 第 `i` 位对应 id 为 `i` 的关系。
//!
//! 所有操作均不分配堆内存：枚举器在指数规模的子集空间上反复调用这些操作，
//! 这是整个连接顺序优化中最热的代码路径。

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// 关系子集（位集）
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subproblem(u64);

impl Subproblem {
    /// 位集可容纳的最大关系数量
    pub const CAPACITY: usize = 64;

    /// 空集
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 由原始位掩码构造
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// 只包含关系 `id` 的单元素集合
    ///
    /// # Panics
    /// `id` 超出位集宽度时 panic（属于调用方的前置条件错误）
    pub fn singleton(id: usize) -> Self {
        assert!(
            id < Self::CAPACITY,
            "关系 id {} 超出位集宽度 {}",
            id,
            Self::CAPACITY
        );
        Self(1u64 << id)
    }

    /// 包含 `0..n` 全部关系的集合
    pub fn all(n: usize) -> Self {
        assert!(n <= Self::CAPACITY, "关系数量 {} 超出位集宽度", n);
        if n == Self::CAPACITY {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    /// 原始位掩码
    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 集合大小（popcount）
    pub const fn size(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn contains(self, id: usize) -> bool {
        id < Self::CAPACITY && self.0 & (1u64 << id) != 0
    }

    pub const fn is_subset_of(self, other: Subproblem) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn is_disjoint_with(self, other: Subproblem) -> bool {
        self.0 & other.0 == 0
    }

    /// 两个集合是否有公共元素
    pub const fn intersects(self, other: Subproblem) -> bool {
        self.0 & other.0 != 0
    }

    /// 最低位对应的单元素集合，空集返回空集
    pub const fn lowest(self) -> Subproblem {
        Self(self.0 & self.0.wrapping_neg())
    }

    /// 最低位对应的关系 id
    pub fn lowest_id(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// 所有 id 小于等于 `id` 的关系构成的集合（DPccp 中的 B_i）
    pub fn up_to(id: usize) -> Self {
        if id + 1 >= Self::CAPACITY {
            Self(u64::MAX)
        } else {
            Self((1u64 << (id + 1)) - 1)
        }
    }

    /// 按升序遍历集合中的关系 id
    pub fn iter(self) -> Ids {
        Ids(self.0)
    }

    /// 按升序遍历集合中的单元素子集
    pub fn singletons(self) -> impl Iterator<Item = Subproblem> {
        self.iter().map(Subproblem::singleton)
    }

    /// 按数值升序遍历所有非空子集（最后一个是集合本身）
    pub fn subsets(self) -> Subsets {
        Subsets {
            set: self.0,
            current: 0,
            done: self.0 == 0,
        }
    }

    /// 按数值升序遍历所有非空真子集
    pub fn proper_subsets(self) -> impl Iterator<Item = Subproblem> {
        self.subsets().filter(move |s| *s != self)
    }

    /// 遍历 `0..n` 中所有大小为 `k` 的子集（Gosper's hack），按数值升序
    pub fn k_subsets(n: usize, k: usize) -> KSubsets {
        assert!(n <= Self::CAPACITY);
        let limit = Subproblem::all(n).0;
        if k == 0 || k > n {
            return KSubsets {
                current: 0,
                limit,
                done: true,
            };
        }
        KSubsets {
            current: Subproblem::all(k).0,
            limit,
            done: false,
        }
    }
}

impl BitOr for Subproblem {
    type Output = Subproblem;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Subproblem {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Subproblem {
    type Output = Subproblem;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Subproblem {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

/// 集合差
impl Sub for Subproblem {
    type Output = Subproblem;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}

impl SubAssign for Subproblem {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 &= !rhs.0;
    }
}

impl fmt::Debug for Subproblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Subproblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<usize> for Subproblem {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Subproblem::empty(), |acc, id| acc | Subproblem::singleton(id))
    }
}

/// 集合元素迭代器
#[derive(Debug, Clone)]
pub struct Ids(u64);

impl Iterator for Ids {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Ids {
    fn next_back(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let id = 63 - self.0.leading_zeros() as usize;
        self.0 &= !(1u64 << id);
        Some(id)
    }
}

impl ExactSizeIterator for Ids {}

/// 子集迭代器
///
/// 利用 `next = (current - set) & set` 的技巧按数值升序枚举
#[derive(Debug, Clone)]
pub struct Subsets {
    set: u64,
    current: u64,
    done: bool,
}

impl Iterator for Subsets {
    type Item = Subproblem;

    fn next(&mut self) -> Option<Subproblem> {
        if self.done {
            return None;
        }
        self.current = self.current.wrapping_sub(self.set) & self.set;
        if self.current == self.set {
            self.done = true;
        }
        Some(Subproblem(self.current))
    }
}

/// 固定大小子集迭代器（Gosper's hack）
#[derive(Debug, Clone)]
pub struct KSubsets {
    current: u64,
    limit: u64,
    done: bool,
}

impl Iterator for KSubsets {
    type Item = Subproblem;

    fn next(&mut self) -> Option<Subproblem> {
        if self.done {
            return None;
        }
        let result = self.current;

        // 计算下一个相同 popcount 的更大数值
        let c = self.current;
        let lowest = c & c.wrapping_neg();
        match c.checked_add(lowest) {
            Some(ripple) if ripple & !self.limit == 0 => {
                let ones = ((c ^ ripple) >> 2) >> lowest.trailing_zeros();
                self.current = ripple | ones;
            }
            _ => self.done = true,
        }

        Some(Subproblem(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_and_set_ops() {
        let a = Subproblem::singleton(0);
        let c = Subproblem::singleton(2);
        let ac = a | c;

        assert_eq!(ac.bits(), 0b101);
        assert_eq!(ac.size(), 2);
        assert!(a.is_subset_of(ac));
        assert!(!ac.is_subset_of(a));
        assert!(a.is_disjoint_with(c));
        assert_eq!(ac & c, c);
        assert_eq!(ac - a, c);
        assert!(Subproblem::empty().is_empty());
    }

    #[test]
    fn test_lowest() {
        let s = Subproblem::from_bits(0b10100);
        assert_eq!(s.lowest(), Subproblem::singleton(2));
        assert_eq!(s.lowest_id(), Some(2));
        assert_eq!(Subproblem::empty().lowest_id(), None);
    }

    #[test]
    fn test_all_and_up_to() {
        assert_eq!(Subproblem::all(4).bits(), 0b1111);
        assert_eq!(Subproblem::all(64).bits(), u64::MAX);
        assert_eq!(Subproblem::up_to(2).bits(), 0b111);
        assert_eq!(Subproblem::up_to(63).bits(), u64::MAX);
    }

    #[test]
    #[should_panic]
    fn test_singleton_out_of_range() {
        let _ = Subproblem::singleton(64);
    }

    #[test]
    fn test_iter_ids() {
        let s = Subproblem::from_bits(0b1011);
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(s.iter().len(), 3);
        assert_eq!(s.iter().rev().collect::<Vec<_>>(), vec![3, 1, 0]);
        assert_eq!(Subproblem::singleton(63).iter().next_back(), Some(63));
        let rebuilt: Subproblem = vec![0, 1, 3].into_iter().collect();
        assert_eq!(rebuilt, s);
    }

    #[test]
    fn test_subsets_ascending() {
        let s = Subproblem::from_bits(0b1010);
        let subsets: Vec<u64> = s.subsets().map(|x| x.bits()).collect();
        assert_eq!(subsets, vec![0b0010, 0b1000, 0b1010]);

        let proper: Vec<u64> = s.proper_subsets().map(|x| x.bits()).collect();
        assert_eq!(proper, vec![0b0010, 0b1000]);

        assert_eq!(Subproblem::empty().subsets().count(), 0);
        assert_eq!(Subproblem::all(5).subsets().count(), 31);
    }

    #[test]
    fn test_k_subsets() {
        let all: Vec<u64> = Subproblem::k_subsets(4, 2).map(|s| s.bits()).collect();
        assert_eq!(all, vec![0b0011, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100]);
        assert_eq!(Subproblem::k_subsets(6, 3).count(), 20);
        assert_eq!(Subproblem::k_subsets(4, 4).count(), 1);
        assert_eq!(Subproblem::k_subsets(4, 5).count(), 0);
        assert_eq!(Subproblem::k_subsets(64, 64).count(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Subproblem::from_bits(0b101).to_string(), "{0,2}");
        assert_eq!(Subproblem::empty().to_string(), "{}");
    }
}
