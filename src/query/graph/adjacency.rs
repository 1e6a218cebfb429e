//! 邻接矩阵模块
//!
//! 每个关系对应一个邻居位掩码，在查询图构建时计算一次，
//! 之后被所有枚举器的连通性检查复用。

use crate::core::Subproblem;

/// 关系间的邻接关系
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdjacencyMatrix {
    rows: Vec<Subproblem>,
}

impl AdjacencyMatrix {
    /// 创建 `num_sources` 个关系、没有任何边的邻接矩阵
    pub fn new(num_sources: usize) -> Self {
        assert!(num_sources <= Subproblem::CAPACITY);
        Self {
            rows: vec![Subproblem::empty(); num_sources],
        }
    }

    /// 将 `sources` 中的关系两两标记为相邻
    pub fn connect_all(&mut self, sources: Subproblem) {
        for id in sources.iter() {
            self.rows[id] |= sources - Subproblem::singleton(id);
        }
    }

    /// 关系数量
    pub fn num_sources(&self) -> usize {
        self.rows.len()
    }

    /// 单个关系的邻居
    pub fn neighbors_of(&self, id: usize) -> Subproblem {
        self.rows[id]
    }

    /// `s` 的邻居集合（不含 `s` 自身）
    pub fn neighbors(&self, s: Subproblem) -> Subproblem {
        let mut n = Subproblem::empty();
        for id in s.iter() {
            n |= self.rows[id];
        }
        n - s
    }

    /// `left` 与 `right` 之间是否存在边
    pub fn is_connected_between(&self, left: Subproblem, right: Subproblem) -> bool {
        self.neighbors(left).intersects(right)
    }

    /// 从 `from` 出发、只经过 `within` 中的关系所能到达的集合
    pub fn reachable(&self, from: Subproblem, within: Subproblem) -> Subproblem {
        let mut reached = from & within;
        let mut frontier = reached;
        while !frontier.is_empty() {
            let mut next = Subproblem::empty();
            for id in frontier.iter() {
                next |= self.rows[id];
            }
            // 每个关系只进入一次前沿
            next = (next & within) - reached;
            reached |= next;
            frontier = next;
        }
        reached
    }

    /// `s` 在查询图中诱导的子图是否连通
    ///
    /// 空集视为不连通，单元素集合视为连通
    pub fn is_connected(&self, s: Subproblem) -> bool {
        if s.is_empty() {
            return false;
        }
        if s.size() == 1 {
            return true;
        }
        self.reachable(s.lowest(), s) == s
    }

    /// `s` 的连通分量，按最低 id 升序
    pub fn connected_components(&self, s: Subproblem) -> Vec<Subproblem> {
        let mut components = Vec::new();
        let mut remaining = s;
        while !remaining.is_empty() {
            let component = self.reachable(remaining.lowest(), remaining);
            components.push(component);
            remaining -= component;
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A--B--C  D
    fn chain_with_island() -> AdjacencyMatrix {
        let mut m = AdjacencyMatrix::new(4);
        m.connect_all(Subproblem::from_bits(0b0011));
        m.connect_all(Subproblem::from_bits(0b0110));
        m
    }

    #[test]
    fn test_neighbors() {
        let m = chain_with_island();
        assert_eq!(m.neighbors_of(1), Subproblem::from_bits(0b0101));
        assert_eq!(m.neighbors(Subproblem::from_bits(0b0011)), Subproblem::from_bits(0b0100));
        assert!(m.neighbors_of(3).is_empty());
    }

    #[test]
    fn test_is_connected() {
        let m = chain_with_island();
        assert!(m.is_connected(Subproblem::from_bits(0b0111)));
        assert!(!m.is_connected(Subproblem::from_bits(0b0101)));
        assert!(!m.is_connected(Subproblem::from_bits(0b1001)));
        assert!(m.is_connected(Subproblem::singleton(3)));
        assert!(!m.is_connected(Subproblem::empty()));
    }

    #[test]
    fn test_is_connected_between() {
        let m = chain_with_island();
        assert!(m.is_connected_between(Subproblem::singleton(0), Subproblem::from_bits(0b0110)));
        assert!(!m.is_connected_between(Subproblem::singleton(0), Subproblem::singleton(2)));
    }

    #[test]
    fn test_connected_components() {
        let m = chain_with_island();
        let comps = m.connected_components(Subproblem::from_bits(0b1101));
        assert_eq!(
            comps,
            vec![
                Subproblem::singleton(0),
                Subproblem::from_bits(0b0100),
                Subproblem::singleton(3)
            ]
        );
    }

    #[test]
    fn test_hyperedge_connects_all_pairs() {
        let mut m = AdjacencyMatrix::new(3);
        m.connect_all(Subproblem::all(3));
        assert_eq!(m.neighbors_of(0), Subproblem::from_bits(0b110));
        assert!(m.is_connected(Subproblem::from_bits(0b101)));
    }
}
