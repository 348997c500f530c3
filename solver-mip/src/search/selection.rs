//! Backtracking: choice of the next active node to solve.

use solver_lp::Direction;

use super::{NodeRef, SearchTree};
use crate::master::MasterBackend;
use crate::settings::NodeSelection;

impl<L: MasterBackend> SearchTree<L> {
    /// Active node to continue with; `None` once the active list is empty.
    pub fn select_node(&self, selection: NodeSelection) -> Option<NodeRef> {
        match selection {
            NodeSelection::DepthFirst => self.tail(),
            NodeSelection::BreadthFirst => self.head(),
            NodeSelection::BestBound => self.best_node(),
            NodeSelection::BestProjection => match self.best() {
                None => self.most_feasible_node(),
                Some(best) => self.best_projection_node(best),
            },
        }
    }

    /// Parent's sum of integer infeasibilities for active node `p`.
    fn parent_estimate(&self, p: usize) -> (f64, f64) {
        match self.arena.get(p).parent {
            Some(up) => {
                let parent = self.arena.get(up);
                (parent.bound, parent.ii_sum)
            }
            None => {
                let node = self.arena.get(p);
                (node.bound, node.ii_sum)
            }
        }
    }

    /// Active node whose parent was closest to integer feasible.
    pub fn most_feasible_node(&self) -> Option<NodeRef> {
        let mut best: Option<(usize, f64)> = None;
        for p in self.active.iter(&self.arena) {
            let (_, ii_sum) = self.parent_estimate(p);
            if best.map_or(true, |(_, s)| ii_sum < s) {
                best = Some((p, ii_sum));
            }
        }
        best.map(|(p, _)| self.arena.node_ref(p))
    }

    /// Active node with the best projected objective.
    ///
    /// The degradation per unit of integer infeasibility is taken from
    /// the root: `(best - root.bound) / root.ii_sum`; each node projects
    /// its parent's bound by that rate.
    pub fn best_projection_node(&self, best: f64) -> Option<NodeRef> {
        let root = self.root()?;
        let root = self.node(root);
        let deg = if root.ii_sum > 0.0 {
            (best - root.bound) / root.ii_sum
        } else {
            0.0
        };

        let mut choice: Option<(usize, f64)> = None;
        for p in self.active.iter(&self.arena) {
            let (bound, ii_sum) = self.parent_estimate(p);
            let mut obj = bound + deg * ii_sum;
            if self.dir == Direction::Maximize {
                obj = -obj;
            }
            if choice.map_or(true, |(_, o)| obj < o) {
                choice = Some((p, obj));
            }
        }
        choice.map(|(p, _)| self.arena.node_ref(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Incumbent;
    use solver_lp::{sparse, Bounds, SimplexLp};

    fn tree(dir: Direction) -> SearchTree<SimplexLp> {
        let mut lp = SimplexLp::new(1, 2, dir).unwrap();
        lp.load_matrix(&sparse::from_dense_rows(&[vec![1.0, 1.0]])).unwrap();
        lp.set_bounds(1, Bounds::double(0.0, 3.0));
        lp.set_bounds(2, Bounds::double(0.0, 3.0));
        SearchTree::new(lp)
    }

    fn set(t: &mut SearchTree<SimplexLp>, r: NodeRef, bound: f64, ii_sum: f64) {
        let node = t.arena.get_mut(r.slot);
        node.bound = bound;
        node.ii_sum = ii_sum;
    }

    // root -> a, b; a -> a1, a2. Active: b, a1, a2.
    fn shaped(dir: Direction) -> (SearchTree<SimplexLp>, Vec<NodeRef>) {
        let mut t = tree(dir);
        let root = t.root().unwrap();
        let kids = t.clone_node(root, 2);
        let grand = t.clone_node(kids[0], 2);
        (t, vec![root, kids[0], kids[1], grand[0], grand[1]])
    }

    #[test]
    fn test_depth_and_breadth_first() {
        let (t, n) = shaped(Direction::Minimize);
        assert_eq!(t.select_node(NodeSelection::DepthFirst), Some(n[4]));
        assert_eq!(t.select_node(NodeSelection::BreadthFirst), Some(n[2]));
    }

    #[test]
    fn test_best_bound() {
        let (mut t, n) = shaped(Direction::Maximize);
        set(&mut t, n[2], 10.0, 0.0);
        set(&mut t, n[3], 12.0, 0.0);
        set(&mut t, n[4], 12.0, 0.0);
        assert_eq!(t.select_node(NodeSelection::BestBound), Some(n[3]));
    }

    #[test]
    fn test_most_feasible_before_incumbent() {
        let (mut t, n) = shaped(Direction::Minimize);
        set(&mut t, n[0], 1.0, 1.5);
        set(&mut t, n[1], 2.0, 0.4);
        assert_eq!(t.select_node(NodeSelection::BestProjection), Some(n[3]));

        set(&mut t, n[1], 2.0, 2.0);
        assert_eq!(t.select_node(NodeSelection::BestProjection), Some(n[2]));
    }

    #[test]
    fn test_best_projection_with_incumbent() {
        let (mut t, n) = shaped(Direction::Minimize);
        // deg = (20 - 10) / 2 = 5
        set(&mut t, n[0], 10.0, 2.0);
        set(&mut t, n[1], 12.0, 1.0);
        t.incumbent = Some(Incumbent {
            obj_val: 20.0,
            row_values: vec![0.0],
            col_values: vec![0.0, 0.0],
        });
        // b projects 10 + 5*2 = 20, a1/a2 project 12 + 5*1 = 17.
        assert_eq!(t.select_node(NodeSelection::BestProjection), Some(n[3]));

        set(&mut t, n[1], 16.0, 1.0);
        // a1/a2 now project 21.
        assert_eq!(t.select_node(NodeSelection::BestProjection), Some(n[2]));
    }

    #[test]
    fn test_empty_tree_selects_nothing() {
        let mut t = tree(Direction::Minimize);
        t.delete(t.root().unwrap());
        for s in [
            NodeSelection::DepthFirst,
            NodeSelection::BreadthFirst,
            NodeSelection::BestBound,
            NodeSelection::BestProjection,
        ] {
            assert_eq!(t.select_node(s), None);
        }
    }
}
