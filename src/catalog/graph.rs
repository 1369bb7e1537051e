//! In-memory monster graph with evolution and transformation edges.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::types::{EvoKind, MonsterId};

use super::model::{AwokenSkill, CatalogData, EvolutionRecord, Monster};

/// Read-only view over one catalog load.
///
/// Alt trees (the undirected closure of evolution and transformation edges)
/// are computed once at construction; evo trees are walked on demand.
#[derive(Debug, Default)]
pub struct MonsterGraph {
    monsters: BTreeMap<MonsterId, Monster>,
    evolutions: HashMap<MonsterId, Vec<MonsterId>>,
    back_evolutions: HashMap<MonsterId, (MonsterId, EvolutionRecord)>,
    transformations: HashMap<MonsterId, Vec<MonsterId>>,
    back_transformations: HashMap<MonsterId, Vec<MonsterId>>,
    awoken_skills: HashMap<u32, AwokenSkill>,
    trees: Vec<Vec<MonsterId>>,
    tree_of: HashMap<MonsterId, usize>,
    rem_trees: Vec<bool>,
}

impl MonsterGraph {
    #[must_use]
    pub fn new(data: CatalogData) -> Self {
        let mut graph = Self {
            monsters: data.monsters.into_iter().map(|m| (m.id, m)).collect(),
            awoken_skills: data
                .awoken_skills
                .into_iter()
                .map(|skill| (skill.id, skill))
                .collect(),
            ..Self::default()
        };

        for edge in data.evolutions {
            if !graph.monsters.contains_key(&edge.from) || !graph.monsters.contains_key(&edge.to) {
                debug!(
                    "Skipping evolution {} -> {} with unknown endpoint",
                    edge.from, edge.to
                );
                continue;
            }
            graph.evolutions.entry(edge.from).or_default().push(edge.to);
            graph
                .back_evolutions
                .insert(edge.to, (edge.from, edge.record));
        }

        for (from, to) in data.transformations {
            if !graph.monsters.contains_key(&from) || !graph.monsters.contains_key(&to) {
                debug!("Skipping transformation {from} -> {to} with unknown endpoint");
                continue;
            }
            graph.transformations.entry(from).or_default().push(to);
            graph.back_transformations.entry(to).or_default().push(from);
        }

        graph.build_trees();
        graph
    }

    fn build_trees(&mut self) {
        let ids: Vec<MonsterId> = self.monsters.keys().copied().collect();
        for id in ids {
            if self.tree_of.contains_key(&id) {
                continue;
            }
            let tree: Vec<MonsterId> = self.flood(id, true).into_iter().collect();
            let tree_idx = self.trees.len();
            let in_rem = tree
                .iter()
                .any(|member| self.monsters.get(member).is_some_and(|m| m.in_rem));
            for member in &tree {
                self.tree_of.insert(*member, tree_idx);
            }
            self.trees.push(tree);
            self.rem_trees.push(in_rem);
        }
    }

    /// Worklist flood fill over evolution edges, plus transformation edges
    /// when `with_transforms` is set.
    fn flood(&self, start: MonsterId, with_transforms: bool) -> BTreeSet<MonsterId> {
        let mut seen = BTreeSet::from([start]);
        let mut worklist = vec![start];

        while let Some(id) = worklist.pop() {
            let mut neighbours: Vec<MonsterId> = Vec::new();
            neighbours.extend(self.evolutions.get(&id).into_iter().flatten());
            neighbours.extend(self.back_evolutions.get(&id).map(|(from, _)| *from));
            if with_transforms {
                neighbours.extend(self.transformations.get(&id).into_iter().flatten());
                neighbours.extend(self.back_transformations.get(&id).into_iter().flatten());
            }
            for next in neighbours {
                if seen.insert(next) {
                    worklist.push(next);
                }
            }
        }

        seen
    }

    /// All monsters in ascending id order.
    pub fn all_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    /// Ids of the alt tree containing `id`, ascending. Empty for unknown ids.
    #[must_use]
    pub fn alt_tree_ids(&self, id: MonsterId) -> &[MonsterId] {
        self.tree_of
            .get(&id)
            .map(|tree_idx| self.trees[*tree_idx].as_slice())
            .unwrap_or_default()
    }

    /// Closure of evolution and transformation edges.
    #[must_use]
    pub fn get_alt_tree(&self, id: MonsterId) -> Vec<&Monster> {
        self.alt_tree_ids(id)
            .iter()
            .filter_map(|member| self.monsters.get(member))
            .collect()
    }

    /// Closure of evolution edges only.
    #[must_use]
    pub fn get_evo_tree(&self, id: MonsterId) -> Vec<&Monster> {
        if !self.monsters.contains_key(&id) {
            return Vec::new();
        }
        self.flood(id, false)
            .into_iter()
            .filter_map(|member| self.monsters.get(&member))
            .collect()
    }

    /// Lowest id in the alt tree. Unknown ids are their own base.
    #[must_use]
    pub fn get_base_id(&self, id: MonsterId) -> MonsterId {
        self.alt_tree_ids(id).first().copied().unwrap_or(id)
    }

    #[must_use]
    pub fn get_base(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&self.get_base_id(id))
    }

    /// Whether any member of the alt tree is in the rare egg machine.
    #[must_use]
    pub fn monster_is_rem_evo(&self, id: MonsterId) -> bool {
        self.tree_of
            .get(&id)
            .is_some_and(|tree_idx| self.rem_trees[*tree_idx])
    }

    #[must_use]
    pub fn awoken_skill(&self, id: u32) -> Option<&AwokenSkill> {
        self.awoken_skills.get(&id)
    }

    #[must_use]
    pub fn next_evolutions(&self, id: MonsterId) -> &[MonsterId] {
        self.evolutions.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn prev_evolution(&self, id: MonsterId) -> Option<MonsterId> {
        self.back_evolutions.get(&id).map(|(from, _)| *from)
    }

    #[must_use]
    pub fn evolution_record(&self, id: MonsterId) -> Option<&EvolutionRecord> {
        self.back_evolutions.get(&id).map(|(_, record)| record)
    }

    /// Stage of the edge that produced this monster, `Base` when it has none.
    #[must_use]
    pub fn true_evo_type(&self, id: MonsterId) -> EvoKind {
        self.evolution_record(id)
            .map_or(EvoKind::Base, |record| record.kind)
    }

    #[must_use]
    pub fn transforms_from(&self, id: MonsterId) -> &[MonsterId] {
        self.back_transformations.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_graph;

    fn ids(monsters: &[&Monster]) -> Vec<MonsterId> {
        monsters.iter().map(|m| m.id).collect()
    }

    #[test]
    fn alt_tree_is_closed_over_both_directions() {
        let graph = fixture_graph();
        for id in [100, 101, 102, 103] {
            assert_eq!(ids(&graph.get_alt_tree(id)), vec![100, 101, 102, 103]);
        }
    }

    #[test]
    fn evo_tree_ignores_transformations() {
        let graph = fixture_graph();
        assert_eq!(ids(&graph.get_alt_tree(601)), vec![600, 601]);
        assert_eq!(ids(&graph.get_evo_tree(601)), vec![601]);
    }

    #[test]
    fn base_is_minimum_id_of_tree() {
        let graph = fixture_graph();
        assert_eq!(graph.get_base_id(103), 100);
        assert_eq!(graph.get_base_id(601), 600);
        assert_eq!(graph.get_base_id(1234), 1234);
        assert_eq!(graph.get_base(701).map(|base| base.name_en.as_str()), Some("Young Hermes"));
    }

    #[test]
    fn unknown_ids_are_absent_not_errors() {
        let graph = fixture_graph();
        assert!(graph.get(9999).is_none());
        assert!(graph.get_alt_tree(9999).is_empty());
        assert!(graph.get_evo_tree(9999).is_empty());
        assert!(!graph.monster_is_rem_evo(9999));
    }

    #[test]
    fn rem_flag_spreads_to_whole_tree() {
        let graph = fixture_graph();
        assert!(graph.monster_is_rem_evo(103));
        assert!(graph.monster_is_rem_evo(202));
        assert!(!graph.monster_is_rem_evo(300));
    }

    #[test]
    fn true_evo_type_follows_parent_edge() {
        let graph = fixture_graph();
        assert_eq!(graph.true_evo_type(100), EvoKind::Base);
        assert_eq!(graph.true_evo_type(101), EvoKind::Ultimate);
        assert_eq!(graph.true_evo_type(102), EvoKind::Reincarnated);
        assert_eq!(graph.true_evo_type(103), EvoKind::Assist);
        assert_eq!(graph.true_evo_type(202), EvoKind::SuperReincarnated);
        assert_eq!(graph.prev_evolution(102), Some(101));
        assert_eq!(graph.next_evolutions(100), &[101]);
    }

    #[test]
    fn awoken_skill_lookup() {
        let graph = fixture_graph();
        assert_eq!(
            graph.awoken_skill(27).map(|skill| skill.name_en.as_str()),
            Some("Two-Pronged Attack")
        );
        assert!(graph.awoken_skill(999).is_none());
    }
}
