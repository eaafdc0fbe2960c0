//! # Layout Engine
//!
//! Deterministic generational placement for a separate renderer.
//!
//! 1. **Generations**: roots (no parent inside the node set) sit at 0,
//!    everyone else at `max(parent generations) + 1`. People the
//!    propagation never reaches (parent cycles and whatever hangs below
//!    them) go to a trailing block under everything else.
//! 2. **Positions**: rows are filled top to bottom. Sibling groups (same
//!    parent set) stay together and are ordered by where their parents
//!    landed; each person is followed directly by their partners in the
//!    same row. One fixed spacing unit per slot, rows centred on x = 0.
//!
//! Greedy and single-pass: no crossing minimization.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use chrono::NaiveDate;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::config::LayoutConfig;
use crate::model::*;

/// Parents of each child inside the node set, sorted by id.
pub type ParentSets = HashMap<PersonId, SmallVec<[PersonId; 2]>>;

/// Output of [`assign_generations`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationMap {
    pub generations: BTreeMap<PersonId, i32>,
    /// People placed in the trailing block, in placement order.
    pub trailing: Vec<PersonId>,
}

impl GenerationMap {
    pub fn get(&self, id: PersonId) -> Option<i32> {
        self.generations.get(&id).copied()
    }
}

/// Parent sets for every child with at least one parent in `nodes`.
pub fn parent_sets(nodes: &[PersonId], edges: &[RelationshipEdge]) -> ParentSets {
    let members: HashSet<PersonId> = nodes.iter().copied().collect();
    let mut parents = ParentSets::new();
    for edge in edges {
        let (Some(parent), Some(child)) = (edge.parent(), edge.child()) else { continue };
        if parent == child || !members.contains(&parent) || !members.contains(&child) {
            continue;
        }
        let set = parents.entry(child).or_default();
        if !set.contains(&parent) {
            set.push(parent);
            set.sort();
        }
    }
    parents
}

/// Assign a generation to every node.
///
/// Conflicting parent generations resolve to the maximum, so nobody is
/// drawn above any of their parents. Unreachable nodes are placed after
/// the deepest reachable generation, breaking each cycle at its smallest id.
pub fn assign_generations(nodes: &[PersonId], parent_child_edges: &[RelationshipEdge]) -> GenerationMap {
    let parents = parent_sets(nodes, parent_child_edges);
    let mut children: HashMap<PersonId, Vec<PersonId>> = HashMap::new();
    for (child, set) in &parents {
        for parent in set {
            children.entry(*parent).or_default().push(*child);
        }
    }
    for list in children.values_mut() {
        list.sort();
    }

    let ordered: BTreeSet<PersonId> = nodes.iter().copied().collect();
    let mut remaining: HashMap<PersonId, usize> = ordered
        .iter()
        .map(|id| (*id, parents.get(id).map_or(0, |p| p.len())))
        .collect();

    let mut map = GenerationMap::default();
    let mut queue: VecDeque<PersonId> = ordered
        .iter()
        .copied()
        .filter(|id| remaining.get(id) == Some(&0))
        .collect();
    for root in &queue {
        map.generations.insert(*root, 0);
    }
    propagate(&mut map, &mut queue, &parents, &children, &mut remaining, None);

    let unresolved = ordered.iter().filter(|id| !map.generations.contains_key(*id)).count();
    if unresolved == 0 {
        return map;
    }

    tracing::warn!(
        count = unresolved,
        "parent cycle in layout input; placing unreachable people in a trailing block"
    );
    let base = map.generations.values().max().map_or(0, |deepest| deepest + 1);
    loop {
        let pending: Vec<PersonId> = ordered
            .iter()
            .copied()
            .filter(|id| !map.generations.contains_key(id))
            .collect();
        // Only a cycle member may seed; whatever hangs below it follows
        // through propagation.
        let Some(seed) = pending
            .iter()
            .copied()
            .find(|id| on_parent_cycle(*id, &parents, &map))
            .or_else(|| pending.first().copied())
        else {
            break;
        };
        let from_parents = placed_parent_max(seed, &parents, &map).map_or(base, |g| g + 1);
        map.generations.insert(seed, from_parents.max(base));
        map.trailing.push(seed);
        queue.push_back(seed);
        propagate(&mut map, &mut queue, &parents, &children, &mut remaining, Some(base));
    }
    map
}

/// Kahn propagation: a child is placed once all its parents are.
/// With a `trailing_floor`, everything reached is recorded as trailing and
/// placed no higher than the floor.
fn propagate(
    map: &mut GenerationMap,
    queue: &mut VecDeque<PersonId>,
    parents: &ParentSets,
    children: &HashMap<PersonId, Vec<PersonId>>,
    remaining: &mut HashMap<PersonId, usize>,
    trailing_floor: Option<i32>,
) {
    while let Some(id) = queue.pop_front() {
        let Some(kids) = children.get(&id) else { continue };
        for child in kids {
            let left = remaining.entry(*child).or_insert(0);
            *left = left.saturating_sub(1);
            if *left > 0 || map.generations.contains_key(child) {
                continue;
            }
            let generation = placed_parent_max(*child, parents, map).map_or(0, |g| g + 1);
            map.generations.insert(*child, generation.max(trailing_floor.unwrap_or(i32::MIN)));
            if trailing_floor.is_some() {
                map.trailing.push(*child);
            }
            queue.push_back(*child);
        }
    }
}

/// Whether `id` reaches itself by following parents that are still unplaced.
fn on_parent_cycle(id: PersonId, parents: &ParentSets, map: &GenerationMap) -> bool {
    let mut stack = vec![id];
    let mut seen: HashSet<PersonId> = HashSet::new();
    while let Some(next) = stack.pop() {
        for parent in parents.get(&next).into_iter().flatten() {
            if *parent == id {
                return true;
            }
            if !map.generations.contains_key(parent) && seen.insert(*parent) {
                stack.push(*parent);
            }
        }
    }
    false
}

fn placed_parent_max(id: PersonId, parents: &ParentSets, map: &GenerationMap) -> Option<i32> {
    parents
        .get(&id)?
        .iter()
        .filter_map(|p| map.generations.get(p).copied())
        .max()
}

/// Place every node of every row.
///
/// `rows` maps generation → people in that generation; `spouse_edges`
/// are union edges; `sibling_groups` come from [`parent_sets`].
pub fn assign_positions(
    rows: &BTreeMap<i32, Vec<PersonNode>>,
    spouse_edges: &[RelationshipEdge],
    sibling_groups: &ParentSets,
    config: &LayoutConfig,
) -> Vec<LayoutPosition> {
    let mut partners: HashMap<PersonId, Vec<(RelationshipKind, PersonId)>> = HashMap::new();
    for edge in spouse_edges.iter().filter(|e| e.kind.is_union() && !e.is_self_loop()) {
        partners.entry(edge.person_a).or_default().push((edge.kind, edge.person_b));
        partners.entry(edge.person_b).or_default().push((edge.kind, edge.person_a));
    }
    for list in partners.values_mut() {
        list.sort();
        list.dedup_by_key(|(_, id)| *id);
    }

    let mut x_of: HashMap<PersonId, f64> = HashMap::new();
    let mut positions = Vec::new();

    for (&generation, row) in rows {
        let in_row: HashMap<PersonId, Option<NaiveDate>> =
            row.iter().map(|n| (n.id, n.birth_date)).collect();

        // Sibling groups keyed by parent set.
        let mut groups: BTreeMap<Vec<PersonId>, Vec<PersonId>> = BTreeMap::new();
        for node in row {
            let key = sibling_groups.get(&node.id).map(|s| s.to_vec()).unwrap_or_default();
            groups.entry(key).or_default().push(node.id);
        }

        let mut ordered: Vec<(Option<f64>, Vec<PersonId>, Vec<PersonId>)> = groups
            .into_iter()
            .map(|(key, mut members)| {
                members.sort_by(|a, b| birth_order(in_row[a], in_row[b]).then(a.cmp(b)));
                let placed: Vec<f64> = key.iter().filter_map(|p| x_of.get(p).copied()).collect();
                let anchor = (!placed.is_empty()).then(|| placed.iter().sum::<f64>() / placed.len() as f64);
                (anchor, key, members)
            })
            .collect();
        ordered.sort_by(|(xa, ka, _), (xb, kb, _)| match (xa, xb) {
            (Some(a), Some(b)) => a.total_cmp(b).then_with(|| ka.cmp(kb)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => ka.cmp(kb),
        });

        let mut sequence: Vec<PersonId> = Vec::with_capacity(row.len());
        let mut placed: HashSet<PersonId> = HashSet::new();
        for (_, _, members) in &ordered {
            for member in members {
                // Depth-first over unions so each partner is directly
                // followed by their own partners, current spouse first.
                let mut stack = vec![*member];
                while let Some(person) = stack.pop() {
                    if !placed.insert(person) {
                        continue;
                    }
                    sequence.push(person);
                    if let Some(list) = partners.get(&person) {
                        stack.extend(
                            list.iter()
                                .rev()
                                .map(|(_, partner)| *partner)
                                .filter(|p| in_row.contains_key(p) && !placed.contains(p)),
                        );
                    }
                }
            }
        }

        let centre = (sequence.len().saturating_sub(1)) as f64 / 2.0;
        for (slot, id) in sequence.into_iter().enumerate() {
            let x = (slot as f64 - centre) * config.node_spacing;
            x_of.insert(id, x);
            positions.push(LayoutPosition {
                person_id: id,
                generation,
                x,
                y: f64::from(generation) * config.generation_spacing,
            });
        }
    }
    positions
}

/// Known birth dates first, oldest first.
fn birth_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Full layout pass: generations, rows, positions.
///
/// With an `anchor`, generations are shifted so the anchor sits at 0 and
/// its ancestors go negative. Edges touching people outside `nodes` are
/// ignored; duplicate nodes keep their first occurrence. Output is sorted
/// by (generation, x).
pub fn compute_layout(
    nodes: &[PersonNode],
    edges: &[RelationshipEdge],
    anchor: Option<PersonId>,
    config: &LayoutConfig,
) -> Vec<LayoutPosition> {
    let mut seen = HashSet::new();
    let nodes: Vec<&PersonNode> = nodes.iter().filter(|n| seen.insert(n.id)).collect();
    let ids: Vec<PersonId> = nodes.iter().map(|n| n.id).collect();

    let parental: Vec<RelationshipEdge> = edges.iter().filter(|e| e.kind.is_parental()).copied().collect();
    let unions: Vec<RelationshipEdge> = edges
        .iter()
        .filter(|e| e.kind.is_union() && seen.contains(&e.person_a) && seen.contains(&e.person_b))
        .map(|e| e.normalized())
        .collect();

    let generations = assign_generations(&ids, &parental);
    let shift = anchor.and_then(|a| generations.get(a)).unwrap_or(0);

    let mut rows: BTreeMap<i32, Vec<PersonNode>> = BTreeMap::new();
    for node in nodes {
        let generation = generations.get(node.id).unwrap_or(0) - shift;
        let mut node = node.clone();
        node.generation_hint = Some(generation);
        rows.entry(generation).or_default().push(node);
    }

    let sibling_groups = parent_sets(&ids, &parental);
    let mut positions = assign_positions(&rows, &unions, &sibling_groups, config);
    positions.sort_by(|a, b| a.generation.cmp(&b.generation).then(a.x.total_cmp(&b.x)));
    positions
}
