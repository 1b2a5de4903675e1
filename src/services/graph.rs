//! Migration dependency graph: leaf detection, conflicts and plans.

use crate::services::inspector::MigrationDetails;
use crate::services::pysource::{parse_migration, PySourceError};
use crate::services::registry::AppRegistry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub type NodeKey = (String, String);

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("migration {}.{} depends on nonexistent node ('{}', '{}')", .child.0, .child.1, .missing.0, .missing.1)]
    NodeNotFound { child: NodeKey, missing: NodeKey },
    #[error("circular dependency between migrations: {0}")]
    Cycle(String),
    #[error("could not read migration {app}.{name}: {source}")]
    Io {
        app: String,
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse migration {app}.{name}: {source}")]
    Source {
        app: String,
        name: String,
        #[source]
        source: PySourceError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationNode {
    pub app: String,
    pub name: String,
    pub dependencies: Vec<NodeKey>,
    pub initial: bool,
}

impl MigrationNode {
    pub fn key(&self) -> NodeKey {
        (self.app.clone(), self.name.clone())
    }
}

#[derive(Debug, Default)]
pub struct MigrationGraph {
    nodes: BTreeMap<NodeKey, MigrationNode>,
    parents: BTreeMap<NodeKey, BTreeSet<NodeKey>>,
    children: BTreeMap<NodeKey, BTreeSet<NodeKey>>,
}

impl MigrationGraph {
    pub fn build(nodes: Vec<MigrationNode>) -> Result<Self, GraphError> {
        let mut graph = MigrationGraph::default();
        for node in nodes {
            let key = node.key();
            graph.parents.entry(key.clone()).or_default();
            graph.children.entry(key.clone()).or_default();
            graph.nodes.insert(key, node);
        }
        let apps: BTreeSet<String> = graph.nodes.keys().map(|(app, _)| app.clone()).collect();

        let mut internal = Vec::new();
        let mut external = Vec::new();
        for node in graph.nodes.values() {
            for dep in &node.dependencies {
                if dep.0 == node.app {
                    if !is_special(&dep.1) {
                        internal.push((node.key(), dep.clone()));
                    }
                } else {
                    external.push((node.key(), dep.clone()));
                }
            }
        }

        for (child, parent) in internal {
            graph.add_edge(child, parent)?;
        }
        for (child, dep) in external {
            if !apps.contains(&dep.0) {
                tracing::debug!(app = %child.0, name = %child.1, dep_app = %dep.0, "skipping dependency on an app without migrations");
                continue;
            }
            let parent = match dep.1.as_str() {
                "__first__" => graph.first_node_of(&dep.0),
                "__latest__" => graph.leaf_nodes_of(&dep.0).into_iter().next(),
                _ => Some(dep.clone()),
            };
            let Some(parent) = parent else {
                continue;
            };
            graph.add_edge(child, parent)?;
        }

        graph.ensure_not_cyclic()?;
        Ok(graph)
    }

    fn add_edge(&mut self, child: NodeKey, parent: NodeKey) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&parent) {
            return Err(GraphError::NodeNotFound {
                child,
                missing: parent,
            });
        }
        self.children
            .entry(parent.clone())
            .or_default()
            .insert(child.clone());
        self.parents.entry(child).or_default().insert(parent);
        Ok(())
    }

    fn ensure_not_cyclic(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }
        let mut marks: BTreeMap<&NodeKey, Mark> = BTreeMap::new();
        for start in self.nodes.keys() {
            if marks.contains_key(start) {
                continue;
            }
            let mut stack: Vec<(&NodeKey, bool)> = vec![(start, false)];
            let mut path: Vec<&NodeKey> = Vec::new();
            while let Some((node, finished)) = stack.pop() {
                if finished {
                    marks.insert(node, Mark::Done);
                    path.pop();
                    continue;
                }
                match marks.get(node) {
                    Some(Mark::Done) => continue,
                    Some(Mark::Active) => {
                        let from = path.iter().position(|k| *k == node).unwrap_or(0);
                        let cycle: Vec<String> = path[from..]
                            .iter()
                            .chain(std::iter::once(&node))
                            .map(|(a, n)| format!("{}.{}", a, n))
                            .collect();
                        return Err(GraphError::Cycle(cycle.join(" -> ")));
                    }
                    None => {}
                }
                marks.insert(node, Mark::Active);
                path.push(node);
                stack.push((node, true));
                for parent in self.parents.get(node).into_iter().flatten() {
                    if marks.get(parent) != Some(&Mark::Done) {
                        stack.push((parent, false));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn leaf_nodes(&self) -> Vec<NodeKey> {
        self.nodes
            .keys()
            .filter(|key| !self.children[*key].iter().any(|c| c.0 == key.0))
            .cloned()
            .collect()
    }

    pub fn leaf_nodes_of(&self, app: &str) -> Vec<NodeKey> {
        self.leaf_nodes().into_iter().filter(|k| k.0 == app).collect()
    }

    pub fn root_nodes_of(&self, app: &str) -> Vec<NodeKey> {
        self.nodes
            .keys()
            .filter(|key| key.0 == app && !self.parents[*key].iter().any(|p| p.0 == app))
            .cloned()
            .collect()
    }

    fn first_node_of(&self, app: &str) -> Option<NodeKey> {
        let roots = self.root_nodes_of(app);
        roots
            .iter()
            .find(|key| self.nodes[*key].initial)
            .or(roots.first())
            .cloned()
    }

    pub fn conflicts(&self) -> BTreeMap<String, Vec<String>> {
        let mut leaves: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (app, name) in self.leaf_nodes() {
            leaves.entry(app).or_default().push(name);
        }
        leaves.retain(|_, names| names.len() > 1);
        leaves
    }

    /// `key` and all of its ancestors, dependencies first.
    ///
    /// Post-order DFS; parents are pushed in sorted order so the greatest
    /// parent is explored first.
    pub fn forwards_plan(&self, key: &NodeKey) -> Vec<NodeKey> {
        let mut visited = Vec::new();
        let mut seen: HashSet<&NodeKey> = HashSet::new();
        let Some((start, _)) = self.nodes.get_key_value(key) else {
            return visited;
        };
        let mut stack: Vec<(&NodeKey, bool)> = vec![(start, false)];
        while let Some((node, processed)) = stack.pop() {
            if seen.contains(node) {
                continue;
            }
            if processed {
                seen.insert(node);
                visited.push(node.clone());
            } else {
                stack.push((node, true));
                stack.extend(self.parents[node].iter().map(|p| (p, false)));
            }
        }
        visited
    }

    pub fn plan(&self, targets: &[NodeKey], at_end: bool) -> Vec<NodeKey> {
        let mut plan = Vec::new();
        let mut planned = HashSet::new();
        for target in targets {
            for step in self.forwards_plan(target) {
                if planned.contains(&step) || (!at_end && targets.contains(&step)) {
                    continue;
                }
                planned.insert(step.clone());
                plan.push(step);
            }
        }
        plan
    }
}

fn is_special(name: &str) -> bool {
    name == "__first__" || name == "__latest__"
}

pub trait GraphSource {
    fn load(&self, registry: &AppRegistry) -> anyhow::Result<MigrationGraph>;
}

pub struct DiskGraphSource;

impl GraphSource for DiskGraphSource {
    fn load(&self, registry: &AppRegistry) -> anyhow::Result<MigrationGraph> {
        let mut nodes = Vec::new();
        for app in registry.apps() {
            let Some(details) = app
                .migrations_dir
                .as_ref()
                .and_then(|dir| MigrationDetails::load(&app.label, dir))
            else {
                continue;
            };
            if !details.has_migrations() {
                continue;
            }
            for name in details.names() {
                nodes.push(load_node(&details, name)?);
            }
        }
        Ok(MigrationGraph::build(nodes.into_iter().flatten().collect())?)
    }
}

fn load_node(details: &MigrationDetails, name: &str) -> Result<Option<MigrationNode>, GraphError> {
    let path = details.source_path(name);
    if !path.exists() {
        tracing::debug!(app = %details.app_label, %name, "no source for migration, leaving it out of the graph");
        return Ok(None);
    }
    let src = std::fs::read_to_string(&path).map_err(|source| GraphError::Io {
        app: details.app_label.clone(),
        name: name.to_string(),
        source,
    })?;
    let parsed = parse_migration(&src).map_err(|source| GraphError::Source {
        app: details.app_label.clone(),
        name: name.to_string(),
        source,
    })?;
    let dependencies = parsed
        .dependencies
        .map(|deps| {
            deps.literal_pairs()
                .map(|p| (p.app.clone(), p.name.clone()))
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(MigrationNode {
        app: details.app_label.clone(),
        name: name.to_string(),
        dependencies,
        initial: parsed.initial,
    }))
}
