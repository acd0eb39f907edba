//! The target graph.
//!
//! Targets reference each other through `use` (an index that includes
//! another target's documents). [`SiteGraph::build`] resolves every
//! reference up front: an unknown name or a cycle fails before any work
//! starts, and [`SiteGraph::order`] yields targets with every `use`d target
//! ahead of the targets that use it.
//!
//! The graph also fixes where each document is published:
//!
//! | Target | Document | Output |
//! |---|---|---|
//! | `index = true` | any | `<target>/<stem>.html` |
//! | `index = false` | first | `<target>/index.html` |
//! | `index = false` | others | `<target>/<stem>.html` |

use crate::config::{SiteConfig, TargetConfig};
use crate::metadata::ParseError;
use crate::naming::file_stem;
use crate::series::{self, SeriesMeta};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("target {name:?} is defined more than once")]
    DuplicateTarget { name: String },
    #[error("target {target:?} uses unknown target {name:?}")]
    UnknownUse { target: String, name: String },
    #[error("targets {} use each other in a cycle", .targets.join(", "))]
    Cycle { targets: Vec<String> },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A document and where it is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Absolute source path.
    pub source: PathBuf,
    pub target: String,
    /// Output path below the output root, `/`-separated.
    pub site_path: String,
}

impl PageRef {
    /// Output file name (`post.html`, `index.html`).
    pub fn file_name(&self) -> &str {
        self.site_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.site_path)
    }
}

/// One target with its resolved paths, documents and edges.
#[derive(Debug, Clone)]
pub struct TargetNode {
    pub config: TargetConfig,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pages: Vec<PageRef>,
    pub series: Option<SeriesMeta>,
    /// Indices of `use`d targets.
    pub uses: Vec<usize>,
}

impl TargetNode {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Output directory below the output root.
    pub fn site_dir(&self) -> &str {
        &self.config.name
    }

    /// Site path of the page that serves as this target's landing page.
    pub fn landing_path(&self) -> String {
        format!("{}/index.html", self.site_dir())
    }
}

#[derive(Debug, Clone)]
pub struct SiteGraph {
    content_root: PathBuf,
    output_root: PathBuf,
    targets: Vec<TargetNode>,
    order: Vec<usize>,
    by_source: HashMap<PathBuf, (usize, usize)>,
}

fn publish_pages(target: &TargetConfig, sources: Vec<PathBuf>) -> Vec<PageRef> {
    sources
        .into_iter()
        .enumerate()
        .map(|(i, source)| {
            let file = if !target.index && i == 0 {
                "index.html".to_string()
            } else {
                format!("{}.html", file_stem(&source))
            };
            PageRef {
                site_path: format!("{}/{file}", target.name),
                target: target.name.clone(),
                source,
            }
        })
        .collect()
}

impl SiteGraph {
    pub fn build(
        config: &SiteConfig,
        content_root: &Path,
        output_root: &Path,
    ) -> Result<Self, GraphError> {
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for (i, target) in config.targets.iter().enumerate() {
            if index_of.insert(target.name.as_str(), i).is_some() {
                return Err(GraphError::DuplicateTarget {
                    name: target.name.clone(),
                });
            }
        }

        let mut targets = Vec::with_capacity(config.targets.len());
        for target in &config.targets {
            let source_dir = target.source_dir(content_root);
            let uses = target
                .uses
                .iter()
                .map(|name| {
                    index_of
                        .get(name.as_str())
                        .copied()
                        .ok_or_else(|| GraphError::UnknownUse {
                            target: target.name.clone(),
                            name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let (sources, series) = if target.is_series() {
                let meta = series::link(&target.name, &target.series, &source_dir)?;
                (meta.pages().to_vec(), Some(meta))
            } else {
                let sources = target.pages.iter().map(|p| source_dir.join(p)).collect();
                (sources, None)
            };

            targets.push(TargetNode {
                pages: publish_pages(target, sources),
                output_dir: output_root.join(&target.name),
                config: target.clone(),
                source_dir,
                series,
                uses,
            });
        }

        let order = topological_order(&targets)?;
        let by_source = targets
            .iter()
            .enumerate()
            .flat_map(|(t, node)| {
                node.pages
                    .iter()
                    .enumerate()
                    .map(move |(p, page)| (page.source.clone(), (t, p)))
            })
            .collect();

        Ok(Self {
            content_root: content_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            targets,
            order,
            by_source,
        })
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn targets(&self) -> &[TargetNode] {
        &self.targets
    }

    pub fn target(&self, index: usize) -> &TargetNode {
        &self.targets[index]
    }

    pub fn find(&self, name: &str) -> Option<&TargetNode> {
        self.targets.iter().find(|t| t.name() == name)
    }

    pub fn is_target(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Target indices with dependencies first.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// The publishing record for a source document.
    pub fn page(&self, source: &Path) -> Option<&PageRef> {
        self.by_source
            .get(source)
            .map(|&(t, p)| &self.targets[t].pages[p])
    }
}

/// Kahn's algorithm over `use` edges; ties keep config order.
fn topological_order(targets: &[TargetNode]) -> Result<Vec<usize>, GraphError> {
    let mut pending: Vec<usize> = targets.iter().map(|t| t.uses.len()).collect();
    let mut users: Vec<Vec<usize>> = vec![Vec::new(); targets.len()];
    for (i, target) in targets.iter().enumerate() {
        for &dep in &target.uses {
            users[dep].push(i);
        }
    }

    let mut ready: VecDeque<usize> = (0..targets.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(targets.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &user in &users[i] {
            pending[user] -= 1;
            if pending[user] == 0 {
                ready.push_back(user);
            }
        }
    }

    if order.len() < targets.len() {
        let targets = (0..targets.len())
            .filter(|i| !order.contains(i))
            .map(|i| targets[i].name().to_string())
            .collect();
        return Err(GraphError::Cycle { targets });
    }
    Ok(order)
}
