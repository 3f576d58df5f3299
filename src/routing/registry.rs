//! Route registration.
//!
//! # Responsibilities
//! - Expand every declared handler into concrete routes
//! - Reject ambiguous mappings before any traffic is served
//! - Freeze the result as an immutable [`RouteTable`]
//!
//! # Design Decisions
//! - All-or-nothing: the first error aborts and no table is produced
//! - Two routes conflict when method, path, headers, params, consumes and
//!   produces are all identical
//! - Templates the host router would refuse are refused here first
//! - Entries keep registration order, which breaks runtime ties

use std::collections::HashMap;

use matchit::InsertError;
use serde::Serialize;

use crate::config::VersioningConfig;
use crate::routing::descriptor::{Endpoint, HandlerDescriptor, HandlerGroup};
use crate::routing::error::RouteError;
use crate::routing::expander::{ExpandedRoute, RouteExpander};
use crate::routing::matcher::{CriteriaSignature, RequestCriteria};

/// One registered path of one expanded route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Registration index, unique within the table.
    pub id: usize,
    pub name: String,
    pub version: Option<u32>,
    /// Full path template including the version segment.
    pub path: String,
    /// Criteria for this entry; `paths` holds only [`RouteEntry::path`].
    pub criteria: RequestCriteria,
    pub endpoint: Endpoint,
}

/// Serializable view of a [`RouteEntry`].
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub version: Option<u32>,
    pub methods: Vec<String>,
    pub path: String,
    #[serde(flatten)]
    pub conditions: CriteriaSignature,
}

/// Immutable dispatch table, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    versioning: VersioningConfig,
}

impl RouteTable {
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn versioning(&self) -> &VersioningConfig {
        &self.versioning
    }

    /// Entries grouped by path template, groups in first-seen order.
    pub fn by_path(&self) -> Vec<(&str, Vec<&RouteEntry>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&RouteEntry>)> = Vec::new();
        for entry in &self.entries {
            match index.get(entry.path.as_str()) {
                Some(&i) => groups[i].1.push(entry),
                None => {
                    index.insert(entry.path.as_str(), groups.len());
                    groups.push((entry.path.as_str(), vec![entry]));
                }
            }
        }
        groups
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.entries
            .iter()
            .map(|e| RouteSummary {
                name: e.name.clone(),
                version: e.version,
                methods: e.criteria.methods.iter().map(ToString::to_string).collect(),
                path: e.path.clone(),
                conditions: e.criteria.signature(),
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ConflictKey {
    method: Option<String>,
    path: String,
    signature: CriteriaSignature,
}

/// Map a rejected template onto the registration error it stands for.
fn template_error(
    err: InsertError,
    endpoint: &str,
    path: &str,
    owners: &HashMap<String, String>,
) -> RouteError {
    match err {
        InsertError::Conflict { with } => RouteError::Conflict {
            existing: owners.get(&with).cloned().unwrap_or(with),
            duplicate: endpoint.to_string(),
            method: "*".to_string(),
            path: path.to_string(),
        },
        _ => RouteError::InvalidPath {
            endpoint: endpoint.to_string(),
            path: path.to_string(),
        },
    }
}

/// Register expanded routes into a table.
///
/// Every distinct template is inserted into the same matcher the host router
/// uses, so a table that builds can always be served. Overlapping templates
/// (`/t/{id}` and `/t/{key}`, `/t/{id}` and `/t/{*rest}`) and identical
/// request tuples fail with [`RouteError::Conflict`]; malformed captures fail
/// with [`RouteError::InvalidPath`].
pub fn register_with(
    routes: Vec<ExpandedRoute>,
    versioning: VersioningConfig,
) -> Result<RouteTable, RouteError> {
    let mut templates: matchit::Router<()> = matchit::Router::new();
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut seen: HashMap<ConflictKey, String> = HashMap::new();
    let mut entries = Vec::new();

    for route in routes {
        let signature = route.criteria.signature();

        for path in &route.criteria.paths {
            if !owners.contains_key(path) {
                templates
                    .insert(path.as_str(), ())
                    .map_err(|err| template_error(err, &route.name, path, &owners))?;
                owners.insert(path.clone(), route.name.clone());
            }

            let methods: Vec<Option<String>> = if route.criteria.methods.is_empty() {
                vec![None]
            } else {
                route.criteria.methods.iter().map(|m| Some(m.to_string())).collect()
            };

            for method in methods {
                let key = ConflictKey {
                    method: method.clone(),
                    path: path.clone(),
                    signature: signature.clone(),
                };
                if let Some(existing) = seen.get(&key) {
                    return Err(RouteError::Conflict {
                        existing: existing.clone(),
                        duplicate: route.name.clone(),
                        method: method.unwrap_or_else(|| "*".to_string()),
                        path: path.clone(),
                    });
                }
                seen.insert(key, route.name.clone());
            }

            tracing::debug!(
                endpoint = %route.name,
                path = %path,
                version = ?route.version,
                methods = ?route.criteria.methods,
                "Registered route"
            );

            entries.push(RouteEntry {
                id: entries.len(),
                name: route.name.clone(),
                version: route.version,
                path: path.clone(),
                criteria: RequestCriteria {
                    paths: vec![path.clone()],
                    ..route.criteria.clone()
                },
                endpoint: route.endpoint.clone(),
            });
        }
    }

    Ok(RouteTable {
        entries,
        versioning,
    })
}

/// Register expanded routes using the default versioning bounds.
pub fn register(routes: Vec<ExpandedRoute>) -> Result<RouteTable, RouteError> {
    register_with(routes, VersioningConfig::default())
}

#[derive(Debug)]
enum Declaration {
    Handler(HandlerDescriptor),
    Group(HandlerGroup),
}

/// Collects handler declarations and builds the [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteRegistry {
    expander: RouteExpander,
    declarations: Vec<Declaration>,
}

impl RouteRegistry {
    pub fn new(versioning: VersioningConfig) -> Self {
        Self {
            expander: RouteExpander::new(versioning),
            declarations: Vec::new(),
        }
    }

    /// Add every member of a group, with group defaults applied at build.
    pub fn group(mut self, group: HandlerGroup) -> Self {
        self.declarations.push(Declaration::Group(group));
        self
    }

    pub fn handler(mut self, descriptor: HandlerDescriptor) -> Self {
        self.declarations.push(Declaration::Handler(descriptor));
        self
    }

    /// Expand and register everything declared so far.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut descriptors = Vec::new();
        for declaration in self.declarations {
            match declaration {
                Declaration::Handler(descriptor) => descriptors.push(descriptor),
                Declaration::Group(group) => descriptors.extend(group.descriptors()?),
            }
        }

        let mut routes = Vec::new();
        for descriptor in &descriptors {
            routes.extend(self.expander.expand(descriptor)?);
        }

        let table = register_with(routes, self.expander.versioning().clone())?;

        tracing::info!(
            endpoints = descriptors.len(),
            routes = table.len(),
            versioned = table.entries().iter().filter(|e| e.version.is_some()).count(),
            max_api_version = self.expander.versioning().max_api_version,
            "Route table built"
        );
        Ok(table)
    }
}
