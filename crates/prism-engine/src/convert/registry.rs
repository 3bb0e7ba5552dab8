use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ConvertError, RegistryError};
use crate::repr::{ReprType, Representation};

use super::key::{PathKey, TieBreak};
use super::package::describe_stages;
use super::{Converter, ConverterPackage};

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Choice between packages reaching the same destination.
    pub tie_break: TieBreak,

    /// Compose packages from elementary converters once all built-ins are registered.
    pub compose_chains: bool,

    /// Longest package [`ConverterRegistry::compose_chains`] assembles.
    pub max_hops: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::RegistrationOrder,
            compose_chains: true,
            max_hops: 3,
        }
    }
}

struct RankedPackage {
    key: PathKey,
    package: ConverterPackage,
}

/// A resolved conversion: one elementary converter or a package.
#[derive(Clone, Copy)]
pub enum ConversionPath<'r> {
    Direct(&'r Arc<dyn Converter>),
    Package(&'r ConverterPackage),
}

impl<'r> ConversionPath<'r> {
    /// Converters to run, in order.
    pub fn stages(&self) -> &'r [Arc<dyn Converter>] {
        match *self {
            ConversionPath::Direct(c) => std::slice::from_ref(c),
            ConversionPath::Package(p) => p.stages(),
        }
    }

    #[inline]
    pub fn hops(&self) -> usize {
        self.stages().len()
    }

    pub fn describe(&self) -> String {
        describe_stages(self.stages())
    }
}

impl core::fmt::Debug for ConversionPath<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// All converters known to a process, constructed explicitly at start-up and
/// shared with data objects through an `Arc`.
///
/// Lookup characteristics:
/// - direct converters are found by a hash on `(from, to)`
/// - packages are ranked when registered, so lookup never searches the graph
pub struct ConverterRegistry {
    /// Elementary converters in registration order.
    converters: Vec<Arc<dyn Converter>>,
    direct: HashMap<(ReprType, ReprType), Vec<Arc<dyn Converter>>>,
    packages: HashMap<(ReprType, ReprType), Vec<RankedPackage>>,
    tie_break: TieBreak,
    next_order: u32,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new(TieBreak::default())
    }
}

impl ConverterRegistry {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            converters: Vec::new(),
            direct: HashMap::new(),
            packages: HashMap::new(),
            tie_break,
            next_order: 0,
        }
    }

    /// Registers an elementary converter and returns the shared handle, which
    /// can be reused as a package stage.
    pub fn register<C: Converter + 'static>(&mut self, converter: C) -> Arc<dyn Converter> {
        let converter: Arc<dyn Converter> = Arc::new(converter);
        self.register_arc(converter.clone());
        converter
    }

    pub fn register_arc(&mut self, converter: Arc<dyn Converter>) {
        log::debug!(
            "registered converter {} ({} -> {})",
            converter.name(),
            converter.from_type(),
            converter.to_type()
        );
        self.direct
            .entry((converter.from_type(), converter.to_type()))
            .or_default()
            .push(converter.clone());
        self.converters.push(converter);
    }

    /// Validates and registers an explicit multi-hop package.
    pub fn register_package(
        &mut self,
        stages: Vec<Arc<dyn Converter>>,
    ) -> Result<(), RegistryError> {
        let package = ConverterPackage::new(stages)?;
        self.insert_package(package);
        Ok(())
    }

    fn insert_package(&mut self, package: ConverterPackage) {
        let key = PathKey::new(package.hops(), self.next_order);
        self.next_order += 1;
        log::debug!("registered package {}", package.describe());

        let policy = self.tie_break;
        let ranked = self
            .packages
            .entry((package.from_type(), package.to_type()))
            .or_default();
        ranked.push(RankedPackage { key, package });
        ranked.sort_by(|a, b| a.key.cmp_under(&b.key, policy));
    }

    /// Assembles every simple path of 2..=`max_hops` elementary converters
    /// whose endpoints have no direct converter, and registers each as a
    /// package. Paths already registered explicitly are skipped.
    ///
    /// Run once after all elementary converters are registered. Returns the
    /// number of packages added.
    pub fn compose_chains(&mut self, max_hops: usize) -> usize {
        let mut found: Vec<Vec<Arc<dyn Converter>>> = Vec::new();
        let mut starts: Vec<ReprType> = Vec::new();
        for c in &self.converters {
            if !starts.contains(&c.from_type()) {
                starts.push(c.from_type());
            }
        }

        for start in starts {
            let mut path = Vec::new();
            self.collect_paths(start, &mut path, &mut vec![start], max_hops, &mut found);
        }

        let added = self.insert_composed(found);
        log::debug!("composed {added} converter packages (max {max_hops} hops)");
        added
    }

    /// Registers discovered chains, shortest first, and returns how many were
    /// accepted.
    fn insert_composed(&mut self, mut found: Vec<Vec<Arc<dyn Converter>>>) -> usize {
        found.sort_by_key(Vec::len);
        let mut added = 0;
        for stages in found {
            match ConverterPackage::new(stages) {
                Ok(package) => {
                    self.insert_package(package);
                    added += 1;
                }
                Err(err) => log::warn!("skipping composed chain: {err}"),
            }
        }
        added
    }

    fn collect_paths(
        &self,
        start: ReprType,
        path: &mut Vec<Arc<dyn Converter>>,
        visited: &mut Vec<ReprType>,
        max_hops: usize,
        found: &mut Vec<Vec<Arc<dyn Converter>>>,
    ) {
        if path.len() >= max_hops {
            return;
        }
        let at = visited[visited.len() - 1];

        for c in &self.converters {
            let to = c.to_type();
            if c.from_type() != at || visited.contains(&to) {
                continue;
            }

            path.push(c.clone());
            visited.push(to);

            if path.len() >= 2
                && !self.direct.contains_key(&(start, to))
                && !self.has_package(path)
            {
                found.push(path.clone());
            }
            self.collect_paths(start, path, visited, max_hops, found);

            visited.pop();
            path.pop();
        }
    }

    fn has_package(&self, stages: &[Arc<dyn Converter>]) -> bool {
        let (Some(first), Some(last)) = (stages.first(), stages.last()) else {
            return false;
        };
        self.packages
            .get(&(first.from_type(), last.to_type()))
            .is_some_and(|ranked| ranked.iter().any(|r| r.package.same_stages(stages)))
    }

    #[inline]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Changes the tie-break policy and re-ranks every package.
    pub fn set_tie_break(&mut self, policy: TieBreak) {
        self.tie_break = policy;
        for ranked in self.packages.values_mut() {
            ranked.sort_by(|a, b| a.key.cmp_under(&b.key, policy));
        }
    }

    /// Picks a path from `source` to `to`.
    ///
    /// Direct converters are tried before packages, each in rank order. A
    /// candidate is only used once `can_convert_from` accepts the concrete
    /// source. When every candidate rejects, the first rejection is reported
    /// as [`ConvertError::FormatMismatch`]; without any candidate the result is
    /// [`ConvertError::Unavailable`].
    pub fn find(
        &self,
        source: &dyn Representation,
        to: ReprType,
    ) -> Result<ConversionPath<'_>, ConvertError> {
        let from = source.repr_type();
        let mut rejection: Option<(&'static str, String)> = None;

        if let Some(converters) = self.direct.get(&(from, to)) {
            for c in converters {
                match c.can_convert_from(source) {
                    Ok(()) => return Ok(ConversionPath::Direct(c)),
                    Err(reason) => {
                        log::debug!("{} rejected {from} ({}): {reason}", c.name(), source.format());
                        rejection.get_or_insert((c.name(), reason));
                    }
                }
            }
        }

        if let Some(ranked) = self.packages.get(&(from, to)) {
            for r in ranked {
                let first = &r.package.stages()[0];
                match first.can_convert_from(source) {
                    Ok(()) => return Ok(ConversionPath::Package(&r.package)),
                    Err(reason) => {
                        log::debug!(
                            "package {} rejected {from} ({}): {reason}",
                            r.package.describe(),
                            source.format()
                        );
                        rejection.get_or_insert((first.name(), reason));
                    }
                }
            }
        }

        match rejection {
            Some((converter, reason)) => Err(ConvertError::FormatMismatch {
                converter,
                from: from.name(),
                to: to.name(),
                format: source.format(),
                extent: source.extent(),
                reason,
            }),
            None => Err(ConvertError::Unavailable {
                from: from.name(),
                to: to.name(),
                format: source.format(),
            }),
        }
    }

    /// True if any converter or package is registered for `(from, to)`,
    /// regardless of runtime compatibility.
    pub fn has_path(&self, from: ReprType, to: ReprType) -> bool {
        self.direct.contains_key(&(from, to)) || self.packages.contains_key(&(from, to))
    }

    /// True if anything at all produces `to`.
    pub fn reaches(&self, to: ReprType) -> bool {
        self.converters.iter().any(|c| c.to_type() == to)
    }

    #[inline]
    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }

    pub fn package_count(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    /// One line per direct converter and per package, in registration order.
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .converters
            .iter()
            .map(|c| format!("{}: {} -> {}", c.name(), c.from_type(), c.to_type()))
            .collect();

        let mut ranked: Vec<&RankedPackage> = self.packages.values().flatten().collect();
        ranked.sort_by_key(|r| r.key.order);
        lines.extend(ranked.iter().map(|r| format!("package: {}", r.package.describe())));
        lines
    }
}
