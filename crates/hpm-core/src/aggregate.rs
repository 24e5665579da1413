//! Folding every package of one installation into one mapping
//!
//! Files are processed strictly one after another. Each file's environment
//! is folded into the running accumulator: new keys go last, new values go
//! after existing ones, and a value already present under a key is dropped.
//!
//! The fold is order-sensitive, so the result is only as deterministic as the
//! file order. Files handed to [`PackageAggregator::aggregate_files`] are
//! folded exactly as given. The configured [`FileOrdering`] only applies to
//! [`PackageAggregator::discover`], where [`FileOrdering::Listing`] keeps the
//! file system's order and [`FileOrdering::Lexicographic`] (the default) or a
//! custom comparator makes it reproducible.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::diagnostic::Diagnostic;
use crate::environment::EnvMap;
use crate::error::{Error, Result};
use crate::package::{PackageContext, PackageOptions, PackageResolution};
use crate::resolve::SeedMapping;

/// Extension of package files.
pub const PACKAGE_EXTENSION: &str = "json";

type Comparator = Arc<dyn Fn(&Path, &Path) -> Ordering + Send + Sync>;

/// Order in which package files are folded.
#[derive(Clone, Default)]
pub enum FileOrdering {
    /// Keep the order files were supplied or listed in
    Listing,
    /// Sort by file name, then by full path
    #[default]
    Lexicographic,
    /// Sort with a caller-supplied comparator
    Custom(Comparator),
}

impl fmt::Debug for FileOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => f.write_str("Listing"),
            Self::Lexicographic => f.write_str("Lexicographic"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FileOrdering {
    /// Reorder `files` in place.
    pub fn apply(&self, files: &mut [PathBuf]) {
        match self {
            Self::Listing => {}
            Self::Lexicographic => files.sort_by(|a, b| {
                a.file_name()
                    .cmp(&b.file_name())
                    .then_with(|| a.cmp(b))
            }),
            Self::Custom(compare) => files.sort_by(|a, b| compare(a, b)),
        }
    }
}

/// The combined result for one package directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub environment: EnvMap,
    pub misplaced: EnvMap,
    /// Every package, in fold order, including disabled and malformed ones
    pub packages: Vec<PackageResolution>,
}

impl AggregateReport {
    /// All package diagnostics in fold order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.packages.iter().flat_map(|p| p.diagnostics.iter())
    }
}

/// Runs the package pipeline over a set of files and folds the results.
#[derive(Debug, Clone)]
pub struct PackageAggregator {
    options: PackageOptions,
    ordering: FileOrdering,
    include_disabled: bool,
    carry_bindings: bool,
}

impl Default for PackageAggregator {
    fn default() -> Self {
        Self::new(PackageOptions::default())
    }
}

impl PackageAggregator {
    pub fn new(options: PackageOptions) -> Self {
        Self {
            options,
            ordering: FileOrdering::default(),
            include_disabled: false,
            carry_bindings: true,
        }
    }

    pub fn with_ordering(mut self, ordering: FileOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Order files with `compare` instead of a built-in ordering.
    pub fn with_comparator<F>(self, compare: F) -> Self
    where
        F: Fn(&Path, &Path) -> Ordering + Send + Sync + 'static,
    {
        self.with_ordering(FileOrdering::Custom(Arc::new(compare)))
    }

    /// Fold disabled packages too.
    pub fn include_disabled(mut self, include: bool) -> Self {
        self.include_disabled = include;
        self
    }

    /// Let packages refer to `env` variables defined by earlier packages.
    pub fn carry_bindings(mut self, carry: bool) -> Self {
        self.carry_bindings = carry;
        self
    }

    pub fn options(&self) -> &PackageOptions {
        &self.options
    }

    pub fn ordering(&self) -> &FileOrdering {
        &self.ordering
    }

    /// List the package files of `dir`, ordered for folding.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|e| Error::read(dir, e))?.path();
            let is_package = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION));
            if is_package {
                files.push(path);
            }
        }

        self.ordering.apply(&mut files);
        Ok(files)
    }

    /// Discover and fold every package file in `dir`.
    pub fn aggregate_dir(&self, dir: &Path, seed: &SeedMapping) -> Result<AggregateReport> {
        let files = self.discover(dir)?;
        debug!(dir = %dir.display(), count = files.len(), "Discovered package files");
        Ok(self.fold(&files, seed))
    }

    /// Fold the given files in the order supplied.
    pub fn aggregate_files(&self, files: &[PathBuf], seed: &SeedMapping) -> AggregateReport {
        self.fold(files, seed)
    }

    fn fold(&self, files: &[PathBuf], seed: &SeedMapping) -> AggregateReport {
        let mut report = AggregateReport::default();
        let mut inherited = SeedMapping::new();

        for file in files {
            let mut context = PackageContext::new(seed, &self.options);
            if self.carry_bindings {
                context = context.with_inherited(&inherited);
            }
            let package = context.resolve_file(file);

            if package.enabled || self.include_disabled {
                report.environment.merge(&package.environment);
                report.misplaced.merge(&package.misplaced);
                if self.carry_bindings {
                    inherited.extend(package.exported());
                }
            } else {
                debug!(package = %package.name, "Skipping disabled package");
            }
            trace!(
                package = %package.name,
                keys = report.environment.len(),
                "Folded package"
            );

            report.packages.push(package);
        }

        report
    }
}
