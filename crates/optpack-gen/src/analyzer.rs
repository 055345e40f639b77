use std::collections::{HashMap, HashSet};

use crate::extract::DeclCollector;
use crate::package::Package;
use crate::receiver::{ReceiverNormalizer, RustReceiverNormalizer};

/// One declared type and the names of the functions in its impl blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclEntry {
    name: String,
    methods: Vec<String>,
    method_set: HashSet<String>,
}

impl DeclEntry {
    fn new(name: String) -> Self {
        DeclEntry {
            name,
            methods: Vec::new(),
            method_set: HashSet::new(),
        }
    }

    fn push_method(&mut self, method: &str) {
        if self.method_set.insert(method.to_string()) {
            self.methods.push(method.to_string());
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method names in first-seen order, without duplicates.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method_set.contains(name)
    }
}

/// Declared types of one package mapped to their methods.
///
/// When several files declare the same type name the first one seen wins (files
/// in package order, items in source order). Methods attach by name, so those of
/// the shadowed declarations end up on the surviving entry too.
#[derive(Debug, Clone)]
pub struct Analyzer {
    package_name: String,
    package_path: String,
    entries: Vec<DeclEntry>,
    index: HashMap<String, usize>,
}

impl Analyzer {
    pub fn from_package<P: Package + ?Sized>(pkg: &P) -> Self {
        Self::with_normalizer(pkg, &RustReceiverNormalizer)
    }

    /// # Panics
    ///
    /// Panics if `normalizer` rejects a receiver.
    pub fn with_normalizer<P: Package + ?Sized>(
        pkg: &P,
        normalizer: &dyn ReceiverNormalizer,
    ) -> Self {
        let mut collector = DeclCollector::default();
        for file in pkg.syntax() {
            collector.collect(file);
        }

        let mut entries: Vec<DeclEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for name in collector.types {
            if index.contains_key(&name) {
                tracing::debug!(type_name = %name, "skipping duplicate type declaration");
                continue;
            }
            index.insert(name.clone(), entries.len());
            entries.push(DeclEntry::new(name));
        }

        for method in &collector.methods {
            let recv = normalizer.normalize(method.receiver);
            if let Some(&i) = index.get(&recv) {
                entries[i].push_method(&method.name);
            }
        }

        tracing::debug!(
            package = pkg.name(),
            types = entries.len(),
            methods = collector.methods.len(),
            "analyzed package"
        );

        Analyzer {
            package_name: pkg.name().to_string(),
            package_path: pkg.path().to_string(),
            entries,
            index,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&DeclEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = &DeclEntry> {
        self.entries.iter()
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }
}
