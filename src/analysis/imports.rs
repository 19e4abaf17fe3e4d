//! Imports a generated caller needs to reference what a function uses.
//!
//! Qualified references are easy: the package identifier resolves to its
//! import. A dot-imported declaration carries no qualifier at all, so the
//! resolver remembers the package named by the previous identifier and
//! treats a foreign package-level reference that did not directly follow
//! its own package identifier as unqualified access.

use std::collections::BTreeSet;

use super::RequiredImport;
use crate::syntax::visit::{self, Visit};
use crate::syntax::{FuncDecl, Ident, PackageRef, Resolution};

pub const DOT_IMPORT_ALIAS: &str = ".";

#[derive(Debug)]
pub struct ImportResolver<'a> {
    /// Import path of the package being analyzed.
    own_package: &'a str,
    previous_package: Option<PackageRef>,
    required: BTreeSet<RequiredImport>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(own_package: &'a str) -> Self {
        Self {
            own_package,
            previous_package: None,
            required: BTreeSet::new(),
        }
    }

    /// Imports needed by `func`'s signature and body, sorted and deduplicated.
    pub fn resolve(own_package: &'a str, func: &FuncDecl) -> Vec<RequiredImport> {
        let mut resolver = Self::new(own_package);
        visit::walk_func_decl(&mut resolver, func);
        resolver.finish()
    }

    pub fn finish(self) -> Vec<RequiredImport> {
        self.required.into_iter().collect()
    }

    fn require(&mut self, path: &str, alias: &str) {
        self.required.insert(RequiredImport {
            path: path.to_string(),
            alias: alias.to_string(),
        });
    }
}

impl<'ast> Visit<'ast> for ImportResolver<'_> {
    fn visit_ident(&mut self, ident: &'ast Ident) {
        match &ident.resolution {
            Some(Resolution::Package(package)) => {
                self.require(&package.path, &ident.name);
                self.previous_package = Some(package.clone());
            }
            Some(Resolution::Declared {
                package: Some(package),
                package_level: true,
            }) if package.path != self.own_package => {
                let qualified = self
                    .previous_package
                    .take()
                    .is_some_and(|previous| previous.path == package.path);
                if !qualified {
                    tracing::trace!(
                        name = %ident.name,
                        package = %package.path,
                        "unqualified reference through dot import"
                    );
                    self.require(&package.path, DOT_IMPORT_ALIAS);
                }
            }
            _ => self.previous_package = None,
        }
    }
}
