//! Incremental queries over Razor documents.

use std::sync::Arc;

pub use line_index::LineIndex;
use razor_errors::RazorDiagnostic;
use razor_ir::DocumentIr;
use razor_parse::{ParserOptions, RazorSyntaxTree};
use razor_syntax::{Checksum, WeakCache};

#[salsa::db]
pub trait Db: salsa::Database {
    /// Trees shared between documents with the same text and options.
    fn parse_cache(&self) -> &WeakCache<RazorSyntaxTree>;
}

#[salsa::input(debug)]
pub struct Document {
    #[returns(ref)]
    pub path: camino::Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
    pub options: ParserOptions,
}

#[salsa::tracked]
impl Document {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn Db) -> LineIndex {
        LineIndex::new(self.text(db))
    }

    #[salsa::tracked]
    pub fn syntax_tree(self, db: &dyn Db) -> Arc<RazorSyntaxTree> {
        let text = self.text(db);
        let options = self.options(db);
        let checksum = Checksum::of(&(text, options));
        db.parse_cache().get_or_insert_with(
            checksum,
            |tree| tree.text() == text && tree.options() == options,
            || razor_parse::parse(text, &options),
        )
    }

    #[salsa::tracked(returns(ref))]
    pub fn diagnostics(self, db: &dyn Db) -> Vec<RazorDiagnostic> {
        self.syntax_tree(db).diagnostics()
    }

    #[salsa::tracked(returns(ref))]
    pub fn document_ir(self, db: &dyn Db) -> DocumentIr {
        razor_ir::lower(&self.syntax_tree(db))
    }
}

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
    parse_cache: Arc<WeakCache<RazorSyntaxTree>>,
}

impl RootDatabase {
    /// A database sharing `parse_cache` with other databases.
    pub fn with_parse_cache(parse_cache: Arc<WeakCache<RazorSyntaxTree>>) -> Self {
        Self { storage: salsa::Storage::default(), parse_cache }
    }
}

#[salsa::db]
impl salsa::Database for RootDatabase {}

#[salsa::db]
impl Db for RootDatabase {
    fn parse_cache(&self) -> &WeakCache<RazorSyntaxTree> {
        &self.parse_cache
    }
}
