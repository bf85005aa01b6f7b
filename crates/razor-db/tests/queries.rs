use std::sync::Arc;

use pretty_assertions::assert_eq;
use razor_db::{Document, RootDatabase};
use razor_parse::ParserOptions;
use razor_syntax::{Checksum, GreenNode, WeakCache};
use salsa::Setter as _;

fn document(db: &RootDatabase, text: &str) -> Document {
    Document::new(db, "Index.cshtml".into(), text.to_owned(), ParserOptions::default())
}

fn diagnostic_lines(db: &RootDatabase, document: Document) -> Vec<(u32, &'static str)> {
    let line_index = document.line_index(db);
    document
        .diagnostics(db)
        .iter()
        .map(|diagnostic| {
            let line = line_index.line_col(diagnostic.span().start()).line + 1;
            (line, diagnostic.id())
        })
        .collect()
}

#[test]
fn diagnostics_map_to_lines() {
    let db = RootDatabase::default();
    let document = document(&db, "<p>\n  @ \n</p>\n@code x\n");

    assert_eq!(diagnostic_lines(&db, document), [(2, "RZ1004"), (4, "RZ1017")]);
}

#[test]
fn identical_documents_share_a_tree() {
    let db = RootDatabase::default();
    let first = document(&db, "<p>@user.Name</p>");
    let second = document(&db, "<p>@user.Name</p>");
    let design_time = Document::new(
        &db,
        "Other.cshtml".into(),
        "<p>@user.Name</p>".to_owned(),
        ParserOptions { design_time: true, ..ParserOptions::default() },
    );

    let first = first.syntax_tree(&db);
    let second = second.syntax_tree(&db);
    let design_time = design_time.syntax_tree(&db);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &design_time));
    assert!(first.root().green().is_equivalent_to(design_time.root().green()));
}

#[test]
fn databases_can_share_a_parse_cache() {
    let cache = Arc::new(WeakCache::default());
    let left = RootDatabase::with_parse_cache(Arc::clone(&cache));
    let right = RootDatabase::with_parse_cache(Arc::clone(&cache));

    let left_tree = document(&left, "@{ var x = 1; }").syntax_tree(&left);
    let right_tree = document(&right, "@{ var x = 1; }").syntax_tree(&right);

    assert!(GreenNode::ptr_eq(left_tree.root().green(), right_tree.root().green()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn editing_text_reparses() {
    let mut db = RootDatabase::default();
    let document = document(&db, "@using System\n<p>@x</p>");
    assert_eq!(document.document_ir(&db).usings().collect::<Vec<_>>(), ["System"]);

    document.set_text(&mut db).to("@using System.Linq\n<p>@(x</p>".to_owned());

    assert_eq!(document.syntax_tree(&db).text(), "@using System.Linq\n<p>@(x</p>");
    assert_eq!(document.document_ir(&db).usings().collect::<Vec<_>>(), ["System.Linq"]);
    assert_eq!(diagnostic_lines(&db, document), [(2, "RZ1006")]);
}

#[test]
fn dropped_trees_leave_the_cache() {
    let cache = Arc::new(WeakCache::default());
    {
        let db = RootDatabase::with_parse_cache(Arc::clone(&cache));
        let tree = document(&db, "@x").syntax_tree(&db);

        let checksum = Checksum::of(&("@x", ParserOptions::default()));
        let cached = cache.get(checksum).expect("tree is cached while alive");
        assert!(Arc::ptr_eq(&cached, &tree));
    }

    cache.cleanup();
    assert!(cache.is_empty());
}

#[test]
fn colliding_cache_entry_is_not_reused() {
    let cache = Arc::new(WeakCache::default());
    let options = ParserOptions::default();
    let checksum = Checksum::of(&("@x", options));
    let planted = cache.get_or_insert_with(checksum, |_| true, || razor_parse::parse("@y", &options));

    let db = RootDatabase::with_parse_cache(Arc::clone(&cache));
    let tree = document(&db, "@x").syntax_tree(&db);

    assert_eq!(tree.text(), "@x");
    assert!(!Arc::ptr_eq(&tree, &planted));
    assert_eq!(planted.text(), "@y");
}
