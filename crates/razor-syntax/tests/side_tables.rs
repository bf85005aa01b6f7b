use std::thread;

use pretty_assertions::assert_eq;
use razor_syntax::{
    Annotated as _, GreenList, GreenNode, RazorDiagnostic, SyntaxAnnotation, SyntaxKind,
    SyntaxNode, SyntaxToken, TextRange,
};

fn literal(text: &str) -> GreenNode {
    GreenNode::new(SyntaxKind::MARKUP_TEXT_LITERAL, [Some(GreenNode::token(SyntaxKind::TEXT, text))])
}

#[test]
fn no_op_annotation_calls_return_same_node() {
    let node = literal("x");
    let never_attached = SyntaxAnnotation::new("test");

    assert!(GreenNode::ptr_eq(&node.without_annotation(&never_attached), &node));
    assert!(GreenNode::ptr_eq(&node.with_additional_annotations(Vec::<SyntaxAnnotation>::new()), &node));
    assert!(GreenNode::ptr_eq(&node.without_annotations_of_kind("test"), &node));
}

#[test]
fn adding_is_non_destructive_and_deduplicated() {
    let node = literal("x");
    let annotation = SyntaxAnnotation::new("test");

    let annotated = node.with_additional_annotation(annotation.clone());
    assert!(annotated.has_annotation(&annotation));
    assert!(!node.has_annotation(&annotation));
    assert!(!GreenNode::ptr_eq(&annotated, &node));

    let twice = annotated.with_additional_annotation(annotation.clone());
    assert!(GreenNode::ptr_eq(&twice, &annotated));
    assert_eq!(twice.annotations_of_kind("test").count(), 1);
}

#[test]
fn removes_only_the_requested_kind() {
    let a1 = SyntaxAnnotation::new("test");
    let a2 = SyntaxAnnotation::with_data("test", 2_u32);
    let a3 = SyntaxAnnotation::new("other");
    let node = literal("x").with_additional_annotations([a1.clone(), a2.clone(), a3.clone()]);

    let stripped = node.without_annotations_of_kind("test");

    assert_eq!(stripped.annotations(), vec![a3.clone()]);
    assert_eq!(node.annotations(), vec![a1, a2.clone(), a3]);
    assert_eq!(a2.data::<u32>(), Some(&2));
}

#[test]
fn annotations_survive_on_red_nodes_and_copy_to_replacements() {
    let annotation = SyntaxAnnotation::new("razor.directive");
    let root = SyntaxNode::new_root(GreenNode::new(
        SyntaxKind::MARKUP_BLOCK,
        [GreenList::new([literal("a"), literal("b")]).into_slot()],
    ));
    let second = root.children().nth(1).expect("two literals");

    let annotated = second.with_additional_annotation(annotation.clone());
    assert_eq!(annotated.position(), second.position());
    assert!(annotated.has_annotation(&annotation));

    let replacement = annotated.copy_annotations_to(literal("c"));
    assert!(replacement.has_annotation(&annotation));
}

#[test]
fn diagnostic_three_levels_down_is_reported_once() {
    let diagnostic = RazorDiagnostic::error("RZ1000", "bad token", TextRange::new(0.into(), 1.into()));
    let token = GreenNode::token(SyntaxKind::TEXT, "x").set_diagnostics(&[diagnostic.clone()]);
    let level1 = GreenNode::new(SyntaxKind::MARKUP_TEXT_LITERAL, [Some(token)]);
    let level2 = GreenNode::new(
        SyntaxKind::MARKUP_BLOCK,
        [GreenList::new([level1, literal("sibling")]).into_slot()],
    );
    let level3 = GreenNode::new(SyntaxKind::RAZOR_DOCUMENT, [Some(level2), None]);

    assert!(level3.contains_diagnostics());
    assert_eq!(level3.collect_diagnostics(), vec![diagnostic.clone()]);

    let root = SyntaxNode::new_root(level3);
    let sibling = root
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::MARKUP_TEXT_LITERAL)
        .nth(1)
        .expect("sibling literal");
    let rebuilt = root.replace_node(&sibling, literal("rebuilt"));

    assert_eq!(rebuilt.text(), "xrebuilt");
    assert_eq!(rebuilt.diagnostics(), vec![diagnostic]);
}

#[test]
fn trees_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<GreenNode>();
    assert_send_sync::<GreenList>();
    assert_send_sync::<SyntaxNode>();
    assert_send_sync::<SyntaxToken>();
    assert_send_sync::<SyntaxAnnotation>();
}

#[test]
fn threads_annotate_a_shared_tree_independently() {
    let root = SyntaxNode::new_root(GreenNode::new(
        SyntaxKind::MARKUP_BLOCK,
        [GreenList::new([literal("a"), literal("b"), literal("c")]).into_slot()],
    ));
    let kinds = ["razor.left", "razor.middle", "razor.right", "razor.all"];

    let results: Vec<SyntaxNode> = thread::scope(|scope| {
        let handles: Vec<_> = kinds
            .iter()
            .enumerate()
            .map(|(index, &kind)| {
                let root = root.clone();
                scope.spawn(move || {
                    let targets: Vec<SyntaxNode> = root.children().collect();
                    let annotation = SyntaxAnnotation::with_data(kind, index);
                    let mut annotated = root.clone();
                    for _ in 0..100 {
                        let target = targets.get(index).unwrap_or(&root);
                        let derived = target.with_additional_annotation(annotation.clone());
                        annotated = derived.root();
                        drop(derived.without_annotation(&annotation));
                    }
                    annotated
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().expect("worker panicked")).collect()
    });

    assert!(!root.contains_annotations());
    for (index, (tree, kind)) in results.iter().zip(kinds).enumerate() {
        assert_eq!(tree.text(), "abc");
        assert!(tree.green().is_equivalent_to(root.green()));
        let annotated: Vec<(String, usize)> = tree
            .descendants()
            .flat_map(|node| {
                let text = node.text();
                node.annotations_of_kind(kind)
                    .filter_map(|annotation| annotation.data::<usize>().copied())
                    .map(|data| (text.clone(), data))
                    .collect::<Vec<_>>()
            })
            .collect();
        let expected = if index < 3 { ["a", "b", "c"][index] } else { "abc" };
        assert_eq!(annotated, vec![(expected.to_owned(), index)]);
    }
}
