//! Directive synthesis over trees built through the public mutation API

use offsync_core::rules::synthesize;
use offsync_core::tree::{Node, NodeState, PathTree, TreePath};
use offsync_core::{Directive, Error};
use pretty_assertions::assert_eq;

fn path(raw: &str) -> TreePath {
    TreePath::parse(raw).unwrap()
}

fn lines(directives: &[Directive]) -> Vec<String> {
    directives.iter().map(ToString::to_string).collect()
}

fn chain_with_d() -> PathTree {
    let mut tree = PathTree::new();
    tree.include(&path("A/B/C/D")).unwrap();
    tree
}

#[test]
fn simple_evict_is_one_exclusion() {
    let mut tree = PathTree::new();
    tree.evict(&path("A")).unwrap();

    let rules = tree.synthesize_at(&path("A")).unwrap();
    insta::assert_snapshot!(format!("{:?}", lines(&rules)), @r###"["- A"]"###);

    let node = Node::new("A").with_state(NodeState::Evicted);
    assert_eq!(lines(&synthesize(&node, "A").unwrap()), ["- A"]);
}

#[test]
fn single_nested_include() {
    let tree = chain_with_d();
    let rules = tree.synthesize_at(&path("A")).unwrap();
    insta::assert_snapshot!(
        format!("{:?}", lines(&rules)),
        @r###"["+ A/B/C/D/", "- A/B/C/*", "+ A/B/C/", "- A/B/*", "+ A/B/", "- A/*"]"###
    );
}

#[test]
fn two_siblings_follow_declaration_order() {
    let mut tree = chain_with_d();
    tree.include(&path("A/B/C/E")).unwrap();

    let rules = lines(&tree.synthesize_at(&path("A")).unwrap());
    let d = rules.iter().position(|l| l == "+ A/B/C/D/").unwrap();
    let e = rules.iter().position(|l| l == "+ A/B/C/E/").unwrap();
    let wildcard = rules.iter().position(|l| l == "- A/B/C/*").unwrap();
    assert!(d < e, "declaration order: D was included first");
    assert!(e < wildcard);

    let mut reversed = PathTree::new();
    reversed.include(&path("A/B/C/E")).unwrap();
    reversed.include(&path("A/B/C/D")).unwrap();
    let rules = lines(&reversed.synthesize_at(&path("A")).unwrap());
    assert_eq!(&rules[..2], ["+ A/B/C/E/", "+ A/B/C/D/"]);
}

#[test]
fn full_revert_prunes_everything() {
    let mut tree = chain_with_d();
    tree.revert(&path("A/B/C/D")).unwrap();

    assert!(tree.is_empty());
    assert!(tree.get(&path("A")).is_none());
    assert!(tree.synthesize_at(&path("A")).unwrap().is_empty());
    assert!(tree.directives().unwrap().is_empty());
}

#[test]
fn evicted_node_with_included_descendant_is_pass_through() {
    let mut tree = PathTree::new();
    tree.evict(&path("media")).unwrap();
    tree.include(&path("media/music")).unwrap();

    assert_eq!(tree.get(&path("media")).unwrap().state(), NodeState::Evicted);
    assert_eq!(
        lines(&tree.synthesize_at(&path("media")).unwrap()),
        ["+ media/music/", "- media/*"]
    );
    assert_eq!(
        lines(&tree.directives().unwrap()),
        ["+ media/music/", "- media/*", "+ media/"]
    );

    // Once the include is gone the nominal eviction applies again
    tree.revert(&path("media/music")).unwrap();
    assert_eq!(lines(&tree.directives().unwrap()), ["- media"]);
}

#[test]
fn evictions_beneath_untraversed_nodes_are_dropped() {
    let tree = PathTree::from_marks([
        offsync_core::tree::Mark {
            location: "A/B".into(),
            state: NodeState::Evicted,
        },
        offsync_core::tree::Mark {
            location: "A/C/D".into(),
            state: NodeState::Evicted,
        },
    ])
    .unwrap();
    assert!(tree.directives().unwrap().is_empty());
}

#[test]
fn whole_target_mixes_top_level_entries() {
    let mut tree = PathTree::new();
    tree.include(&path("documents")).unwrap();
    tree.include(&path("photos/2019")).unwrap();
    tree.evict(&path("photos/raw")).unwrap();
    tree.evict(&path("videos")).unwrap();

    insta::assert_snapshot!(
        format!("{:?}", lines(&tree.directives().unwrap())),
        @r###"["+ documents/", "+ photos/2019/", "- photos/raw", "- photos/*", "+ photos/", "- videos"]"###
    );
}

#[test]
fn synthesis_is_deterministic() {
    let mut tree = chain_with_d();
    tree.include(&path("A/X")).unwrap();
    tree.evict(&path("A/B/old")).unwrap();

    let first = tree.directives().unwrap();
    let second = tree.directives().unwrap();
    assert_eq!(first, second);
}

#[test]
fn corrupted_tree_is_reported_not_guessed() {
    let node = Node::new("A")
        .with_child(Node::new("B").with_state(NodeState::Included))
        .with_child(Node::new("B").with_state(NodeState::Included));
    let err = synthesize(&node, "A").unwrap_err();
    assert!(matches!(err, Error::TreeCorruption { .. }));
    assert!(err.is_fatal());
}

#[test]
fn wildcard_names_are_escaped_in_filter_rules() {
    let mut target = offsync_core::Target::new("host:/srv/media/", "/data/media");
    target.include(&path("a*")).unwrap();
    target.evict(&path("x[1]")).unwrap();
    target.include(&path("what?/keep")).unwrap();

    let anchored: Vec<String> = target
        .filter_rules()
        .unwrap()
        .iter()
        .map(Directive::anchored)
        .collect();
    assert_eq!(
        anchored,
        [
            r"+ /a\*/",
            r"- /x\[1]",
            r"+ /what\?/keep/",
            r"- /what\?/*",
            r"+ /what\?/",
            "- /*",
        ]
    );
}
