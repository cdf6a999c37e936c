//! Tests for the tree view pipeline: input shapes, collapse state and layout

use std::collections::HashSet;
use std::sync::Once;

use rstest::rstest;
use tracing_subscriber::EnvFilter;

use treeview_wasm::layout::{NodeSize, Orientation, Point, Projection};
use treeview_wasm::render::{self, StyleRegistry};
use treeview_wasm::tree::{LinkRecord, NodeId, RawHierarchy, TreeNode};
use treeview_wasm::{LookupMiss, TreeView, TreeViewConfig, ValidationError};

const ORG_CHART: &str = r#"[
  {
    "name": "CEO",
    "attributes": {"department": "board"},
    "children": [
      {
        "name": "Manager",
        "attributes": {"department": "production", "headcount": 3},
        "children": [
          {"name": "Foreman", "children": [{"name": "Worker A"}, {"name": "Worker B"}]},
          {"name": "Inspector"}
        ]
      },
      {"name": "Assistant", "attributes": {"remote": true}}
    ]
  }
]"#;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn org_chart_view(config: TreeViewConfig) -> TreeView {
    init_tracing();
    let input: RawHierarchy = serde_json::from_str(ORG_CHART).unwrap();
    let mut view = TreeView::new(config).unwrap();
    view.load_hierarchy(&input).unwrap();
    view
}

fn id_of(view: &TreeView, name: &str) -> NodeId {
    view.state()
        .root()
        .unwrap()
        .iter()
        .find(|(_, n)| n.name == name)
        .map(|(_, n)| n.id)
        .unwrap()
}

fn visible_names(projection: &Projection) -> Vec<&str> {
    projection.nodes.iter().map(|n| n.name.as_str()).collect()
}

fn descendants(node: &TreeNode) -> Vec<NodeId> {
    node.iter().skip(1).map(|(_, n)| n.id).collect()
}

#[test]
fn given_nested_input_when_loaded_then_tree_is_well_formed() {
    // Arrange
    let view = org_chart_view(TreeViewConfig::default());

    // Act
    let root = view.state().root().unwrap();

    // Assert
    let nodes: Vec<&TreeNode> = root.iter().map(|(_, n)| n).collect();
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), nodes.len());
    let child_sum: usize = nodes.iter().map(|n| n.children.len()).sum();
    assert_eq!(child_sum, nodes.len() - 1);
    assert!(nodes.iter().all(|n| !n.collapsed));
}

#[test]
fn given_collapsed_node_when_projecting_then_proper_descendants_hidden() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig::default());
    let manager = id_of(&view, "Manager");
    let hidden = descendants(view.find_by_id(manager).unwrap());

    // Act
    view.toggle(manager).unwrap();
    let projection = view.project();

    // Assert
    assert!(projection.contains(manager));
    for id in hidden {
        assert!(!projection.contains(id));
    }
    assert_eq!(visible_names(projection), vec!["CEO", "Manager", "Assistant"]);
}

#[test]
fn given_collapsed_subtree_when_expanding_parent_then_children_stay_collapsed() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig::default());
    let manager = id_of(&view, "Manager");
    view.toggle(manager).unwrap();

    // Act
    let snapshot = view.toggle(manager).unwrap().unwrap();

    // Assert
    assert!(!snapshot.collapsed);
    assert!(snapshot.children.iter().all(|c| c.collapsed));
    assert_eq!(
        visible_names(view.project()),
        vec!["CEO", "Manager", "Foreman", "Inspector", "Assistant"]
    );
}

#[rstest]
#[case(0, vec!["CEO"])]
#[case(1, vec!["CEO", "Manager", "Assistant"])]
#[case(2, vec!["CEO", "Manager", "Foreman", "Inspector", "Assistant"])]
#[case(3, vec!["CEO", "Manager", "Foreman", "Worker A", "Worker B", "Inspector", "Assistant"])]
fn given_initial_depth_when_first_projecting_then_deeper_nodes_collapsed(
    #[case] depth: usize,
    #[case] expected: Vec<&str>,
) {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig {
        initial_depth: Some(depth),
        ..Default::default()
    });

    // Act
    let projection = view.project();

    // Assert
    assert_eq!(visible_names(projection), expected);
}

#[test]
fn given_flat_links_with_attribute_fields_when_loaded_then_attributes_copied() {
    // Arrange
    init_tracing();
    let links: Vec<LinkRecord> = serde_json::from_str(
        r#"[
          {"parent": "root", "child": "api", "owner": "team-a", "tier": 1},
          {"parent": "root", "child": "web", "owner": "team-b", "tier": 2},
          {"parent": "api", "child": "db", "owner": "team-a", "notes": null, "meta": {"pager": true}}
        ]"#,
    )
    .unwrap();
    let fields = vec!["owner".to_string()];
    let mut view = TreeView::new(TreeViewConfig::default()).unwrap();

    // Act
    view.load_links(&links, Some(&fields)).unwrap();

    // Assert
    let projection = view.project();
    let api = projection.nodes.iter().find(|n| n.name == "api").unwrap();
    assert_eq!(api.attributes.len(), 1);
    assert_eq!(api.attributes["owner"].to_string(), "team-a");
    let root = projection.nodes.iter().find(|n| n.name == "root").unwrap();
    assert!(root.attributes.is_empty());
    let db = projection.nodes.iter().find(|n| n.name == "db").unwrap();
    assert_eq!(db.attributes.keys().collect::<Vec<_>>(), vec!["owner"]);
}

#[test]
fn given_child_listed_before_its_parent_link_when_loaded_then_it_keeps_no_attributes() {
    // Arrange
    init_tracing();
    let links: Vec<LinkRecord> = serde_json::from_str(
        r#"[
          {"parent": "service", "child": "worker", "owner": "team-w"},
          {"parent": "root", "child": "service", "owner": "team-s"}
        ]"#,
    )
    .unwrap();
    let fields = vec!["owner".to_string()];
    let mut view = TreeView::new(TreeViewConfig::default()).unwrap();

    // Act
    view.load_links(&links, Some(&fields)).unwrap();

    // Assert
    let service = view.find_by_id(id_of(&view, "service")).unwrap();
    assert!(service.attributes.is_empty());
    let worker = view.find_by_id(id_of(&view, "worker")).unwrap();
    assert_eq!(worker.attributes["owner"].to_string(), "team-w");
}

#[rstest]
#[case::cycle(vec![("R", "A"), ("A", "B"), ("B", "C"), ("C", "B")])]
#[case::two_parents(vec![("R", "A"), ("R", "B"), ("A", "C"), ("B", "C")])]
#[case::forest(vec![("R", "A"), ("S", "B")])]
fn given_invalid_links_when_loading_then_previous_tree_kept(#[case] pairs: Vec<(&str, &str)>) {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig::default());
    let links: Vec<LinkRecord> = pairs.into_iter().map(|(p, c)| LinkRecord::new(p, c)).collect();

    // Act
    let result = view.load_links(&links, None);

    // Assert
    assert!(result.is_err());
    assert_eq!(view.state().root().unwrap().name, "CEO");
    assert_eq!(view.state().version(), 1);
}

#[test]
fn given_detached_cycle_when_loading_then_cycle_error() {
    init_tracing();
    let links = vec![
        LinkRecord::new("R", "A"),
        LinkRecord::new("B", "C"),
        LinkRecord::new("C", "B"),
    ];
    let mut view = TreeView::new(TreeViewConfig::default()).unwrap();

    let err = view.load_links(&links, None).unwrap_err();

    assert!(matches!(err, ValidationError::Cycle(_)), "got {err}");
}

#[test]
fn given_unknown_id_when_toggling_then_lookup_miss_and_state_unchanged() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig::default());
    let before = view.state().root().cloned();

    // Act
    let result = view.toggle(NodeId(u32::MAX));

    // Assert
    assert_eq!(result, Err(LookupMiss(NodeId(u32::MAX))));
    assert_eq!(view.state().root().cloned(), before);
}

#[test]
fn given_same_state_when_projecting_twice_then_output_byte_identical() {
    let mut view = org_chart_view(TreeViewConfig::default());

    let first = serde_json::to_vec(view.project()).unwrap();
    let second = serde_json::to_vec(view.project()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_vertical_orientation_when_projecting_then_siblings_share_row() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig {
        orientation: Orientation::Vertical,
        node_size: NodeSize { x: 100.0, y: 80.0 },
        ..Default::default()
    });

    // Act
    let projection = view.project();

    // Assert
    let root = &projection.nodes[0];
    assert_eq!(root.position(), Point::ORIGIN);
    for node in &projection.nodes {
        assert_eq!(node.y, node.depth as f32 * 80.0, "{}", node.name);
    }
    let worker_a = projection.nodes.iter().find(|n| n.name == "Worker A").unwrap();
    let worker_b = projection.nodes.iter().find(|n| n.name == "Worker B").unwrap();
    assert_eq!(worker_b.x - worker_a.x, 100.0);
}

#[test]
fn given_depth_factor_when_projecting_horizontally_then_depth_axis_scaled() {
    let mut view = org_chart_view(TreeViewConfig {
        depth_factor: Some(250.0),
        ..Default::default()
    });

    let projection = view.project();

    for node in &projection.nodes {
        assert_eq!(node.x, node.depth as f32 * 250.0, "{}", node.name);
    }
}

#[test]
fn given_projection_when_drawing_then_links_precede_nodes_with_styles_available() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig::default());
    let styles = StyleRegistry::with_defaults();

    // Act
    let list = render::draw(view.project());

    // Assert
    assert_eq!(list.links.len(), list.nodes.len() - 1);
    let classes: HashSet<&str> = list.nodes.iter().map(|g| g.class).collect();
    for class in classes {
        let selector = format!(".{}", class.split(' ').next_back().unwrap());
        assert!(styles.stylesheet().contains(&selector), "no style for {class}");
    }
    let manager = list.nodes.iter().find(|g| g.label == "Manager").unwrap();
    assert_eq!(manager.attribute_lines, vec!["department: production", "headcount: 3"]);
}

#[test]
fn given_name_link_and_unlabeled_attributes_when_drawing_then_labels_follow_node_data() {
    // Arrange
    init_tracing();
    let input: RawHierarchy = serde_json::from_str(
        r#"{
          "name": "Handbook",
          "nameLink": "https://example.com/handbook",
          "attributes": {"status": "draft", "pages": 12},
          "unlabeledAttributes": ["status"]
        }"#,
    )
    .unwrap();
    let mut view = TreeView::new(TreeViewConfig::default()).unwrap();
    view.load_hierarchy(&input).unwrap();

    // Act
    let list = render::draw(view.project());

    // Assert
    let glyph = &list.nodes[0];
    assert_eq!(glyph.label_class, "nodeNameBase nodeNameLink");
    assert_eq!(glyph.name_link.as_deref(), Some("https://example.com/handbook"));
    assert_eq!(glyph.attribute_lines, vec!["pages: 12", "draft"]);
}

#[test]
fn given_zero_depth_factor_when_projecting_then_node_size_spacing_used() {
    let mut view = org_chart_view(TreeViewConfig {
        depth_factor: Some(0.0),
        ..Default::default()
    });

    let projection = view.project();

    for node in &projection.nodes {
        assert_eq!(node.x, node.depth as f32 * 140.0, "{}", node.name);
    }
}

#[test]
fn given_toggle_and_zoom_when_reporting_update_then_viewport_included() {
    // Arrange
    let mut view = org_chart_view(TreeViewConfig {
        scale_extent: treeview_wasm::viewport::ScaleExtent { min: 0.5, max: 2.0 },
        ..Default::default()
    });
    let assistant = id_of(&view, "Assistant");

    // Act
    let toggled = view.toggle(assistant).unwrap();
    let after_toggle = view.update(toggled);
    view.zoom_to(1.5, Point::new(40.0, 20.0));
    let after_zoom = view.update(None);

    // Assert
    assert_eq!(after_toggle.node.map(|n| n.name), Some("Assistant".to_string()));
    assert_eq!(after_toggle.zoom, 1.0);
    assert!(after_zoom.node.is_none());
    assert_eq!(after_zoom.zoom, 1.5);
    assert_eq!(after_zoom.translate, Point::new(40.0, 20.0));
}
