//! Layout state: output collection, stable ids, update states and
//! compatibility checks.

use std::sync::Arc;

use spark_mount::component::primitives::{column, drawable, text};
use spark_mount::component::TransitionScopeKind;
use spark_mount::engine::NodeStyle;
use spark_mount::output::{
    AnimatedProperty, OutputUnitsAffinityGroup, ROOT_HOST_ID, Transition, calculate_id,
};
use spark_mount::{
    Component, Config, Error, LayoutContext, LayoutState, OutputType, Rect, SizeSpec, UpdateState,
};

fn calculate(
    root: &Component,
    width: SizeSpec,
    height: SizeSpec,
    previous: Option<&LayoutState>,
) -> Result<LayoutState, Error> {
    let ctx = LayoutContext::new(Arc::new(Config::default()));
    let state = LayoutState::calculate(ctx, root, width, height, previous)?;
    Ok(state.expect("context was never released"))
}

fn level_of(id: u64) -> u64 {
    (id >> 18) & 0xFF
}

fn sized(type_name: &'static str, height: i32) -> Component {
    drawable(type_name).with_style(NodeStyle::default().height(height))
}

#[test]
fn test_stable_id_vectors() {
    assert_eq!(
        format!("{:b}", calculate_id(1, 1, OutputType::Content, 1).unwrap()),
        "100000001000000000000000001"
    );
    assert_eq!(
        format!("{:b}", calculate_id(1, 1, OutputType::Background, 1).unwrap()),
        "100000001010000000000000001"
    );

    let err = calculate_id(1, 256, OutputType::Content, 0).unwrap_err();
    assert!(matches!(err, Error::IdOutOfRange { field: "level", .. }));
    let err = calculate_id(1, 1, OutputType::Content, 65536).unwrap_err();
    assert!(matches!(err, Error::IdOutOfRange { field: "sequence", .. }));
}

#[test]
fn test_affinity_group_rules() {
    let mut group = OutputUnitsAffinityGroup::new();
    group.add(OutputType::Content, 1u64).unwrap();
    assert!(group.add(OutputType::Host, 2).is_err());
    let err = group.add(OutputType::Content, 3).unwrap_err();
    assert_eq!(err.to_string(), "Already contains unit for type CONTENT");

    let mut group = OutputUnitsAffinityGroup::new();
    group.add(OutputType::Host, 1u64).unwrap();
    assert!(group.add(OutputType::Background, 2).is_err());
}

#[test]
fn test_output_order_and_hosts() {
    let root = column(vec![
        sized("Image", 10),
        sized("Icon", 5).with_common(|c| c.click_handler = Some("tap".into())),
    ])
    .with_common(|c| c.background = Some("red".into()));

    let state = calculate(&root, SizeSpec::exactly(100), SizeSpec::unspecified(), None).unwrap();
    let types: Vec<OutputType> = state.outputs().iter().map(|o| o.output_type).collect();
    assert_eq!(
        types,
        vec![
            OutputType::Host,
            OutputType::Background,
            OutputType::Content,
            OutputType::Host,
            OutputType::Content,
        ]
    );

    let outputs = state.outputs();
    assert_eq!(outputs[0].id, ROOT_HOST_ID);
    assert_eq!(outputs[0].bounds, Rect::new(0, 0, 100, 15));
    assert_eq!(outputs[2].bounds, Rect::new(0, 0, 100, 10));
    assert_eq!(outputs[3].bounds, Rect::new(0, 10, 100, 15));

    // Everything directly under the root host sits at level 1.
    for output in &outputs[1..4] {
        assert_eq!(output.host_id(), Some(ROOT_HOST_ID));
        assert_eq!(level_of(output.id), 1);
    }
    // The clickable child's content moves into its own host, one level down.
    assert_eq!(outputs[4].host_id(), Some(outputs[3].id));
    assert_eq!(level_of(outputs[4].id), 2);
    assert!(outputs[3].attributes.as_ref().is_some_and(|a| a.clickable));

    for (index, output) in outputs.iter().enumerate() {
        assert_eq!(output.index, index);
        assert_eq!(state.output_by_id(output.id).map(|o| o.index), Some(index));
    }
}

#[test]
fn test_content_bounds_exclude_padding_and_border() {
    let root = column(vec![
        drawable("Badge")
            .with_style(
                NodeStyle::default()
                    .height(20)
                    .padding(spark_mount::Edge::All, 2.0)
                    .border(spark_mount::Edge::Left, 1.0),
            )
            .with_common(|c| c.border_color = Some(0xff0000)),
    ]);

    let state = calculate(&root, SizeSpec::exactly(50), SizeSpec::unspecified(), None).unwrap();
    let content = state
        .outputs()
        .iter()
        .find(|o| o.output_type == OutputType::Content)
        .unwrap();
    assert_eq!(content.bounds, Rect::new(3, 2, 48, 18));

    let border = state
        .outputs()
        .iter()
        .find(|o| o.output_type == OutputType::Border)
        .unwrap();
    assert_eq!(border.bounds, Rect::new(0, 0, 50, 20));
    assert!(border.index > content.index);
}

#[test]
fn test_tops_and_bottoms_are_sorted() {
    let root = column(vec![sized("A", 10), sized("B", 30), sized("C", 5)]);
    let state = calculate(&root, SizeSpec::exactly(10), SizeSpec::unspecified(), None).unwrap();
    let outputs = state.outputs();

    let tops: Vec<i32> = state.tops().iter().map(|&i| outputs[i].bounds.top).collect();
    assert!(tops.windows(2).all(|w| w[0] <= w[1]));
    let bottoms: Vec<i32> = state
        .bottoms()
        .iter()
        .map(|&i| outputs[i].bounds.bottom)
        .collect();
    assert!(bottoms.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(state.tops().len(), outputs.len());
}

#[test]
fn test_duplicate_global_transition_key_fails() {
    let root = column(vec![
        drawable("Image").with_transition_key("test", TransitionScopeKind::Global),
        drawable("Image").with_transition_key("test", TransitionScopeKind::Global),
    ]);

    let err = calculate(&root, SizeSpec::exactly(10), SizeSpec::exactly(10), None).unwrap_err();
    assert!(err.to_string().contains(
        "The transitionId 'TransitionId{\"test\", GLOBAL}' is defined multiple times in the same layout."
    ));
}

#[test]
fn test_local_transition_keys_under_different_owners() {
    let root = column(vec![
        column(vec![drawable("Image").with_transition_key("test", TransitionScopeKind::Local)]),
        column(vec![drawable("Image").with_transition_key("test", TransitionScopeKind::Local)]),
    ]);

    let state = calculate(&root, SizeSpec::exactly(10), SizeSpec::exactly(10), None).unwrap();
    assert_eq!(state.transition_ids().len(), 2);
    for group in state.transition_ids().values() {
        let id = group.get(OutputType::Content).copied().unwrap();
        assert!(state.output_by_id(id).unwrap().transition_id.is_some());
    }
}

#[test]
fn test_root_bounds_transitions() {
    let root = column(vec![sized("Image", 10)])
        .with_transition_key("root", TransitionScopeKind::Global)
        .with_transition(
            Transition::create(&["root"])
                .animate(AnimatedProperty::Height)
                .appear_from(0.0)
                .into(),
        )
        .with_transition(Transition::all_layout().into());

    let state = calculate(&root, SizeSpec::exactly(10), SizeSpec::unspecified(), None).unwrap();
    let (width, height) = state.root_bounds_transitions();
    assert!(width.has_transition);
    assert!(width.appear_transition.is_none());
    assert!(height.has_transition);
    assert_eq!(height.appear_transition.unwrap().appear_from, Some(0.0));
}

#[test]
fn test_compatibility_checks() {
    let root = column(vec![sized("Image", 10)]);
    let state = calculate(&root, SizeSpec::exactly(40), SizeSpec::unspecified(), None).unwrap();

    assert!(state.is_compatible_size(40, 10));
    assert!(!state.is_compatible_size(40, 11));
    assert!(state.is_compatible_spec(SizeSpec::exactly(40), SizeSpec::unspecified()));
    assert!(!state.is_compatible_spec(SizeSpec::at_most(40), SizeSpec::unspecified()));
    assert!(state.is_compatible_component_and_spec(
        root.id(),
        SizeSpec::exactly(40),
        SizeSpec::unspecified()
    ));
    assert!(!state.is_compatible_component_and_spec(
        column(Vec::new()).id(),
        SizeSpec::exactly(40),
        SizeSpec::unspecified()
    ));
}

#[test]
fn test_ids_and_update_states_across_passes() {
    let label = text("a");
    let first_root = column(vec![label.clone(), sized("Image", 3)]);
    let first = calculate(&first_root, SizeSpec::exactly(20), SizeSpec::unspecified(), None).unwrap();
    assert!(
        first
            .outputs()
            .iter()
            .all(|o| o.update_state == UpdateState::Unknown)
    );

    // Same tree again: every id survives and nothing is dirty.
    let second = calculate(
        &first_root.make_shallow_copy(),
        SizeSpec::exactly(20),
        SizeSpec::unspecified(),
        Some(&first),
    )
    .unwrap();
    let first_ids: Vec<u64> = first.outputs().iter().map(|o| o.id).collect();
    let second_ids: Vec<u64> = second.outputs().iter().map(|o| o.id).collect();
    assert_eq!(first_ids, second_ids);
    assert!(
        second
            .outputs()
            .iter()
            .all(|o| o.update_state == UpdateState::Updated)
    );

    // Changed text: its output keeps its id but is dirty.
    let third_root = column(vec![text("b"), sized("Image", 3)]);
    let third = calculate(
        &third_root,
        SizeSpec::exactly(20),
        SizeSpec::unspecified(),
        Some(&second),
    )
    .unwrap();
    let changed = |state: &LayoutState| {
        state
            .outputs()
            .iter()
            .find(|o| o.global_key == "Column,Text")
            .cloned()
            .unwrap()
    };
    assert_eq!(changed(&third).id, changed(&second).id);
    assert_eq!(changed(&third).update_state, UpdateState::Dirty);
    let image = third
        .outputs()
        .iter()
        .find(|o| o.global_key == "Column,Image")
        .unwrap();
    assert_eq!(image.update_state, UpdateState::Updated);
}

#[test]
fn test_empty_root_still_has_root_host() {
    let root = spark_mount::component::primitives::composite("Nothing", |_| Ok(None));
    let state = calculate(&root, SizeSpec::exactly(30), SizeSpec::exactly(20), None).unwrap();
    assert_eq!(state.output_count(), 1);
    assert_eq!(state.outputs()[0].id, ROOT_HOST_ID);
    assert_eq!(state.size(), spark_mount::Size::new(30, 20));
}

#[test]
fn test_visibility_outputs() {
    let root = column(vec![
        sized("Image", 10).with_common(|c| c.visibility_handler = Some("seen".into())),
    ]);
    let state = calculate(&root, SizeSpec::exactly(10), SizeSpec::unspecified(), None).unwrap();
    let visibility = state.visibility_outputs();
    assert_eq!(visibility.len(), 1);
    assert_eq!(visibility[0].handler, "seen");
    assert_eq!(visibility[0].global_key, "Column,Image");
    assert_eq!(visibility[0].bounds, Rect::new(0, 0, 10, 10));
}

#[test]
fn test_inserted_sibling_keeps_existing_ids() {
    let first_root = column(vec![sized("Image", 5).with_key("b")]);
    let first = calculate(&first_root, SizeSpec::exactly(10), SizeSpec::unspecified(), None).unwrap();
    let id_of = |state: &LayoutState, key: &str| {
        state
            .outputs()
            .iter()
            .find(|o| o.global_key == key)
            .map(|o| o.id)
            .unwrap()
    };
    let kept = id_of(&first, "Column,b");

    let second_root = column(vec![
        sized("Image", 5).with_key("a"),
        sized("Image", 5).with_key("b"),
    ]);
    let second = calculate(
        &second_root,
        SizeSpec::exactly(10),
        SizeSpec::unspecified(),
        Some(&first),
    )
    .unwrap();

    assert_eq!(id_of(&second, "Column,b"), kept);
    assert_ne!(id_of(&second, "Column,a"), kept);
}
