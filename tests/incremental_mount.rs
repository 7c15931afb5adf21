//! Incremental mount: sweep cursors, idempotence and mount refs.

use std::sync::Arc;

use spark_mount::component::primitives::{column, drawable};
use spark_mount::engine::NodeStyle;
use spark_mount::mount::{
    IncrementalMountExtension, MountDelegate, MountExtension, MountOp, MountRefs, MountState,
    RecordingMountTarget,
};
use spark_mount::output::{LayoutOutput, OutputType};
use spark_mount::{Config, Error, LayoutContext, LayoutState, Rect, SizeSpec};

/// `count` outputs of 10x10 stacked vertically.
fn stacked(count: i32) -> Arc<LayoutState> {
    let outputs = (0..count)
        .map(|i| {
            LayoutOutput::new(
                i as u64 + 1,
                drawable("Cell"),
                OutputType::Content,
                Rect::from_xywh(0, i * 10, 10, 10),
            )
        })
        .collect();
    Arc::new(LayoutState::from_outputs(
        column(Vec::new()),
        outputs,
        10,
        count * 10,
    ))
}

fn extension_of(state: &MountState<RecordingMountTarget>) -> &IncrementalMountExtension {
    state
        .delegate()
        .extension::<IncrementalMountExtension>()
        .expect("incremental mount is enabled")
}

#[test]
fn test_ten_outputs_half_visible() {
    let mut state = MountState::new(RecordingMountTarget::new(), Arc::new(Config::default()));
    let stats = state
        .mount(stacked(10), Some(Rect::new(0, 0, 10, 50)))
        .unwrap();

    let extension = extension_of(&state);
    assert_eq!(extension.previous_tops_index(), 5);
    assert_eq!(extension.previous_bottoms_index(), 0);
    assert_eq!(stats.mounted, 5);
    assert_eq!(state.target().attached_count(), 5);
}

#[test]
fn test_dirty_mount_with_empty_rect() {
    let mut state = MountState::new(RecordingMountTarget::new(), Arc::new(Config::default()));
    state
        .mount(stacked(10), Some(Rect::new(0, 0, 10, 50)))
        .unwrap();

    state.mount(stacked(3), Some(Rect::EMPTY)).unwrap();
    assert!(state.mounted_ids().is_empty());

    state.set_visible_rect(Rect::new(0, 0, 10, 50)).unwrap();
    let extension = extension_of(&state);
    assert_eq!(extension.previous_tops_index(), 3);
    assert_eq!(extension.previous_bottoms_index(), 0);
    assert_eq!(state.mounted_ids(), vec![1, 2, 3]);
}

#[test]
fn test_extension_driven_directly() {
    let mut refs = MountRefs::new();
    let mut extension = IncrementalMountExtension::new();

    extension
        .before_mount(&mut refs, &stacked(10), Some(Rect::new(0, 0, 10, 50)))
        .unwrap();
    assert_eq!(extension.previous_tops_index(), 5);
    assert_eq!(extension.previous_bottoms_index(), 0);

    extension
        .before_mount(&mut refs, &stacked(3), Some(Rect::EMPTY))
        .unwrap();
    extension
        .on_visible_bounds_changed(&mut refs, Rect::new(0, 0, 10, 50))
        .unwrap();
    assert_eq!(extension.previous_tops_index(), 3);
    assert_eq!(extension.previous_bottoms_index(), 0);
}

#[test]
fn test_mount_twice_does_no_extra_work() {
    let mut state = MountState::new(RecordingMountTarget::new(), Arc::new(Config::default()));
    let layout = stacked(10);
    let rect = Some(Rect::new(0, 0, 10, 50));

    state.mount(layout.clone(), rect).unwrap();
    let before = state.target().ops().to_vec();
    let (tops, bottoms) = {
        let extension = extension_of(&state);
        (extension.previous_tops_index(), extension.previous_bottoms_index())
    };

    let stats = state.mount(layout, rect).unwrap();
    assert!(stats.is_empty());
    assert_eq!(state.target().ops(), before.as_slice());
    let extension = extension_of(&state);
    assert_eq!(extension.previous_tops_index(), tops);
    assert_eq!(extension.previous_bottoms_index(), bottoms);
}

#[test]
fn test_scrolling_mounts_and_unmounts_edges_only() {
    let mut state = MountState::new(RecordingMountTarget::new(), Arc::new(Config::default()));
    state
        .mount(stacked(10), Some(Rect::new(0, 0, 10, 50)))
        .unwrap();
    state.target_mut().take_ops();

    let stats = state.set_visible_rect(Rect::new(0, 10, 10, 60)).unwrap();
    assert_eq!(stats.mounted, 1);
    assert_eq!(stats.unmounted, 1);
    assert_eq!(state.mounted_ids(), vec![2, 3, 4, 5, 6]);

    let ops = state.target().ops();
    assert!(matches!(ops[0], MountOp::Unmount { .. }));
    assert!(ops.iter().any(|op| matches!(op, MountOp::Create { output_id: 6, .. })));
}

#[test]
fn test_mount_refs_lock_outputs() {
    let mut delegate = MountDelegate::new();
    assert!(delegate.is_locked_for_mount(42));

    delegate.add_extension(Box::new(IncrementalMountExtension::new()));
    assert!(!delegate.is_locked_for_mount(42));

    delegate.acquire_mount_ref(42);
    delegate.acquire_mount_ref(42);
    assert!(delegate.is_locked_for_mount(42));

    delegate.release_mount_ref(42).unwrap();
    assert!(delegate.is_locked_for_mount(42));
    delegate.release_mount_ref(42).unwrap();
    assert!(!delegate.is_locked_for_mount(42));

    let err = delegate.release_mount_ref(42).unwrap_err();
    assert!(matches!(err, Error::MountRefNotAcquired(42)));
}

#[test]
fn test_computed_layout_mounts_hosts_first() {
    let root = column(vec![
        drawable("Image").with_style(NodeStyle::default().height(10)),
        drawable("Button")
            .with_style(NodeStyle::default().height(10))
            .with_common(|c| c.click_handler = Some("press".into())),
    ]);
    let ctx = LayoutContext::new(Arc::new(Config::default()));
    let layout = LayoutState::calculate(ctx, &root, SizeSpec::exactly(20), SizeSpec::unspecified(), None)
        .unwrap()
        .unwrap();

    let mut state = MountState::new(
        RecordingMountTarget::new(),
        Arc::new(Config::default().with_incremental_mount(false)),
    );
    let stats = state.mount(Arc::new(layout), None).unwrap();
    // Image content, Button host, Button content; the root host is the target itself.
    assert_eq!(stats.mounted, 3);

    let ops = state.target().ops();
    let attributes = ops
        .iter()
        .find_map(|op| match op {
            MountOp::SetAttributes { attributes, .. } => Some(attributes.clone()),
            _ => None,
        })
        .unwrap();
    assert!(attributes.clickable);
    assert_eq!(attributes.click_handler.as_deref(), Some("press"));

    let button_host = state.mount_item(
        state
            .layout_state()
            .unwrap()
            .outputs()
            .iter()
            .find(|o| o.output_type == OutputType::Host && o.global_key == "Column,Button")
            .unwrap()
            .id,
    );
    let host_content = button_host.unwrap().content;
    assert!(ops.iter().any(|op| matches!(
        op,
        MountOp::Mount { host, .. } if *host == host_content
    )));
}

#[test]
fn test_mount_recovers_after_failed_pass() {
    let outputs = ["Cell", "Broken", "Cell"]
        .into_iter()
        .enumerate()
        .map(|(i, type_name)| {
            LayoutOutput::new(
                i as u64 + 1,
                drawable(type_name),
                OutputType::Content,
                Rect::from_xywh(0, i as i32 * 10, 10, 10),
            )
        })
        .collect();
    let layout = Arc::new(LayoutState::from_outputs(column(Vec::new()), outputs, 10, 30));
    let mut state = MountState::new(
        RecordingMountTarget::new().fail_on("Broken"),
        Arc::new(Config::default()),
    );

    let err = state.mount(layout.clone(), None).unwrap_err();
    assert!(err.is_component_failure());
    assert_eq!(state.mounted_ids(), vec![1]);
    assert!(state.layout_state().is_none());

    state.target_mut().clear_failures();
    let stats = state.mount(layout.clone(), None).unwrap();
    assert_eq!(stats.mounted, 2);
    assert_eq!(state.mounted_ids(), vec![1, 2, 3]);
    assert!(state.mount(layout, None).unwrap().is_empty());
}
