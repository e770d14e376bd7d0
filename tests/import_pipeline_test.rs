use std::{cell::RefCell, rc::Rc};

use flow_import::{
    data_structures::scene_graph::ContainerNode,
    import::ImportRequest,
    sched::{block_on, yield_now},
};

use crate::common::test_utils::{StubFormat, builder, importer, material_with};

mod common;

#[test]
fn first_import_runs_all_stages_and_commits_cache() {
    let importer = importer(false);
    let mut format = StubFormat::new(3, 2)
        .with_materials(vec![material_with("wood", Some("wood.png"), None)]);
    let mut builder = builder();

    // Empty display name falls back to the source file stem.
    let request = ImportRequest::new("/models/cube.obj").named("");
    let root = block_on(importer.import(request, &mut format, &mut builder)).unwrap();

    assert_eq!(root.borrow().name(), "cube");
    // Root + 2 group containers + 3 objects.
    assert_eq!(root.borrow().node_count(), 6);
    assert_eq!(format.parse_calls.get(), 1);

    let cached = importer.cached_result("/models/cube.obj").unwrap();
    assert!(Rc::ptr_eq(&root, &cached));
    assert!(!importer.global_progress().borrow().is_busy());
}

#[test]
fn explicit_name_and_parent_attachment() {
    let importer = importer(false);
    let mut format = StubFormat::new(1, 0);
    let mut builder = builder();
    let world = ContainerNode::new_ref("world");

    let request = ImportRequest::new("/models/hero.obj")
        .named("Hero")
        .under(world.clone());
    let root = block_on(importer.import(request, &mut format, &mut builder)).unwrap();

    assert_eq!(root.borrow().name(), "Hero");
    assert_eq!(world.borrow().children().len(), 1);
    assert!(Rc::ptr_eq(&world.borrow().children()[0], &root));
}

#[test]
fn progress_is_monotonic_bounded_and_observable() {
    let importer = importer(false);
    let mut format = StubFormat::new(4, 2).with_materials(vec![
        material_with("a", Some("a.png"), None),
        material_with("b", Some("b.png"), Some("b_n.png")),
    ]);
    let mut builder = builder();
    let progress = importer.global_progress();

    let samples = Rc::new(RefCell::new(Vec::new()));
    let watcher = {
        let samples = samples.clone();
        let progress = progress.clone();
        async move {
            loop {
                yield_now().await;
                let Some(percentage) = progress.borrow().overall() else {
                    break;
                };
                samples.borrow_mut().push(percentage);
            }
        }
    };
    let import = importer.import(
        ImportRequest::new("/models/ship.obj"),
        &mut format,
        &mut builder,
    );
    let (result, _) = block_on(futures::future::join(import, watcher));
    result.unwrap();

    let samples = samples.borrow();
    assert!(samples.len() > 2, "watcher saw {} samples", samples.len());
    assert!(samples.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(samples.iter().all(|p| (0.0..=100.0).contains(p)));
}
