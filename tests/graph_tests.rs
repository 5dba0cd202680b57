//! Pass graph integration tests
//!
//! These tests assemble small renderers on a [`RecordingDevice`] and cover:
//! - Identifier validation
//! - Linking: resolution, unresolved targets, type mismatches
//! - Exclusive surface hand-off
//! - One-shot validation and the assembly lifecycle
//! - Execution order and device error propagation

mod common;

use common::*;
use pass_graph::backend::*;
use pass_graph::bindable::ConstantBuffer;
use pass_graph::render_graph::*;
use pass_graph::{ErrorKind, RenderError, RenderTarget};
use rstest::rstest;
use std::sync::Arc;

// ============================================================================
// Naming
// ============================================================================

#[rstest]
#[case::camel("renderTarget")]
#[case::underscore("_shadow")]
#[case::digits("pass2d")]
#[case::single("a")]
fn test_valid_identifiers(#[case] name: &str) {
    assert!(is_valid_identifier(name));
    assert!(PassBase::new(name).is_ok());
}

#[rstest]
#[case::empty("")]
#[case::leading_digit("2d")]
#[case::dash("render-target")]
#[case::dot("pass.producer")]
#[case::space("back buffer")]
#[case::dollar("$")]
fn test_invalid_identifiers(#[case] name: &str) {
    assert!(!is_valid_identifier(name));
    let err = PassBase::new(name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assembly);
}

#[test]
fn test_global_scope_is_only_valid_as_target_pass() {
    let mut base = PassBase::new("lambertian").unwrap();
    base.consume_render_target("renderTarget").unwrap();

    assert!(base
        .setup_consumer_target("renderTarget", GLOBAL_SCOPE, "backColorbuffer")
        .is_ok());
    assert!(matches!(
        base.setup_consumer_target("renderTarget", "$", "$"),
        Err(RenderError::InvalidName { .. })
    ));
    assert!(matches!(
        base.setup_consumer_target("renderTarget", "clear-rt", "buffer"),
        Err(RenderError::InvalidName { .. })
    ));
}

#[test]
fn test_setup_unknown_consumer() {
    let mut base = PassBase::new("lambertian").unwrap();
    assert_eq!(
        base.setup_consumer_target("renderTarget", "clearRt", "buffer"),
        Err(RenderError::ConsumerNotFound {
            pass: "lambertian".to_string(),
            consumer: "renderTarget".to_string(),
        })
    );
}

// ============================================================================
// Linking
// ============================================================================

/// A chain of threading passes ends up sharing the source's surfaces.
#[test]
fn test_threaded_surfaces_are_shared() {
    init_logging();
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();

    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("middle", "source", 2))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("last", "middle", 3))
        .unwrap();
    renderer.finalize().unwrap();

    let source = renderer.pass("source").unwrap().base();
    let last = renderer.pass("last").unwrap().base();
    assert!(Arc::ptr_eq(
        &source.render_target().unwrap(),
        &last.render_target().unwrap()
    ));
    assert!(Arc::ptr_eq(
        &source.depth_stencil().unwrap(),
        &last.depth_stencil().unwrap()
    ));
    for pass in ["source", "middle", "last"] {
        let base = renderer.pass(pass).unwrap().base();
        assert!(base.consumers().all(|c| c.is_linked()));
    }
}

#[test]
fn test_consumer_without_target_is_unresolved() {
    let mut renderer = Renderer::new();
    let mut pass = MarkerPass::bare("lonely", 1);
    pass.base_mut().consume_render_target("renderTarget").unwrap();

    assert_eq!(
        renderer.add_pass(pass).map(|_| ()),
        Err(RenderError::LinkageUnresolved {
            pass: "lonely".to_string(),
            consumer: "renderTarget".to_string(),
        })
    );
    assert_eq!(renderer.pass_count(), 0);
}

#[test]
fn test_target_pass_not_found() {
    let mut renderer = Renderer::new();
    let pass = MarkerPass::threading("wireframe", "verticalBlur", 1);

    let err = renderer.add_pass(pass).unwrap_err();
    assert!(matches!(
        err,
        RenderError::PassNotFound { ref target_pass, .. } if target_pass == "verticalBlur"
    ));
    assert_eq!(err.kind(), ErrorKind::LinkageUnresolved);
}

#[test]
fn test_target_producer_not_found() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    let mut pass = MarkerPass::bare("reader", 2);
    let base = pass.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.setup_consumer_target("renderTarget", "source", "shadowMap")
        .unwrap();

    assert!(matches!(
        renderer.add_pass(pass),
        Err(RenderError::ProducerNotFound { ref producer, .. }) if producer == "shadowMap"
    ));
}

#[test]
fn test_unknown_global_producer() {
    let mut renderer = Renderer::new();
    let mut pass = MarkerPass::bare("reader", 1);
    let base = pass.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.setup_consumer_target("renderTarget", GLOBAL_SCOPE, "backColorbuffer")
        .unwrap();

    assert!(matches!(
        renderer.add_pass(pass),
        Err(RenderError::ProducerNotFound { ref target_pass, .. }) if target_pass == GLOBAL_SCOPE
    ));
}

/// A consumer may only see passes added before its own pass.
#[test]
fn test_consumer_cannot_target_later_pass() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();

    assert!(matches!(
        renderer.add_pass(MarkerPass::threading("early", "late", 1)),
        Err(RenderError::PassNotFound { .. })
    ));
    renderer
        .add_pass(MarkerPass::source(&mut device, "late", 2))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("early", "late", 1))
        .unwrap();
}

/// A type mismatch leaves the consumer unlinked, its slot empty and the
/// exclusive producer still available.
#[test]
fn test_type_mismatch_leaves_cell_untouched() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    let mut wrong = MarkerPass::bare("wrong", 2);
    let base = wrong.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.setup_consumer_target("renderTarget", "source", "depthStencil")
        .unwrap();
    assert!(wrong.base().render_target().is_none());

    let err = renderer.add_pass(wrong).unwrap_err();
    assert_eq!(
        err,
        RenderError::LinkageTypeMismatch {
            pass: "wrong".to_string(),
            consumer: "renderTarget".to_string(),
            target: "source.depthStencil".to_string(),
            expected: "RenderTarget",
            actual: "DepthStencil",
        }
    );
    assert_eq!(err.kind(), ErrorKind::LinkageTypeMismatch);

    // The depth surface was never handed out
    renderer
        .add_pass(MarkerPass::threading("right", "source", 3))
        .unwrap();
}

#[test]
fn test_binder_type_mismatch() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_global_producer(Box::new(
            Linker::with_resource("offscreen", color_target(&mut device, "offscreen")).unwrap(),
        ))
        .unwrap();

    let mut pass = MarkerPass::source(&mut device, "reader", 1);
    let base = pass.base_mut();
    base.add_binder::<ConstantBuffer>("kernel").unwrap();
    base.setup_consumer_target("kernel", GLOBAL_SCOPE, "offscreen")
        .unwrap();

    assert!(matches!(
        renderer.add_pass(pass),
        Err(RenderError::LinkageTypeMismatch { expected: "ConstantBuffer", .. })
    ));
}

/// A linker hands one bindable to any number of binders.
#[test]
fn test_linker_is_shareable() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    let offscreen = color_target(&mut device, "offscreen");
    renderer
        .add_global_producer(Box::new(
            Linker::with_resource("offscreen", Arc::clone(&offscreen)).unwrap(),
        ))
        .unwrap();

    for (name, marker) in [("first", 1), ("second", 2)] {
        let mut pass = MarkerPass::source(&mut device, name, marker);
        let base = pass.base_mut();
        base.add_binder::<RenderTarget>("input").unwrap();
        base.setup_consumer_target("input", GLOBAL_SCOPE, "offscreen")
            .unwrap();
        renderer.add_pass(pass).unwrap();
    }
    renderer.finalize().unwrap();
    device.take_commands();

    renderer.run(&mut device).unwrap();
    let sampled = device
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::SetTexture { view, .. } if *view == offscreen.view()))
        .count();
    assert_eq!(sampled, 2);
}

// ============================================================================
// Exclusive Surfaces
// ============================================================================

#[test]
fn test_surface_handed_out_once() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("first", "source", 2))
        .unwrap();

    let err = renderer
        .add_pass(MarkerPass::threading("second", "source", 3))
        .unwrap_err();
    assert_eq!(
        err,
        RenderError::ExclusiveResourceReuse {
            producer: "renderTarget".to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::ExclusiveResourceReuse);
}

#[test]
fn test_global_surface_handed_out_once() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_global_producer(Box::new(
            SurfaceProducer::new("backColorbuffer", filled_slot(color_target(&mut device, "back")))
                .unwrap(),
        ))
        .unwrap();

    for name in ["clearA", "clearB"] {
        let mut pass = MarkerPass::bare(name, 1);
        let base = pass.base_mut();
        base.consume_render_target("renderTarget").unwrap();
        base.setup_consumer_target("renderTarget", GLOBAL_SCOPE, "backColorbuffer")
            .unwrap();
        let result = renderer.add_pass(pass);
        if name == "clearA" {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(RenderError::ExclusiveResourceReuse { .. })));
        }
    }
}

/// A duplicate pass name is rejected before linking, so the surfaces it
/// would have taken stay available.
#[test]
fn test_duplicate_pass_does_not_consume_surface() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    assert_eq!(
        renderer
            .add_pass(MarkerPass::threading("source", "source", 2))
            .map(|_| ()),
        Err(RenderError::DuplicatePassName("source".to_string()))
    );
    renderer
        .add_pass(MarkerPass::threading("next", "source", 3))
        .unwrap();
}

/// A pass whose second consumer fails takes none of the surfaces its first
/// consumer resolved.
#[rstest]
#[case::missing_producer("source", "nope", ErrorKind::LinkageUnresolved)]
#[case::missing_pass("ghost", "depthStencil", ErrorKind::LinkageUnresolved)]
#[case::wrong_type("source", "renderTarget", ErrorKind::LinkageTypeMismatch)]
fn test_rejected_pass_leaves_surfaces_available(
    #[case] depth_pass: &str,
    #[case] depth_producer: &str,
    #[case] kind: ErrorKind,
) {
    init_logging();
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    let mut bad = MarkerPass::bare("bad", 2);
    let base = bad.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.consume_depth_stencil("depthStencil").unwrap();
    base.setup_consumer_target("renderTarget", "source", "renderTarget")
        .unwrap();
    base.setup_consumer_target("depthStencil", depth_pass, depth_producer)
        .unwrap();

    let err = renderer.add_pass(bad).unwrap_err();
    assert_eq!(err.kind(), kind);
    assert!(renderer.pass("bad").is_none());

    renderer
        .add_pass(MarkerPass::threading("next", "source", 3))
        .unwrap();
    renderer.finalize().unwrap();
    renderer.run(&mut device).unwrap();
    assert_eq!(markers(&device), vec![1, 3]);
}

/// Two consumers of one pass cannot split an exclusive surface.
#[test]
fn test_same_surface_twice_in_one_pass() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    let mut greedy = MarkerPass::bare("greedy", 2);
    let base = greedy.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.add_binder::<RenderTarget>("input").unwrap();
    base.setup_consumer_target("renderTarget", "source", "renderTarget")
        .unwrap();
    base.setup_consumer_target("input", "source", "renderTarget")
        .unwrap();

    assert_eq!(
        renderer.add_pass(greedy).map(|_| ()),
        Err(RenderError::ExclusiveResourceReuse {
            producer: "renderTarget".to_string()
        })
    );
    renderer
        .add_pass(MarkerPass::threading("next", "source", 3))
        .unwrap();
}

#[test]
fn test_duplicate_producer_and_consumer_names() {
    let mut base = PassBase::new("pass").unwrap();
    base.consume_render_target("renderTarget").unwrap();
    base.produce_render_target("renderTarget").unwrap();

    assert!(matches!(
        base.consume_depth_stencil("renderTarget"),
        Err(RenderError::DuplicateConsumer { .. })
    ));
    assert!(matches!(
        base.produce_depth_stencil("renderTarget"),
        Err(RenderError::DuplicateProducer { .. })
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_pass_without_surface_fails_validation() {
    let mut renderer = Renderer::new();
    renderer.add_pass(MarkerPass::bare("empty", 1)).unwrap();

    assert_eq!(
        renderer.finalize(),
        Err(RenderError::MissingRenderSurface {
            pass: "empty".to_string()
        })
    );
    assert!(!renderer.is_validated());
}

#[test]
fn test_dynamic_surface_pass_passes_validation() {
    let mut renderer = Renderer::new();
    let mut pass = MarkerPass::bare("clear", 1);
    pass.base_mut().set_binds_surfaces_dynamically(true);
    renderer.add_pass(pass).unwrap();

    assert!(renderer.finalize().is_ok());
}

#[test]
fn test_validation_is_one_shot() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();

    assert_eq!(renderer.run(&mut device), Err(RenderError::NotValidated));
    renderer.finalize().unwrap();
    assert_eq!(
        renderer.validate_consumers_linkage(),
        Err(RenderError::AlreadyValidated)
    );

    assert_eq!(
        renderer
            .add_pass(MarkerPass::source(&mut device, "late", 2))
            .map(|_| ()),
        Err(RenderError::AssemblyClosed)
    );
    let back = filled_slot(color_target(&mut device, "back"));
    assert_eq!(
        renderer.add_global_producer(Box::new(
            SurfaceProducer::new("late", Arc::clone(&back)).unwrap()
        )),
        Err(RenderError::AssemblyClosed)
    );
    assert_eq!(
        renderer.add_global_consumer(Box::new(SlotConsumer::new("late", back).unwrap())),
        Err(RenderError::AssemblyClosed)
    );
}

/// Every global consumer must be linked once assembly completes.
#[test]
fn test_untargeted_global_consumer_fails() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer
        .add_global_consumer(Box::new(
            SlotConsumer::<RenderTarget>::new("backColorbuffer", empty_slot()).unwrap(),
        ))
        .unwrap();

    assert_eq!(
        renderer.finalize(),
        Err(RenderError::LinkageUnresolved {
            pass: GLOBAL_SCOPE.to_string(),
            consumer: "backColorbuffer".to_string(),
        })
    );

    // A failed finalize leaves the renderer closed to execution but open to
    // another attempt
    assert!(!renderer.is_validated());
    assert_eq!(renderer.run(&mut device), Err(RenderError::NotValidated));

    renderer
        .setup_global_consumer_target("backColorbuffer", "source", "renderTarget")
        .unwrap();
    renderer.finalize().unwrap();
    assert!(renderer.is_validated());
    assert!(renderer
        .global_consumer("backColorbuffer")
        .unwrap()
        .is_linked());
    renderer.run(&mut device).unwrap();
    assert_eq!(markers(&device), vec![1]);
}

#[test]
fn test_global_consumer_receives_final_surface() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    let back = empty_slot::<RenderTarget>();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("last", "source", 2))
        .unwrap();
    renderer
        .add_global_consumer(Box::new(
            SlotConsumer::new("backColorbuffer", Arc::clone(&back)).unwrap(),
        ))
        .unwrap();
    renderer
        .setup_global_consumer_target("backColorbuffer", "last", "renderTarget")
        .unwrap();
    renderer.finalize().unwrap();

    let source = renderer.pass("source").unwrap().base().render_target().unwrap();
    assert!(Arc::ptr_eq(&slot_get(&back).unwrap(), &source));
    assert!(renderer.global_consumer("backColorbuffer").unwrap().is_linked());
}

// ============================================================================
// Execution
// ============================================================================

/// Passes run in insertion order regardless of which pass they link to.
#[rstest]
#[case::forward(&["a", "b", "c"])]
#[case::reverse(&["c", "b", "a"])]
#[case::mixed(&["b", "c", "a"])]
fn test_execution_follows_insertion_order(#[case] consumers: &[&str]) {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();

    // Three sources, then three consumers, each linked to one source
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        renderer
            .add_pass(MarkerPass::source(&mut device, name, i as u32 + 1))
            .unwrap();
    }
    for (i, from) in consumers.iter().enumerate() {
        let name = format!("after_{}", from);
        renderer
            .add_pass(MarkerPass::threading(&name, from, 10 + i as u32))
            .unwrap();
    }
    renderer.finalize().unwrap();

    renderer.run(&mut device).unwrap();
    assert_eq!(markers(&device), vec![1, 2, 3, 10, 11, 12]);

    let names: Vec<_> = renderer.pass_names().collect();
    assert_eq!(names[3], format!("after_{}", consumers[0]));
}

#[test]
fn test_inactive_pass_is_skipped() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer
        .add_pass(MarkerPass::threading("overlay", "source", 2))
        .unwrap();
    renderer.finalize().unwrap();

    renderer.set_pass_active("overlay", false).unwrap();
    renderer.run(&mut device).unwrap();
    assert_eq!(markers(&device), vec![1]);

    assert_eq!(
        renderer.set_pass_active("missing", false),
        Err(RenderError::UnknownPass("missing".to_string()))
    );
}

#[test]
fn test_pass_binds_color_with_depth() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    renderer.finalize().unwrap();
    device.take_commands();

    renderer.run(&mut device).unwrap();
    let base = renderer.pass("source").unwrap().base();
    let color = base.render_target().unwrap().view();
    let depth = base.depth_stencil().unwrap().view();
    assert_eq!(
        device.commands()[0],
        DeviceCommand::SetRenderTargets {
            color: Some(color),
            depth: Some(depth),
        }
    );
}

#[test]
fn test_queue_lookup() {
    let mut device = RecordingDevice::new();
    let mut renderer = Renderer::new();
    renderer
        .add_pass(MarkerPass::source(&mut device, "source", 1))
        .unwrap();
    let mut queue = RenderQueuePass::new("queue").unwrap();
    let base = queue.base_mut();
    base.consume_render_target("renderTarget").unwrap();
    base.setup_consumer_target("renderTarget", "source", "renderTarget")
        .unwrap();
    renderer.add_pass(queue).unwrap();

    assert!(renderer.render_queue_pass_mut("queue").is_ok());
    assert_eq!(
        renderer.render_queue_pass_mut("source").map(|_| ()),
        Err(RenderError::NotARenderQueuePass("source".to_string()))
    );
    assert_eq!(
        renderer.render_queue_pass_mut("nope").map(|_| ()),
        Err(RenderError::UnknownPass("nope".to_string()))
    );
    assert!(renderer.pass_as_mut::<MarkerPass>("source").is_some());
    assert!(renderer.pass_as_mut::<MarkerPass>("queue").is_none());
}

// ============================================================================
// Device Errors
// ============================================================================

#[rstest]
#[case::out_of_memory(BackendError::OutOfMemory)]
#[case::device_lost(BackendError::DeviceLost)]
fn test_device_error_propagates(#[case] failure: BackendError) {
    let mut device = RecordingDevice::new();
    device.fail_next_creation(failure.clone());

    let err: RenderError = RenderTarget::new(&mut device, "rt", 4, 4, TextureFormat::Rgba8Unorm)
        .map_err(RenderError::from)
        .unwrap_err();
    assert_eq!(err, RenderError::Device(failure));
    assert_eq!(err.kind(), ErrorKind::Device);
}
