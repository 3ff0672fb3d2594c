use super::*;
use crate::foundation::core::Point;

fn stage(w: f64, h: f64) -> StageSize {
    StageSize::new(w, h).unwrap()
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn rect_node(name: &str, w: f64, h: f64, c: Rgba8) -> DisplayNode {
    DisplayNode::with_content(
        name,
        NodeContent::Rect {
            size: Size::new(w, h),
            color: c,
        },
    )
}

#[test]
fn empty_tree_clears_to_black() {
    let frame = CpuStageRenderer::new()
        .render(&DisplayNode::new("root"), stage(8.0, 4.0))
        .unwrap();
    assert_eq!((frame.width, frame.height), (8, 4));
    assert_eq!(frame.data.len(), 8 * 4 * 4);
    assert!(frame.premultiplied);
    assert_eq!(px(&frame, 3, 2), [0, 0, 0, 255]);
}

#[test]
fn transparent_clear_leaves_zeroes() {
    let frame = CpuStageRenderer::new()
        .with_clear(None)
        .render(&DisplayNode::new("root"), stage(4.0, 4.0))
        .unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn rects_are_placed_relative_to_their_parent() {
    let root = DisplayNode::new("root");
    let group = DisplayNode::new("group");
    group.set_position(Point::new(10.0, 0.0));
    let r = rect_node("r", 5.0, 5.0, Rgba8::opaque(255, 0, 0));
    r.set_position(Point::new(2.0, 2.0));
    group.add_child(r);
    root.add_child(group);

    let frame = CpuStageRenderer::new().render(&root, stage(20.0, 10.0)).unwrap();
    assert_eq!(px(&frame, 14, 4), [255, 0, 0, 255]);
    assert_eq!(px(&frame, 4, 4), [0, 0, 0, 255]);
}

#[test]
fn hidden_and_transparent_nodes_are_skipped() {
    let root = DisplayNode::new("root");
    let hidden = rect_node("hidden", 10.0, 10.0, Rgba8::WHITE);
    hidden.set_visible(false);
    let faded = rect_node("faded", 10.0, 10.0, Rgba8::WHITE);
    faded.set_alpha(0.0);
    root.add_child(hidden);
    root.add_child(faded);

    let frame = CpuStageRenderer::new().render(&root, stage(10.0, 10.0)).unwrap();
    assert_eq!(px(&frame, 5, 5), [0, 0, 0, 255]);
}

#[test]
fn half_alpha_blends_over_the_background() {
    let root = DisplayNode::new("root");
    let r = rect_node("r", 10.0, 10.0, Rgba8::WHITE);
    r.set_alpha(0.5);
    root.add_child(r);

    let frame = CpuStageRenderer::new().render(&root, stage(10.0, 10.0)).unwrap();
    let [r, g, b, a] = px(&frame, 5, 5);
    assert_eq!(a, 255);
    for c in [r, g, b] {
        assert!((120..=136).contains(&c), "channel {c}");
    }
}

#[test]
fn color_matrix_filters_tint_fills_below_them() {
    let root = DisplayNode::new("root");
    root.set_filter(Some(ColorMatrix::diag(0.0, 1.0, 1.0, 1.0)));
    root.add_child(rect_node("r", 10.0, 10.0, Rgba8::WHITE));

    let frame = CpuStageRenderer::new().render(&root, stage(10.0, 10.0)).unwrap();
    assert_eq!(px(&frame, 5, 5), [0, 255, 255, 255]);
}

#[test]
fn images_are_scaled_to_their_node_size() {
    let image = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new([0u8, 255, 0, 255].repeat(4)),
    };
    let root = DisplayNode::new("root");
    root.add_child(DisplayNode::with_content(
        "bg",
        NodeContent::Image {
            image,
            size: Size::new(16.0, 16.0),
        },
    ));

    let mut renderer = CpuStageRenderer::new();
    let frame = renderer.render(&root, stage(16.0, 16.0)).unwrap();
    assert_eq!(px(&frame, 1, 1), [0, 255, 0, 255]);
    assert_eq!(px(&frame, 14, 14), [0, 255, 0, 255]);
    assert_eq!(renderer.image_cache.len(), 1);

    renderer.render(&root, stage(16.0, 16.0)).unwrap();
    assert_eq!(renderer.image_cache.len(), 1);
}

#[test]
fn text_reveals_only_visible_characters() {
    let blocks = text_blocks("abc def", 3, 10.0, Size::new(100.0, 40.0));
    assert_eq!(blocks.len(), 3);
    let all = text_blocks("abc def", 7, 10.0, Size::new(100.0, 40.0));
    assert_eq!(all.len(), 6);
}

#[test]
fn text_wraps_at_the_box_width() {
    let blocks = text_blocks("abcdef", 6, 10.0, Size::new(20.0, 100.0));
    assert!(blocks.iter().any(|b| b.y0 > 10.0));
    assert!(blocks.iter().all(|b| b.x1 <= 20.0));
}

#[test]
fn particles_are_deterministic_per_effect_name() {
    let size = Size::new(100.0, 100.0);
    let a = particles("sakura", 0.25, size);
    let b = particles("sakura", 0.25, size);
    assert_eq!(a, b);
    assert_ne!(a, particles("snow", 0.25, size));
    assert_ne!(a, particles("sakura", 0.5, size));
}

#[test]
fn models_draw_a_silhouette() {
    let root = DisplayNode::new("root");
    root.add_child(DisplayNode::with_content(
        "model",
        NodeContent::Model {
            costume: "c".to_string(),
            motion: None,
            expression: None,
            speaking: false,
            size: Size::new(40.0, 80.0),
        },
    ));
    let frame = CpuStageRenderer::new().render(&root, stage(40.0, 80.0)).unwrap();
    assert_ne!(px(&frame, 20, 60), [0, 0, 0, 255]);
    assert_eq!(px(&frame, 1, 1), [0, 0, 0, 255]);
}

#[test]
fn zero_sized_stage_is_rejected() {
    let err = CpuStageRenderer::new()
        .render(
            &DisplayNode::new("root"),
            StageSize {
                width: 0.4,
                height: 10.0,
            },
        )
        .unwrap_err();
    assert!(matches!(err, StageError::Validation(_)));
}
