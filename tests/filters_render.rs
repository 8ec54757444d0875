use serde_json::json;
use texture_lab::{
    Artifact, Edge, Evaluator, Graph, Node, OperatorKind, RasterImage, Resolution,
    ResvgRasterizer, compile_svg,
};

fn chain(nodes: Vec<Node>) -> Graph {
    let edges = nodes
        .windows(2)
        .enumerate()
        .map(|(i, w)| Edge::new(format!("e{i}"), w[0].id.clone(), w[1].id.clone(), "in"))
        .collect();
    Graph::new(nodes, edges)
}

fn bake(graph: &Graph, px: u32) -> (Artifact, RasterImage) {
    let r = ResvgRasterizer::default();
    let res = Resolution::new(px).unwrap();
    let a = Evaluator::new(&r).evaluate(graph, res, None).unwrap();
    let img = a.bake(res, px, &r).unwrap();
    (a, img)
}

fn alpha(img: &RasterImage, x: u32, y: u32) -> u8 {
    img.pixel(x, y).unwrap()[3]
}

#[test]
fn beam_fades_from_top_to_near_zero_by_sixty_percent() {
    let g = chain(vec![
        Node::new("beam", OperatorKind::Beam).with_params(json!({
            "length": 250, "topWidth": 5, "bottomWidth": 100
        })),
        Node::new("out", OperatorKind::Output),
    ]);
    let (_, img) = bake(&g, 512);
    // Beam spans y = 131..381.
    let top = alpha(&img, 256, 134);
    let at_60 = alpha(&img, 256, 131 + 150);
    let bottom = alpha(&img, 256, 378);
    assert!(top > 200, "top alpha {top}");
    assert!(at_60 < 30, "alpha at 60% {at_60}");
    assert!(bottom < 10, "bottom alpha {bottom}");
    assert!(top > at_60 && at_60 >= bottom);
}

#[test]
fn fill_twice_equals_fill_once() {
    let params = json!({"fillEnabled": false, "strokeWidth": 4});
    let once = chain(vec![
        Node::new("r", OperatorKind::Rectangle),
        Node::new("f1", OperatorKind::Fill).with_params(params.clone()),
        Node::new("out", OperatorKind::Output),
    ]);
    let twice = chain(vec![
        Node::new("r", OperatorKind::Rectangle),
        Node::new("f1", OperatorKind::Fill).with_params(params.clone()),
        Node::new("f2", OperatorKind::Fill).with_params(params),
        Node::new("out", OperatorKind::Output),
    ]);
    let res = Resolution::new(128).unwrap();
    assert_eq!(
        compile_svg(&once, res, None).unwrap(),
        compile_svg(&twice, res, None).unwrap()
    );
}

#[test]
fn outline_only_fill_leaves_the_interior_empty() {
    let g = chain(vec![
        Node::new("r", OperatorKind::Rectangle).with_params(json!({"width": 64, "height": 64})),
        Node::new("f", OperatorKind::Fill).with_params(json!({"fillEnabled": false, "strokeWidth": 4})),
        Node::new("out", OperatorKind::Output),
    ]);
    let (_, img) = bake(&g, 128);
    assert_eq!(alpha(&img, 64, 64), 0);
    // Left edge of the square sits at x = 32.
    assert_eq!(alpha(&img, 32, 64), 255);
}

#[test]
fn pixelate_produces_uniform_blocks() {
    let g = chain(vec![
        Node::new("c", OperatorKind::Circle).with_params(json!({"width": 40, "height": 40})),
        Node::new("p", OperatorKind::Pixelate).with_params(json!({"pixelSize": 8})),
        Node::new("out", OperatorKind::Output),
    ]);
    let (artifact, img) = bake(&g, 64);
    let Artifact::Raster { image, .. } = &artifact else {
        panic!("pixelate output should be raster");
    };
    assert_eq!((image.width, image.height), (8, 8));

    let mut saw_partial_canvas = (false, false);
    for by in 0..8 {
        for bx in 0..8 {
            let a = img.pixel(bx * 8 + 1, by * 8 + 1).unwrap();
            let b = img.pixel(bx * 8 + 6, by * 8 + 6).unwrap();
            assert_eq!(a, b, "block ({bx}, {by}) is not uniform");
            if a[3] == 0 {
                saw_partial_canvas.0 = true;
            } else {
                saw_partial_canvas.1 = true;
            }
        }
    }
    assert_eq!(saw_partial_canvas, (true, true));
}

#[test]
fn glow_spreads_alpha_beyond_the_shape() {
    let plain = chain(vec![
        Node::new("r", OperatorKind::Rectangle).with_params(json!({"width": 40, "height": 40})),
        Node::new("out", OperatorKind::Output),
    ]);
    let glowing = chain(vec![
        Node::new("r", OperatorKind::Rectangle).with_params(json!({"width": 40, "height": 40})),
        Node::new("g", OperatorKind::Glow).with_params(json!({"radius": 4, "intensity": 2})),
        Node::new("out", OperatorKind::Output),
    ]);
    let (_, a) = bake(&plain, 128);
    let (_, b) = bake(&glowing, 128);
    // Square spans 44..84; sample just outside it.
    assert_eq!(alpha(&a, 90, 64), 0);
    assert!(alpha(&b, 90, 64) > 0);
    // Core stays solid.
    assert_eq!(alpha(&b, 64, 64), 255);
}

#[test]
fn gradient_fade_ramps_left_to_right_at_ninety_degrees() {
    let g = chain(vec![
        Node::new("v", OperatorKind::Value).with_params(json!({"value": 1.0})),
        Node::new("f", OperatorKind::GradientFade),
        Node::new("out", OperatorKind::Output),
    ]);
    let (_, img) = bake(&g, 64);
    let left = alpha(&img, 2, 32);
    let mid = alpha(&img, 32, 32);
    let right = alpha(&img, 61, 32);
    assert!(left > mid && mid > right, "{left} {mid} {right}");
    assert!(left > 240 && right < 15);
}
