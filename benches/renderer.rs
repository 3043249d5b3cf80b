use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use xmg_viewer::config::Config;
use xmg_viewer::layout::compute_layout;
use xmg_viewer::parser::parse_document;
use xmg_viewer::render::{RenderMode, render_svg};
use xmg_viewer::text_metrics::FixedTextMeasurer;
use xmg_viewer::transform::{transform_frame, transform_tree};
use xmg_viewer::{RenderContext, render_frame, render_tree};

const CATS: [&str; 5] = ["s", "np", "vp", "v", "pp"];
const KINDS: [&str; 4] = ["subst", "anchor", "foot", "std"];

fn push_node(out: &mut String, depth: usize, branching: usize, counter: &mut usize) {
    let idx = *counter;
    *counter += 1;
    let kind = if depth == 0 { KINDS[idx % KINDS.len()] } else { "std" };
    out.push_str(&format!("<node type=\"{kind}\" name=\"N{idx}\"><narg><fs>"));
    out.push_str(&format!(
        "<f name=\"top\"><fs><f name=\"i\"><sym varname=\"@X{}\"/></f><f name=\"agr\"><sym value=\"3sg\"/></f></fs></f>",
        idx % 7
    ));
    out.push_str(&format!(
        "<f name=\"cat\"><sym value=\"{}\"/></f>",
        CATS[idx % CATS.len()]
    ));
    out.push_str(&format!(
        "<f name=\"bot\"><fs><f name=\"i\"><sym varname=\"@X{}\"/></f></fs></f>",
        (idx + 1) % 7
    ));
    out.push_str("</fs></narg>");
    if depth > 0 {
        for _ in 0..branching {
            push_node(out, depth - 1, branching, counter);
        }
    }
    out.push_str("</node>");
}

fn tree_entry_source(depth: usize, branching: usize) -> String {
    let mut out = String::from("<grammar><entry name=\"bench\"><tree id=\"bench\">");
    let mut counter = 0usize;
    push_node(&mut out, depth, branching, &mut counter);
    out.push_str("</tree></entry></grammar>");
    out
}

fn frame_entry_source(components: usize, features: usize) -> String {
    let mut out = String::from("<grammar><entry name=\"bench\"><frame>");
    for c in 0..components {
        out.push_str(&format!(
            "<fs coref=\"@E{c}\"><ctype><type val=\"event\"/></ctype>"
        ));
        for f in 0..features {
            out.push_str(&format!(
                "<f name=\"f{f}\"><fs coref=\"@X{}\"><f name=\"g\"><sym value=\"v{f}\"/></f></fs></f>",
                (c + f) % 5
            ));
        }
        out.push_str("</fs>");
        out.push_str(&format!(
            "<relation name=\"part-of\"><sym varname=\"@E{c}\"/><sym varname=\"@X{}\"/></relation>",
            c % 5
        ));
    }
    out.push_str("</frame></entry></grammar>");
    out
}

fn context() -> RenderContext {
    RenderContext::with_measurer(Config::default(), Arc::new(FixedTextMeasurer::default()))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input) in [
        ("tree_d3_b2", tree_entry_source(3, 2)),
        ("tree_d5_b3", tree_entry_source(5, 3)),
        ("frame_20x8", frame_entry_source(20, 8)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let grammar = parse_document(black_box(data)).expect("parse failed");
                black_box(grammar.entries.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = Config::default();
    let measurer = FixedTextMeasurer::default();
    for (name, depth, branching) in [("tree_d3_b2", 3, 2), ("tree_d5_b3", 5, 3)] {
        let grammar = parse_document(&tree_entry_source(depth, branching)).expect("parse failed");
        let (scene, root) = transform_tree(&grammar.entries[0]).expect("tree missing");
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let geometry = compute_layout(
                    black_box(&scene),
                    root,
                    &measurer,
                    &config.layout,
                    &config.theme,
                );
                black_box(geometry.size(root));
            });
        });
    }
    let grammar = parse_document(&frame_entry_source(20, 8)).expect("parse failed");
    let (scene, root) = transform_frame(&grammar.entries[0]).expect("frame missing");
    group.bench_function(BenchmarkId::from_parameter("frame_20x8"), |b| {
        b.iter(|| {
            let geometry =
                compute_layout(black_box(&scene), root, &measurer, &config.layout, &config.theme);
            black_box(geometry.size(root));
        });
    });
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let context = context();
    let grammar = parse_document(&tree_entry_source(5, 3)).expect("parse failed");
    let mut view = render_tree(&grammar.entries[0], &context)
        .into_view()
        .expect("tree missing");
    view.activate_label("X3");
    group.bench_function("tree_d5_b3_interactive", |b| {
        b.iter(|| black_box(render_svg(black_box(&view), RenderMode::Interactive).len()));
    });

    let grammar = parse_document(&frame_entry_source(20, 8)).expect("parse failed");
    let view = render_frame(&grammar.entries[0], &context)
        .into_view()
        .expect("frame missing");
    group.bench_function("frame_20x8_static", |b| {
        b.iter(|| black_box(render_svg(black_box(&view), RenderMode::Static).len()));
    });
    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("toggle");
    let context = context();
    let grammar = parse_document(&tree_entry_source(5, 3)).expect("parse failed");
    let mut view = render_tree(&grammar.entries[0], &context)
        .into_view()
        .expect("tree missing");
    let leaf = *view.nodes().last().expect("tree has nodes");
    group.bench_function("leaf_node", |b| {
        b.iter(|| black_box(view.toggle_node(black_box(leaf))));
    });
    group.bench_function("collapse_expand_all", |b| {
        b.iter(|| {
            view.collapse_all();
            view.expand_all();
            black_box(view.size());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_render, bench_toggle);
criterion_main!(benches);
