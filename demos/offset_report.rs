//! Offset report: runs the offset engine on a few sample drawings and prints
//! what came out.
//!
//! Usage:
//! ```text
//! cargo run --example offset_report                 # every pattern, distance 1.5
//! cargo run --example offset_report -- slot 0.75    # one pattern, custom distance
//! RUST_LOG=cam_offset=debug cargo run --example offset_report -- notch
//! ```

use std::f64::consts::{FRAC_PI_2, PI};
use std::process::ExitCode;

use cam_offset::{
    offset_chain_both_sides, offset_shape, Arc, Chain, ChainOffsetParameters, ChainOffsetResult,
    Ellipse, OffsetDirection, OffsetResult, Point2, Polyline, Shape, Spline, Vector2,
};

/// A named sample drawing.
struct Pattern {
    name: &'static str,
    chain: Chain,
}

fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

fn patterns() -> Vec<Pattern> {
    let notch = [
        p(0.0, 0.0),
        p(10.0, 0.0),
        p(10.0, 10.0),
        p(6.0, 10.0),
        p(6.0, 2.0),
        p(4.0, 2.0),
        p(4.0, 10.0),
        p(0.0, 10.0),
    ];
    vec![
        Pattern {
            name: "rectangle",
            chain: Chain::new(vec![Shape::polyline(Polyline::from_points(
                &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 6.0), p(0.0, 6.0)],
                true,
            ))]),
        },
        Pattern {
            name: "slot",
            chain: Chain::new(vec![
                Shape::line(p(0.0, 0.0), p(20.0, 0.0)),
                Shape::arc(Arc::new(p(20.0, 3.0), 3.0, -FRAC_PI_2, FRAC_PI_2, false)),
                Shape::line(p(20.0, 6.0), p(0.0, 6.0)),
                Shape::arc(Arc::new(p(0.0, 3.0), 3.0, FRAC_PI_2, 3.0 * FRAC_PI_2, false)),
            ]),
        },
        Pattern {
            name: "notch",
            chain: Chain::new(
                (0..notch.len())
                    .map(|i| Shape::line(notch[i], notch[(i + 1) % notch.len()]))
                    .collect(),
            ),
        },
        Pattern {
            name: "dome",
            chain: Chain::new(vec![
                Shape::line(p(-10.0, 0.0), p(10.0, 0.0)),
                Shape::ellipse(Ellipse::arc(p(0.0, 0.0), Vector2::new(10.0, 0.0), 0.6, 0.0, PI)),
            ]),
        },
        Pattern {
            name: "wave",
            chain: Chain::new(vec![Shape::spline(Spline::new(
                vec![p(0.0, 0.0), p(10.0, 5.0), p(20.0, -5.0), p(30.0, 5.0), p(40.0, 0.0)],
                3,
                vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0],
            ))]),
        },
    ]
}

fn print_shape_result(label: &str, result: &OffsetResult) {
    let status = if result.success { "ok" } else { "FAILED" };
    println!("  {label:<8} {status}: {} shape(s)", result.shapes.len());
    for shape in &result.shapes {
        if let Some(bbox) = shape.bounding_box() {
            println!(
                "    {:<9} bbox {:.3} x {:.3}",
                shape.kind().to_string(),
                bbox.width(),
                bbox.height()
            );
        }
    }
    for w in &result.warnings {
        println!("    warning: {w}");
    }
    for e in &result.errors {
        println!("    error: {e}");
    }
}

fn print_chain_result(result: &ChainOffsetResult) {
    for (side, chain) in [("outer", &result.outer_chain), ("inner", &result.inner_chain)] {
        match chain {
            Some(chain) => {
                let extent = chain
                    .bounding_box()
                    .map(|b| format!("{:.3} x {:.3}", b.width(), b.height()))
                    .unwrap_or_default();
                println!(
                    "  chain {side}: {} shape(s), closed {}, area {:.3}, bbox {extent}",
                    chain.len(),
                    chain.is_closed(1e-6),
                    chain.signed_area()
                );
            }
            None => println!("  chain {side}: none"),
        }
    }
    let m = &result.metrics;
    println!(
        "  metrics: {} in, {} out, {} gaps filled, {} overlaps trimmed, {} self-intersections, {:?}",
        m.input_shapes, m.output_shapes, m.gaps_filled, m.overlaps_trimmed, m.self_intersections, m.elapsed
    );
    for w in &result.warnings {
        println!("    warning: {w}");
    }
    for e in &result.errors {
        println!("    error: {e}");
    }
}

fn main() -> ExitCode {
    // Default: WARN for everything, INFO for cam_offset.
    // Override with RUST_LOG env var (e.g. RUST_LOG=cam_offset=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("cam_offset=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let only = args.next();
    let distance = match args.next().map(|s| s.parse::<f64>()) {
        None => 1.5,
        Some(Ok(d)) if d.is_finite() && d > 0.0 => d,
        Some(_) => {
            eprintln!("distance must be a positive number");
            return ExitCode::FAILURE;
        }
    };

    let selected: Vec<Pattern> = patterns()
        .into_iter()
        .filter(|pat| only.as_deref().map_or(true, |name| name == pat.name))
        .collect();
    if selected.is_empty() {
        let names: Vec<&str> = patterns().iter().map(|pat| pat.name).collect();
        eprintln!("unknown pattern; choose one of: {}", names.join(", "));
        return ExitCode::FAILURE;
    }

    let params = ChainOffsetParameters::default();
    for pattern in &selected {
        println!("== {} (distance {distance}) ==", pattern.name);
        if let [shape] = pattern.chain.shapes.as_slice() {
            print_shape_result("outset", &offset_shape(shape, distance, OffsetDirection::Outset));
            print_shape_result("inset", &offset_shape(shape, distance, OffsetDirection::Inset));
        }
        print_chain_result(&offset_chain_both_sides(&pattern.chain, distance, &params));
    }
    ExitCode::SUCCESS
}
