//! Headless pipeline demo: load an image, blur it, write the result.
//!
//! Usage: pipeline <input-image> <output-image> [radius]

use pixelgraph::{default_registry, GraphEvent, NodeGraph, ParameterChange};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(input_path), Some(output_path)) = (args.next(), args.next()) else {
        eprintln!("usage: pipeline <input-image> <output-image> [radius]");
        std::process::exit(1);
    };
    let radius: i32 = args
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(5);

    let registry = default_registry();
    println!("available node types:");
    for name in registry.node_types() {
        println!("  {name}");
    }

    let mut graph = NodeGraph::new();
    graph.add_observer(|event| {
        if let GraphEvent::NodeUpdated(handle) = event {
            println!("node {} updated", handle.index());
        }
    });

    let input = graph.add_node(registry.create("Image Input").unwrap());
    let blur = graph.add_node(registry.create("Blur").unwrap());
    let output = graph.add_node(registry.create("Image Output").unwrap());

    graph.connect(input, 0, blur, 0).unwrap();
    graph.connect(blur, 0, output, 0).unwrap();

    graph
        .set_parameter(output, ParameterChange::text("path", output_path.clone()))
        .unwrap();
    graph
        .set_parameter(blur, ParameterChange::integer("radius", radius))
        .unwrap();
    graph
        .set_parameter(input, ParameterChange::text("path", input_path))
        .unwrap();

    println!("wrote {output_path}");
}
