//! mindmap CLI
//!
//! Edits the shared mind map document stored under `MINDMAP_DATA_DIR`.
//!
//! Usage:
//!   mindmap show
//!   mindmap add-root
//!   mindmap add <parent_id>
//!   mindmap rename <node_id> <label>
//!   mindmap move <node_id> <x> <y>
//!   mindmap collapse <node_id>
//!   mindmap star <node_id>
//!   mindmap delete <node_id>
//!   mindmap reset
//!   mindmap fit

use mindmap_sync::{LocalFallback, MindMapStore, RemoteDocument, Storage, SyncConfig};
use mindmap_tree::{MindMap, Node, NodeId, Point};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!("mindmap - Edit the shared mind map");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  mindmap show                       Print the visible tree");
    eprintln!("  mindmap add-root                   Create the root node");
    eprintln!("  mindmap add <parent_id>            Add a child node");
    eprintln!("  mindmap rename <node_id> <label>   Change a node's label");
    eprintln!("  mindmap move <node_id> <x> <y>     Move a node");
    eprintln!("  mindmap collapse <node_id>         Collapse or expand a node");
    eprintln!("  mindmap star <node_id>             Star or unstar a node");
    eprintln!("  mindmap delete <node_id>           Delete a node and its subtree");
    eprintln!("  mindmap reset                      Clear the whole map");
    eprintln!("  mindmap fit                        Print the zoom-to-fit viewport");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MINDMAP_DATA_DIR   Storage directory (default: ./mindmap-data)");
    eprintln!("  MINDMAP_DOCUMENT   Document id (default: mindMaps/defaultMap)");
    eprintln!("  MINDMAP_VIEWPORT   Viewport for fit, WIDTHxHEIGHT (default: 1280x800)");
}

/// Parsed command line.
#[derive(Debug)]
enum Command {
    Show,
    AddRoot,
    Add { parent: NodeId },
    Rename { node: NodeId, label: String },
    Move { node: NodeId, position: Point },
    Collapse { node: NodeId },
    Star { node: NodeId },
    Delete { node: NodeId },
    Reset,
    Fit,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let name = args.first().ok_or("missing command")?;
    let node = |i: usize| {
        args.get(i)
            .map(|s| NodeId::new(s.as_str()))
            .ok_or(format!("{} requires a node_id argument", name))
    };
    let coord = |i: usize| -> Result<f64, String> {
        let raw = args
            .get(i)
            .ok_or(format!("{} requires <x> <y> arguments", name))?;
        raw.parse()
            .map_err(|_| format!("invalid coordinate {:?}", raw))
    };

    let cmd = match name.as_str() {
        "show" => Command::Show,
        "add-root" => Command::AddRoot,
        "add" => Command::Add { parent: node(1)? },
        "rename" => Command::Rename {
            node: node(1)?,
            label: args[2..].join(" "),
        },
        "move" => Command::Move {
            node: node(1)?,
            position: Point::new(coord(2)?, coord(3)?),
        },
        "collapse" => Command::Collapse { node: node(1)? },
        "star" => Command::Star { node: node(1)? },
        "delete" => Command::Delete { node: node(1)? },
        "reset" => Command::Reset,
        "fit" => Command::Fit,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(cmd)
}

fn print_node(map: &MindMap, node: &Node, depth: usize) {
    let marker = match (node.children.is_empty(), node.collapsed) {
        (true, _) => " ",
        (false, true) => "+",
        (false, false) => "-",
    };
    let star = if node.is_starred() { " *" } else { "" };
    println!(
        "{}{} {}{}  [{}] ({}, {})",
        "  ".repeat(depth),
        marker,
        node.label,
        star,
        node.id,
        node.position.x,
        node.position.y
    );
    if node.collapsed {
        return;
    }
    for child in node.children.iter().filter_map(|id| map.get(id)) {
        print_node(map, child, depth + 1);
    }
}

fn print_map<R: RemoteDocument, L: LocalFallback>(store: &MindMapStore<R, L>) {
    println!("status: {}", store.sync_status());
    match store.map().root() {
        Some(root) => print_node(store.map(), root, 0),
        None => println!("(empty)"),
    }
}

fn report(applied: bool, what: &str, node: &NodeId) {
    if applied {
        println!("{} {}", what, node);
    } else {
        eprintln!("Error: node {} not found", node);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindmap=info,mindmap_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    let config = SyncConfig::from_env();
    tracing::debug!("Opening {:?} document {}", config.data_dir, config.document_id);
    let storage = Storage::open(&config.data_dir)?;
    let mut store = MindMapStore::new(storage.document(&config.document_id), storage.fallback());
    store.start_listener();
    store.drain_remote();

    match cmd {
        Command::Show => print_map(&store),
        Command::AddRoot => match store.add_root().await {
            Some(id) => println!("added root {}", id),
            None => eprintln!("Error: the map already has a root"),
        },
        Command::Add { parent } => match store.add_child(&parent).await {
            Some(id) => println!("added {} under {}", id, parent),
            None => eprintln!("Error: node {} not found", parent),
        },
        Command::Rename { node, label } => match store.rename_node(&node, &label).await {
            Ok(true) => println!("renamed {}", node),
            Ok(false) => println!("{} unchanged", node),
            Err(e) => eprintln!("Error: {}", e),
        },
        Command::Move { node, position } => {
            let applied = store.move_node(&node, position).await;
            report(applied, "moved", &node);
        }
        Command::Collapse { node } => {
            let applied = store.toggle_collapse(&node).await;
            report(applied, "toggled", &node);
        }
        Command::Star { node } => {
            let applied = store.toggle_starred(&node).await;
            report(applied, "starred", &node);
        }
        Command::Delete { node } => {
            let applied = store.delete_node(&node).await;
            report(applied, "deleted", &node);
        }
        Command::Reset => {
            store.reset_map().await;
            println!("map cleared");
        }
        Command::Fit => {
            if store.zoom_to_fit(config.viewport) {
                let offset = store.canvas_offset();
                println!(
                    "scale {:.3}, offset ({:.1}, {:.1}) for {}x{}",
                    store.canvas_scale(),
                    offset.x,
                    offset.y,
                    config.viewport.x,
                    config.viewport.y
                );
            } else {
                println!("nothing to fit");
            }
        }
    }

    store.stop_listener();
    Ok(())
}
