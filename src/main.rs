mod app;
mod data;
mod sim;
mod util;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Dataset {
    /// Paper-to-paper citation network.
    Citations,
    /// Author collaboration network.
    Coauthor,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the delimited source tables.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Pre-built {nodes, links} JSON document; bypasses the table builders.
    #[arg(long)]
    graph_json: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "citations")]
    dataset: Dataset,
    /// Node budget for the rendered view, clamped to [10, 1000].
    #[arg(long, default_value_t = 300)]
    max_nodes: usize,
    /// Disable wheel zoom.
    #[arg(long)]
    no_zoom: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = match (&args.graph_json, args.dataset) {
        (Some(path), _) => data::Source::GraphDoc { path: path.clone() },
        (None, Dataset::Citations) => data::Source::Citations {
            path: args.data_dir.join("citations.csv"),
        },
        (None, Dataset::Coauthor) => {
            let publications = args.data_dir.join("publications.csv");
            data::Source::Coauthor {
                affiliations: args.data_dir.join("affiliations.csv"),
                publications: publications.exists().then_some(publications),
            }
        }
    };
    let app_options = app::AppOptions {
        max_nodes: args.max_nodes,
        enable_zoom: !args.no_zoom,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "citegraph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CiteGraphApp::new(cc, source, app_options)))),
    )
}
