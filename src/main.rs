mod app;
mod data;
mod sim;
mod util;

use std::time::Duration;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = data::DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long)]
    offline: bool,
    #[arg(long, default_value_t = 8)]
    timeout_secs: u64,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let endpoint = if args.offline {
        None
    } else {
        Some(args.endpoint)
    };
    let timeout = Duration::from_secs(args.timeout_secs.max(1));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "relagraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::GraphViewerApp::new(
                cc,
                endpoint.clone(),
                timeout,
            )))
        }),
    )
}
