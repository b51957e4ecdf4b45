#![warn(clippy::all, rust_2018_idioms)]
// hide console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> eframe::Result<()> {
    use clap::Parser;
    let args = sgm_admin_client::cli::Cli::parse();

    if let Err(e) = sgm_admin_client::tracing::init(&args) {
        eprintln!("Failed to start tracing: {e}");
    }

    let mut configuration =
        match sgm_admin_client::configuration::get_configuration(&args.config_dir) {
            Ok(configuration) => configuration,
            Err(e) => {
                eprintln!("Failed to load configuration: {e:?}");
                std::process::exit(1);
            }
        };
    if let Some(server_address) = args.server_address {
        configuration.client.server_address = server_address;
    }

    let rt = match sgm_admin_client::background_worker::create_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    };
    let handle = rt.handle().clone();
    // This Guard must be held to call `tokio::spawn` anywhere in the program
    let _enter = handle.enter();
    // Also keeps the runtime from stopping
    sgm_admin_client::background_worker::start_background_worker(rt);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "SGM Administración",
        native_options,
        Box::new(move |cc| {
            sgm_admin_client::SgmApp::new(cc, &configuration)
                .map(|app| Box::new(app) as Box<dyn eframe::App>)
                .map_err(Into::into)
        }),
    )
}
