use chronicle::gui::frontend::ChronicleApp;
use chronicle::persistence::persist;
use chronicle::store::graph::ChronicleStore;

use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Load once before the UI exists; a broken autosave is treated the same
    // as no autosave
    let loaded_state = match persist::load_active() {
        Ok(state) => state,
        Err(err) => {
            log::warn!("discarding unreadable autosave: {err:#}");
            None
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([700.0, 420.0])
            .with_resizable(true),
        ..Default::default()
    };
    eframe::run_native(
        "Chronicle",
        options,
        Box::new(move |_cc| {
            if let Some(state) = loaded_state {
                Ok(Box::new(ChronicleApp::from_state(state)) as Box<dyn eframe::App>)
            } else {
                log::info!("no autosave found, starting from the starter chronicle");
                Ok(Box::new(ChronicleApp::new(ChronicleStore::starter())) as Box<dyn eframe::App>)
            }
        }),
    )
}
