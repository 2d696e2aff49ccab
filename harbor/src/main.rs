//! harbor — a keyboard-friendly desktop file manager.

mod app;
mod file_list;
mod icons;
mod preview;
mod session;

use std::path::PathBuf;

use app::HarborApp;
use eframe::NativeOptions;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let start_dir = std::env::args().nth(1).map(PathBuf::from);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 700.0])
            .with_title("harbor"),
        ..Default::default()
    };

    eframe::run_native(
        "harbor",
        options,
        Box::new(|cc| {
            harborcore::HarborTheme::default().apply(&cc.egui_ctx);
            Box::new(HarborApp::new(cc, start_dir))
        }),
    )
}
