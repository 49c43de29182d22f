//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Snapboard");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = pollster::block_on(snapboard_app::App::run(&args)) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
