use lab_renderer::settings::RenderSettings;

fn main() {
    lab_renderer::init_logging();

    let settings = RenderSettings::load();
    if let Err(err) = lab_renderer::run(settings) {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
}
