pub mod app;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;

use app::App;
use settings::RenderSettings;
use winit::event_loop::EventLoop;

pub use error::RendererError;

/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let _ = logger_builder("RUST_LOG").try_init();
}

fn logger_builder(filter_var: &str) -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(filter_var, "info"))
}

pub fn run(settings: RenderSettings) -> Result<(), winit::error::EventLoopError> {
    log::info!("Starting lab renderer - {} stage", settings.stage.label());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Application shutdown complete");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_defaults_to_info() {
        let logger = logger_builder("LAB_RENDERER_TEST_LOG_UNSET").build();
        assert_eq!(logger.filter(), log::LevelFilter::Info);
    }

    #[test]
    fn log_filter_variable_overrides_default() {
        std::env::set_var("LAB_RENDERER_TEST_LOG_DEBUG", "debug");
        let logger = logger_builder("LAB_RENDERER_TEST_LOG_DEBUG").build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }
}
