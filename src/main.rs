use arranger::{
    config::Config,
    core::{project::Project, state::ArrangerState},
    engine::{EngineClient, link::WebSocketConnector},
    ui::run_app,
};
use log::{error, info, warn};

fn main() {
    let (config, config_error) = Config::load();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Some(err) = config_error {
        warn!("Ignoring config file, using defaults: {}", err);
    }

    let settings = config.client_settings();
    info!("Engine endpoint: {}", settings.url);
    let client = EngineClient::new(WebSocketConnector::new(), settings);
    let mut state = ArrangerState::new(Project::demo(), client);
    state.start();

    // Ui thread (main thread). Opens the app window
    if let Err(err) = run_app(state) {
        error!("Failed to run the arranger window: {}", err);
        std::process::exit(1);
    }
}
