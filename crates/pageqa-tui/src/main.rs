use std::sync::Arc;

use anyhow::Result;
use pageqa_core::{Config, QaClient};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

// One thread: every state change happens on the event loop between awaits.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    logging::initialize(&config.log_file());
    if let Some(err) = config_error {
        log::warn!("{err}; using default configuration");
    }

    let (service_url, source) = config.service_url();
    log::info!("using Q&A service at {service_url} ({source:?})");

    let client = QaClient::new(&service_url);
    let mut app = App::new(Arc::new(client), service_url, config.suggestions());
    app.start_health_check();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.quit();
    tui::restore()?;
    log::info!("terminal restored, exiting");

    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_tasks().await;
    }

    Ok(())
}
