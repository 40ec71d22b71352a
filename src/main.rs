use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use strym::auth::{SessionManager, SessionStatus, SpotifyTokenExchange};
use strym::config::AppConfig;
use strym::controller::AppController;
use strym::logging;
use strym::model::{PlaybackStore, Router, SpotifyClient};
use strym::storage::FileStorage;
use strym::view::AppView;

type Session = SessionManager<FileStorage, SpotifyTokenExchange>;

const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== strym starting ===");

    let config = AppConfig::from_env()?;
    let storage = Arc::new(FileStorage::open(&config.storage_path)?);
    let router = Router::new();

    let session: Arc<Session> = Arc::new(SessionManager::new(
        storage,
        SpotifyTokenExchange::new(config.clone()),
        router.clone(),
    )?);
    let controller: AppController<SpotifyClient> =
        AppController::new(router.clone(), config.search_debounce, config.search_limit);

    // Build the catalog client once the session reports a credential
    let session_for_connect = session.clone();
    let controller_for_connect = controller.clone();
    let config_for_connect = config.clone();
    tokio::spawn(async move {
        connect_catalog(session_for_connect, controller_for_connect, config_for_connect).await;
    });

    let session_for_auth = session.clone();
    tokio::spawn(async move {
        if let Err(e) = session_for_auth.ensure_authenticated().await {
            tracing::warn!(error = %e, "Session unavailable");
        }
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let store = PlaybackStore::new();
    let res = store
        .provide(run_app(&mut terminal, &controller, &router, &session))
        .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("strym shutting down");
    Ok(())
}

async fn connect_catalog(
    session: Arc<Session>,
    controller: AppController<SpotifyClient>,
    config: AppConfig,
) {
    let mut status = session.subscribe();
    let ready = status
        .wait_for(|s| matches!(s, SessionStatus::Authenticated | SessionStatus::Failed(_)))
        .await
        .map(|s| s.clone());

    match ready {
        Ok(SessionStatus::Authenticated) => {}
        Ok(_) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Session status channel closed");
            return;
        }
    }

    let Some(credential) = session.credential().await else {
        tracing::warn!("Authenticated session without a credential");
        return;
    };

    match SpotifyClient::with_credential(&credential, &config).await {
        Ok(client) => controller.attach_catalog(client).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build catalog client");
            controller.set_status(format!("Error: {}", e)).await;
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &AppController<SpotifyClient>,
    router: &Router,
    session: &Session,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let elapsed = last_tick.elapsed();
        if elapsed >= CLOCK_INTERVAL {
            last_tick = Instant::now();
            controller.advance_clock(elapsed)?;
        }

        let ui_state = controller.get_ui_state().await;
        let route = router.current();
        let search = controller.search().await.map(|s| s.state());
        let failure = match session.status() {
            SessionStatus::Failed(reason) => Some(reason),
            _ => None,
        };

        let mut rendered = Ok(());
        terminal.draw(|f| {
            rendered = AppView::render(f, &ui_state, &route, search.as_ref(), failure.as_deref());
        })?;
        rendered?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if ui_state.should_quit {
            break;
        }
    }

    Ok(())
}
