//! delegate-pulse - simulated live feed for the Delegate dashboards
//!
//! Single-threaded event loop: the generator ticks on a local task, the UI
//! loop polls the socket wire and user commands, and redraws on change.

use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use delegate_pulse::config::Config;
use delegate_pulse::event_bus::{close_wire, drain_wire};
use delegate_pulse::logging;
use delegate_pulse::panel_manager::{PanelContext, PanelManager};
use delegate_pulse::panels;
use delegate_pulse::panels::notifications::render::{self, RenderOptions, UserAction};
use delegate_pulse::panels::notifications::store::NotificationCenter;
use delegate_pulse::services::generator::EventGenerator;
use delegate_pulse::services::socket::SocketService;
use delegate_pulse::services::{self, FeedRoute};
use log::{info, warn};
use pulse_bus::EventBus;
use pulse_clock::{Clock, IntervalTicker, SystemClock};
use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use tokio::sync::watch;

enum Command {
    Action(UserAction),
    Quit,
    Unknown(String),
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load(config_path_from_args().as_deref())?;
    logging::init(&config.log_level);
    info!("Starting delegate-pulse ({})", config.dashboard.as_str());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(config))
}

/// `--config <path>` is the only flag.
fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let bus = EventBus::new();
    let center = NotificationCenter::new(config.store_capacity());
    let store = center.handle();

    let socket = Rc::new(SocketService::create(config.socket_url.clone()));
    let mut wire = if services::start_socket(&socket) {
        Some(socket.subscribe()?)
    } else {
        None
    };

    let mut manager = PanelManager::new();
    for factory in panels::factories_for(config.dashboard) {
        manager.register_boxed(factory);
    }
    manager.start(&PanelContext {
        bus: bus.clone(),
        store: store.clone(),
        clock: clock.clone(),
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut generator =
        EventGenerator::for_dashboard(config.dashboard, config.selection, config.seed)?;
    let route = FeedRoute::new(socket.clone(), bus.clone());
    let tick_period = config.tick_period();
    let max_ticks = config.max_ticks;
    let generator_task = tokio::task::spawn_local(async move {
        let mut ticker = IntervalTicker::new(tick_period);
        generator.run(&mut ticker, &route, shutdown_rx, max_ticks).await
    });

    let commands = start_command_reader();
    let options = RenderOptions {
        toast_limit: config.toast_limit,
        panel_window: config.panel_window,
        ..RenderOptions::default()
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(config.poll_period());
    let mut last_version = None;

    info!("delegate-pulse running. Commands: open <id>, dismiss <id>, read-all, clear, quit");

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = poll.tick() => {
                if let Some(rx) = wire.as_mut() {
                    drain_wire(rx, &bus);
                }

                let mut quit = false;
                for command in drain_commands(&commands) {
                    match command {
                        Command::Action(action) => {
                            render::dispatch(&store, action);
                        }
                        Command::Quit => quit = true,
                        Command::Unknown(line) => warn!("Unknown command: {}", line),
                    }
                }

                if last_version != Some(store.version()) {
                    last_version = Some(store.version());
                    let view = render::render(&center.snapshot(), clock.now(), &options);
                    for line in view.to_lines() {
                        println!("{line}");
                    }
                }

                if quit || generator_task.is_finished() {
                    break;
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match generator_task.await {
        Ok(emitted) => info!("Generator emitted {} events", emitted),
        Err(e) => warn!("Generator task failed: {}", e),
    }

    let flushed = close_wire(&mut wire, &bus);
    if flushed > 0 {
        info!("Flushed {} envelopes from the socket wire", flushed);
    }
    manager.shutdown();
    socket.dispose();
    bus.dispose();
    info!("delegate-pulse stopped");
    Ok(())
}

/// Read stdin lines on a helper thread and forward them to the UI loop.
fn start_command_reader() -> Receiver<Command> {
    let (tx, rx) = unbounded();

    let spawned = thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let command = if line == "quit" || line == "q" {
                    Command::Quit
                } else {
                    UserAction::parse(&line)
                        .map(Command::Action)
                        .unwrap_or(Command::Unknown(line))
                };
                if tx.send(command).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        warn!("Failed to spawn command reader: {}", e);
    }
    rx
}

/// Drain all pending commands without blocking.
fn drain_commands(rx: &Receiver<Command>) -> Vec<Command> {
    let mut commands = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(command) => commands.push(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    commands
}
