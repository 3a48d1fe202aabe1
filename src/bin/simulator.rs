use bathsim::controller::BathController;
use bathsim::profile::ProfileStore;
use bathsim::protocol::{self, Command, CommandResponse, CommandType, SensorFrame};
use bathsim::SimConfig;
use clap::{App, Arg};
use colored::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tokio::time;
use tracing::{error, info, warn};

const NOTIFICATION_BROADCAST_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let matches = App::new("bathsim-simulator")
        .version("0.1.0")
        .about("Smart bath fixture simulator server")
        .arg(
            Arg::with_name("listen")
                .short("l")
                .long("listen")
                .value_name("ADDR")
                .help("TCP listen address")
                .takes_value(true)
                .default_value("127.0.0.1:8080"),
        )
        .arg(
            Arg::with_name("profiles")
                .long("profiles")
                .value_name("FILE")
                .help("Profile store path")
                .takes_value(true)
                .default_value("profiles.csv"),
        )
        .arg(
            Arg::with_name("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .help("Simulation tick period in milliseconds")
                .takes_value(true)
                .default_value("1000")
                .validator(|v| {
                    v.parse::<u64>()
                        .ok()
                        .filter(|ms| *ms > 0)
                        .map(|_| ())
                        .ok_or_else(|| "tick period must be a positive integer".into())
                }),
        )
        .get_matches();

    let config = SimConfig {
        listen_addr: matches.value_of("listen").unwrap_or_default().to_string(),
        profile_store_path: matches
            .value_of("profiles")
            .unwrap_or_default()
            .to_string(),
        tick_period_ms: matches
            .value_of("tick-ms")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000),
        ..SimConfig::default()
    };

    println!("{}", "🛁 Smart Bath Simulator".bright_blue().bold());
    println!("========================");

    // Load persisted profiles; a broken store is not fatal.
    let profile_path = PathBuf::from(&config.profile_store_path);
    let profiles = match ProfileStore::load(&profile_path) {
        Ok(store) => {
            info!("loaded {} profiles from {}", store.len(), profile_path.display());
            store
        }
        Err(e) => {
            warn!("failed to load profiles from {}: {}", profile_path.display(), e);
            ProfileStore::new()
        }
    };

    let tick_period = Duration::from_millis(config.tick_period_ms);
    let listen_addr = config.listen_addr.clone();
    let controller = Arc::new(Mutex::new(BathController::new(config, profiles)));
    let running = Arc::new(AtomicBool::new(true));

    // Create broadcast channel for display notifications
    let (notify_tx, _) = broadcast::channel(NOTIFICATION_BROADCAST_BUFFER_SIZE);

    // Start TCP server
    let tcp_controller = Arc::clone(&controller);
    let tcp_notify_tx = notify_tx.clone();
    let tcp_running = Arc::clone(&running);
    let tcp_server = tokio::spawn(async move {
        if let Err(e) = start_tcp_server(listen_addr, tcp_controller, tcp_notify_tx, tcp_running).await {
            error!("TCP server error: {}", e);
        }
    });

    // Main simulation loop: tick at a fixed period until stopped.
    let mut interval = time::interval(tick_period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let batch = {
                    let mut guard = controller.lock().await;
                    guard.tick();
                    guard.take_notifications()
                };
                // Relay outside the lock; a send error only means nobody is
                // listening right now.
                for notification in batch {
                    let _ = notify_tx.send(notification.render().to_string());
                }
                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }

    // Ordered shutdown: stop accepting, then flush profiles.
    tcp_server.abort();
    {
        let guard = controller.lock().await;
        if let Err(e) = guard.dump_profiles(&profile_path) {
            error!("failed to dump profiles: {}", e);
        } else {
            info!("profiles dumped to {}", profile_path.display());
        }
    }

    println!("{}", "🛁 Smart Bath Simulator stopped".bright_blue());
    Ok(())
}

async fn start_tcp_server(
    listen_addr: String,
    controller: Arc<Mutex<BathController>>,
    notify_tx: broadcast::Sender<String>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("🌐 TCP server listening on {}", listen_addr);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("🔗 New client connected: {}", addr);
                let client_controller = Arc::clone(&controller);
                let client_notify_tx = notify_tx.clone();
                let client_running = Arc::clone(&running);

                tokio::spawn(async move {
                    if let Err(e) =
                        handle_client(stream, client_controller, client_notify_tx, client_running)
                            .await
                    {
                        warn!("Client {} error: {}", addr, e);
                    }
                    info!("🔌 Client {} disconnected", addr);
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    controller: Arc<Mutex<BathController>>,
    notify_tx: broadcast::Sender<String>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (reader, writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    // Wrap writer in Arc<Mutex<>> so the notification stream and command
    // responses can share it.
    let writer = Arc::new(Mutex::new(writer));

    // Spawn notification streaming task
    let mut notify_rx = notify_tx.subscribe();
    let notify_writer = Arc::clone(&writer);
    let notify_task = tokio::spawn(async move {
        while let Ok(line) = notify_rx.recv().await {
            let mut writer_guard = notify_writer.lock().await;
            if writer_guard.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer_guard.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    // Process lines from the client: JSON command envelopes are answered,
    // sensor frames are applied silently, malformed input is logged and
    // dropped.
    let mut line = String::new();
    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break, // Client disconnected
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if trimmed.starts_with('{') {
                    let response = match protocol::parse_command(trimmed) {
                        Ok(command) => {
                            info!("📨 Received command: {:?}", command.command_type);
                            let (response, batch) = {
                                let mut guard = controller.lock().await;
                                let response = execute_command(&mut guard, command);
                                (response, guard.take_notifications())
                            };
                            for notification in batch {
                                let _ = notify_tx.send(notification.render().to_string());
                            }
                            response
                        }
                        Err(e) => {
                            warn!("Failed to parse command: {}", e);
                            CommandResponse::parse_error(e.to_string())
                        }
                    };

                    let response_json = serde_json::to_string(&response)?;
                    {
                        let mut writer_guard = writer.lock().await;
                        writer_guard.write_all(response_json.as_bytes()).await?;
                        writer_guard.write_all(b"\n").await?;
                    }
                } else {
                    match SensorFrame::parse(trimmed) {
                        Ok(SensorFrame::Stop) => {
                            info!("stop command received");
                            running.store(false, Ordering::SeqCst);
                            break;
                        }
                        Ok(frame) => {
                            let batch = {
                                let mut guard = controller.lock().await;
                                apply_sensor_frame(&mut guard, frame);
                                guard.take_notifications()
                            };
                            for notification in batch {
                                let _ = notify_tx.send(notification.render().to_string());
                            }
                        }
                        Err(e) => {
                            // No return channel for sensor frames.
                            warn!("dropping malformed frame '{}': {}", trimmed, e);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error reading from client: {}", e);
                break;
            }
        }
    }

    notify_task.abort();
    Ok(())
}

fn apply_sensor_frame(controller: &mut BathController, frame: SensorFrame) {
    match frame {
        SensorFrame::DefaultTemperature(t) => controller.set_default_temperature(t),
        SensorFrame::WaterQuality(sample) => controller.set_water_quality(sample),
        SensorFrame::SaltLevel(fraction) => controller.set_salt_remaining(fraction),
        SensorFrame::SetPipe {
            pipe,
            on,
            debit_lps,
            temperature_c,
        } => {
            if let Err(e) = controller.set_pipe(pipe, on, debit_lps, temperature_c) {
                warn!("remote pipe command rejected: {}", e);
            }
        }
        // Stop is handled by the listener loop itself.
        SensorFrame::Stop => {}
    }
}

fn execute_command(controller: &mut BathController, command: Command) -> CommandResponse {
    let id = command.id;
    match command.command_type {
        CommandType::Ping => CommandResponse::success(id, Some("pong".to_string())),
        CommandType::Status => {
            let payload = serde_json::to_string(&controller.status()).unwrap_or_default();
            CommandResponse::success(id, Some(payload))
        }
        CommandType::SetPipe {
            pipe,
            on,
            debit_lps,
            temperature_c,
        } => match controller.set_pipe(pipe, on, debit_lps, temperature_c) {
            Ok(()) => CommandResponse::success(id, None),
            Err(e) => CommandResponse::rejected(id, &e),
        },
        CommandType::GetPipeState { pipe } => {
            let payload = serde_json::to_string(&controller.pipe_state(pipe)).unwrap_or_default();
            CommandResponse::success(id, Some(payload))
        }
        CommandType::GetVolume => {
            CommandResponse::success(id, Some(controller.current_volume().to_string()))
        }
        CommandType::ToggleStopper { closed } => {
            controller.toggle_stopper(closed);
            CommandResponse::success(id, None)
        }
        CommandType::SetDefaultTemperature { temperature_c } => {
            controller.set_default_temperature(temperature_c);
            CommandResponse::success(id, Some(controller.default_temperature().to_string()))
        }
        CommandType::PrepareBath {
            weight_kg,
            temperature_c,
        } => {
            let result = match (weight_kg, temperature_c) {
                (Some(weight), Some(temperature)) => controller.prepare_bath(weight, temperature),
                (Some(weight), None) => controller.prepare_bath_default(weight),
                (None, _) => controller.prepare_bath_for_active_profile(),
            };
            match result {
                Ok(eta_s) => CommandResponse::success(id, Some(eta_s.to_string())),
                Err(e) => CommandResponse::rejected(id, &e),
            }
        }
        CommandType::SetPump { on } => match controller.toggle_pump(on) {
            Ok(()) => CommandResponse::success(id, None),
            Err(e) => CommandResponse::rejected(id, &e),
        },
        CommandType::AddProfile { name, profile } => {
            match controller.add_profile(&name, profile) {
                Ok(()) => CommandResponse::success(id, None),
                Err(e) => CommandResponse::rejected(id, &e),
            }
        }
        CommandType::EditProfile { name, profile } => {
            match controller.edit_profile(&name, profile) {
                Ok(()) => CommandResponse::success(id, None),
                Err(e) => CommandResponse::rejected(id, &e),
            }
        }
        CommandType::RemoveProfile { name } => match controller.remove_profile(&name) {
            Ok(_) => CommandResponse::success(id, None),
            Err(e) => CommandResponse::rejected(id, &e),
        },
        CommandType::SetActiveProfile { name } => match controller.set_active_profile(&name) {
            Ok(()) => CommandResponse::success(id, None),
            Err(e) => CommandResponse::rejected(id, &e),
        },
        CommandType::GetProfile { name } => match controller.get_profile(&name) {
            Ok(profile) => {
                let payload = serde_json::to_string(&profile).unwrap_or_default();
                CommandResponse::success(id, Some(payload))
            }
            Err(e) => CommandResponse::rejected(id, &e),
        },
        CommandType::ListProfiles => {
            let payload = serde_json::to_string(&controller.profile_names()).unwrap_or_default();
            CommandResponse::success(id, Some(payload))
        }
    }
}
