use clap::{App, Arg, ArgMatches, SubCommand};
use colored::*;
use std::process::Command;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("bathsim")
        .version("0.1.0")
        .author("Home Systems Engineering Team")
        .about("🛁 Smart Bath Simulator - bathtub and shower fixture control")
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("Simulator host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Simulator port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table", "compact"])
                .default_value("table")
                .global(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enable verbose output")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("ping")
                .about("🏓 Test connection to the bath simulator"),
        )
        .subcommand(
            SubCommand::with_name("status")
                .about("📊 Get full fixture status")
                .long_about("Retrieves pipe states, tub volume, salt system, water quality, and profile summary"),
        )
        .subcommand(
            SubCommand::with_name("pipe")
                .about("🚿 Control the bath or shower pipe")
                .arg(
                    Arg::with_name("pipe")
                        .help("Which pipe to control")
                        .required(true)
                        .possible_values(&["bath", "shower"]),
                )
                .arg(
                    Arg::with_name("state")
                        .help("Pipe state")
                        .required(true)
                        .possible_values(&["on", "off"]),
                )
                .arg(
                    Arg::with_name("debit")
                        .short("d")
                        .long("debit")
                        .value_name("LPS")
                        .help("Water debit in liters per second (defaults to the pipe ceiling)")
                        .takes_value(true)
                        .validator(|v| {
                            v.parse::<f64>()
                                .map(|_| ())
                                .map_err(|_| "Debit must be a number".into())
                        }),
                )
                .arg(
                    Arg::with_name("temp")
                        .short("t")
                        .long("temp")
                        .value_name("CELSIUS")
                        .help("Water temperature in Celsius (defaults to the default temperature)")
                        .takes_value(true)
                        .validator(|v| {
                            v.parse::<f64>()
                                .map(|_| ())
                                .map_err(|_| "Temperature must be a number".into())
                        }),
                ),
        )
        .subcommand(
            SubCommand::with_name("volume").about("💧 Get the current tub volume"),
        )
        .subcommand(
            SubCommand::with_name("prepare")
                .about("🛁 Prepare a bath sized to a body weight")
                .long_about("Opens the bath pipe at full debit and sets a fill target sized from body weight. Without --weight the active profile is used.")
                .arg(
                    Arg::with_name("weight")
                        .short("w")
                        .long("weight")
                        .value_name("KG")
                        .help("Body weight in kilograms (omit to use the active profile)")
                        .takes_value(true)
                        .validator(|v| {
                            v.parse::<f64>()
                                .map(|_| ())
                                .map_err(|_| "Weight must be a number".into())
                        }),
                )
                .arg(
                    Arg::with_name("temp")
                        .short("t")
                        .long("temp")
                        .value_name("CELSIUS")
                        .help("Water temperature in Celsius")
                        .takes_value(true)
                        .requires("weight")
                        .validator(|v| {
                            v.parse::<f64>()
                                .map(|_| ())
                                .map_err(|_| "Temperature must be a number".into())
                        }),
                ),
        )
        .subcommand(
            SubCommand::with_name("stopper")
                .about("🔘 Open or close the drain stopper")
                .arg(
                    Arg::with_name("state")
                        .help("Stopper state")
                        .required(true)
                        .possible_values(&["open", "closed"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("pump")
                .about("🧂 Control the salt pump")
                .arg(
                    Arg::with_name("state")
                        .help("Pump state")
                        .required(true)
                        .possible_values(&["on", "off"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("temp")
                .about("🌡️  Set the default water temperature")
                .arg(
                    Arg::with_name("celsius")
                        .help("Temperature in Celsius")
                        .required(true)
                        .validator(|v| {
                            v.parse::<f64>()
                                .map(|_| ())
                                .map_err(|_| "Temperature must be a number".into())
                        }),
                ),
        )
        .subcommand(
            SubCommand::with_name("profile")
                .about("👤 User profile management")
                .subcommand(
                    SubCommand::with_name("add")
                        .about("Add a new profile")
                        .arg(Arg::with_name("name").help("Profile name").required(true))
                        .arg(
                            Arg::with_name("weight")
                                .short("w")
                                .long("weight")
                                .value_name("KG")
                                .help("Body weight in kilograms")
                                .required(true)
                                .takes_value(true),
                        )
                        .arg(
                            Arg::with_name("bath-temp")
                                .long("bath-temp")
                                .value_name("CELSIUS")
                                .help("Preferred bath temperature")
                                .required(true)
                                .takes_value(true),
                        )
                        .arg(
                            Arg::with_name("shower-temp")
                                .long("shower-temp")
                                .value_name("CELSIUS")
                                .help("Preferred shower temperature")
                                .required(true)
                                .takes_value(true),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("edit")
                        .about("Edit an existing profile")
                        .arg(Arg::with_name("name").help("Profile name").required(true))
                        .arg(
                            Arg::with_name("weight")
                                .short("w")
                                .long("weight")
                                .value_name("KG")
                                .help("Body weight in kilograms")
                                .required(true)
                                .takes_value(true),
                        )
                        .arg(
                            Arg::with_name("bath-temp")
                                .long("bath-temp")
                                .value_name("CELSIUS")
                                .help("Preferred bath temperature")
                                .required(true)
                                .takes_value(true),
                        )
                        .arg(
                            Arg::with_name("shower-temp")
                                .long("shower-temp")
                                .value_name("CELSIUS")
                                .help("Preferred shower temperature")
                                .required(true)
                                .takes_value(true),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("remove")
                        .about("Remove a profile")
                        .arg(Arg::with_name("name").help("Profile name").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("activate")
                        .about("Select the active profile")
                        .arg(Arg::with_name("name").help("Profile name").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Show a profile")
                        .arg(Arg::with_name("name").help("Profile name").required(true)),
                )
                .subcommand(SubCommand::with_name("list").about("List profile names")),
        )
        .subcommand(
            SubCommand::with_name("monitor")
                .about("📈 Monitor the live notification stream")
                .long_about("Prints display notifications (pipe changes, tub volume, fill completion) as the simulator emits them"),
        )
        .subcommand(
            SubCommand::with_name("server")
                .about("🚀 Start the bath simulator server")
                .arg(
                    Arg::with_name("background")
                        .short("b")
                        .long("background")
                        .help("Run server in background"),
                ),
        )
        .get_matches();

    let host = matches.value_of("host").unwrap();
    let port = matches.value_of("port").unwrap().parse::<u16>()?;
    let format = matches.value_of("format").unwrap();
    let verbose = matches.is_present("verbose");

    if verbose {
        println!("{}", "🛁 BathSim - Smart Bath Simulator".bright_blue().bold());
        println!("{} {}:{}", "Connecting to".dimmed(), host, port);
    }

    match matches.subcommand() {
        ("ping", _) => {
            let response = send_command(host, port, envelope("Ping")).await?;
            match format {
                "json" => println!("{}", response),
                "compact" => println!("{}", "PONG".bright_green()),
                _ => {
                    if response_succeeded(&response) {
                        println!("{} {}", "✅".green(), "Bath simulator is responsive".bright_green());
                    } else {
                        println!("{} {}", "❌".red(), "Ping failed".bright_red());
                    }
                }
            }
        }
        ("status", _) => {
            let response = send_command(host, port, envelope("Status")).await?;
            print_status(&response, format);
        }
        ("pipe", Some(sub_matches)) => {
            handle_pipe_command(sub_matches, host, port, format).await?;
        }
        ("volume", _) => {
            let response = send_command(host, port, envelope("GetVolume")).await?;
            match format {
                "json" => println!("{}", response),
                _ => {
                    if let Some(volume) = response_message(&response) {
                        println!("{} {} L", "💧".bright_blue(), volume.bright_cyan());
                    } else {
                        println!("{} {}", "❌".red(), "Volume query failed".bright_red());
                    }
                }
            }
        }
        ("prepare", Some(sub_matches)) => {
            handle_prepare_command(sub_matches, host, port, format).await?;
        }
        ("stopper", Some(sub_matches)) => {
            let closed = sub_matches.value_of("state").unwrap() == "closed";
            let command = tagged_envelope("ToggleStopper", serde_json::json!({ "closed": closed }));
            let response = send_command(host, port, command).await?;
            print_command_result(
                "Stopper",
                if closed { "CLOSED" } else { "OPEN" },
                &response,
                format,
            );
        }
        ("pump", Some(sub_matches)) => {
            let on = sub_matches.value_of("state").unwrap() == "on";
            let command = tagged_envelope("SetPump", serde_json::json!({ "on": on }));
            let response = send_command(host, port, command).await?;
            print_command_result("Salt Pump", if on { "ON" } else { "OFF" }, &response, format);
        }
        ("temp", Some(sub_matches)) => {
            let celsius: f64 = sub_matches.value_of("celsius").unwrap().parse()?;
            let command = tagged_envelope(
                "SetDefaultTemperature",
                serde_json::json!({ "temperature_c": celsius }),
            );
            let response = send_command(host, port, command).await?;
            // The server clamps; report the value it settled on.
            match response_message(&response) {
                Some(applied) => print_command_result(
                    "Default Temperature",
                    &format!("{}°C", applied),
                    &response,
                    format,
                ),
                None => print_command_result(
                    "Default Temperature",
                    &format!("{}°C", celsius),
                    &response,
                    format,
                ),
            }
        }
        ("profile", Some(sub_matches)) => {
            handle_profile_command(sub_matches, host, port, format).await?;
        }
        ("monitor", _) => {
            handle_monitor(host, port).await?;
        }
        ("server", Some(sub_matches)) => {
            handle_server(sub_matches, port).await?;
        }
        _ => {
            println!("{}", "No command specified. Use --help for usage information.".yellow());
            println!("{}", "Quick start:".bright_green());
            println!("  {} Start the simulator server", "bathsim server".bright_cyan());
            println!("  {} Test connection", "bathsim ping".bright_cyan());
            println!("  {} Open the bath pipe", "bathsim pipe bath on".bright_cyan());
            println!("  {} Watch notifications", "bathsim monitor".bright_cyan());
        }
    }

    Ok(())
}

async fn handle_pipe_command(
    matches: &ArgMatches<'_>,
    host: &str,
    port: u16,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipe = matches.value_of("pipe").unwrap();
    let on = matches.value_of("state").unwrap() == "on";
    let debit: Option<f64> = matches.value_of("debit").map(|v| v.parse()).transpose()?;
    let temp: Option<f64> = matches.value_of("temp").map(|v| v.parse()).transpose()?;

    let command = tagged_envelope(
        "SetPipe",
        serde_json::json!({
            "pipe": pipe,
            "on": on,
            "debit_lps": debit,
            "temperature_c": temp,
        }),
    );
    let response = send_command(host, port, command).await?;

    let label = if pipe == "bath" { "Bath Pipe" } else { "Shower Pipe" };
    print_command_result(label, if on { "ON" } else { "OFF" }, &response, format);
    Ok(())
}

async fn handle_prepare_command(
    matches: &ArgMatches<'_>,
    host: &str,
    port: u16,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let weight: Option<f64> = matches.value_of("weight").map(|v| v.parse()).transpose()?;
    let temp: Option<f64> = matches.value_of("temp").map(|v| v.parse()).transpose()?;

    let command = tagged_envelope(
        "PrepareBath",
        serde_json::json!({ "weight_kg": weight, "temperature_c": temp }),
    );
    let response = send_command(host, port, command).await?;

    match format {
        "json" => println!("{}", response),
        _ => {
            if response_succeeded(&response) {
                let eta = response_message(&response).unwrap_or_default();
                println!(
                    "{} {} (ready in about {} s)",
                    "✅".green(),
                    "Bath preparation started".bright_green(),
                    eta.bright_cyan()
                );
            } else {
                print_rejection("Prepare Bath", &response);
            }
        }
    }
    Ok(())
}

async fn handle_profile_command(
    matches: &ArgMatches<'_>,
    host: &str,
    port: u16,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        ("add", Some(sub_matches)) | ("edit", Some(sub_matches)) => {
            let variant = if matches.subcommand_name() == Some("add") {
                "AddProfile"
            } else {
                "EditProfile"
            };
            let name = sub_matches.value_of("name").unwrap();
            let weight: f64 = sub_matches.value_of("weight").unwrap().parse()?;
            let bath_temp: f64 = sub_matches.value_of("bath-temp").unwrap().parse()?;
            let shower_temp: f64 = sub_matches.value_of("shower-temp").unwrap().parse()?;

            let command = tagged_envelope(
                variant,
                serde_json::json!({
                    "name": name,
                    "profile": {
                        "weight_kg": weight,
                        "bath_temperature_c": bath_temp,
                        "shower_temperature_c": shower_temp,
                    }
                }),
            );
            let response = send_command(host, port, command).await?;
            print_command_result("Profile", name, &response, format);
        }
        ("remove", Some(sub_matches)) => {
            let name = sub_matches.value_of("name").unwrap();
            let command = tagged_envelope("RemoveProfile", serde_json::json!({ "name": name }));
            let response = send_command(host, port, command).await?;
            print_command_result("Remove Profile", name, &response, format);
        }
        ("activate", Some(sub_matches)) => {
            let name = sub_matches.value_of("name").unwrap();
            let command = tagged_envelope("SetActiveProfile", serde_json::json!({ "name": name }));
            let response = send_command(host, port, command).await?;
            print_command_result("Active Profile", name, &response, format);
        }
        ("show", Some(sub_matches)) => {
            let name = sub_matches.value_of("name").unwrap();
            let command = tagged_envelope("GetProfile", serde_json::json!({ "name": name }));
            let response = send_command(host, port, command).await?;
            match format {
                "json" => println!("{}", response),
                _ => {
                    if let Some(payload) = response_message(&response) {
                        if let Ok(profile) = serde_json::from_str::<serde_json::Value>(&payload) {
                            println!("{} {}", "👤".bright_blue(), name.bright_white().bold());
                            println!(
                                "  Weight: {} kg",
                                profile["weight_kg"].to_string().bright_cyan()
                            );
                            println!(
                                "  Bath temperature: {}°C",
                                profile["bath_temperature_c"].to_string().bright_cyan()
                            );
                            println!(
                                "  Shower temperature: {}°C",
                                profile["shower_temperature_c"].to_string().bright_cyan()
                            );
                        }
                    } else {
                        print_rejection("Show Profile", &response);
                    }
                }
            }
        }
        ("list", _) => {
            let command = envelope("ListProfiles");
            let response = send_command(host, port, command).await?;
            match format {
                "json" => println!("{}", response),
                _ => {
                    if let Some(payload) = response_message(&response) {
                        let names: Vec<String> =
                            serde_json::from_str(&payload).unwrap_or_default();
                        if names.is_empty() {
                            println!("{}", "No profiles stored".yellow());
                        } else {
                            println!("{} {}", "👤".bright_blue(), "Profiles".bright_blue().bold());
                            for name in names {
                                println!("  {}", name.bright_white());
                            }
                        }
                    }
                }
            }
        }
        _ => {
            println!("{}", "Profile subcommand required. Use 'bathsim profile --help' for options.".yellow());
        }
    }
    Ok(())
}

async fn handle_monitor(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "📈 Monitoring bath notifications (Press Ctrl+C to stop)...".bright_blue().bold());

    let stream = TcpStream::connect((host, port)).await?;
    let mut lines = BufReader::new(stream).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() || line.starts_with('{') {
            // Command responses belong to other clients on a shared stream.
            continue;
        }
        if let Some(volume) = line.strip_prefix("currentVolume/") {
            println!("{} {} L", "💧".bright_blue(), volume.bright_cyan());
        } else if line == "targetReached" {
            println!("{} {}", "✅".green(), "Bath is ready".bright_green().bold());
        } else if let Some(rest) = line.strip_prefix("pipe/") {
            println!("{} pipe/{}", "🚿".bright_blue(), rest.bright_white());
        } else {
            println!("{}", line.dimmed());
        }
    }

    Ok(())
}

async fn handle_server(
    matches: &ArgMatches<'_>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let background = matches.is_present("background");

    println!("{}", "🚀 Starting bath simulator server...".bright_green().bold());

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--bin", "bathsim-simulator"]);

    if background {
        cmd.spawn()?;
        println!("{} Server started in background on port {}", "✅".green(), port);
    } else {
        println!("{} Server starting on port {} (Press Ctrl+C to stop)", "🌐".bright_blue(), port);
        cmd.status()?;
    }

    Ok(())
}

// Helper functions

fn print_status(response: &str, format: &str) {
    match format {
        "json" => println!("{}", response),
        _ => {
            let payload = match response_message(response)
                .and_then(|m| serde_json::from_str::<serde_json::Value>(&m).ok())
            {
                Some(p) => p,
                None => {
                    println!("{} {}", "❌".red(), "Status query failed".bright_red());
                    return;
                }
            };

            println!("{} {}", "📊".bright_blue(), "Fixture Status".bright_blue().bold());
            println!("{}", "═══════════════════".bright_blue());

            for (label, key) in [("Bath", "bath"), ("Shower", "shower")] {
                let pipe = &payload[key];
                if pipe["on"].as_bool().unwrap_or(false) {
                    println!(
                        "{}: {} ({} L/s at {}°C)",
                        label.bright_white(),
                        "ON".bright_green(),
                        pipe["debit_lps"].to_string().bright_cyan(),
                        pipe["temperature_c"].to_string().bright_cyan()
                    );
                } else {
                    println!("{}: {}", label.bright_white(), "OFF".dimmed());
                }
            }

            let tub = &payload["bathtub"];
            println!(
                "{}: {} / {} L ({})",
                "Tub".bright_white(),
                tub["current_volume_l"].to_string().bright_cyan(),
                tub["capacity_l"].to_string().bright_cyan(),
                if tub["stopper_closed"].as_bool().unwrap_or(true) {
                    "stopper closed".normal()
                } else {
                    "draining".yellow()
                }
            );
            if let Some(target) = tub["fill_target_l"].as_f64() {
                println!("{}: {} L", "Fill target".bright_white(), target.to_string().bright_cyan());
            }

            let salt = &payload["salt"];
            println!(
                "{}: pump {} ({} remaining)",
                "Salt".bright_white(),
                if salt["pump_on"].as_bool().unwrap_or(false) {
                    "ON".bright_green()
                } else {
                    "OFF".dimmed()
                },
                format!("{:.0}%", salt["remaining_fraction"].as_f64().unwrap_or(0.0) * 100.0)
                    .bright_cyan()
            );

            println!(
                "{}: {}°C",
                "Default temperature".bright_white(),
                payload["default_temperature_c"].to_string().bright_cyan()
            );

            match payload["active_profile"].as_str() {
                Some(name) => println!(
                    "{}: {} ({} stored)",
                    "Active profile".bright_white(),
                    name.bright_cyan(),
                    payload["profile_count"]
                ),
                None => println!(
                    "{}: {} ({} stored)",
                    "Active profile".bright_white(),
                    "none".dimmed(),
                    payload["profile_count"]
                ),
            }
        }
    }
}

fn print_command_result(action: &str, value: &str, response: &str, format: &str) {
    match format {
        "json" => println!("{}", response),
        "compact" => {
            if response_succeeded(response) {
                println!("{}", "OK".bright_green());
            } else {
                println!("{}", "REJECTED".bright_red());
            }
        }
        _ => {
            if response_succeeded(response) {
                println!("{} {} set to {}", "✅".green(), action.bright_white(), value.bright_cyan());
            } else {
                print_rejection(action, response);
            }
        }
    }
}

fn print_rejection(action: &str, response: &str) {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(response) {
        let kind = parsed["kind"].as_str().unwrap_or("Unknown");
        let message = parsed["message"].as_str().unwrap_or("Command rejected");
        println!("{} {} failed: {}", "❌".red(), action.bright_white(), message.bright_red());

        // Nudge toward the fix for the common rejections.
        match kind {
            "AlreadyPreparing" => {
                println!("{} A fill is in flight. Turn the bath pipe off to cancel it:", "💡".yellow());
                println!("   {}", "bathsim pipe bath off".bright_cyan());
            }
            "NoActiveProfile" => {
                println!("{} Select a profile first: {}", "💡".yellow(), "bathsim profile activate <name>".bright_cyan());
            }
            "VolumeTooLow" => {
                println!("{} The pump needs the tub at least a quarter full", "💡".yellow());
            }
            _ => {}
        }
    } else {
        println!("{} {} failed", "❌".red(), action.bright_white());
    }
}

fn response_succeeded(response: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(response)
        .map(|parsed| parsed["status"] == "Success")
        .unwrap_or(false)
}

fn response_message(response: &str) -> Option<String> {
    let parsed = serde_json::from_str::<serde_json::Value>(response).ok()?;
    if parsed["status"] != "Success" {
        return None;
    }
    parsed["message"].as_str().map(str::to_string)
}

async fn send_command(
    host: &str,
    port: u16,
    command: String,
) -> Result<String, Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", host, port);
    let stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("{} Failed to connect to bath simulator at {}", "❌".red(), addr.bright_white());

            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                eprintln!("{} Server is not running. Start it with:", "💡".yellow());
                eprintln!("   {}", "bathsim server".bright_cyan());
                eprintln!("   or");
                eprintln!("   {}", "cargo run --bin bathsim-simulator".bright_cyan());
            } else {
                eprintln!("{} Network error: {}", "🔌".yellow(), e.to_string().bright_red());
            }

            return Err(e.into());
        }
    };

    match tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let (reader, mut writer) = stream.into_split();
        writer.write_all(command.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        // The server interleaves broadcast notifications with responses on
        // the same stream; skip lines until the JSON response arrives.
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim_start().starts_with('{') {
                return Ok(line);
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "Server closed connection",
        ))
    })
    .await
    {
        Ok(result) => Ok(result?),
        Err(_) => {
            eprintln!("{} Command timed out after 5 seconds", "⏰".yellow());
            Err("Command timeout".into())
        }
    }
}

// Command envelope builders

fn envelope(unit_variant: &str) -> String {
    serde_json::json!({
        "id": current_timestamp() as u32,
        "timestamp": current_timestamp(),
        "command_type": unit_variant,
    })
    .to_string()
}

fn tagged_envelope(variant: &str, fields: serde_json::Value) -> String {
    let mut command_type = serde_json::Map::new();
    command_type.insert(variant.to_string(), fields);
    serde_json::json!({
        "id": current_timestamp() as u32,
        "timestamp": current_timestamp(),
        "command_type": command_type,
    })
    .to_string()
}

fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
