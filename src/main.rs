use clap::Parser;
use crossbeam::channel::{after, never, tick, Receiver};
use phasorlink::{
    config::Settings, logging, ui::StatusDisplay, Args, HostLoop, HostStats, LinkBridge, Result,
    SessionHandle, SimulatedSession,
};
use std::time::Instant;

fn main() {
    let args = parse_command_line_arguments();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn run(args: &Args) -> Result<()> {
    let settings = Settings::load(args)?;
    initialize_logging(args, &settings)?;

    let session = SimulatedSession::new(settings.bpm);
    let handle = session.handle();
    let bridge = LinkBridge::new(session, settings.signal_config());

    if settings.autostart {
        handle.start_playing(settings.count_in);
    } else {
        log::info!("Transport left stopped");
    }

    let stats = run_host_loop(bridge, &settings);
    report(&stats, &handle);
    Ok(())
}

fn initialize_logging(args: &Args, settings: &Settings) -> Result<()> {
    if args.log_stderr {
        logging::init_stderr_logger(settings.log_level)?;
    } else {
        logging::init_logger(settings.log_level)?;
    }
    log::info!("Application starting");
    Ok(())
}

fn shutdown_channel(settings: &Settings) -> Receiver<Instant> {
    match settings.duration {
        Some(duration) => after(duration),
        None => never(),
    }
}

fn run_host_loop(bridge: LinkBridge<SimulatedSession>, settings: &Settings) -> HostStats {
    let ticker = tick(settings.tick_interval());
    let shutdown = shutdown_channel(settings);

    // Redraw about 20 times per second regardless of the tick rate
    let redraw_every = u64::from(settings.rate / 20).max(1);
    let mut display = StatusDisplay::new(settings.quantum, redraw_every);

    println!("\nPress Ctrl+C to exit...");
    let mut host = HostLoop::new(bridge);
    let stats = host.run(&ticker, &shutdown, &mut display);
    display.finish();
    stats
}

fn report(stats: &HostStats, handle: &SessionHandle) {
    log::info!(
        "Processed {} ticks at {} BPM: {} clock, {} reset, {} beat pulses",
        stats.ticks,
        handle.tempo(),
        stats.clock_pulses,
        stats.reset_pulses,
        stats.beat_flashes
    );
    println!(
        "Processed {} ticks: {} clock pulses, {} resets, {} beats",
        stats.ticks, stats.clock_pulses, stats.reset_pulses, stats.beat_flashes
    );
}
