mod config;
mod demo;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use uartdeck_core::{list_ports, ChannelDevice, PortDevice, SerialBank, SimDevice, SimHandle};

use crate::config::AppConfig;
use crate::demo::Demo;

/// Channels provided by the reference part.
const CHANNELS: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "uartdeck")]
#[command(about = "Prompt for a number on a serial console and echo it in hex and binary")]
struct Args {
    /// JSON config file (default: <config dir>/uartdeck/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List host serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Input typed on a simulated console; "\r" ends a line
    #[arg(long, default_value = "")]
    script: String,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<usize>,

    /// Print the simulated console traffic when done
    #[arg(long)]
    trace: bool,
}

type DynDevice = Box<dyn ChannelDevice + Send>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_ports {
        for port in list_ports() {
            match (port.vid, port.pid) {
                (Some(vid), Some(pid)) => println!("{} {} ({vid:04X}:{pid:04X})", port.port_name, port.port_type),
                _ => println!("{} {}", port.port_name, port.port_type),
            }
        }
        return Ok(());
    }

    let config = AppConfig::load(args.config.as_deref())?;
    let (bank, console_sim) = build_bank(&config)?;
    let mut demo = Demo::new(bank, &config).context("configuring channels")?;

    if let Some(sim) = &console_sim {
        sim.feed(unescape(&args.script).as_bytes());
        demo = demo.stop_when_console_idle();
    }

    let mut rounds = 0;
    while args.rounds.map_or(true, |limit| rounds < limit) {
        if demo.round()?.is_none() {
            break;
        }
        rounds += 1;
    }
    log::info!("{rounds} round(s) completed");

    if let (true, Some(sim)) = (args.trace, &console_sim) {
        print!("{}", sim.traffic().to_text(false));
    }
    Ok(())
}

/// One device per channel: a host port where the config names one, a
/// simulated device otherwise. Simulated link channels are wired together.
fn build_bank(config: &AppConfig) -> Result<(SerialBank<DynDevice>, Option<SimHandle>)> {
    let mut sims: Vec<Option<SimDevice>> = Vec::new();
    let mut devices: Vec<DynDevice> = Vec::new();

    for index in 0..CHANNELS {
        let port = config
            .bindings()
            .into_iter()
            .find(|b| b.channel == index)
            .and_then(|b| b.port.as_deref());
        match port {
            Some(name) => {
                let dev = PortDevice::open(name).with_context(|| format!("opening {name} for channel {index}"))?;
                sims.push(None);
                devices.push(Box::new(dev));
            }
            None => {
                let dev = SimDevice::new();
                sims.push(Some(dev.clone()));
                devices.push(Box::new(dev));
            }
        }
    }

    let sim_at = |index: u8| sims.get(index as usize).and_then(Option::as_ref);
    if let (Some(out), Some(inp)) = (sim_at(config.link_out.channel), sim_at(config.link_in.channel)) {
        out.wire_to(inp);
    }
    let console = sim_at(config.console.channel).map(SimDevice::handle);

    let mut bank = SerialBank::new(devices);
    let hosted = hosted_channels(config);
    for channel in bank.channels_mut().filter(|ch| hosted.contains(&ch.index())) {
        channel.set_relax(host_relax);
    }
    Ok((bank, console))
}

/// Channels the config backs with a host port.
fn hosted_channels(config: &AppConfig) -> Vec<u8> {
    config
        .bindings()
        .into_iter()
        .filter(|b| b.port.is_some())
        .map(|b| b.channel)
        .collect()
}

/// Polling a host port waits on its worker thread, so give up the CPU
/// between polls instead of spinning.
fn host_relax() {
    std::thread::sleep(Duration::from_millis(1));
}

/// Expands `\r`, `\n` and `\b` in a script argument.
fn unescape(script: &str) -> String {
    script
        .replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\b", "\x08")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_expands_control_characters() {
        assert_eq!(unescape("x\\r12\\b3\\r"), "x\r12\x083\r");
    }

    #[test]
    fn simulated_bank_runs_a_round_from_a_script() {
        let config = AppConfig::default();
        let (bank, console) = build_bank(&config).unwrap();
        let console = console.unwrap();
        let mut demo = Demo::new(bank, &config).unwrap();

        console.feed(unescape("k255\\r").as_bytes());
        let round = demo.round().unwrap().unwrap();
        assert_eq!(round.value, 255);
        assert_eq!(round.looped_back, "255");
        assert!(console.transmitted_text().contains("Hex: FF"));
    }

    #[test]
    fn unterminated_script_ends_the_run() {
        let config = AppConfig::default();
        let (bank, console) = build_bank(&config).unwrap();
        let console = console.unwrap();
        let mut demo = Demo::new(bank, &config).unwrap().stop_when_console_idle();

        console.feed(unescape("k12").as_bytes());
        assert!(demo.round().unwrap().is_none());
    }

    #[test]
    fn only_port_backed_channels_are_hosted() {
        let mut config = AppConfig::default();
        assert!(hosted_channels(&config).is_empty());

        config.link_in.port = Some("/dev/ttyUSB1".to_string());
        assert_eq!(hosted_channels(&config), [3]);
    }
}
