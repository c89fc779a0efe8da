//! The menu loop: prompt on the console, pass the entry over the link
//! channels, then show it in hex and binary.

use anyhow::Result;
use uartdeck_core::{
    format_radix, parse_int_bytes, ChannelDevice, Color, LineBuffer, Radix, SerialBank, LINE_CAPACITY,
};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub entered: String,
    pub looped_back: String,
    pub value: u16,
}

pub struct Demo<D> {
    bank: SerialBank<D>,
    console: u8,
    link_out: u8,
    link_in: u8,
    stop_when_idle: bool,
}

impl<D: ChannelDevice> Demo<D> {
    /// Configures the three channels named by `config` on `bank`.
    pub fn new(mut bank: SerialBank<D>, config: &AppConfig) -> Result<Self> {
        for binding in config.bindings() {
            bank.configure(binding.channel, &binding.settings)?;
        }
        Ok(Self {
            bank,
            console: config.console.channel,
            link_out: config.link_out.channel,
            link_in: config.link_in.channel,
            stop_when_idle: false,
        })
    }

    /// Makes [`round`](Self::round) end instead of waiting whenever the
    /// console has nothing left to read. For scripted consoles, whose input
    /// is all queued up front.
    pub fn stop_when_console_idle(mut self) -> Self {
        self.stop_when_idle = true;
        self
    }

    /// One pass of the loop. Waits on the console for a key, then for a
    /// line, then on the link input for the looped-back line.
    ///
    /// Returns `None` when the console ran dry while idle stopping is on.
    pub fn round(&mut self) -> Result<Option<Round>> {
        let con = self.console;
        let idle_stop = self.stop_when_idle;
        let bank = &mut self.bank;

        if idle_stop && !bank.available(con)? {
            return Ok(None);
        }
        bank.receive(con)?;
        bank.clear_screen(con)?;

        bank.move_cursor(con, 2, 2)?;
        bank.set_color(con, Color::Yellow.into())?;
        bank.send_str(con, "Enter a number:")?;

        bank.move_cursor(con, 22, 2)?;
        bank.set_color(con, Color::Green.into())?;
        let mut entry = LineBuffer::<LINE_CAPACITY>::new();
        if idle_stop {
            if bank.read_line_received(con, &mut entry)?.is_none() {
                log::info!("console ran dry mid-line after {:?}", entry.text());
                return Ok(None);
            }
        } else {
            bank.read_line_into(con, &mut entry)?;
        }

        bank.send_bytes(self.link_out, entry.as_bytes())?;
        bank.send_str(self.link_out, "\r")?;
        let mut echo = LineBuffer::<LINE_CAPACITY>::new();
        bank.read_line_into(self.link_in, &mut echo)?;
        bank.move_cursor(con, 5, 3)?;
        bank.send_bytes(con, echo.as_bytes())?;

        let value = parse_int_bytes(entry.as_bytes());
        bank.move_cursor(con, 5, 4)?;
        bank.set_color(con, Color::Blue.into())?;
        bank.send_str(con, "Hex: ")?;
        bank.send_str(con, format_radix(value, Radix::Hex).as_str())?;

        bank.move_cursor(con, 5, 5)?;
        bank.send_str(con, "Bin: ")?;
        bank.send_str(con, format_radix(value, Radix::Binary).as_str())?;

        let round = Round {
            entered: entry.text(),
            looped_back: echo.text(),
            value,
        };
        log::info!(
            "entered {:?}, looped back {:?}, value {}",
            round.entered,
            round.looped_back,
            round.value
        );
        Ok(Some(round))
    }
}
