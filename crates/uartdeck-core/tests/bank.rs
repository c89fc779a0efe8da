use uartdeck_core::{
    parse_int, to_string_radix, Color, LineBuffer, SerialBank, SimDevice, SimHandle, UartError,
    LINE_CAPACITY, MAX_CHANNELS,
};

fn sim_bank() -> (SerialBank<SimDevice>, Vec<SimHandle>) {
    let devices: Vec<SimDevice> = (0..4).map(|_| SimDevice::new()).collect();
    let handles = devices.iter().map(SimDevice::handle).collect();
    (SerialBank::new(devices), handles)
}

#[test]
fn configure_out_of_range_touches_no_device() {
    let (mut bank, sims) = sim_bank();
    let err = bank.configure_raw(4, 115_200, 8, 0, 1).unwrap_err();
    assert!(matches!(err, UartError::InvalidChannel(4)));
    assert!(sims.iter().all(|s| s.register_writes() == 0));
}

#[test]
fn configure_rejects_bad_framing_without_writes() {
    let (mut bank, sims) = sim_bank();
    let err = bank.configure_raw(1, 115_200, 9, 0, 1).unwrap_err();
    assert!(matches!(err, UartError::InvalidParameter(_)));
    assert_eq!(sims[1].register_writes(), 0);
}

#[test]
fn channels_are_configured_independently() {
    let (mut bank, sims) = sim_bank();
    bank.configure_raw(0, 12_345, 8, 1, 2).unwrap();
    bank.configure_raw(2, 115_200, 8, 0, 1).unwrap();

    assert_eq!(sims[0].divisor(), 161);
    assert_eq!(sims[2].divisor(), 16);
    assert_eq!(sims[1].register_writes(), 0);
    assert_eq!(sims[3].register_writes(), 0);
    assert_eq!(sims[2].baud_rate(uartdeck_core::DEFAULT_CLOCK_HZ), 117_647);
}

#[test]
fn invalid_channel_io_is_a_no_op() {
    let (mut bank, sims) = sim_bank();
    assert!(bank.send(9, b'x').is_err());
    assert!(bank.send_str(9, "abc").is_err());
    assert_eq!(bank.receive(9).unwrap_or(0), 0);
    assert!(!bank.available(9).unwrap_or(false));
    assert!(bank.clear_screen(9).is_err());
    assert!(bank.move_cursor(9, 1, 1).is_err());
    assert!(bank.set_color(9, 32).is_err());
    assert!(sims.iter().all(|s| s.transmitted().is_empty()));
}

#[test]
fn absent_text_sends_nothing() {
    let (mut bank, sims) = sim_bank();
    assert!(matches!(bank.send_str(0, None::<&str>), Err(UartError::NullInput)));
    bank.send_str(0, "ok").unwrap();
    assert_eq!(sims[0].transmitted(), b"ok");
}

#[test]
fn cursor_position_is_row_first() {
    let (mut bank, sims) = sim_bank();
    bank.move_cursor(0, 5, 3).unwrap();
    assert_eq!(sims[0].transmitted(), b"\x1b[3;5H");
}

#[test]
fn line_read_then_converted() {
    let (mut bank, sims) = sim_bank();
    sims[0].feed(b"2\x0855\r");

    let mut line = LineBuffer::<LINE_CAPACITY>::new();
    bank.read_line_into(0, &mut line).unwrap();
    let value = parse_int(&line.text());
    assert_eq!(value, 55);
    assert_eq!(to_string_radix(value, 16).unwrap(), "37");
    assert_eq!(to_string_radix(value, 2).unwrap(), "110111");
}

#[test]
fn reference_demo_round_over_loopback() {
    let devices: Vec<SimDevice> = (0..4).map(|_| SimDevice::new()).collect();
    devices[2].wire_to(&devices[3]);
    let console = devices[0].handle();
    let mut bank = SerialBank::new(devices);

    bank.configure_raw(0, 12_345, 8, 1, 2).unwrap();
    bank.configure_raw(2, 115_200, 8, 0, 1).unwrap();
    bank.configure_raw(3, 115_200, 8, 0, 1).unwrap();

    console.feed(b" 200\r");
    bank.receive(0).unwrap();
    bank.clear_screen(0).unwrap();
    bank.set_color(0, Color::Green.into()).unwrap();
    let entered = bank.read_line(0, LINE_CAPACITY).unwrap();

    for &byte in &entered {
        bank.send(2, byte).unwrap();
    }
    bank.send_str(2, "\r").unwrap();
    let echoed = bank.read_line(3, LINE_CAPACITY).unwrap();
    assert_eq!(echoed, b"200");

    let transcript = console.transmitted();
    assert!(transcript.starts_with(b"\x1b[2J\x1b[H\x1b[32m200"));
}

#[test]
fn devices_beyond_the_index_range_are_not_aliased() {
    let devices: Vec<SimDevice> = (0..300).map(|_| SimDevice::new()).collect();
    let handles: Vec<SimHandle> = devices.iter().map(SimDevice::handle).collect();
    let mut bank = SerialBank::new(devices);
    assert_eq!(bank.len(), MAX_CHANNELS);

    bank.send(0, b'a').unwrap();
    bank.send(255, b'z').unwrap();
    assert_eq!(handles[0].transmitted(), b"a");
    assert_eq!(handles[255].transmitted(), b"z");
    assert!(handles[256].transmitted().is_empty());
    assert!(bank.channels_mut().enumerate().all(|(i, ch)| ch.index() as usize == i));
}

#[test]
fn line_bytes_round_trip_unchanged() {
    let (mut bank, sims) = sim_bank();
    sims[1].feed(b"\xc3\xff\x01\r");
    let line = bank.read_line(1, 2).unwrap();
    assert_eq!(line, [0xc3, 0xff]);
    assert!(bank.read_line(9, 2).is_err());
}
