use anyhow::{Context, Result};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io::{Read, Write};
use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};
use std::sync::mpsc;

use smartline_proto::{addr, AttributeId, Gauge, ATTRIBUTES, BAUD_RATE};

fn cmd_get<IO: Read + Write>(args: &mut CmdScanner, gauge: &mut Gauge<IO>) -> Result<()> {
    let id: AttributeId = args.parse_next()?;
    println!("{}", gauge.get(id)?);
    Ok(())
}

fn cmd_set<IO: Read + Write>(args: &mut CmdScanner, gauge: &mut Gauge<IO>) -> Result<()> {
    let id: AttributeId = args.parse_next()?;
    gauge.set(id, args.next()?)?;
    Ok(())
}

fn cmd_poll<IO: Read + Write>(args: &mut CmdScanner, gauge: &mut Gauge<IO>) -> Result<()> {
    let id: AttributeId = args.parse_next()?;
    let delay = std::time::Duration::from_secs_f32(args.parse_next()?);

    println!("Press enter to stop polling.");
    // check that the first read is ok before starting the poll stop thread
    println!("{}", gauge.get(id)?);
    let (io_tx, io_rx) = mpsc::channel::<()>();
    std::thread::spawn(move || {
        let _ch = io_tx;
        let mut buf = String::new();
        let _ = std::io::stdin().read_line(&mut buf);
    });
    loop {
        if io_rx.recv_timeout(delay) == Err(mpsc::RecvTimeoutError::Disconnected) {
            break;
        }
        println!("{}", gauge.get(id)?);
    }
    Ok(())
}

fn cmd_list() -> Result<()> {
    for attr in ATTRIBUTES.iter() {
        let access = if attr.write.is_some() { "rw" } else { "r" };
        println!("{:<16} {}", attr.name, access);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let address: u8 = match args.next() {
        Some(a) => a.parse().context("Invalid gauge address")?,
        None => 1,
    };

    let serial = serialport::new(&port, BAUD_RATE)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(std::time::Duration::from_millis(500))
        .open()
        .with_context(|| format!("Failed to open serial port {}", port))?;

    let mut stdout = std::io::stdout();

    let mut gauge = Gauge::new(serial, addr(address));
    loop {
        print!(">> ");
        stdout.flush()?;
        let mut cmd = String::new();
        let mut scan = CmdScanner::read_stdin(&mut cmd)?;
        if let Err(err) = match scan.next() {
            Err(_) => continue,
            Ok("get") | Ok("g") => cmd_get(&mut scan, &mut gauge),
            Ok("set") | Ok("s") => cmd_set(&mut scan, &mut gauge),
            Ok("poll") => cmd_poll(&mut scan, &mut gauge),
            Ok("list") => cmd_list(),
            Ok("quit") => break,
            Ok(cmd) => {
                println!("Unknown command {}", cmd);
                continue;
            }
        } {
            println!("{:?}", err)
        }
    }
    Ok(())
}

struct CmdScanner<'a> {
    splt: Peekable<SplitWhitespace<'a>>,
}

impl<'a> CmdScanner<'a> {
    fn read_stdin(buf: &'a mut String) -> Result<Self> {
        buf.clear();
        std::io::stdin().read_line(buf)?;
        let splt = buf.split_whitespace().peekable();
        Ok(Self { splt })
    }
    fn next(&mut self) -> Result<&'a str> {
        self.splt.next().context("End of stream")
    }
    fn parse_next<T: FromStr>(&mut self) -> Result<T> {
        self.next()?.parse::<T>().ok().context("Parse error")
    }
}
