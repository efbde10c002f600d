use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Read, Write};
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::Duration;

use smartline_proto::frame::{decode_response, parse_reply, TERMINATOR};
use smartline_proto::{encode_request, Address, Command};

const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Half duplex RS485 bus shared between one host and any number of gauges.
#[derive(Default)]
pub struct RS485Bus {
    host: Mutex<Weak<BusInterfaceLink>>,
    gauges: Mutex<Vec<Weak<BusInterfaceLink>>>,
    host_data_available: Arc<Condvar>,
    gauge_data_available: Arc<Condvar>,
    eof: AtomicBool,
}

impl RS485Bus {
    pub fn new() -> Arc<RS485Bus> {
        Default::default()
    }

    pub fn disconnect(&self) {
        self.eof.store(true, SeqCst);
        self.gauge_data_available.notify_all();
        self.host_data_available.notify_all();
    }

    /// Connect the host. A previously connected host stops receiving.
    pub fn new_host_interface(self: &Arc<Self>) -> BusInterface {
        let link = Arc::new(BusInterfaceLink {
            is_host: true,
            rx: Default::default(),
            rx_condvar: Arc::clone(&self.host_data_available),
        });
        *self.host.lock().unwrap() = Arc::downgrade(&link);
        BusInterface {
            bus: Arc::clone(self),
            link,
        }
    }

    pub fn new_gauge_interface(self: &Arc<Self>) -> BusInterface {
        let link = Arc::new(BusInterfaceLink {
            is_host: false,
            rx: Default::default(),
            rx_condvar: Arc::clone(&self.gauge_data_available),
        });
        self.gauges.lock().unwrap().push(Arc::downgrade(&link));
        BusInterface {
            bus: Arc::clone(self),
            link,
        }
    }
}

pub struct BusInterface {
    bus: Arc<RS485Bus>,
    link: Arc<BusInterfaceLink>,
}

struct BusInterfaceLink {
    is_host: bool,
    rx: Mutex<VecDeque<u8>>,
    rx_condvar: Arc<Condvar>,
}

impl Read for BusInterface {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let rx = self.link.rx.lock().expect("Read mutex is poisoned");
        let eof = &self.bus.eof;
        let mut rx = self
            .link
            .rx_condvar
            .wait_timeout_while(rx, READ_TIMEOUT, |rx| rx.is_empty() && !eof.load(SeqCst))
            .expect("Mutex lock failed")
            .0;
        let mut len = 0;
        while len < buf.len() {
            match rx.pop_front() {
                Some(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                None => break,
            }
        }
        if len == 0 && !self.bus.eof.load(SeqCst) {
            return Err(Error::new(ErrorKind::TimedOut, "IO read timeout"));
        }
        Ok(len)
    }
}

impl Write for BusInterface {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.link.is_host {
            let gauges = self.bus.gauges.lock().unwrap();
            for link in gauges.iter().filter_map(Weak::upgrade) {
                link.rx.lock().unwrap().extend(buf);
            }
            self.bus.gauge_data_available.notify_all();
        } else if let Some(host) = self.bus.host.lock().unwrap().upgrade() {
            host.rx.lock().unwrap().extend(buf);
            self.bus.host_data_available.notify_all();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Register state of a simulated gauge.
pub struct SimulatedGauge {
    pub address: Address,
    pub device_type: &'static str,
    pub pressure: &'static str,
    pub unit: u32,
    pub cathode: u32,
    /// Answer unit writes with an acknowledgement, like the real hardware does.
    pub ack_unit_writes: bool,
}

impl SimulatedGauge {
    pub fn new(address: u8) -> Self {
        SimulatedGauge {
            address: Address::new(address),
            device_type: "VSP3",
            pressure: "100020",
            unit: 0,
            cathode: 0,
            ack_unit_writes: false,
        }
    }

    /// Serve requests until the bus is disconnected.
    pub fn run(mut self, mut io: BusInterface) {
        let mut line = Vec::new();
        let mut byte = [0];
        loop {
            match io.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == TERMINATOR => {
                    if let Some(reply) = self.handle(&line) {
                        io.write_all(&reply).unwrap();
                    }
                    line.clear();
                }
                Ok(_) => line.push(byte[0]),
                Err(_) => continue,
            }
        }
    }

    fn handle(&mut self, line: &[u8]) -> Option<Vec<u8>> {
        let message = decode_response(line).ok()?;
        let request = parse_reply(message).ok()?;
        if !request.is_from(self.address) {
            return None;
        }
        let data = request.data;
        let (echo, answer) = match request.command {
            b'T' => (b'T', self.device_type.to_string()),
            b'M' => (b'M', self.pressure.to_string()),
            b'U' => (b'U', format!("{:06}", self.unit)),
            b'I' => (b'I', self.cathode.to_string()),
            b'u' => {
                match std::str::from_utf8(data).ok()?.parse() {
                    Ok(unit) if unit <= 2 => self.unit = unit,
                    _ => return Some(self.frame(b'N', "")),
                }
                if !self.ack_unit_writes {
                    return None;
                }
                (b'u', String::new())
            }
            b'i' => match data {
                b"0" | b"1" => {
                    self.cathode = u32::from(data[0] - b'0');
                    (b'i', String::new())
                }
                _ => (b'X', String::new()),
            },
            _ => (b'N', String::new()),
        };
        Some(self.frame(echo, &answer))
    }

    fn frame(&self, echo: u8, data: &str) -> Vec<u8> {
        encode_request(self.address, Command::new(echo), data.as_bytes())
    }
}
