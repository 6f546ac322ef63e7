//! Cartridge transport
//!
//! The bridge talks to the cartridge through [`Transport`]. The shipped
//! implementation, [`SerialTransport`], moves raw bytes over the Everdrive's
//! USB serial link.

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{anyhow, Context};
use serialport::{available_ports, SerialPort, SerialPortInfo};
use tracing::{debug, info};

/// Byte link to the cartridge.
pub trait Transport {
    /// Read up to `max` bytes. `Ok(None)` means nothing is pending yet.
    fn receive_data(&mut self, max: usize) -> io::Result<Option<Vec<u8>>>;

    /// Send a command to the cartridge.
    fn write_command(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Send a program image to the cartridge before the loop starts.
    ///
    /// The serial implementation writes the raw bytes only; it does not speak
    /// the Everdrive loader handshake.
    fn load_program(&mut self, image: &[u8]) -> io::Result<()>;
}

/// Serial link configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port name; auto-selected among USB serial ports when `None`.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// How long a read waits for the first byte, and for each following one.
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 9600,
            read_timeout_ms: 50,
        }
    }
}

const PROGRAM_CHUNK: usize = 4096;

/// Byte link over a serial port, or any other blocking reader/writer whose
/// reads time out with [`io::ErrorKind::TimedOut`].
pub struct SerialTransport<P = Box<dyn SerialPort>> {
    port: P,
}

impl SerialTransport<Box<dyn SerialPort>> {
    pub fn open(config: &SerialConfig) -> anyhow::Result<Self> {
        let name = match &config.port {
            Some(name) => name.clone(),
            None => select_port()?,
        };

        let port = serialport::new(&name, config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .with_context(|| format!("failed to open serial port {name}"))?;

        info!(port = %name, baud = config.baud_rate, "serial link open");
        Ok(Self { port })
    }
}

impl<P: Read + Write> SerialTransport<P> {
    pub fn from_port(port: P) -> Self {
        Self { port }
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

impl<P: Read + Write> Transport for SerialTransport<P> {
    fn receive_data(&mut self, max: usize) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; max];
        let mut filled = 0usize;

        while filled < max {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(buf))
    }

    fn write_command(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn load_program(&mut self, image: &[u8]) -> io::Result<()> {
        info!(bytes = image.len(), "sending program image");
        for (i, chunk) in image.chunks(PROGRAM_CHUNK).enumerate() {
            self.port.write_all(chunk)?;
            self.port.flush()?;
            debug!(chunk = i, len = chunk.len(), "program chunk sent");
        }
        Ok(())
    }
}

fn is_usb_serial(info: &SerialPortInfo) -> bool {
    matches!(info.port_type, serialport::SerialPortType::UsbPort(_))
        || info.port_name.contains("USB")
        || info.port_name.contains("usb")
        || info.port_name.contains("ACM")
}

/// Pick the only USB serial port, or fail with the candidates listed.
fn select_port() -> anyhow::Result<String> {
    let ports = available_ports().context("failed to enumerate serial ports")?;
    let names = usb_port_names(&ports);

    match names.as_slice() {
        [] => Err(anyhow!(
            "no USB serial ports found (is the cartridge connected, are you in the dialout group?)"
        )),
        [name] => {
            info!(port = %name, "using the only USB serial port");
            Ok(name.clone())
        }
        many => Err(anyhow!(
            "multiple USB serial ports found, pick one with --port: {}",
            many.join(", ")
        )),
    }
}

fn usb_port_names(ports: &[SerialPortInfo]) -> Vec<String> {
    ports
        .iter()
        .filter(|p| is_usb_serial(p))
        .map(|p| p.port_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::SerialPortType;
    use std::collections::VecDeque;

    /// Port that replays scripted reads and then times out.
    #[derive(Default)]
    struct ScriptedPort {
        reads: VecDeque<io::Result<Vec<u8>>>,
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl ScriptedPort {
        fn with_reads(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                ..Self::default()
            }
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(mut data)) => {
                    if data.len() > buf.len() {
                        let rest = data.split_off(buf.len());
                        self.reads.push_front(Ok(rest));
                    }
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::ErrorKind::TimedOut.into()),
            }
        }
    }

    impl Write for ScriptedPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_receive_accumulates_short_reads() {
        let port = ScriptedPort::with_reads(vec![
            Ok(vec![0x80; 100]),
            Ok(vec![0x80; 60]),
            Ok(vec![7; 50]),
        ]);
        let mut link = SerialTransport::from_port(port);

        let frame = link.receive_data(205).unwrap().unwrap();
        assert_eq!(frame.len(), 205);
        assert_eq!(frame[204], 7);

        // The 5 bytes past the frame stay pending for the next read.
        assert_eq!(link.receive_data(205).unwrap(), Some(vec![7; 5]));
    }

    #[test]
    fn test_receive_timeout_ends_read() {
        let port = ScriptedPort::with_reads(vec![Ok(vec![1, 2, 3])]);
        let mut link = SerialTransport::from_port(port);
        assert_eq!(link.receive_data(205).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(link.receive_data(205).unwrap(), None);
    }

    #[test]
    fn test_receive_zero_read_ends_read() {
        let port = ScriptedPort::with_reads(vec![Ok(vec![9; 4]), Ok(Vec::new()), Ok(vec![1])]);
        let mut link = SerialTransport::from_port(port);
        assert_eq!(link.receive_data(205).unwrap(), Some(vec![9; 4]));
        assert_eq!(link.receive_data(205).unwrap(), Some(vec![1]));
    }

    #[test]
    fn test_receive_retries_interrupted() {
        let port = ScriptedPort::with_reads(vec![
            Err(io::ErrorKind::Interrupted.into()),
            Ok(vec![5; 2]),
            Err(io::ErrorKind::Interrupted.into()),
            Ok(vec![6; 1]),
        ]);
        let mut link = SerialTransport::from_port(port);
        assert_eq!(link.receive_data(205).unwrap(), Some(vec![5, 5, 6]));
    }

    #[test]
    fn test_receive_propagates_link_errors() {
        let port = ScriptedPort::with_reads(vec![
            Ok(vec![1; 10]),
            Err(io::ErrorKind::BrokenPipe.into()),
        ]);
        let mut link = SerialTransport::from_port(port);
        let err = link.receive_data(205).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_write_command_flushes() {
        let mut link = SerialTransport::from_port(ScriptedPort::default());
        link.write_command(&[13, 18, 4]).unwrap();
        let port = link.into_port();
        assert_eq!(port.writes, vec![vec![13, 18, 4]]);
        assert_eq!(port.flushes, 1);
    }

    #[test]
    fn test_load_program_chunks() {
        let image: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
        let mut link = SerialTransport::from_port(ScriptedPort::default());
        link.load_program(&image).unwrap();
        let port = link.into_port();

        let sizes: Vec<usize> = port.writes.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![PROGRAM_CHUNK, PROGRAM_CHUNK, 10_000 - 2 * PROGRAM_CHUNK]);
        assert_eq!(port.flushes, 3);
        assert_eq!(port.writes.concat(), image);
    }

    fn info(name: &str, port_type: SerialPortType) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type,
        }
    }

    #[test]
    fn test_usb_port_filter() {
        let ports = vec![
            info("/dev/ttyS0", SerialPortType::Unknown),
            info("/dev/ttyUSB0", SerialPortType::Unknown),
            info("/dev/ttyACM1", SerialPortType::Unknown),
            info("/dev/cu.usbserial-1", SerialPortType::Unknown),
            info("/dev/ttyS1", SerialPortType::PciPort),
        ];
        assert_eq!(
            usb_port_names(&ports),
            vec![
                "/dev/ttyUSB0".to_string(),
                "/dev/ttyACM1".to_string(),
                "/dev/cu.usbserial-1".to_string(),
            ]
        );
    }

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::default();
        assert!(config.port.is_none());
        assert_eq!(config.baud_rate, 9600);
    }
}
