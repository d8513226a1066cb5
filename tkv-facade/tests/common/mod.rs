use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use tkv_facade::{ClientConfig, KVClient, KvFacade};

/// Loopback server that answers each incoming command with the next canned
/// reply and reports every command it received.
pub struct ScriptedServer {
    pub addr: String,
    commands: Receiver<Vec<Vec<u8>>>,
}

impl ScriptedServer {
    pub fn start(replies: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            for reply in replies {
                let Ok(args) = read_command(&mut reader) else {
                    return;
                };
                if tx.send(args).is_err() {
                    return;
                }
                let _ = stream.write_all(&reply);
                let _ = stream.flush();
            }
        });

        ScriptedServer { addr, commands: rx }
    }

    /// Every command received so far, rendered as space-separated text.
    pub fn received(&self) -> Vec<String> {
        self.commands
            .try_iter()
            .map(|args| {
                args.iter()
                    .map(|arg| String::from_utf8_lossy(arg).into_owned())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    pub fn facade(&self) -> KvFacade<String, KVClient> {
        let config = ClientConfig {
            addr: self.addr.clone(),
            max_idle: 1,
            max_total: 1,
            read_timeout: Some(Duration::from_secs(1)),
            write_timeout: Some(Duration::from_secs(1)),
            connect_timeout: Some(Duration::from_secs(1)),
        };
        KvFacade::connect(config).expect("facade")
    }
}

pub fn ok() -> Vec<u8> {
    b"+OK\r\n".to_vec()
}

pub fn int(value: i64) -> Vec<u8> {
    format!(":{value}\r\n").into_bytes()
}

pub fn bulk(data: &str) -> Vec<u8> {
    format!("${}\r\n{}\r\n", data.len(), data).into_bytes()
}

pub fn nil() -> Vec<u8> {
    b"$-1\r\n".to_vec()
}

pub fn array(items: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", items.len()).into_bytes();
    for item in items {
        out.extend_from_slice(&bulk(item));
    }
    out
}

pub fn error(message: &str) -> Vec<u8> {
    format!("-{message}\r\n").into_bytes()
}

fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let count = read_prefixed(reader, "*")?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_prefixed(reader, "$")?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data)?;
        data.truncate(len);
        args.push(data);
    }
    Ok(args)
}

fn read_prefixed(reader: &mut BufReader<TcpStream>, prefix: &str) -> std::io::Result<usize> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    line.trim_end()
        .strip_prefix(prefix)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "bad frame"))
}
