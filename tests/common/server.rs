//! One-shot HTTP server on a local port that replays a scripted response,
//! writing each body chunk separately with a short pause in between.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ScriptedServer {
    pub base_url: String,
    request: mpsc::Receiver<String>,
}

impl ScriptedServer {
    /// Serve one request with `status` and a chunked body.
    pub fn start(status: &str, content_type: &str, chunks: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let head = format!(
            "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n"
        );
        let (tx, request) = mpsc::channel();

        thread::spawn(move || {
            let Ok((mut socket, _)) = listener.accept() else {
                return;
            };
            let _ = tx.send(read_request(&mut socket));
            let _ = socket.write_all(head.as_bytes());
            for chunk in chunks {
                let _ = socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes());
                let _ = socket.write_all(&chunk);
                let _ = socket.write_all(b"\r\n");
                let _ = socket.flush();
                thread::sleep(Duration::from_millis(25));
            }
            let _ = socket.write_all(b"0\r\n\r\n");
            let _ = socket.flush();
        });

        Self { base_url, request }
    }

    /// Raw text of the request the server received.
    pub fn request(&self) -> String {
        self.request.recv_timeout(Duration::from_secs(5)).unwrap()
    }
}

fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let Ok(read) = socket.read(&mut buf) else {
            break;
        };
        if read == 0 {
            break;
        }
        data.extend_from_slice(&buf[..read]);
        if let Some(end) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}
