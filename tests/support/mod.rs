#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;

pub const PAGE: &str = r#"<!doctype html><html><body>
<header>Wellness</header>
<section id="hbe-services" class="hbe-services">
  <div class="hbe-services__pills" role="tablist">
    <button class="hbe-services__pill is-active" data-cat="__all" aria-selected="true">All</button>
    <button class="hbe-services__pill" data-cat="Spa" aria-selected="false">Spa</button>
    <button class="hbe-services__pill" data-cat="Yoga" aria-selected="false">Yoga</button>
  </div>
  <div id="hbeServicesGrid" class="hbe-services__grid"></div>
  <div id="hbeServicesFoot" class="hbe-services__foot"></div>
</section>
</body></html>"#;

pub const CATALOG: &str = r#"{
  "items": [
    {"title": "Sauna", "text": "Finnish sauna", "category": "Spa", "date": "2024-01-01",
     "url": "/book/sauna", "order": 2},
    {"title": "Stones", "text": "Hot stones", "category": "Spa", "date": "2024-01-01",
     "url": "/book/stones", "order": 1, "duration": "60 min", "startingPrice": "from 70 EUR"},
    {"title": "Hatha", "text": "Morning class", "category": "Yoga", "date": "2024-05-01",
     "url": "https://partner.example.net/hatha", "image": "/img/hatha.jpg",
     "audience": "Beginners"},
    {"title": "Gift card", "text": "<b>Any</b> treatment", "category": "Gifts",
     "featured": true, "newTab": true, "cta": "Buy"}
  ]
}"#;

pub fn widget_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-widget"))
}

/// Command for the widget binary with the environment overrides cleared.
pub fn widget_command() -> Command {
    let mut cmd = Command::new(widget_binary());
    cmd.env_remove("CATALOG_WIDGET_DATA_URL")
        .env_remove("CATALOG_WIDGET_VARIANT")
        .env("CATALOG_WIDGET_LOG", "off");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn run_json(cmd: Command) -> Result<Value> {
    let output = run_command(cmd)?;
    serde_json::from_slice(&output.stdout).context("widget output is not JSON")
}

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Titles of the rendered cards, in order.
pub fn card_titles(grid_html: &str) -> Vec<String> {
    grid_html
        .split(r#"<div class="hbe-services__card-title">"#)
        .skip(1)
        .filter_map(|chunk| chunk.split("</div>").next())
        .map(str::to_string)
        .collect()
}

/// Serve exactly one HTTP response on a local port.
///
/// Returns the base URL and a receiver yielding the request line the server
/// saw.
pub fn serve_once(status: &str, body: &str) -> Result<(String, mpsc::Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").context("binding test server")?;
    let addr = listener.local_addr()?;
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            let _ = reader.read_line(&mut request_line);
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            let _ = tx.send(request_line.trim_end().to_string());
        }
    });
    Ok((format!("http://{addr}/services.json"), rx))
}
