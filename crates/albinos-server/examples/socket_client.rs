//! Interactive line-oriented client for poking the service by hand.
//!
//! Each stdin line must be one JSON request object; replies (and any
//! subscription events that arrive shortly after) are printed back.

use std::env;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use albinos_protocol::JsonFramer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or the well-known path.
    let path = env::var_os("ALBINOS_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("raven-os_service_albinos.sock"));

    println!("Connecting to {}...", path.display());
    let mut stream = UnixStream::connect(&path).await?;
    println!("Connected.");
    println!("Type one JSON request per line, like:");
    println!(r#"  {{"REQUEST_NAME": "CONFIG_CREATE", "CONFIG_NAME": "ma_config"}}"#);
    println!(r#"  {{"REQUEST_NAME": "CONFIG_LOAD", "CONFIG_KEY": "<key>"}}"#);
    println!(r#"  {{"REQUEST_NAME": "SETTING_UPDATE", "CONFIG_ID": 1, "SETTINGS_TO_UPDATE": {{"foo": "bar"}}}}"#);
    println!("Type 'quit' or 'exit' to leave.\n");

    let stdin = io::stdin();
    let mut framer = JsonFramer::new();
    let mut chunk = [0u8; 4096];

    loop {
        // Prompt
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let n = stdin.lock().read_line(&mut line)?;
        if n == 0 {
            println!("\nEOF on stdin, exiting client.");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        stream.write_all(trimmed.as_bytes()).await?;

        // Read back whatever arrives shortly after: the reply, possibly
        // followed by subscription events.
        loop {
            while let Some(frame) = framer.next_frame() {
                println!("<< {}", String::from_utf8_lossy(&frame));
            }

            match timeout(Duration::from_millis(200), stream.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    println!("Server closed the connection.");
                    return Ok(());
                }
                Ok(Ok(n)) => framer.push(&chunk[..n]),
                Ok(Err(e)) => {
                    eprintln!("Read error: {:?}", e);
                    return Ok(());
                }
                // Quiet again → back to the prompt.
                Err(_) => break,
            }
        }
    }

    Ok(())
}
