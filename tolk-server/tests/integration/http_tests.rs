use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::integration::init_tracing;
use crate::utils::spawn_server;

#[tokio::test]
async fn test_healthz_reports_ok() -> Result<()> {
    init_tracing();
    let addr = spawn_server().await?;

    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await?;
    let mut response = String::new();
    stream.read_to_string(&mut response).await?;

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains(r#"{"status":"ok"}"#), "{}", response);
    Ok(())
}
