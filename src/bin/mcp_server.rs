//! uix-inspector MCP Server
//!
//! This binary provides a Model Context Protocol (MCP) server for inspecting
//! uiautomator hierarchy dumps. It exposes the inspection tools to AI
//! assistants and other MCP clients.

use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use uix_inspector::inspector::{InspectorOptions, InspectorSession};
use uix_inspector::mcp::InspectorServer;

use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "uix-inspector-mcp")]
#[command(version)]
#[command(about = "Android UI hierarchy inspection MCP server", long_about = None)]
struct Cli {
    /// Dump to load at startup
    #[arg(long, value_name = "PATH")]
    dump: Option<String>,

    /// Screenshot for the startup dump
    #[arg(long, value_name = "PATH", requires = "dump")]
    screenshot: Option<String>,

    /// Tag name of element markers in the dump
    #[arg(long, default_value = "node")]
    element_tag: String,

    /// Overlay padding around selected elements, in pixels
    #[arg(long, default_value = "2")]
    highlight_padding: i32,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the stdio transport.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let options = InspectorOptions::new()
        .element_tag(cli.element_tag.clone())
        .highlight_padding(cli.highlight_padding);

    log::info!("uix-inspector MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let session = Arc::new(InspectorSession::new(options));
    if let Some(ref dump) = cli.dump {
        let loaded = session.load_files(dump, cli.screenshot.as_deref().map(std::path::Path::new))?;
        log::info!("Preloaded {} ({} elements)", dump, loaded.tree().len());
    }

    match cli.transport {
        Transport::Stdio => {
            log::info!("Transport: stdio");
            let server = InspectorServer::with_session(session).serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Http => {
            log::info!("Transport: HTTP streamable, port {}, path {}", cli.port, cli.http_path);

            let bind_addr = format!("127.0.0.1:{}", cli.port);

            // Every HTTP session talks to the same inspector state.
            let service_factory = move || Ok::<_, std::io::Error>(InspectorServer::with_session(Arc::clone(&session)));

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
