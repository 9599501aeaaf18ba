#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::{info, warn};
use poem::listener::TcpListener;

// Server Utilities
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx, SERVER_ARGS, SERVER_DIRS};
use crate::utils::errors::Errors;

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "ItemsServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters or build the catalog.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting items_server!");

    // Only lay down the data directories when asked.
    if SERVER_ARGS.create_dirs_only {
        println!("Data directories ready under {}.", SERVER_DIRS.root_dir);
        return Ok(());
    }

    // Initialize the server.
    server_init();

    // --------------- Main Loop Set Up ---------------
    let config = &RUNTIME_CTX.parms.config;
    let server_url = format!("{}:{}", config.http_addr, config.http_port);
    let app = v1::build_app(RUNTIME_CTX.catalog.clone(), &config.title, &server_url);

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);
    info!("Listening on {}, documentation at {}/docs.", addr, server_url);
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Initialing all subsystems and data structures other than those needed
 * to configure the main loop processor.
 */
fn server_init() {
    // Configure out log.
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));
    if RUNTIME_CTX.catalog.is_empty() {
        warn!("The configured catalog is empty, every listing will be empty.");
    } else {
        info!("Serving a catalog of {} entries.", RUNTIME_CTX.catalog.len());
    }

    // Log build info.
    print_version_info();
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running ITEMS_SERVER={}, RUSTC={}",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("RUSTC_VERSION"));
}
