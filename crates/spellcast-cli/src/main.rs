// Spellcast CLI Entry Point

use spellcast_cli::{output, router::CommandRouter};

#[tokio::main]
async fn main() {
    if let Err(e) = CommandRouter::route().await {
        output::print_error(&e.user_message());
        tracing::debug!(details = %e.technical_details(), "Command failed");
        std::process::exit(1);
    }
}
