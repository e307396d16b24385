use bastionzero::BastionZeroProvider;
use tfplug::ServerConfig;

#[tokio::main]
async fn main() -> tfplug::Result<()> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    tfplug::serve(BastionZeroProvider::new(), ServerConfig::default()).await
}
