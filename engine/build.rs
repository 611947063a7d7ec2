fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/market_feed.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/market_feed.proto"], &["proto"])?;
    Ok(())
}
