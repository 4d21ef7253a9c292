// Probe the first SpringCard reader on USB and poll for a tag.
// Build with `cargo run --example usb_probe --features usb`.

#[cfg(feature = "usb")]
fn main() -> anyhow::Result<()> {
    use sprox::finder::Protocols;
    use sprox::reader::Reader;
    use sprox::transport::usb::UsbTransport;

    env_logger::init();

    let transport = UsbTransport::open()?;
    let mut session = Reader::new_with_transport(Box::new(transport)).open()?;
    println!(
        "firmware {} capabilities {:?}",
        session.version(),
        session.capabilities()
    );

    println!("waiting for a tag (10 s)...");
    match session.find_wait(Protocols::ANY, 200, 10_000) {
        Ok(tag) => println!(
            "{:?} uid {}",
            tag.protocol,
            sprox::utils::bytes_to_hex(&tag.uid)
        ),
        Err(e) => println!("no tag: {}", e),
    }
    Ok(())
}

#[cfg(not(feature = "usb"))]
fn main() {
    eprintln!("rebuild with --features usb");
}
