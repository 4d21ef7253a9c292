// A self-contained walkthrough against the mock transport: open a session,
// arbitrate protocols, read a Mifare block. Useful to see the call flow
// without a reader attached.

use sprox::constants;
use sprox::finder::Protocols;
use sprox::mifare::{MifareKey, TRANSPORT_KEY};
use sprox::test_support::{ok_frame, session_with};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let uid = [0xDEu8, 0xAD, 0xBE, 0xEF];
    let mut select_payload = vec![0x04, 0x00, 0x08, 0x04];
    select_payload.extend_from_slice(&uid);

    let mut session = session_with(
        0x0001_4102,
        vec![
            ok_frame(constants::CSB_SELECT_ANY, &select_payload),
            ok_frame(constants::CSB_A_REQUEST, &[0x04, 0x00]),
            ok_frame(constants::CSB_A_SELECT, &[0x08]),
            ok_frame(constants::MIF_AUTH, &[]),
            ok_frame(constants::MIF_READ, &[0x42; 16]),
            ok_frame(constants::CSB_A_HALT, &[]),
        ],
    )?;

    println!(
        "reader firmware {} capabilities {:?}",
        session.version(),
        session.capabilities()
    );

    let tag = session.find(Protocols::TYPE_A)?;
    println!(
        "found {:?} tag, uid {}",
        tag.protocol,
        sprox::utils::bytes_to_hex(&tag.uid)
    );

    let key = MifareKey::from(TRANSPORT_KEY);
    let block = session.mif_read_block(None, 1, Some(&key))?;
    println!("block 1: {}", block.to_hex());

    session.a_halt()?;
    Ok(())
}
