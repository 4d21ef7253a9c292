// sprox-rs/sprox/src/transport/usb/mod.rs

#![cfg(feature = "usb")]

use std::time::Duration;

use crate::transport::traits::Transport;
use crate::{Error, Result};

use rusb::UsbContext;
use rusb::{Context, DeviceHandle};

mod descriptor;
use descriptor::find_bulk_endpoints;

/// SpringCard USB vendor id.
const VENDOR_ID: u16 = 0x1C34;

/// Minimal UsbTransport implementation. It detects the first SpringCard
/// reader on the bus (vendor id 0x1C34) and moves wire frames over the
/// bulk endpoint pair. It is feature-gated behind `--features usb` and
/// requires the `rusb` crate.
pub struct UsbTransport {
    handle: DeviceHandle<Context>,
    in_ep: Option<u8>,
    out_ep: Option<u8>,
    timeout_ms: u64,
}

impl UsbTransport {
    /// Open the first matching SpringCard reader found on the bus.
    pub fn open() -> Result<Self> {
        let ctx = Context::new()?;
        for device in ctx.devices()?.iter() {
            let dd = device.device_descriptor()?;
            if dd.vendor_id() != VENDOR_ID {
                continue;
            }

            let mut handle = device.open()?;

            let (in_ep, out_ep, iface_opt) = find_bulk_endpoints(&device);
            let iface = iface_opt.unwrap_or(0);

            // If a kernel driver owns the interface, detach it best-effort
            // and let claim_interface report a hard failure.
            if let Ok(true) = handle.kernel_driver_active(iface) {
                let _ = handle.detach_kernel_driver(iface);
            }
            handle.claim_interface(iface)?;

            return Ok(UsbTransport {
                handle,
                in_ep,
                out_ep,
                timeout_ms: crate::utils::DEFAULT_READ_TIMEOUT_MS,
            });
        }

        Err(Error::ReaderNotFound)
    }
}

impl Transport for UsbTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let timeout = Duration::from_millis(self.timeout_ms);

        let Some(ep) = self.out_ep else {
            return Err(Error::ReaderNotFound);
        };

        // Retry a few times to tolerate transient endpoint stalls; clear
        // the halt and back off between attempts.
        let mut last_rusb: Option<rusb::Error> = None;
        for attempt in 1..=3u64 {
            match self.handle.write_bulk(ep, data, timeout) {
                Ok(_) => return Ok(()),
                Err(e) => {
                    last_rusb = Some(e);
                    let _ = self.handle.clear_halt(ep);
                    std::thread::sleep(Duration::from_millis(20 * attempt));
                }
            }
        }
        match last_rusb {
            Some(e) => Err(e.into()),
            None => Err(Error::Timeout),
        }
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let timeout = Duration::from_millis(timeout_ms);
        let mut buf = vec![0u8; crate::constants::FRAME_CONTENT_SIZE + 8];

        let Some(ep) = self.in_ep else {
            return Err(Error::ReaderNotFound);
        };

        let mut last_err: Option<rusb::Error> = None;
        for attempt in 1..=3u64 {
            match self.handle.read_bulk(ep, &mut buf, timeout) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(rusb::Error::Timeout) => return Err(Error::Timeout),
                Err(e) => {
                    last_err = Some(e);
                    let _ = self.handle.clear_halt(ep);
                    std::thread::sleep(Duration::from_millis(20 * attempt));
                }
            }
        }
        match last_err {
            Some(e) => Err(e.into()),
            None => Err(Error::Timeout),
        }
    }

    fn reset(&mut self) -> Result<()> {
        // Drain any stale frame left over from an interrupted exchange so
        // the next response decoded belongs to the next request.
        if let Some(ep) = self.in_ep {
            let mut buf = vec![0u8; crate::constants::FRAME_CONTENT_SIZE + 8];
            let _ = self
                .handle
                .read_bulk(ep, &mut buf, Duration::from_millis(50));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "usb".to_string()
    }
}
