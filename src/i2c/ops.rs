//! Mapping `embedded-hal` operation lists onto one engine transaction
//!
//! The engine runs at most one write phase followed by one read phase.
//! Adjacent operations of the same kind are merged, so any list of
//! writes followed by reads fits.

use embedded_hal::i2c::Operation;
use heapless::Vec;

use super::error::Error;
use crate::config::BUFFER_CAPACITY;

/// Write bytes and read length of a merged operation list
pub(crate) struct Plan {
    pub send: Vec<u8, BUFFER_CAPACITY>,
    pub read_len: usize,
}

pub(crate) fn plan(operations: &[Operation<'_>]) -> Result<Plan, Error> {
    let mut send = Vec::new();
    let mut read_len = 0usize;
    let mut reading = false;

    for op in operations {
        match op {
            Operation::Write(bytes) => {
                if reading {
                    return Err(Error::UnsupportedOperation);
                }
                send.extend_from_slice(bytes)
                    .map_err(|()| Error::CapacityExceeded)?;
            }
            Operation::Read(buffer) => {
                reading = true;
                read_len += buffer.len();
            }
        }
    }

    if read_len > BUFFER_CAPACITY {
        return Err(Error::CapacityExceeded);
    }
    Ok(Plan { send, read_len })
}

/// Distribute received bytes over the read operations in order
pub(crate) fn scatter(mut data: &[u8], operations: &mut [Operation<'_>]) {
    for op in operations {
        if let Operation::Read(buffer) = op {
            let len = buffer.len().min(data.len());
            buffer[..len].copy_from_slice(&data[..len]);
            data = &data[len..];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_then_reads_merge() {
        let mut a = [0u8; 2];
        let mut b = [0u8; 3];
        let ops = [
            Operation::Write(&[1, 2]),
            Operation::Write(&[3]),
            Operation::Read(&mut a),
            Operation::Read(&mut b),
        ];
        let plan = plan(&ops).unwrap();
        assert_eq!(plan.send.as_slice(), &[1, 2, 3]);
        assert_eq!(plan.read_len, 5);
    }

    #[test]
    fn write_after_read_is_rejected() {
        let mut a = [0u8; 1];
        let ops = [Operation::Read(&mut a), Operation::Write(&[1])];
        assert!(matches!(plan(&ops), Err(Error::UnsupportedOperation)));
    }

    #[test]
    fn oversize_write_is_rejected() {
        let big = [0u8; BUFFER_CAPACITY + 1];
        let ops = [Operation::Write(&big)];
        assert!(matches!(plan(&ops), Err(Error::CapacityExceeded)));
    }

    #[test]
    fn scatter_fills_reads_in_order() {
        let mut a = [0u8; 2];
        let mut b = [0u8; 2];
        {
            let mut ops = [
                Operation::Write(&[9]),
                Operation::Read(&mut a),
                Operation::Read(&mut b),
            ];
            scatter(&[1, 2, 3, 4], &mut ops);
        }
        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4]);
    }
}
