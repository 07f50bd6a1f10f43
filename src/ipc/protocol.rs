//! Fixed-size binary request/response records.
//!
//! Requests are a single little-endian u32 tag. Responses carry a tag plus
//! the STEP payload (turn-angle delta and boost flag); an INIT reply uses the
//! same record with the payload bytes ignored, since the palette travels
//! through shared memory instead.

/// Wire size of a request record.
pub const REQUEST_BYTES: usize = 4;
/// Wire size of a response record.
pub const RESPONSE_BYTES: usize = 12;

const REQ_INIT: u32 = 0;
const REQ_STEP: u32 = 1;
const RES_OK: u32 = 0;

/// Request sent by the supervisor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request {
    Init,
    Step,
}

impl Request {
    pub fn encode(self) -> [u8; REQUEST_BYTES] {
        let tag = match self {
            Request::Init => REQ_INIT,
            Request::Step => REQ_STEP,
        };
        tag.to_le_bytes()
    }
}

/// Reply received from the isolated process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Response {
    Ok { delta_angle: f32, boost: bool },
    /// Any non-OK tag; the kind is reported verbatim to the caller.
    Error(u32),
}

impl Response {
    pub fn decode(buf: &[u8; RESPONSE_BYTES]) -> Self {
        let tag = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if tag == RES_OK {
            Response::Ok {
                delta_angle: f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
                boost: buf[8] != 0,
            }
        } else {
            Response::Error(tag)
        }
    }

    pub fn encode(self) -> [u8; RESPONSE_BYTES] {
        let mut buf = [0u8; RESPONSE_BYTES];
        match self {
            Response::Ok { delta_angle, boost } => {
                buf[0..4].copy_from_slice(&RES_OK.to_le_bytes());
                buf[4..8].copy_from_slice(&delta_angle.to_le_bytes());
                buf[8] = boost as u8;
            }
            Response::Error(kind) => {
                buf[0..4].copy_from_slice(&kind.to_le_bytes());
            }
        }
        buf
    }
}
