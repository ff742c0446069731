use bytes::Bytes;
use serde_derive::{Deserialize, Serialize};

/// The record sent to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Point {
        Point { x, y }
    }
}

impl Default for Point {
    fn default() -> Point {
        Point::new(1, 2)
    }
}

/// Encodes `value` as compact JSON, ready to be written to the socket.
pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(value).map(Bytes::from)
}
