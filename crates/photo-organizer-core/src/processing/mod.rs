/// Content hashing and lightweight image inspection
mod cryptographic;
mod dimensions;

pub use cryptographic::{compute_cryptographic, hash_bytes};
pub use dimensions::{image_dimensions, read_dimensions};
