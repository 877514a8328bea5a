mod digest;

pub use digest::{MessageDigest, RomIdSha256};
