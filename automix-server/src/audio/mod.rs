pub mod loader;
pub mod wav;

pub use loader::load_audio;
pub use wav::{decode_wav16, encode_wav16};
