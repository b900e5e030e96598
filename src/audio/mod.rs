pub mod store;
pub mod wav;

pub use store::{AudioRef, AudioStore, DirAudioStore, MemoryAudioStore};
pub use wav::{WavFormat, WavInfo, encode, probe};
