pub mod format;
pub mod library;
pub mod melody;
pub mod notes;
pub mod scale;

pub use format::{load_melody, parse_melody, save_melody, serialize_melody};
pub use library::{MelodyEntry, MelodyLibrary};
pub use melody::{note_duration_samples, Melody};
pub use scale::{map_step_to_frequency, note_to_frequency, Scale};
