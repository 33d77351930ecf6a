pub mod loaders;
pub mod media_type;
pub mod record;

pub use loaders::{load_images_from_folder, load_session, restore_store, save_session};
pub use record::{GroupSize, ImagePayload, ImageRecord, RecordStatus};
